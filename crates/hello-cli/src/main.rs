//! hello CLI
//!
//! Command-line front end for the hello capability registry.
//!
//! ## Usage
//!
//! ```bash
//! # Call a registered function
//! hello call hello.foo
//! hello call hello.dummy_2_to_3 '[{"x": 11, "y": 22}]'
//!
//! # List functions with their descriptions
//! hello catalog
//!
//! # Check whether optional libraries can be found
//! hello probe vxl vxl.vgl
//!
//! # Build the module (namespace + optional siblings) and show the result
//! hello init --config hello.yaml
//!
//! # Run the "hiya" self-test
//! hello selftest --format json
//! ```
//!
//! ## Exit Codes
//!
//! - 0: Success
//! - 1: Self-test failed, or a probed library is not available
//! - 3: Error

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use hello_core::{
    classify, selftest, Availability, Bootstrap, HelloConfig, RecordingImporter, Value,
};

/// hello: native capabilities published through language bindings
#[derive(Parser, Debug)]
#[command(name = "hello")]
#[command(version)]
#[command(about = "Call, list and probe hello capabilities", long_about = None)]
struct Cli {
    /// Path to a config file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Call a registered function
    Call {
        /// Function path, e.g. hello.foo or proj.hello.foo
        path: String,

        /// Arguments as a JSON array
        #[arg(default_value = "[]")]
        args: String,
    },

    /// List registered functions and their descriptions
    Catalog,

    /// Check whether libraries can be found on the search path
    Probe {
        /// Library names, e.g. vxl or vxl.vgl
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Build the module and import the optional siblings that are present
    Init,

    /// Run the "hiya" self-test
    Selftest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(3)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Call { path, args } => call_command(&config, &path, &args, cli.format),
        Commands::Catalog => catalog_command(&config, cli.format),
        Commands::Probe { names } => probe_command(&config, &names, cli.format),
        Commands::Init => init_command(&config, cli.format),
        Commands::Selftest => selftest_command(&config, cli.format),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<HelloConfig> {
    match path {
        Some(path) => HelloConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(HelloConfig::default()),
    }
}

fn call_command(
    config: &HelloConfig,
    path: &str,
    args: &str,
    format: OutputFormat,
) -> Result<ExitCode> {
    let args: Vec<Value> =
        serde_json::from_str(args).context("Arguments must be a JSON array of values")?;

    let module = Bootstrap::new(config.clone())
        .run(&config.finder(), &mut RecordingImporter::default())
        .context("Module initialization failed")?;

    let result = module
        .call(path, &args)
        .with_context(|| format!("Call to {} failed", path))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&result)?),
        OutputFormat::Text => println!("{}", format_value(&result)),
    }
    Ok(ExitCode::from(0))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Point2(p) => format!("({}, {})", p.x, p.y),
        Value::Point3(p) => format!("({}, {}, {})", p.x, p.y, p.z),
    }
}

fn catalog_command(config: &HelloConfig, format: OutputFormat) -> Result<ExitCode> {
    let namespace = Bootstrap::new(config.clone())
        .namespace()
        .context("Failed to build namespace")?;
    let catalog = namespace.catalog();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
        OutputFormat::Text => {
            for entry in &catalog {
                println!("{} ({} args)", entry.path, entry.arity);
                println!("    {}", entry.description);
            }
        }
    }
    Ok(ExitCode::from(0))
}

fn probe_command(config: &HelloConfig, names: &[String], format: OutputFormat) -> Result<ExitCode> {
    let finder = config.finder();
    let results: Vec<(&String, Availability)> =
        names.iter().map(|n| (n, classify(&finder, n))).collect();

    match format {
        OutputFormat::Json => {
            let json: serde_json::Map<String, serde_json::Value> = results
                .iter()
                .map(|(name, availability)| {
                    (
                        name.to_string(),
                        serde_json::Value::Bool(availability.is_available()),
                    )
                })
                .collect();
            println!("{}", serde_json::Value::Object(json));
        }
        OutputFormat::Text => {
            for (name, availability) in &results {
                match availability {
                    Availability::Available => println!("{}: available", name),
                    Availability::Unavailable => println!("{}: not found", name),
                    Availability::DiscoveryError(reason) => {
                        println!("{}: not found (discovery failed: {})", name, reason)
                    }
                }
            }
        }
    }

    let all_found = results.iter().all(|(_, a)| a.is_available());
    Ok(ExitCode::from(if all_found { 0 } else { 1 }))
}

fn init_command(config: &HelloConfig, format: OutputFormat) -> Result<ExitCode> {
    let mut importer = RecordingImporter::default();
    let module = Bootstrap::new(config.clone())
        .run(&config.finder(), &mut importer)
        .context("Module initialization failed")?;

    let namespace = module.namespace();
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "module": namespace.name(),
                "doc": namespace.doc(),
                "functions": namespace.catalog(),
                "siblings": module.siblings(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Module: {}", namespace.name());
            println!("  {}", namespace.doc());
            println!();
            for sub in namespace.submodules() {
                println!("Sub-module: {}.{}", namespace.name(), sub.name());
                for spec in sub.functions() {
                    println!("  - {}: {}", spec.name, spec.description);
                }
            }
            println!();
            let siblings = module.siblings();
            if siblings.is_empty() {
                println!("Optional siblings: none found");
            } else {
                println!("Optional siblings: {}", siblings.join(", "));
            }
        }
    }
    Ok(ExitCode::from(0))
}

fn selftest_command(config: &HelloConfig, format: OutputFormat) -> Result<ExitCode> {
    let report = selftest::run_with(config);

    match format {
        OutputFormat::Json => println!("{}", report.summary()),
        OutputFormat::Text => {
            println!(
                "{}: {}",
                report.name,
                if report.passed { "PASS" } else { "FAIL" }
            );
            for check in report.failed_checks() {
                println!("  - {} failed", check.name);
            }
        }
    }

    Ok(ExitCode::from(if report.passed { 0 } else { 1 }))
}
