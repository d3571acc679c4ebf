//! Module bootstrap: namespace, sub-module, registration, optional siblings.

use thiserror::Error;

use crate::config::HelloConfig;
use crate::functions::{HELLO_DOC, HELLO_FUNCTIONS};
use crate::probe::{ImportError, LoadError, ModuleFinder, ModuleImporter, SiblingLoader};
use crate::registry::{register_all, CallError, Namespace, RegistryError};
use crate::value::Value;

/// Doc string of the top-level namespace.
pub const MODULE_DOC: &str = "Python bindings for Project";

/// Errors that abort module initialization.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Registration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Module discovery unavailable while probing '{name}': {reason}")]
    Discovery { name: String, reason: String },

    #[error("Optional library was found but failed to import: {0}")]
    Import(#[from] ImportError),
}

impl From<LoadError> for BootstrapError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Discovery { name, reason } => BootstrapError::Discovery { name, reason },
            LoadError::Import(e) => BootstrapError::Import(e),
        }
    }
}

/// An initialized module.
#[derive(Debug)]
pub struct Module {
    namespace: Namespace,
    submodule: String,
    loader: SiblingLoader,
}

impl Module {
    /// The top-level namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The sub-namespace holding the hello functions.
    pub fn hello(&self) -> &Namespace {
        // Mounted by `Bootstrap::run` before a `Module` is handed out
        self.namespace
            .submodule(&self.submodule)
            .unwrap_or(&self.namespace)
    }

    /// Call a function by path relative to the top-level namespace
    /// (`hello.foo`). A leading top-level name is accepted too
    /// (`proj.hello.foo`).
    pub fn call(&self, path: &str, args: &[Value]) -> Result<Value, CallError> {
        let relative = match self.namespace.resolve(path) {
            Some(_) => path,
            None => path
                .strip_prefix(self.namespace.name())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(path),
        };
        self.namespace.call(relative, args)
    }

    /// Sibling libraries imported during initialization.
    pub fn siblings(&self) -> Vec<String> {
        self.loader.loaded()
    }

    pub fn into_namespace(self) -> Namespace {
        self.namespace
    }
}

/// Builds a [`Module`] from a [`HelloConfig`].
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    config: HelloConfig,
}

impl Bootstrap {
    pub fn new(config: HelloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HelloConfig {
        &self.config
    }

    /// Build the namespace tree without probing for siblings.
    pub fn namespace(&self) -> Result<Namespace, BootstrapError> {
        let mut root = Namespace::new(&self.config.module, MODULE_DOC);
        let hello = root.def_submodule(&self.config.submodule, HELLO_DOC)?;
        let bound = register_all(hello, HELLO_FUNCTIONS, self.config.duplicate_policy)?;
        tracing::debug!(
            module = %self.config.module,
            submodule = %self.config.submodule,
            functions = bound,
            "Namespace built"
        );
        Ok(root)
    }

    /// Initialize: build the namespace, then import each configured sibling
    /// that `finder` reports available.
    ///
    /// A missing sibling is skipped. A finder that cannot answer, or a
    /// present sibling that fails to import, aborts initialization.
    pub fn run<F, I>(&self, finder: &F, importer: &mut I) -> Result<Module, BootstrapError>
    where
        F: ModuleFinder + ?Sized,
        I: ModuleImporter + ?Sized,
    {
        let namespace = self.namespace()?;
        let mut loader = SiblingLoader::new();
        for sibling in &self.config.siblings {
            loader.load_if_available(finder, importer, sibling)?;
        }
        Ok(Module {
            namespace,
            submodule: self.config.submodule.clone(),
            loader,
        })
    }
}

/// Importer for hosts where discovery is all that is needed, such as the CLI:
/// a found library counts as imported.
#[derive(Debug, Default)]
pub struct RecordingImporter {
    imported: Vec<String>,
}

impl RecordingImporter {
    pub fn imported(&self) -> &[String] {
        &self.imported
    }
}

impl ModuleImporter for RecordingImporter {
    fn import(&mut self, name: &str) -> Result<(), ImportError> {
        self.imported.push(name.to_string());
        Ok(())
    }
}
