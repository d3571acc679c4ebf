//! # hello-core
//!
//! The native `hello` library and the machinery that publishes it to
//! foreign runtimes.
//!
//! - `foo()` returns 1.
//! - `dummy_2_to_3()` lifts a 2D point onto the `z = 1` plane.
//! - The [`registry`] binds these under stable names with descriptions.
//! - The [`bootstrap`] mounts them as `proj.hello` and imports optional
//!   sibling libraries (by default `vxl`) only when the host can find them.
//!
//! Language bindings live in `bindings/` and carry no semantics of their own.
//!
//! ## Example
//!
//! ```rust
//! use hello_core::{Bootstrap, Point2, SearchPathFinder, RecordingImporter, Value};
//!
//! let finder = SearchPathFinder::default();
//! let mut importer = RecordingImporter::default();
//! let module = Bootstrap::default().run(&finder, &mut importer).unwrap();
//!
//! assert_eq!(module.call("hello.foo", &[]).unwrap(), Value::Int(1));
//! let lifted = module
//!     .call("hello.dummy_2_to_3", &[Point2::new(11.0, 22.0).into()])
//!     .unwrap();
//! assert_eq!(lifted.as_point3().map(|p| p.z), Some(1.0));
//! ```

pub mod bootstrap;
pub mod config;
pub mod functions;
pub mod ident;
pub mod point;
pub mod probe;
pub mod registry;
pub mod selftest;
pub mod value;

// Re-export main types at crate root
pub use bootstrap::{Bootstrap, BootstrapError, Module, RecordingImporter, MODULE_DOC};
pub use config::{ConfigError, HelloConfig};
pub use functions::{foo, HELLO_DOC, HELLO_FUNCTIONS};
pub use point::{dummy_2_to_3, Point2, Point3};
pub use probe::{
    classify, probe, Availability, ImportError, LoadError, LoadOutcome, ModuleFinder,
    ModuleImporter, ParentsFirst, SearchPathFinder, SiblingLoader,
};
pub use registry::{
    register_all, CallError, CatalogEntry, DuplicatePolicy, FunctionSpec, Namespace,
    NativeFn, RegistryError,
};
pub use selftest::TestReport;
pub use value::Value;
