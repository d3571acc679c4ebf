//! # hello-bindings-core
//!
//! Shared FFI type definitions for hello language bindings.
//!
//! This crate provides:
//! - **IR types**: FFI-friendly representations of core types
//! - **Conversions**: Core type → IR type transformations
//! - **Validation**: Test fixtures for binding conformance
//!
//! ## Design Principle
//!
//! **Bindings do not define semantics.**
//!
//! Every function, the namespace layout and the sibling probe live in
//! `hello-core`. Language bindings are thin wrappers that:
//! 1. Accept FFI-compatible input (numbers, strings, JSON)
//! 2. Convert to core types
//! 3. Call into `hello_core`
//! 4. Convert the result to FFI-compatible output
//!
//! ```text
//! FFI Input → Core Types → hello_core → Core Result → IR Types → FFI Output
//! ```

pub mod conversion;
pub mod types;
pub mod validation;

// Re-export IR types
pub use types::{
    IRAvailability, IRCheck, IRFunction, IRPoint2, IRPoint3, IRTestReport, IRValue,
};

// Re-export conversions
pub use conversion::ToIR;

// Re-export validation fixtures
pub use validation::{EXPECTED_FOO, MISSING_LIBRARY, TEST_CALL_ARGS_JSON};
