//! Validation fixtures for language bindings.
//!
//! Inputs and expected outputs that bindings can use to verify their FFI
//! marshalling. All semantics come from `hello-core`; these fixtures only
//! check that data survives the trip through the binding layer.

/// Reference 2D input.
pub const TEST_POINT_X: f64 = 11.0;
pub const TEST_POINT_Y: f64 = 22.0;

/// Expected lift of the reference input.
pub const EXPECTED_LIFTED: (f64, f64, f64) = (11.0, 22.0, 1.0);

/// Expected result of `foo()`.
pub const EXPECTED_FOO: i64 = 1;

/// Qualified paths under the default configuration.
pub const FOO_PATH: &str = "proj.hello.foo";
pub const DUMMY_2_TO_3_PATH: &str = "proj.hello.dummy_2_to_3";

/// Arguments for `dummy_2_to_3`, as accepted by JSON call entry points.
pub const TEST_CALL_ARGS_JSON: &str = r#"[{"x": 11, "y": 22}]"#;

/// A library name no host should be able to find.
pub const MISSING_LIBRARY: &str = "hello_test_definitely_missing_library";
