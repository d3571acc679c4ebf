//! Julia bindings for hello.
//!
//! Plain C ABI functions consumed with `ccall`. Bindings are thin FFI
//! wrappers; all semantics come from `hello-core`.
//!
//! ## Architecture
//!
//! ```text
//! Julia ccall → C ABI functions → hello-core → IR types → JSON / repr(C)
//! ```
//!
//! ## Usage (Julia side)
//!
//! ```julia
//! struct Point2; x::Float64; y::Float64; end
//! struct Point3; x::Float64; y::Float64; z::Float64; end
//!
//! ccall((:hello_foo, libhello), Cint, ())                           # 1
//! ccall((:hello_dummy_2_to_3, libhello), Point3, (Point2,), Point2(11, 22))
//! ```

use std::ffi::{c_char, CStr, CString};

use hello_bindings_core::{IRAvailability, IRFunction, IRPoint3, IRTestReport, IRValue, ToIR};
use hello_core::{
    classify, Bootstrap, HelloConfig, Point2, Point3, RecordingImporter, SearchPathFinder,
    Value,
};

/// C layout of a 2D point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelloPoint2 {
    pub x: f64,
    pub y: f64,
}

/// C layout of a 3D point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelloPoint3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<IRPoint3> for HelloPoint3 {
    fn from(p: IRPoint3) -> Self {
        HelloPoint3 {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

/// A Foo Function that returns 1.
#[no_mangle]
pub extern "C" fn hello_foo() -> i32 {
    hello_core::foo()
}

/// Lift a 2D point to 3D, keeping x and y and setting z to 1.
#[no_mangle]
pub extern "C" fn hello_dummy_2_to_3(point: HelloPoint2) -> HelloPoint3 {
    let lifted: Point3<f64> = hello_core::dummy_2_to_3(Point2::new(point.x, point.y));
    lifted.to_ir().into()
}

/// Call a registered function by path (`hello.foo` or `proj.hello.foo`)
/// with a JSON array of arguments, returning `{"result": <value>}` or
/// `{"error": "..."}`.
///
/// # Safety
///
/// This function is intended for FFI use. `path` must be null or a valid C
/// string; a null `path` yields `{"error": "path is null"}`. `args_json` may
/// be null (no arguments). The returned string must be freed by the caller
/// using `hello_free_string`.
#[no_mangle]
pub extern "C" fn hello_call_json(
    path: *const c_char,
    args_json: *const c_char,
) -> *mut c_char {
    guarded_json(|| {
        if path.is_null() {
            return Err("path is null".to_string());
        }
        // SAFETY: Non-null, caller must provide a valid C string
        let path = unsafe { CStr::from_ptr(path) }
            .to_str()
            .map_err(|e| format!("Invalid path UTF-8: {}", e))?;

        let args: Vec<Value> = if args_json.is_null() {
            Vec::new()
        } else {
            // SAFETY: Non-null, caller must provide a valid C string
            let raw = unsafe { CStr::from_ptr(args_json) }
                .to_str()
                .map_err(|e| format!("Invalid arguments UTF-8: {}", e))?;
            serde_json::from_str(raw).map_err(|e| format!("Invalid arguments JSON: {}", e))?
        };

        let module = Bootstrap::default()
            .run(&SearchPathFinder::default(), &mut RecordingImporter::default())
            .map_err(|e| format!("Bootstrap error: {}", e))?;

        let result: IRValue = module
            .call(path, &args)
            .map_err(|e| format!("Call error: {}", e))?
            .to_ir();

        Ok(serde_json::json!({ "result": result }))
    })
}

/// Look a library up on `PYTHONPATH` and report
/// `{"name": ..., "status": "available" | "unavailable" | "discovery_error"}`,
/// with a `reason` alongside a discovery error.
///
/// # Safety
///
/// `name` must be null or a valid C string. The returned string must be
/// freed using `hello_free_string`.
#[no_mangle]
pub extern "C" fn hello_availability_json(name: *const c_char) -> *mut c_char {
    guarded_json(|| {
        if name.is_null() {
            return Err("name is null".to_string());
        }
        // SAFETY: Non-null, caller must provide a valid C string
        let name = unsafe { CStr::from_ptr(name) }
            .to_str()
            .map_err(|e| format!("Invalid name UTF-8: {}", e))?;

        let availability: IRAvailability = classify(&HelloConfig::default().finder(), name).to_ir();
        let mut json =
            serde_json::to_value(availability).map_err(|e| format!("JSON error: {}", e))?;
        if let Some(object) = json.as_object_mut() {
            object.insert("name".to_string(), serde_json::Value::from(name));
        }
        Ok(json)
    })
}

/// Every registered function as a JSON array of `{path, name, description, arity}`.
///
/// The returned string must be freed using `hello_free_string`.
#[no_mangle]
pub extern "C" fn hello_catalog_json() -> *mut c_char {
    guarded_json(|| {
        let namespace = Bootstrap::default()
            .namespace()
            .map_err(|e| format!("Bootstrap error: {}", e))?;
        let functions: Vec<IRFunction> = namespace.catalog().iter().map(|e| e.to_ir()).collect();
        serde_json::to_value(functions).map_err(|e| format!("JSON error: {}", e))
    })
}

/// Run the "hiya" self-test and return the report as JSON.
///
/// The returned string must be freed using `hello_free_string`.
#[no_mangle]
pub extern "C" fn hello_selftest_json() -> *mut c_char {
    guarded_json(|| {
        let report: IRTestReport = hello_core::selftest::run().to_ir();
        serde_json::to_value(report).map_err(|e| format!("JSON error: {}", e))
    })
}

fn guarded_json<F>(f: F) -> *mut c_char
where
    F: FnOnce() -> Result<serde_json::Value, String> + std::panic::UnwindSafe,
{
    let json = match std::panic::catch_unwind(f) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => serde_json::json!({ "error": e }),
        Err(_) => serde_json::json!({ "error": "Panic in hello" }),
    };
    CString::new(json.to_string())
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// Free a string returned by hello functions.
///
/// # Safety
///
/// Only call this on strings returned by other hello_* functions.
#[no_mangle]
pub unsafe extern "C" fn hello_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the version of the hello library.
#[no_mangle]
pub extern "C" fn hello_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}
