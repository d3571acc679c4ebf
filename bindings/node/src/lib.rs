//! Node.js bindings for hello using napi-rs.
//!
//! This module exposes the hello functions to Node.js.
//!
//! ## Design
//!
//! **Bindings do not define semantics.** All logic lives in `hello-core`.
//! These are thin napi-rs wrappers for FFI marshalling. Node has no optional
//! native sibling to probe, so only the namespace is built here.

#![deny(clippy::all)]

use napi::bindgen_prelude::*;
use napi_derive::napi;

use hello_bindings_core::{IRPoint2, IRPoint3, ToIR};
use hello_core::{self as core, Bootstrap, Point2};

/// A point in the plane.
#[napi(object)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

/// A point in space.
#[napi(object)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<IRPoint3> for Point3D {
    fn from(p: IRPoint3) -> Self {
        Point3D {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

/// A registered function and its description.
#[napi(object)]
pub struct FunctionInfo {
    pub path: String,
    pub name: String,
    pub description: String,
    pub arity: u32,
}

/// Result of the "hiya" self-test.
#[napi(object)]
pub struct SelfTestReport {
    pub name: String,
    pub passed: bool,
    pub failed_checks: Vec<String>,
    pub ran_at: String,
}

/// A Foo Function that returns 1.
#[napi]
pub fn foo() -> i32 {
    core::foo()
}

/// Lift a 2D point to 3D, keeping x and y and setting z to 1.
#[napi(js_name = "dummy2To3")]
pub fn dummy_2_to_3(point: Point2D) -> Point3D {
    let p: Point2<f64> = IRPoint2 {
        x: point.x,
        y: point.y,
    }
    .into();
    core::dummy_2_to_3(p).to_ir().into()
}

/// List every registered function with its description.
#[napi]
pub fn catalog() -> Result<Vec<FunctionInfo>> {
    let namespace = Bootstrap::default()
        .namespace()
        .map_err(|e| Error::new(Status::GenericFailure, format!("Bootstrap failed: {}", e)))?;
    Ok(namespace
        .catalog()
        .iter()
        .map(|entry| {
            let ir = entry.to_ir();
            FunctionInfo {
                path: ir.path,
                name: ir.name,
                description: ir.description,
                arity: ir.arity as u32,
            }
        })
        .collect())
}

/// Run the "hiya" self-test.
#[napi]
pub fn selftest() -> SelfTestReport {
    let report = core::selftest::run().to_ir();
    SelfTestReport {
        name: report.name,
        passed: report.passed,
        failed_checks: report
            .checks
            .into_iter()
            .filter(|c| !c.passed)
            .map(|c| c.name)
            .collect(),
        ran_at: report.ran_at,
    }
}
