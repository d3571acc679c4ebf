//! Intermediate Representation (IR) types for FFI bindings.
//!
//! These types are designed for maximum FFI compatibility:
//! - String-based enum discrimination
//! - Plain `f64` coordinates, no generics
//! - Serializable to JSON
//!
//! **These types carry no semantics.** They are pure data representations
//! for marshalling between Rust and foreign languages.

use serde::{Deserialize, Serialize};

/// IR representation of a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IRPoint2 {
    pub x: f64,
    pub y: f64,
}

/// IR representation of a 3D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IRPoint3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// IR representation of a call argument or result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IRValue {
    Int { value: i64 },
    Float { value: f64 },
    Point2 { x: f64, y: f64 },
    Point3 { x: f64, y: f64, z: f64 },
}

impl IRValue {
    /// String representation of the discriminant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int { .. } => "int",
            Self::Float { .. } => "float",
            Self::Point2 { .. } => "point2",
            Self::Point3 { .. } => "point3",
        }
    }
}

/// IR representation of a registered function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IRFunction {
    /// Qualified name, e.g. `proj.hello.foo`
    pub path: String,
    /// Name inside its namespace, e.g. `foo`
    pub name: String,
    pub description: String,
    pub arity: usize,
}

/// IR representation of a probe result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IRAvailability {
    Available,
    Unavailable,
    DiscoveryError { reason: String },
}

impl IRAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::DiscoveryError { .. } => "discovery_error",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// IR representation of a single self-test check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IRCheck {
    pub name: String,
    pub passed: bool,
}

/// IR representation of a self-test report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IRTestReport {
    pub name: String,
    pub passed: bool,
    pub checks: Vec<IRCheck>,
    /// RFC 3339 timestamp
    pub ran_at: String,
}
