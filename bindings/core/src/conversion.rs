//! Conversions between hello-core types and IR types.
//!
//! Single source of truth for type mapping. All bindings should convert
//! core types → IR types → FFI types, never core → FFI directly.
//!
//! **These conversions are pure data transformations with no semantic logic.**

use hello_core::selftest::Check;
use hello_core::{Availability, CatalogEntry, Point2, Point3, TestReport, Value};

use crate::types::*;

/// Trait for converting core types to IR types.
pub trait ToIR<T> {
    fn to_ir(&self) -> T;
}

// --- Points ---

impl From<Point2<f64>> for IRPoint2 {
    fn from(p: Point2<f64>) -> Self {
        IRPoint2 { x: p.x, y: p.y }
    }
}

impl From<IRPoint2> for Point2<f64> {
    fn from(p: IRPoint2) -> Self {
        Point2::new(p.x, p.y)
    }
}

impl From<Point3<f64>> for IRPoint3 {
    fn from(p: Point3<f64>) -> Self {
        IRPoint3 {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<IRPoint3> for Point3<f64> {
    fn from(p: IRPoint3) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

impl ToIR<IRPoint3> for Point3<f64> {
    fn to_ir(&self) -> IRPoint3 {
        (*self).into()
    }
}

// --- Value ---

impl From<Value> for IRValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Int(value) => IRValue::Int { value },
            Value::Float(value) => IRValue::Float { value },
            Value::Point2(p) => IRValue::Point2 { x: p.x, y: p.y },
            Value::Point3(p) => IRValue::Point3 {
                x: p.x,
                y: p.y,
                z: p.z,
            },
        }
    }
}

impl From<IRValue> for Value {
    fn from(v: IRValue) -> Self {
        match v {
            IRValue::Int { value } => Value::Int(value),
            IRValue::Float { value } => Value::Float(value),
            IRValue::Point2 { x, y } => Value::Point2(Point2::new(x, y)),
            IRValue::Point3 { x, y, z } => Value::Point3(Point3::new(x, y, z)),
        }
    }
}

impl ToIR<IRValue> for Value {
    fn to_ir(&self) -> IRValue {
        (*self).into()
    }
}

// --- Catalog ---

impl From<&CatalogEntry> for IRFunction {
    fn from(e: &CatalogEntry) -> Self {
        IRFunction {
            path: e.path.clone(),
            name: e
                .path
                .rsplit_once('.')
                .map(|(_, leaf)| leaf)
                .unwrap_or(&e.path)
                .to_string(),
            description: e.description.clone(),
            arity: e.arity,
        }
    }
}

impl ToIR<IRFunction> for CatalogEntry {
    fn to_ir(&self) -> IRFunction {
        self.into()
    }
}

// --- Availability ---

impl From<Availability> for IRAvailability {
    fn from(a: Availability) -> Self {
        match a {
            Availability::Available => IRAvailability::Available,
            Availability::Unavailable => IRAvailability::Unavailable,
            Availability::DiscoveryError(reason) => IRAvailability::DiscoveryError { reason },
        }
    }
}

impl ToIR<IRAvailability> for Availability {
    fn to_ir(&self) -> IRAvailability {
        self.clone().into()
    }
}

// --- TestReport ---

impl From<&Check> for IRCheck {
    fn from(c: &Check) -> Self {
        IRCheck {
            name: c.name.clone(),
            passed: c.passed,
        }
    }
}

impl From<&TestReport> for IRTestReport {
    fn from(r: &TestReport) -> Self {
        IRTestReport {
            name: r.name.clone(),
            passed: r.passed,
            checks: r.checks.iter().map(|c| c.into()).collect(),
            ran_at: r.ran_at.to_rfc3339(),
        }
    }
}

impl ToIR<IRTestReport> for TestReport {
    fn to_ir(&self) -> IRTestReport {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion() {
        let ir: IRPoint2 = Point2::new(11.0, 22.0).into();
        assert_eq!(ir, IRPoint2 { x: 11.0, y: 22.0 });
        assert_eq!(Point2::from(ir), Point2::new(11.0, 22.0));
        assert_eq!(Point3::new(1.0, 2.0, 3.0).to_ir().z, 3.0);
    }

    #[test]
    fn test_value_conversion() {
        let ir = Value::Point3(Point3::new(11.0, 22.0, 1.0)).to_ir();
        assert_eq!(ir.type_name(), "point3");
        assert_eq!(Value::from(ir), Value::Point3(Point3::new(11.0, 22.0, 1.0)));
        assert_eq!(Value::Int(1).to_ir(), IRValue::Int { value: 1 });
    }

    #[test]
    fn test_value_json_is_tagged() {
        let json = serde_json::to_string(&IRValue::Point2 { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(json, r#"{"type":"point2","x":1.0,"y":2.0}"#);
    }

    #[test]
    fn test_catalog_entry_conversion() {
        let entry = CatalogEntry {
            path: "proj.hello.foo".to_string(),
            description: "A Foo Function that returns 1".to_string(),
            arity: 0,
        };
        let ir = entry.to_ir();
        assert_eq!(ir.name, "foo");
        assert_eq!(ir.path, "proj.hello.foo");
    }

    #[test]
    fn test_availability_conversion() {
        assert!(Availability::Available.to_ir().is_available());
        let ir: IRAvailability = Availability::DiscoveryError("no importlib".to_string()).into();
        assert_eq!(ir.as_str(), "discovery_error");
        assert_eq!(
            serde_json::to_string(&ir).unwrap(),
            r#"{"status":"discovery_error","reason":"no importlib"}"#
        );
    }
}
