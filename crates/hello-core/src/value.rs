//! Dynamically-typed values carried through the registry's call path.

use serde::{Deserialize, Serialize};

use crate::point::{Point2, Point3};

/// Argument or result of a registered function.
///
/// The JSON form is untagged: `1`, `1.5`, `{"x": 1, "y": 2}`,
/// `{"x": 1, "y": 2, "z": 3}`. Variant order matters for deserialization:
/// a three-coordinate object must be tried before a two-coordinate one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Point3(Point3<f64>),
    Point2(Point2<f64>),
}

impl Value {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Point2(_) => "point_2d",
            Value::Point3(_) => "point_3d",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_point2(&self) -> Option<Point2<f64>> {
        match self {
            Value::Point2(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_point3(&self) -> Option<Point3<f64>> {
        match self {
            Value::Point3(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Point2<f64>> for Value {
    fn from(p: Point2<f64>) -> Self {
        Value::Point2(p)
    }
}

impl From<Point3<f64>> for Value {
    fn from(p: Point3<f64>) -> Self {
        Value::Point3(p)
    }
}
