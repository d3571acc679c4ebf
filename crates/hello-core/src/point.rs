//! Point types and the 2D → 3D lift.

use serde::{Deserialize, Serialize};

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

/// A point in space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Point2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T> Point3<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Copy + From<u8>> Point2<T> {
    /// Lift into space, placing the point on the `z = 1` plane.
    pub fn lift(self) -> Point3<T> {
        dummy_2_to_3(self)
    }
}

impl<T> From<(T, T)> for Point2<T> {
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

impl<T> From<(T, T, T)> for Point3<T> {
    fn from((x, y, z): (T, T, T)) -> Self {
        Self { x, y, z }
    }
}

/// Lift a 2D point to 3D. `x` and `y` are carried over unchanged and `z` is
/// always one.
pub fn dummy_2_to_3<T: Copy + From<u8>>(p: Point2<T>) -> Point3<T> {
    Point3 {
        x: p.x,
        y: p.y,
        z: T::from(1u8),
    }
}
