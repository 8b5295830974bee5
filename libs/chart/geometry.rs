//! Scene-space primitives

use std::fmt;

/// Point in chart world space. `z` only orders layers (grid behind lines).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn shifted_x(self, dx: f64) -> Self {
        Self {
            x: self.x + dx,
            ..self
        }
    }
}

/// Identifier handed out by `ChartModel::append_sample`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One line unit between two consecutive chart positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub from: Vec3,
    pub to: Vec3,
}

impl Segment {
    /// Zero-length segment, as produced by the first append
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }

    /// Copy moved horizontally by `dx`
    pub fn shifted_x(&self, dx: f64) -> Self {
        Self {
            id: self.id,
            from: self.from.shifted_x(dx),
            to: self.to.shifted_x(dx),
        }
    }
}
