//! Stick shapes, orientations and center offsets
//!
//! A shape is an immutable template shared via `Arc` by every stick dealt
//! from it. A `Stick` is one shape in one orientation with its rotated
//! segments materialised up front.

use std::sync::Arc;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// One unit segment of a stick, in shape-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StickSegment {
    pub start: IVec2,
    pub end: IVec2,
}

impl StickSegment {
    pub const fn new(start: IVec2, end: IVec2) -> Self {
        Self { start, end }
    }

    /// Rotate clockwise by the orientation angle (integer-exact)
    pub fn rotate(self, orientation: Orientation) -> Self {
        Self {
            start: orientation.rotate(self.start),
            end: orientation.rotate(self.end),
        }
    }

    /// Axis-aligned with length exactly one
    pub fn is_unit(&self) -> bool {
        let d = (self.end - self.start).abs();
        d.x + d.y == 1
    }

    /// Same segment regardless of direction
    pub fn canonical(&self) -> (IVec2, IVec2) {
        if (self.start.x, self.start.y) <= (self.end.x, self.end.y) {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }
}

/// Discrete stick orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Normal,
    Right,
    Bottom,
    Left,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Normal,
        Orientation::Right,
        Orientation::Bottom,
        Orientation::Left,
    ];

    /// Rotate an offset clockwise by this orientation
    pub fn rotate(self, v: IVec2) -> IVec2 {
        match self {
            Orientation::Normal => v,
            Orientation::Right => IVec2::new(v.y, -v.x),
            Orientation::Bottom => IVec2::new(-v.x, -v.y),
            Orientation::Left => IVec2::new(-v.y, v.x),
        }
    }
}

/// Immutable stick template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickShape {
    pub name: String,
    pub segments: Vec<StickSegment>,
}

impl StickShape {
    pub fn new(name: impl Into<String>, segments: Vec<StickSegment>) -> Self {
        Self {
            name: name.into(),
            segments,
        }
    }

    /// Build from `((x0, y0), (x1, y1))` pairs
    pub fn from_pairs(name: impl Into<String>, pairs: &[((i32, i32), (i32, i32))]) -> Self {
        let segments = pairs
            .iter()
            .map(|&((x0, y0), (x1, y1))| StickSegment::new(IVec2::new(x0, y0), IVec2::new(x1, y1)))
            .collect();
        Self::new(name, segments)
    }
}

/// A stick ready to place: shared shape plus rotated segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stick {
    shape: Arc<StickShape>,
    orientation: Orientation,
    segments: Vec<StickSegment>,
}

impl Stick {
    pub fn new(shape: Arc<StickShape>, orientation: Orientation) -> Self {
        let segments = shape
            .segments
            .iter()
            .map(|s| s.rotate(orientation))
            .collect();
        Self {
            shape,
            orientation,
            segments,
        }
    }

    /// Convenience for tests and one-off shapes
    pub fn from_pairs(pairs: &[((i32, i32), (i32, i32))]) -> Self {
        Self::new(Arc::new(StickShape::from_pairs("custom", pairs)), Orientation::Normal)
    }

    pub fn shape(&self) -> &Arc<StickShape> {
        &self.shape
    }

    pub fn name(&self) -> &str {
        &self.shape.name
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Segments after rotation
    pub fn segments(&self) -> &[StickSegment] {
        &self.segments
    }

    /// Rounded mean of the segment midpoints
    ///
    /// The mean is `sum(start + end) / (2 * n)`, rounded per axis with
    /// round-half-to-even so the result is reproducible.
    pub fn center_offset(&self) -> IVec2 {
        let n = self.segments.len() as i32;
        if n == 0 {
            return IVec2::ZERO;
        }
        let sum = self
            .segments
            .iter()
            .fold(IVec2::ZERO, |acc, s| acc + s.start + s.end);
        IVec2::new(
            round_div_half_even(sum.x, 2 * n),
            round_div_half_even(sum.y, 2 * n),
        )
    }

    /// Axis-aligned bounds of the segment endpoints relative to the center offset
    pub fn centered_bounds(&self) -> Option<(IVec2, IVec2)> {
        let center = self.center_offset();
        let mut points = self
            .segments
            .iter()
            .flat_map(|s| [s.start - center, s.end - center]);
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Integer division rounding to the nearest integer, ties to even
pub fn round_div_half_even(num: i32, den: i32) -> i32 {
    debug_assert!(den > 0);
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    match (2 * r).cmp(&den) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q & 1),
    }
}
