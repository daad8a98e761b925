use crate::math::Vector3;

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Vector3,
    pub end: Vector3,
}

impl Line {
    /// Creates a segment from `start` to `end`
    #[inline]
    pub fn new(start: Vector3, end: Vector3) -> Self {
        Self { start, end }
    }

    /// Length of the segment
    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }
}

/// A closed 1D range, the projection of a shape onto an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Creates an interval
    #[inline]
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Projects a point set onto `axis`
    pub fn from_projection(points: &[Vector3], axis: Vector3) -> Self {
        let mut interval = Self::new(f32::MAX, f32::MIN);
        for point in points {
            let p = axis.dot(point);
            interval.min = interval.min.min(p);
            interval.max = interval.max.max(p);
        }
        interval
    }

    /// Width of the interval
    #[inline]
    pub fn length(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive overlap test
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        other.min <= self.max && self.min <= other.max
    }

    /// Amount by which two intervals overlap.
    ///
    /// Computed as the combined width minus the spanned width, so the result is
    /// negative when the intervals are apart and independent of argument order.
    #[inline]
    pub fn overlap(&self, other: &Self) -> f32 {
        let long_span = self.max.max(other.max) - self.min.min(other.min);
        let sum_span = self.length() + other.length();
        sum_span - long_span
    }
}
