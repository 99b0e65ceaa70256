/// A range of ray parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    ///
    /// NaN is never surrounded, which lets degenerate roots fall through
    /// as misses.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Returns a copy with the upper bound replaced.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }

    /// Parameters in front of a ray origin, excluding the origin itself.
    pub const FORWARD: Interval = Interval {
        min: f32::EPSILON,
        max: f32::INFINITY,
    };
}
