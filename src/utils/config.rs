//! Helpers for configuration variables.

use std::cmp;

//------------ DefMinMax -----------------------------------------------------

/// The default value and permitted range of a configuration variable.
#[derive(Clone, Copy, Debug)]
pub struct DefMinMax<T> {
    /// The value used when none is configured.
    def: T,

    /// The smallest accepted value.
    min: T,

    /// The largest accepted value.
    max: T,
}

impl<T> DefMinMax<T> {
    /// Creates a new set of limits.
    pub const fn new(def: T, min: T, max: T) -> Self {
        Self { def, min, max }
    }

    /// Returns the default value.
    pub fn default(self) -> T {
        self.def
    }

    /// Clamps the given value into the permitted range.
    pub fn limit(self, value: T) -> T
    where
        T: Ord,
    {
        cmp::max(self.min, cmp::min(self.max, value))
    }
}
