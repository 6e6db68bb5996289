//! Cubic profiles `a + b*ds + c*ds^2 + d*ds^3`
//!
//! Lane widths, elevation, superelevation and crossfall all store a cubic in
//! the local coordinate `ds` measured from the start of the entry.

use serde::{Deserialize, Serialize};

/// A cubic polynomial in a local coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cubic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Cubic {
    /// Create a cubic from its coefficients
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// A constant profile
    pub fn constant(a: f64) -> Self {
        Self::new(a, 0.0, 0.0, 0.0)
    }

    /// A linear profile from `start` with slope `slope`
    pub fn linear(start: f64, slope: f64) -> Self {
        Self::new(start, slope, 0.0, 0.0)
    }

    /// Value at `ds`
    pub fn value(&self, ds: f64) -> f64 {
        self.a + ds * (self.b + ds * (self.c + ds * self.d))
    }

    /// First derivative at `ds`
    pub fn slope(&self, ds: f64) -> f64 {
        self.b + ds * (2.0 * self.c + 3.0 * ds * self.d)
    }

    /// Second derivative at `ds`
    pub fn curvature(&self, ds: f64) -> f64 {
        2.0 * self.c + 6.0 * self.d * ds
    }

    /// The same curve expressed in a coordinate starting at `ds`.
    ///
    /// The cubic coefficient is unchanged, so the re-based profile is exact.
    pub fn rebased(&self, ds: f64) -> Self {
        Self::new(
            self.value(ds),
            self.slope(ds),
            self.curvature(ds) / 2.0,
            self.d,
        )
    }
}
