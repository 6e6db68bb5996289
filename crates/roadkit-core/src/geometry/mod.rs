//! Geometric road primitive
//!
//! A road reference line is a chain of track components, each a parametric
//! curve over `[s_start, s_start + length]`. The editing layer only consumes
//! the queries of [`TrackGeometry`]; every query outside the component's
//! domain fails with [`RoadError::OutOfRange`].

mod track;

pub use track::{TrackArc, TrackComponent, TrackLine};

use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{RoadError, RoadResult};
use crate::constants::NUMERICAL_ZERO6;

/// A planar position with a heading in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point2<f64>,
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            heading,
        }
    }

    /// Apply the rigid motion that maps `from` onto `to`
    pub fn transformed(&self, from: &Pose, to: &Pose) -> Pose {
        let rotation = Rotation2::new(to.heading - from.heading);
        let offset = rotation * (self.position - from.position);
        Pose {
            position: to.position + offset,
            heading: self.heading + to.heading - from.heading,
        }
    }

    /// Rotate around `pivot` by `angle` radians
    pub fn rotated(&self, pivot: &Point2<f64>, angle: f64) -> Pose {
        let rotation = Rotation2::new(angle);
        Pose {
            position: pivot + rotation * (self.position - pivot),
            heading: self.heading + angle,
        }
    }

    /// Translate by `offset`
    pub fn translated(&self, offset: &Vector2<f64>) -> Pose {
        Pose {
            position: self.position + offset,
            heading: self.heading,
        }
    }
}

/// Queries a parametric reference-line segment answers in road coordinates.
pub trait TrackGeometry {
    /// Road coordinate where the segment starts
    fn s_start(&self) -> f64;

    /// Arc length of the segment
    fn length(&self) -> f64;

    /// Road coordinate where the segment ends
    fn s_end(&self) -> f64 {
        self.s_start() + self.length()
    }

    /// Heading in radians at local coordinate `ds`
    fn local_heading(&self, ds: f64) -> f64;

    /// Point on the reference line at local coordinate `ds`
    fn local_point(&self, ds: f64) -> Point2<f64>;

    /// Map a road coordinate to a local one, rejecting values outside the segment
    fn local_s(&self, s: f64) -> RoadResult<f64> {
        let (start, end) = (self.s_start(), self.s_end());
        if !s.is_finite() || s < start - NUMERICAL_ZERO6 || s > end + NUMERICAL_ZERO6 {
            return Err(RoadError::OutOfRange { s, start, end });
        }
        Ok((s - start).clamp(0.0, self.length()))
    }

    /// Point at `s`, offset laterally by `d` (positive to the left)
    fn global_point(&self, s: f64, d: f64) -> RoadResult<Point2<f64>> {
        let ds = self.local_s(s)?;
        let normal = normal_of(self.local_heading(ds));
        Ok(self.local_point(ds) + normal * d)
    }

    /// Heading in radians at `s`
    fn global_heading(&self, s: f64) -> RoadResult<f64> {
        let ds = self.local_s(s)?;
        Ok(self.local_heading(ds))
    }

    /// Unit tangent at `s`
    fn global_tangent(&self, s: f64) -> RoadResult<Vector2<f64>> {
        let heading = self.global_heading(s)?;
        Ok(Vector2::new(heading.cos(), heading.sin()))
    }

    /// Unit normal at `s`, pointing to the left of the tangent
    fn global_normal(&self, s: f64) -> RoadResult<Vector2<f64>> {
        Ok(normal_of(self.global_heading(s)?))
    }
}

fn normal_of(heading: f64) -> Vector2<f64> {
    Vector2::new(-heading.sin(), heading.cos())
}
