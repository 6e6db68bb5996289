use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use super::{Pose, TrackGeometry};
use crate::constants::NUMERICAL_ZERO6;
use crate::error::{RoadError, RoadResult};

const STRAIGHT_CURVATURE: f64 = 1.0e-12;

/// A straight segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLine {
    pub s_start: f64,
    pub start: Pose,
    pub length: f64,
}

impl TrackLine {
    pub fn new(s_start: f64, start: Pose, length: f64) -> Self {
        Self {
            s_start,
            start,
            length,
        }
    }
}

impl TrackGeometry for TrackLine {
    fn s_start(&self) -> f64 {
        self.s_start
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn local_heading(&self, _ds: f64) -> f64 {
        self.start.heading
    }

    fn local_point(&self, ds: f64) -> Point2<f64> {
        let h = self.start.heading;
        self.start.position + Vector2::new(h.cos(), h.sin()) * ds
    }
}

/// A constant-curvature segment. Positive curvature turns left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackArc {
    pub s_start: f64,
    pub start: Pose,
    pub length: f64,
    pub curvature: f64,
}

impl TrackArc {
    pub fn new(s_start: f64, start: Pose, length: f64, curvature: f64) -> Self {
        Self {
            s_start,
            start,
            length,
            curvature,
        }
    }
}

impl TrackGeometry for TrackArc {
    fn s_start(&self) -> f64 {
        self.s_start
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn local_heading(&self, ds: f64) -> f64 {
        self.start.heading + self.curvature * ds
    }

    fn local_point(&self, ds: f64) -> Point2<f64> {
        let (h0, k) = (self.start.heading, self.curvature);
        if k.abs() < STRAIGHT_CURVATURE {
            return self.start.position + Vector2::new(h0.cos(), h0.sin()) * ds;
        }
        let h1 = h0 + k * ds;
        self.start.position + Vector2::new((h1.sin() - h0.sin()) / k, (h0.cos() - h1.cos()) / k)
    }
}

/// One component of a road's reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrackComponent {
    Line(TrackLine),
    Arc(TrackArc),
}

impl TrackComponent {
    /// Straight component starting at `start`
    pub fn line(s_start: f64, start: Pose, length: f64) -> Self {
        Self::Line(TrackLine::new(s_start, start, length))
    }

    /// Circular component starting at `start`
    pub fn arc(s_start: f64, start: Pose, length: f64, curvature: f64) -> Self {
        Self::Arc(TrackArc::new(s_start, start, length, curvature))
    }

    fn geometry(&self) -> &dyn TrackGeometry {
        match self {
            Self::Line(line) => line,
            Self::Arc(arc) => arc,
        }
    }

    /// Pose at the start of the component
    pub fn start_pose(&self) -> Pose {
        match self {
            Self::Line(line) => line.start,
            Self::Arc(arc) => arc.start,
        }
    }

    fn start_pose_mut(&mut self) -> &mut Pose {
        match self {
            Self::Line(line) => &mut line.start,
            Self::Arc(arc) => &mut arc.start,
        }
    }

    /// Pose at the end of the component
    pub fn end_pose(&self) -> Pose {
        let length = self.length();
        let position = self.local_point(length);
        Pose {
            position,
            heading: self.local_heading(length),
        }
    }

    /// Move the component to a new road coordinate
    pub fn set_s_start(&mut self, s: f64) {
        match self {
            Self::Line(line) => line.s_start = s,
            Self::Arc(arc) => arc.s_start = s,
        }
    }

    /// Translate the component in the plane
    pub fn translate(&mut self, offset: &Vector2<f64>) {
        let pose = self.start_pose().translated(offset);
        *self.start_pose_mut() = pose;
    }

    /// Rotate the component around `pivot`
    pub fn rotate(&mut self, pivot: &Point2<f64>, angle: f64) {
        let pose = self.start_pose().rotated(pivot, angle);
        *self.start_pose_mut() = pose;
    }

    /// Apply the rigid motion mapping `from` onto `to`
    pub fn transform(&mut self, from: &Pose, to: &Pose) {
        let pose = self.start_pose().transformed(from, to);
        *self.start_pose_mut() = pose;
    }

    /// Split into two components at road coordinate `s`.
    ///
    /// `s` must lie strictly inside the component.
    pub fn split(&self, s: f64) -> RoadResult<(TrackComponent, TrackComponent)> {
        let ds = self.local_s(s)?;
        if ds < NUMERICAL_ZERO6 || ds > self.length() - NUMERICAL_ZERO6 {
            return Err(RoadError::Degenerate(format!(
                "split at s = {s:.6} touches a track boundary"
            )));
        }
        let mid = Pose {
            position: self.local_point(ds),
            heading: self.local_heading(ds),
        };
        let rest = self.length() - ds;
        Ok(match self {
            Self::Line(line) => (
                Self::line(line.s_start, line.start, ds),
                Self::line(s, mid, rest),
            ),
            Self::Arc(arc) => (
                Self::arc(arc.s_start, arc.start, ds, arc.curvature),
                Self::arc(s, mid, rest, arc.curvature),
            ),
        })
    }
}

impl TrackGeometry for TrackComponent {
    fn s_start(&self) -> f64 {
        self.geometry().s_start()
    }

    fn length(&self) -> f64 {
        self.geometry().length()
    }

    fn local_heading(&self, ds: f64) -> f64 {
        self.geometry().local_heading(ds)
    }

    fn local_point(&self, ds: f64) -> Point2<f64> {
        self.geometry().local_point(ds)
    }
}
