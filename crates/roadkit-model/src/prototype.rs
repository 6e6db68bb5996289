//! Road prototypes
//!
//! Factory for simple roads: one track component, flat profiles and a
//! single lane section with a given number of lanes per side.

use roadkit_core::{Cubic, Pose, RoadResult, TrackComponent};

use crate::lane::{Lane, LaneRoadMark, LaneType, RoadMarkType};
use crate::lane_section::LaneSection;
use crate::profile::{ElevationSection, RoadType, TypeSection};
use crate::road::Road;

#[derive(Debug, Clone)]
pub struct RoadPrototype {
    id: String,
    name: String,
    start: Pose,
    length: f64,
    curvature: f64,
    left_lanes: u32,
    right_lanes: u32,
    lane_width: f64,
    road_type: RoadType,
    junction: Option<String>,
}

impl RoadPrototype {
    /// Straight road from `start` with `left` and `right` lanes of `lane_width`
    pub fn straight(
        id: impl Into<String>,
        start: Pose,
        length: f64,
        left: u32,
        right: u32,
        lane_width: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: format!("road {id}"),
            id,
            start,
            length,
            curvature: 0.0,
            left_lanes: left,
            right_lanes: right,
            lane_width,
            road_type: RoadType::Town,
            junction: None,
        }
    }

    /// Bend the reference line with a constant curvature
    pub fn with_curvature(mut self, curvature: f64) -> Self {
        self.curvature = curvature;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_road_type(mut self, road_type: RoadType) -> Self {
        self.road_type = road_type;
        self
    }

    /// Make the road a connecting road of `junction`
    pub fn in_junction(mut self, junction: impl Into<String>) -> Self {
        self.junction = Some(junction.into());
        self
    }

    pub fn build(&self) -> RoadResult<Road> {
        let mut road = Road::new(self.id.clone(), self.name.clone());
        if let Some(junction) = &self.junction {
            road.set_junction(junction.clone());
        }
        let track = if self.curvature == 0.0 {
            TrackComponent::line(0.0, self.start, self.length)
        } else {
            TrackComponent::arc(0.0, self.start, self.length, self.curvature)
        };
        road.add_track(track)?;
        road.type_sections_mut()
            .add(TypeSection::new(0.0, self.road_type))?;
        road.elevation_sections_mut()
            .add(ElevationSection::new(0.0, Cubic::default()))?;
        road.lane_sections_mut().add(self.lane_section()?)?;
        road.clear_changes();
        Ok(road)
    }

    fn lane_section(&self) -> RoadResult<LaneSection> {
        let right = (1..=self.right_lanes as i32).map(|i| -i);
        let left = 1..=self.left_lanes as i32;
        let mut lanes = Vec::new();
        let mut center = Lane::new(0, LaneType::None);
        center.add_road_mark(LaneRoadMark::new(0.0, RoadMarkType::Solid))?;
        lanes.push(center);
        for id in right.chain(left) {
            let mut lane = Lane::with_width(id, LaneType::Driving, self.lane_width);
            lane.add_road_mark(LaneRoadMark::new(0.0, RoadMarkType::Broken))?;
            lanes.push(lane);
        }
        LaneSection::with_lanes(0.0, lanes)
    }
}
