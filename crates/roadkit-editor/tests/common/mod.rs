//! Shared fixtures for the command tests

#![allow(dead_code)]

use roadkit_core::{Pose, TrackComponent};
use roadkit_model::{Road, RoadPrototype, RoadSystem};
use serde_json::Value;

pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Straight road along the x axis with `left` and `right` lanes of 3 m
pub fn road_with_lanes(id: &str, length: f64, left: u32, right: u32) -> Road {
    RoadPrototype::straight(id, Pose::new(0.0, 0.0, 0.0), length, left, right, 3.0)
        .build()
        .unwrap()
}

/// Straight road with one lane per side starting at `(x, y)`
pub fn straight(id: &str, x: f64, y: f64, heading: f64, length: f64) -> Road {
    RoadPrototype::straight(id, Pose::new(x, y, heading), length, 1, 1, 3.0)
        .build()
        .unwrap()
}

/// Straight road from the origin made of two line tracks
pub fn two_track_road(id: &str, first: f64, second: f64) -> Road {
    let mut road = road_with_lanes(id, first, 1, 1);
    road.add_track(TrackComponent::line(first, Pose::new(first, 0.0, 0.0), second))
        .unwrap();
    road
}

pub fn system_of(roads: impl IntoIterator<Item = Road>) -> RoadSystem {
    let mut system = RoadSystem::new();
    for road in roads {
        system.add_road(road).unwrap();
    }
    system
}

/// Serialized model state; change flags are not part of it
pub fn snapshot(system: &RoadSystem) -> Value {
    serde_json::to_value(system).unwrap()
}

pub fn lane_ids(system: &RoadSystem, road: &str, section: f64) -> Vec<i32> {
    system
        .road(road)
        .unwrap()
        .try_lane_section(section)
        .unwrap()
        .lane_ids()
}

pub fn lane_section_starts(system: &RoadSystem, road: &str) -> Vec<f64> {
    system.road(road).unwrap().lane_sections().starts().collect()
}
