//! The road system: all roads, junctions and fiddleyards of a network

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use roadkit_core::{RoadError, RoadResult};

use crate::junction::{Fiddleyard, Junction};
use crate::road::Road;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadSystem {
    roads: BTreeMap<String, Road>,
    junctions: BTreeMap<String, Junction>,
    fiddleyards: BTreeMap<String, Fiddleyard>,
}

impl RoadSystem {
    pub fn new() -> Self {
        Self::default()
    }

    // Roads

    pub fn add_road(&mut self, road: Road) -> RoadResult<()> {
        if self.roads.contains_key(road.id()) {
            return Err(RoadError::DuplicateRoad(road.id().to_string()));
        }
        debug!(road = road.id(), length = road.length(), "road added");
        self.roads.insert(road.id().to_string(), road);
        Ok(())
    }

    pub fn del_road(&mut self, id: &str) -> RoadResult<Road> {
        let road = self
            .roads
            .remove(id)
            .ok_or_else(|| RoadError::RoadNotFound(id.to_string()))?;
        debug!(road = id, "road removed");
        Ok(road)
    }

    pub fn road(&self, id: &str) -> Option<&Road> {
        self.roads.get(id)
    }

    pub fn road_mut(&mut self, id: &str) -> Option<&mut Road> {
        self.roads.get_mut(id)
    }

    /// Road `id` or a [`RoadError::RoadNotFound`]
    pub fn get_road(&self, id: &str) -> RoadResult<&Road> {
        self.roads
            .get(id)
            .ok_or_else(|| RoadError::RoadNotFound(id.to_string()))
    }

    pub fn get_road_mut(&mut self, id: &str) -> RoadResult<&mut Road> {
        self.roads
            .get_mut(id)
            .ok_or_else(|| RoadError::RoadNotFound(id.to_string()))
    }

    pub fn roads(&self) -> impl Iterator<Item = &Road> + '_ {
        self.roads.values()
    }

    pub fn road_ids(&self) -> Vec<String> {
        self.roads.keys().cloned().collect()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    // Junctions

    pub fn add_junction(&mut self, junction: Junction) -> RoadResult<()> {
        if self.junctions.contains_key(&junction.id) {
            return Err(RoadError::DuplicateRoad(junction.id.clone()));
        }
        self.junctions.insert(junction.id.clone(), junction);
        Ok(())
    }

    pub fn del_junction(&mut self, id: &str) -> RoadResult<Junction> {
        self.junctions
            .remove(id)
            .ok_or_else(|| RoadError::JunctionNotFound(id.to_string()))
    }

    pub fn junction(&self, id: &str) -> Option<&Junction> {
        self.junctions.get(id)
    }

    pub fn get_junction(&self, id: &str) -> RoadResult<&Junction> {
        self.junctions
            .get(id)
            .ok_or_else(|| RoadError::JunctionNotFound(id.to_string()))
    }

    pub fn get_junction_mut(&mut self, id: &str) -> RoadResult<&mut Junction> {
        self.junctions
            .get_mut(id)
            .ok_or_else(|| RoadError::JunctionNotFound(id.to_string()))
    }

    pub fn junctions(&self) -> impl Iterator<Item = &Junction> + '_ {
        self.junctions.values()
    }

    pub fn junctions_mut(&mut self) -> impl Iterator<Item = &mut Junction> + '_ {
        self.junctions.values_mut()
    }

    // Fiddleyards

    pub fn add_fiddleyard(&mut self, fiddleyard: Fiddleyard) -> RoadResult<()> {
        if self.fiddleyards.contains_key(&fiddleyard.id) {
            return Err(RoadError::DuplicateRoad(fiddleyard.id.clone()));
        }
        self.fiddleyards.insert(fiddleyard.id.clone(), fiddleyard);
        Ok(())
    }

    pub fn fiddleyard(&self, id: &str) -> Option<&Fiddleyard> {
        self.fiddleyards.get(id)
    }

    pub fn get_fiddleyard_mut(&mut self, id: &str) -> RoadResult<&mut Fiddleyard> {
        self.fiddleyards
            .get_mut(id)
            .ok_or_else(|| RoadError::FiddleyardNotFound(id.to_string()))
    }

    // Ids

    fn id_in_use(&self, id: &str) -> bool {
        self.roads.contains_key(id)
            || self.junctions.contains_key(id)
            || self.fiddleyards.contains_key(id)
    }

    /// A fresh id, `suggestion` itself when it is unused
    pub fn unique_id(&self, suggestion: &str) -> String {
        self.unique_ids(suggestion, 1).remove(0)
    }

    /// `count` distinct fresh ids derived from `suggestion`
    pub fn unique_ids(&self, suggestion: &str, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        if !suggestion.is_empty() && !self.id_in_use(suggestion) {
            ids.push(suggestion.to_string());
        }
        let stem = suggestion.trim_end_matches(|c: char| c.is_ascii_digit());
        let mut n = self.roads.len() + self.junctions.len() + self.fiddleyards.len();
        while ids.len() < count {
            let candidate = format!("{stem}{n}");
            if !self.id_in_use(&candidate) && !ids.contains(&candidate) {
                ids.push(candidate);
            }
            n += 1;
        }
        ids
    }

    /// Clear change flags on every element
    pub fn clear_changes(&mut self) {
        for road in self.roads.values_mut() {
            road.clear_changes();
        }
        for junction in self.junctions.values_mut() {
            junction.clear_changes();
        }
    }
}
