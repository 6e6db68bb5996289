//! Junctions, junction connections and fiddleyards

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use roadkit_core::{RoadError, RoadResult};

use crate::changes::Changes;
use crate::link::{ContactPoint, ElementType};

/// Lane mapping from an incoming lane to a connecting lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneLink {
    pub from: i32,
    pub to: i32,
}

/// Connection from an incoming road to a connecting road of a junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionConnection {
    pub id: String,
    pub incoming_road: String,
    pub connecting_road: String,
    pub contact_point: ContactPoint,
    pub lane_links: SmallVec<[LaneLink; 4]>,
}

impl JunctionConnection {
    pub fn new(
        id: impl Into<String>,
        incoming_road: impl Into<String>,
        connecting_road: impl Into<String>,
        contact_point: ContactPoint,
    ) -> Self {
        Self {
            id: id.into(),
            incoming_road: incoming_road.into(),
            connecting_road: connecting_road.into(),
            contact_point,
            lane_links: SmallVec::new(),
        }
    }

    pub fn add_lane_link(&mut self, from: i32, to: i32) {
        self.lane_links.push(LaneLink { from, to });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub id: String,
    pub name: String,
    connections: Vec<JunctionConnection>,
    #[serde(skip)]
    changes: Changes,
}

impl Junction {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            connections: Vec::new(),
            changes: Changes::NONE,
        }
    }

    pub fn connections(&self) -> &[JunctionConnection] {
        &self.connections
    }

    pub fn connection(&self, id: &str) -> Option<&JunctionConnection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn connections_mut(&mut self) -> impl Iterator<Item = &mut JunctionConnection> + '_ {
        self.changes |= Changes::CONNECTIONS;
        self.connections.iter_mut()
    }

    pub fn add_connection(&mut self, connection: JunctionConnection) {
        self.connections.push(connection);
        self.changes |= Changes::CONNECTIONS;
    }

    /// Remove connection `id`, returning it with its former position
    pub fn remove_connection(&mut self, id: &str) -> RoadResult<(usize, JunctionConnection)> {
        let index = self
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| RoadError::ConnectionNotFound {
                junction: self.id.clone(),
                connection: id.to_string(),
            })?;
        self.changes |= Changes::CONNECTIONS;
        Ok((index, self.connections.remove(index)))
    }

    /// Reinsert a connection at a former position
    pub fn insert_connection(&mut self, index: usize, connection: JunctionConnection) {
        let index = index.min(self.connections.len());
        self.connections.insert(index, connection);
        self.changes |= Changes::CONNECTIONS;
    }

    /// Ids of the connections whose connecting road is `road_id`
    pub fn connections_of_connecting_road(&self, road_id: &str) -> Vec<String> {
        self.connections
            .iter()
            .filter(|c| c.connecting_road == road_id)
            .map(|c| c.id.clone())
            .collect()
    }

    /// `count` connection ids not used by this junction yet
    pub fn next_connection_ids(&self, count: usize) -> Vec<String> {
        let next = self
            .connections
            .iter()
            .filter_map(|c| c.id.strip_prefix("jc").and_then(|n| n.parse::<usize>().ok()))
            .map(|n| n + 1)
            .max()
            .unwrap_or(0);
        (next..next + count).map(|n| format!("jc{n}")).collect()
    }

    pub fn changes(&self) -> Changes {
        self.changes
    }

    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }
}

/// Traffic source or sink attached to a road end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fiddleyard {
    pub id: String,
    pub name: String,
    pub element_type: ElementType,
    pub element_id: String,
    pub contact_point: ContactPoint,
}

impl Fiddleyard {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        road_id: impl Into<String>,
        contact_point: ContactPoint,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            element_type: ElementType::Road,
            element_id: road_id.into(),
            contact_point,
        }
    }
}
