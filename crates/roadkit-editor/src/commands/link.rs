//! Road link commands

use tracing::info;

use roadkit_model::{JunctionConnection, LinkType, RoadLink, RoadSystem};

use super::{road_mut, CommandInfo, Custody};
use crate::error::{CommandError, CommandResult};
use crate::lane_links::{
    propagate_lane_links, reset_boundary_lane_links, LaneFilter, LaneLinkSnapshot,
};
use crate::link_inference::{candidate_pairs, plan_links, LinkPlan, RoadPair};

#[derive(Debug)]
struct SlotEdit {
    road: String,
    slot: LinkType,
    custody: Custody<Option<RoadLink>, RoadLink>,
}

impl SlotEdit {
    fn install(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let new = self.custody.take_new()?;
        let old = road.set_link(self.slot, Some(new));
        self.custody.hold_old(old);
        Ok(())
    }

    fn restore(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let old = self.custody.take_old()?;
        let new = road
            .set_link(self.slot, old)
            .ok_or(CommandError::Custody("installed link missing"))?;
        self.custody.hold_new(new);
        Ok(())
    }

    fn targets_road(&self) -> bool {
        match &self.custody {
            Custody::OwnsNew(link) => link.is_road(),
            _ => false,
        }
    }
}

/// A junction connection added by a command, held while not installed.
#[derive(Debug)]
struct AddedConnection {
    junction: String,
    id: String,
    pending: Option<JunctionConnection>,
}

impl AddedConnection {
    fn new(junction: String, connection: JunctionConnection) -> Self {
        Self {
            junction,
            id: connection.id.clone(),
            pending: Some(connection),
        }
    }

    fn install(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let junction = system.get_junction_mut(&self.junction)?;
        let connection = self
            .pending
            .take()
            .ok_or(CommandError::Custody("connection not held"))?;
        junction.add_connection(connection);
        Ok(())
    }

    fn remove(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let junction = system.get_junction_mut(&self.junction)?;
        let (_, connection) = junction.remove_connection(&self.id)?;
        self.pending = Some(connection);
        Ok(())
    }
}

/// Link the road ends of a set of roads that lie close to each other.
#[derive(Debug)]
pub struct SetRoadLinkRoadsCommand {
    info: CommandInfo,
    slots: Vec<SlotEdit>,
    connections: Vec<AddedConnection>,
    involved: Vec<String>,
    snapshot: LaneLinkSnapshot,
}

impl SetRoadLinkRoadsCommand {
    const TEXT: &'static str = "Set Road Link";

    /// Infer links among `road_ids` for ends within `threshold` of each other
    pub fn new(system: &RoadSystem, road_ids: &[String], threshold: f64) -> Self {
        if road_ids.is_empty() {
            return Self::rejected("no roads given");
        }
        if let Some(missing) = road_ids.iter().find(|id| system.road(id).is_none()) {
            return Self::rejected(&format!("road {missing} not found"));
        }
        let pairs = candidate_pairs(system, road_ids, threshold);
        Self::from_plan(system, plan_links(system, &pairs))
    }

    /// Link precomputed road pairs, in the given order
    pub fn from_pairs(system: &RoadSystem, pairs: &[RoadPair]) -> Self {
        if pairs.is_empty() {
            return Self::rejected("no road pairs given");
        }
        Self::from_plan(system, plan_links(system, pairs))
    }

    fn rejected(reason: &str) -> Self {
        Self {
            info: CommandInfo::invalid(Self::TEXT, reason),
            slots: Vec::new(),
            connections: Vec::new(),
            involved: Vec::new(),
            snapshot: LaneLinkSnapshot::default(),
        }
    }

    fn from_plan(system: &RoadSystem, plan: LinkPlan) -> Self {
        if plan.is_empty() {
            return Self::rejected("no road ends within reach");
        }
        let mut slots: Vec<SlotEdit> = Vec::new();
        let mut involved: Vec<String> = Vec::new();
        for planned in plan.links {
            let mut touched = vec![&planned.road];
            if planned.link.is_road() {
                touched.push(&planned.link.element_id);
            }
            for id in touched {
                if !involved.contains(id) && system.road(id).is_some() {
                    involved.push(id.clone());
                }
            }
            // A slot matched by several candidates keeps the last link.
            match slots
                .iter_mut()
                .find(|s| s.road == planned.road && s.slot == planned.slot)
            {
                Some(existing) => existing.custody.hold_new(planned.link),
                None => slots.push(SlotEdit {
                    road: planned.road,
                    slot: planned.slot,
                    custody: Custody::OwnsNew(planned.link),
                }),
            }
        }
        let connections = plan
            .connections
            .into_iter()
            .map(|c| AddedConnection::new(c.junction, c.connection))
            .collect();
        Self {
            info: CommandInfo::new(Self::TEXT),
            slots,
            connections,
            involved,
            snapshot: LaneLinkSnapshot::default(),
        }
    }

    /// Number of road slots the command writes
    pub fn link_count(&self) -> usize {
        self.slots.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.snapshot = LaneLinkSnapshot::capture(system, &self.involved);
        let propagate: Vec<(String, LinkType)> = self
            .slots
            .iter()
            .filter(|s| s.targets_road())
            .map(|s| (s.road.clone(), s.slot))
            .collect();
        for slot in &mut self.slots {
            slot.install(system)?;
        }
        for connection in &mut self.connections {
            connection.install(system)?;
        }
        for (road, slot) in propagate {
            propagate_lane_links(system, &road, slot, LaneFilter::AllLanes);
        }
        info!(
            links = self.slots.len(),
            connections = self.connections.len(),
            "road links inferred"
        );
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for connection in self.connections.iter_mut().rev() {
            connection.remove(system)?;
        }
        for slot in self.slots.iter_mut().rev() {
            slot.restore(system)?;
        }
        self.snapshot.restore(system);
        Ok(())
    }
}

/// Set one link slot of a road, optionally adding a junction connection.
#[derive(Debug)]
pub struct SetRoadLinkCommand {
    info: CommandInfo,
    road: String,
    slot: LinkType,
    custody: Custody<Option<RoadLink>, Option<RoadLink>>,
    connection: Option<AddedConnection>,
    involved: Vec<String>,
    snapshot: LaneLinkSnapshot,
}

impl SetRoadLinkCommand {
    const TEXT: &'static str = "Set Road Link";

    /// `link = None` clears the slot
    pub fn new(
        system: &RoadSystem,
        road: &str,
        slot: LinkType,
        link: Option<RoadLink>,
        connection: Option<(String, JunctionConnection)>,
    ) -> Self {
        let reject = |reason: &str| Self {
            info: CommandInfo::invalid(Self::TEXT, reason),
            road: road.to_string(),
            slot,
            custody: Custody::Empty,
            connection: None,
            involved: Vec::new(),
            snapshot: LaneLinkSnapshot::default(),
        };
        let Some(current) = system.road(road) else {
            return reject("road not found");
        };
        if current.link(slot) == link.as_ref() {
            return reject("link unchanged");
        }
        if let Some((junction, _)) = &connection {
            if system.junction(junction).is_none() {
                return reject("junction not found");
            }
        }
        let mut involved = vec![road.to_string()];
        if let Some(target) = link.as_ref().filter(|l| l.is_road()) {
            if system.road(&target.element_id).is_none() {
                return reject("linked road not found");
            }
            if target.element_id != road {
                involved.push(target.element_id.clone());
            }
        }
        Self {
            info: CommandInfo::new(Self::TEXT),
            road: road.to_string(),
            slot,
            custody: Custody::OwnsNew(link),
            connection: connection.map(|(junction, c)| AddedConnection::new(junction, c)),
            involved,
            snapshot: LaneLinkSnapshot::default(),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.snapshot = LaneLinkSnapshot::capture(system, &self.involved);
        let road = road_mut(system, &self.road)?;
        let new = self.custody.take_new()?;
        let old = road.set_link(self.slot, new);
        self.custody.hold_old(old);
        if let Some(connection) = &mut self.connection {
            connection.install(system)?;
        }
        propagate_lane_links(system, &self.road, self.slot, LaneFilter::SlotSide);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        if let Some(connection) = &mut self.connection {
            connection.remove(system)?;
        }
        let road = road_mut(system, &self.road)?;
        let old = self.custody.take_old()?;
        let new = road.set_link(self.slot, old);
        self.custody.hold_new(new);
        self.snapshot.restore(system);
        Ok(())
    }
}

/// Remove both links of a road together with the junction connections
/// that use it as connecting road.
#[derive(Debug)]
pub struct RemoveRoadLinkCommand {
    info: CommandInfo,
    road: String,
    predecessor: Option<RoadLink>,
    successor: Option<RoadLink>,
    removed: Vec<(String, usize, JunctionConnection)>,
    snapshot: LaneLinkSnapshot,
}

impl RemoveRoadLinkCommand {
    const TEXT: &'static str = "Remove Road Link";

    pub fn new(system: &RoadSystem, road: &str) -> Self {
        let info = match system.road(road) {
            None => CommandInfo::invalid(Self::TEXT, "road not found"),
            Some(r) => {
                let has_connections = system
                    .junction(r.junction())
                    .is_some_and(|j| !j.connections_of_connecting_road(road).is_empty());
                if r.predecessor().is_none() && r.successor().is_none() && !has_connections {
                    CommandInfo::invalid(Self::TEXT, "road has no links")
                } else {
                    CommandInfo::new(Self::TEXT)
                }
            }
        };
        Self {
            info,
            road: road.to_string(),
            predecessor: None,
            successor: None,
            removed: Vec::new(),
            snapshot: LaneLinkSnapshot::default(),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.snapshot = LaneLinkSnapshot::capture(system, std::slice::from_ref(&self.road));
        let road = road_mut(system, &self.road)?;
        self.predecessor = road.del_link(LinkType::Predecessor);
        self.successor = road.del_link(LinkType::Successor);
        let junction_id = road.junction().to_string();

        self.removed.clear();
        let ids = system
            .junction(&junction_id)
            .map(|j| j.connections_of_connecting_road(&self.road))
            .unwrap_or_default();
        if !ids.is_empty() {
            let junction = system.get_junction_mut(&junction_id)?;
            for id in ids {
                let (index, connection) = junction.remove_connection(&id)?;
                self.removed.push((junction_id.clone(), index, connection));
            }
        }
        reset_boundary_lane_links(system, &self.road);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        for (junction, index, connection) in self.removed.drain(..).rev() {
            system
                .get_junction_mut(&junction)?
                .insert_connection(index, connection);
        }
        let road = road_mut(system, &self.road)?;
        road.set_link(LinkType::Predecessor, self.predecessor.take());
        road.set_link(LinkType::Successor, self.successor.take());
        self.snapshot.restore(system);
        Ok(())
    }
}

impl_command!(SetRoadLinkRoadsCommand, SetRoadLinkCommand, RemoveRoadLinkCommand);
