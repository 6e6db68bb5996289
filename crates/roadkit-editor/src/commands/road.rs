//! Road commands
//!
//! Commands that add, remove, move or restructure whole roads. Structural
//! edits build the resulting roads up front and swap them with the live
//! ones, so undo reinstalls the original road values.

use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};
use tracing::debug;

use roadkit_core::{
    SMap, TrackComponent, TrackGeometry, MIN_SPLIT_MARGIN, NUMERICAL_ZERO6, NUMERICAL_ZERO8,
};
use roadkit_model::{
    ContactPoint, ElementType, LinkType, Road, RoadLink, RoadSystem, SectionKind, SectionSet,
};

use super::{road_mut, Command, CommandInfo, CompositeCommand, Custody, EditCommand};
use crate::error::{CommandError, CommandResult};
use crate::link_inference::ContactMask;

/// Add a new road to the system.
#[derive(Debug)]
pub struct NewRoadCommand {
    info: CommandInfo,
    id: String,
    custody: Custody<(), Road>,
}

impl NewRoadCommand {
    const TEXT: &'static str = "New Road";

    pub fn new(system: &RoadSystem, road: Road) -> Self {
        let info = if road.id().is_empty() {
            CommandInfo::invalid(Self::TEXT, "road has no id")
        } else if system.road(road.id()).is_some() {
            CommandInfo::invalid(Self::TEXT, "road id already in use")
        } else {
            CommandInfo::new(Self::TEXT)
        };
        Self {
            info,
            id: road.id().to_string(),
            custody: Custody::OwnsNew(road),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = self.custody.take_new()?;
        system.add_road(road)?;
        self.custody.hold_old(());
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.custody.take_old()?;
        let road = system.del_road(&self.id)?;
        self.custody.hold_new(road);
        Ok(())
    }
}

/// Remove a road from the system. Links pointing at it are left as they are.
#[derive(Debug)]
pub struct RemoveRoadCommand {
    info: CommandInfo,
    id: String,
    custody: Custody<Road, ()>,
}

impl RemoveRoadCommand {
    const TEXT: &'static str = "Remove Road";

    pub fn new(system: &RoadSystem, id: &str) -> Self {
        let info = if system.road(id).is_some() {
            CommandInfo::new(Self::TEXT)
        } else {
            CommandInfo::invalid(Self::TEXT, "road not found")
        };
        Self {
            info,
            id: id.to_string(),
            custody: Custody::OwnsNew(()),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.custody.take_new()?;
        let road = system.del_road(&self.id)?;
        self.custody.hold_old(road);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = self.custody.take_old()?;
        system.add_road(road)?;
        self.custody.hold_new(());
        Ok(())
    }
}

fn roads_exist(system: &RoadSystem, roads: &[String]) -> bool {
    !roads.is_empty() && roads.iter().all(|id| system.road(id).is_some())
}

fn capture_tracks(system: &RoadSystem, roads: &[String]) -> CommandResult<Vec<SMap<TrackComponent>>> {
    roads
        .iter()
        .map(|id| Ok(super::road(system, id)?.track_map().clone()))
        .collect()
}

fn restore_tracks(
    system: &mut RoadSystem,
    roads: &[String],
    tracks: &mut Vec<SMap<TrackComponent>>,
) -> CommandResult<()> {
    for (id, old) in roads.iter().zip(tracks.drain(..)) {
        road_mut(system, id)?.replace_tracks(old);
    }
    Ok(())
}

/// Translate the reference lines of several roads.
#[derive(Debug)]
pub struct MoveRoadCommand {
    info: CommandInfo,
    roads: Vec<String>,
    offset: Vector2<f64>,
    old: Vec<SMap<TrackComponent>>,
}

impl MoveRoadCommand {
    const TEXT: &'static str = "Move Road";

    pub fn new(system: &RoadSystem, roads: Vec<String>, offset: Vector2<f64>) -> Self {
        let info = if !roads_exist(system, &roads) {
            CommandInfo::invalid(Self::TEXT, "road not found")
        } else if offset.norm() < NUMERICAL_ZERO8 {
            CommandInfo::invalid(Self::TEXT, "no change")
        } else {
            CommandInfo::new(Self::TEXT)
        };
        Self {
            info,
            roads,
            offset,
            old: Vec::new(),
        }
    }

    /// Absorb a following move of the same roads
    pub fn merge_with(&mut self, other: &MoveRoadCommand) -> bool {
        if !self.info.is_valid() || !other.info.is_valid() || self.roads != other.roads {
            return false;
        }
        self.offset += other.offset;
        true
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.old = capture_tracks(system, &self.roads)?;
        for id in &self.roads {
            road_mut(system, id)?.translate(&self.offset);
        }
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        restore_tracks(system, &self.roads, &mut self.old)
    }
}

/// Rotate the reference lines of several roads around a pivot.
#[derive(Debug)]
pub struct RotateRoadCommand {
    info: CommandInfo,
    roads: Vec<String>,
    pivot: Point2<f64>,
    /// Radians, counter-clockwise
    angle: f64,
    old: Vec<SMap<TrackComponent>>,
}

impl RotateRoadCommand {
    const TEXT: &'static str = "Rotate Road";

    pub fn new(system: &RoadSystem, roads: Vec<String>, pivot: Point2<f64>, angle: f64) -> Self {
        let info = if !roads_exist(system, &roads) {
            CommandInfo::invalid(Self::TEXT, "road not found")
        } else if angle.abs() < NUMERICAL_ZERO8 {
            CommandInfo::invalid(Self::TEXT, "no change")
        } else {
            CommandInfo::new(Self::TEXT)
        };
        Self {
            info,
            roads,
            pivot,
            angle,
            old: Vec::new(),
        }
    }

    /// Absorb a following rotation of the same roads around the same pivot
    pub fn merge_with(&mut self, other: &RotateRoadCommand) -> bool {
        if !self.info.is_valid()
            || !other.info.is_valid()
            || self.roads != other.roads
            || (self.pivot - other.pivot).norm() > NUMERICAL_ZERO8
        {
            return false;
        }
        self.angle += other.angle;
        true
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.old = capture_tracks(system, &self.roads)?;
        for id in &self.roads {
            road_mut(system, id)?.rotate(&self.pivot, self.angle);
        }
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        restore_tracks(system, &self.roads, &mut self.old)
    }
}

/// Split the track component containing `s` into two components at `s`.
#[derive(Debug)]
pub struct SplitTrackComponentCommand {
    info: CommandInfo,
    road: String,
    start: f64,
    custody: Custody<TrackComponent, (TrackComponent, TrackComponent)>,
}

impl SplitTrackComponentCommand {
    const TEXT: &'static str = "Split Track";

    pub fn new(system: &RoadSystem, road: &str, s: f64) -> Self {
        let split = system
            .road(road)
            .and_then(|r| r.track_at(s).ok())
            .map(|track| (track.s_start(), track.split(s)));
        match split {
            Some((start, Ok(pieces))) => Self {
                info: CommandInfo::new(Self::TEXT),
                road: road.to_string(),
                start,
                custody: Custody::OwnsNew(pieces),
            },
            Some((start, Err(_))) => Self {
                info: CommandInfo::invalid(Self::TEXT, "position on a track boundary"),
                road: road.to_string(),
                start,
                custody: Custody::Empty,
            },
            None => Self {
                info: CommandInfo::invalid(Self::TEXT, "no track at this position"),
                road: road.to_string(),
                start: s,
                custody: Custody::Empty,
            },
        }
    }

    /// Replace the split track on `road` with the two pieces
    fn install(road: &mut Road, start: f64, pieces: (TrackComponent, TrackComponent)) -> CommandResult<TrackComponent> {
        let old = road.del_track(start)?;
        road.add_track(pieces.0)?;
        road.add_track(pieces.1)?;
        Ok(old)
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let pieces = self.custody.take_new()?;
        let old = Self::install(road, self.start, pieces)?;
        self.custody.hold_old(old);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let old = self.custody.take_old()?;
        let second_start = old.s_start() + road.track_at(old.s_start())?.length();
        let second = road.del_track(second_start)?;
        let first = road.del_track(self.start)?;
        road.add_track(old)?;
        self.custody.hold_new((first, second));
        Ok(())
    }
}

/// Point the neighbour behind one end of road `from` at road `to`.
///
/// `link` is the link of `from` at `end`. Road neighbours get their
/// matching slot rewritten, junctions their connections with `from` as
/// incoming road (and the connecting roads' links), fiddleyards their
/// element. Neighbours listed in `skip` are left alone.
fn redirect_neighbour(
    system: &mut RoadSystem,
    link: Option<&RoadLink>,
    end: ContactPoint,
    from: &str,
    to: &str,
    skip: &[&str],
) -> CommandResult<()> {
    let Some(link) = link else {
        return Ok(());
    };
    if skip.contains(&link.element_id.as_str()) {
        return Ok(());
    }
    let points_back = |l: &RoadLink| l.targets_road(from) && l.contact_point == end;

    match link.element_type {
        ElementType::Road => {
            let slot = LinkType::at_end(link.contact_point);
            if let Some(neighbour) = system.road_mut(&link.element_id) {
                if neighbour.link(slot).is_some_and(points_back) {
                    if let Some(back) = neighbour.link_mut(slot) {
                        back.element_id = to.to_string();
                    }
                }
            }
        }
        ElementType::Junction => {
            let Some(junction) = system.junction(&link.element_id) else {
                return Ok(());
            };
            let redirected: Vec<(String, String, LinkType)> = junction
                .connections()
                .iter()
                .filter(|c| c.incoming_road == from)
                .map(|c| {
                    (
                        c.id.clone(),
                        c.connecting_road.clone(),
                        LinkType::at_end(c.contact_point),
                    )
                })
                .filter(|(_, connecting, slot)| {
                    system
                        .road(connecting)
                        .and_then(|r| r.link(*slot))
                        .is_some_and(points_back)
                })
                .collect();
            if redirected.is_empty() {
                return Ok(());
            }
            let junction = system.get_junction_mut(&link.element_id)?;
            for connection in junction.connections_mut() {
                if redirected.iter().any(|(id, _, _)| *id == connection.id) {
                    connection.incoming_road = to.to_string();
                }
            }
            for (_, connecting, slot) in redirected {
                if let Some(back) = system.road_mut(&connecting).and_then(|r| r.link_mut(slot)) {
                    back.element_id = to.to_string();
                }
            }
        }
        ElementType::Fiddleyard => {
            let fiddleyard = system.get_fiddleyard_mut(&link.element_id)?;
            if fiddleyard.element_id == from && fiddleyard.contact_point == end {
                fiddleyard.element_id = to.to_string();
            }
        }
    }
    Ok(())
}

/// Split a road into two new roads at a track boundary.
///
/// The split position snaps to the nearest boundary of the track
/// containing `s`. The two halves get fresh ids and are linked to each
/// other; the original links move to the outer ends, and every neighbour
/// that pointed at the original road is redirected to the half now sitting
/// at its end. Undo reinstalls the original road and the neighbours' links.
#[derive(Debug)]
pub struct SplitRoadCommand {
    info: CommandInfo,
    original: String,
    first: String,
    second: String,
    custody: Custody<Road, (Road, Road)>,
}

impl SplitRoadCommand {
    const TEXT: &'static str = "Split Road";

    pub fn new(system: &RoadSystem, road: &str, s: f64) -> Self {
        Self::with_margin(system, road, s, MIN_SPLIT_MARGIN)
    }

    /// Split refusing positions closer than `margin` to the road ends
    pub fn with_margin(system: &RoadSystem, road: &str, s: f64, margin: f64) -> Self {
        match system.road(road) {
            Some(r) => Self::for_road(system, r, s, margin),
            None => Self::rejected(road, "road not found"),
        }
    }

    fn rejected(road: &str, reason: &str) -> Self {
        Self {
            info: CommandInfo::invalid(Self::TEXT, reason),
            original: road.to_string(),
            first: String::new(),
            second: String::new(),
            custody: Custody::Empty,
        }
    }

    /// Boundary of the track containing `s` closest to `s`
    fn snap(road: &Road, s: f64, margin: f64) -> Result<f64, &'static str> {
        if s < margin {
            return Err("too close to the start of the road");
        }
        if s > road.length() - margin {
            return Err("too close to the end of the road");
        }
        let track = road.track_at(s).map_err(|_| "no track at this position")?;
        let start = track.s_start();
        let end = start + track.length();
        if (s - start).abs() < NUMERICAL_ZERO6 {
            Ok(start)
        } else if s - start < end - s {
            if start < NUMERICAL_ZERO6 {
                Err("too close to the start of the road")
            } else {
                Ok(start)
            }
        } else if (end - road.length()).abs() < NUMERICAL_ZERO6 {
            Err("too close to the end of the road")
        } else {
            Ok(end)
        }
    }

    /// Split `road`, which need not be installed yet, as it will look when
    /// the command is applied
    fn for_road(system: &RoadSystem, road: &Road, s: f64, margin: f64) -> Self {
        let at = match Self::snap(road, s, margin) {
            Ok(at) => at,
            Err(reason) => return Self::rejected(road.id(), reason),
        };
        let ids = system.unique_ids(road.id(), 2);
        let (first_id, second_id) = (ids[0].clone(), ids[1].clone());
        let (mut first, mut second) = match road.split_before(at, &first_id, &second_id) {
            Ok(halves) => halves,
            Err(_) => return Self::rejected(road.id(), "cannot split at this position"),
        };

        let loops = |link: &RoadLink| link.targets_road(road.id());
        first.set_link(
            LinkType::Predecessor,
            road.predecessor().map(|link| {
                if loops(link) {
                    RoadLink::road(second_id.clone(), ContactPoint::End)
                } else {
                    link.clone()
                }
            }),
        );
        first.set_successor(RoadLink::road(second_id.clone(), ContactPoint::Start));
        second.set_predecessor(RoadLink::road(first_id.clone(), ContactPoint::End));
        second.set_link(
            LinkType::Successor,
            road.successor().map(|link| {
                if loops(link) {
                    RoadLink::road(first_id.clone(), ContactPoint::Start)
                } else {
                    link.clone()
                }
            }),
        );
        debug!(road = road.id(), at, first = %first_id, second = %second_id, "road split prepared");

        Self {
            info: CommandInfo::new(Self::TEXT),
            original: road.id().to_string(),
            first: first_id,
            second: second_id,
            custody: Custody::OwnsNew((first, second)),
        }
    }

    /// Ids of the two halves
    pub fn halves(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }

    fn redirect(&self, system: &mut RoadSystem, original: &Road, forward: bool) -> CommandResult<()> {
        let skip = [self.original.as_str(), self.first.as_str(), self.second.as_str()];
        let ends = [
            (original.predecessor().cloned(), ContactPoint::Start, &self.first),
            (original.successor().cloned(), ContactPoint::End, &self.second),
        ];
        for (link, end, half) in ends {
            let (from, to) = if forward {
                (self.original.as_str(), half.as_str())
            } else {
                (half.as_str(), self.original.as_str())
            };
            redirect_neighbour(system, link.as_ref(), end, from, to, &skip)?;
        }
        Ok(())
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let (first, second) = self.custody.take_new()?;
        let original = system.del_road(&self.original)?;
        system.add_road(first)?;
        system.add_road(second)?;
        self.redirect(system, &original, true)?;
        self.custody.hold_old(original);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let original = self.custody.take_old()?;
        self.redirect(system, &original, false)?;
        let first = system.del_road(&self.first)?;
        let second = system.del_road(&self.second)?;
        system.add_road(original)?;
        self.custody.hold_new((first, second));
        Ok(())
    }
}

/// Split the track at `s` and then the road at the new track boundary.
///
/// When `s` already lies on a track boundary only the road is split.
/// Positions closer than `margin` to the road ends are refused.
pub fn split_track_road(system: &RoadSystem, road: &str, s: f64, margin: f64) -> CompositeCommand {
    const TEXT: &str = "Split Track and Road";
    let Some(current) = system.road(road) else {
        return CompositeCommand::new(TEXT, Vec::new());
    };
    let track_split = SplitTrackComponentCommand::new(system, road, s);
    let mut children: Vec<EditCommand> = Vec::with_capacity(2);
    let road_split = match track_split.custody.new_ref() {
        Some(pieces) if track_split.is_valid() => {
            let mut staged = current.clone();
            let staged_ok =
                SplitTrackComponentCommand::install(&mut staged, track_split.start, pieces.clone())
                    .is_ok();
            let split = if staged_ok {
                SplitRoadCommand::for_road(system, &staged, s, margin)
            } else {
                SplitRoadCommand::rejected(road, "cannot split the track")
            };
            children.push(track_split.into());
            split
        }
        _ => SplitRoadCommand::with_margin(system, road, s, margin),
    };
    children.push(road_split.into());
    CompositeCommand::new(TEXT, children)
}

/// Join a second road onto one end of a first road.
///
/// The second road's reference line is moved rigidly to continue the first
/// one and its sections follow along. The second road is removed.
#[derive(Debug)]
pub struct MergeRoadsCommand {
    info: CommandInfo,
    first: String,
    second: String,
    custody: Custody<(Road, Road), Road>,
}

impl MergeRoadsCommand {
    const TEXT: &'static str = "Merge";

    pub fn new(system: &RoadSystem, first: &str, second: &str, at_start: bool) -> Self {
        let joined = match (system.road(first), system.road(second)) {
            _ if first == second => Err("cannot merge a road with itself"),
            (Some(a), Some(b)) => a.joined(b, at_start).map_err(|_| "roads cannot be joined"),
            _ => Err("road not found"),
        };
        let (info, custody) = match joined {
            Ok(road) => (CommandInfo::new(Self::TEXT), Custody::OwnsNew(road)),
            Err(reason) => (CommandInfo::invalid(Self::TEXT, reason), Custody::Empty),
        };
        Self {
            info,
            first: first.to_string(),
            second: second.to_string(),
            custody,
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let joined = self.custody.take_new()?;
        let second = system.del_road(&self.second)?;
        let first = system.del_road(&self.first)?;
        system.add_road(joined)?;
        self.custody.hold_old((first, second));
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let (first, second) = self.custody.take_old()?;
        let joined = system.del_road(&self.first)?;
        system.add_road(first)?;
        system.add_road(second)?;
        self.custody.hold_new(joined);
        Ok(())
    }
}

/// Swap the live road `id` for `road`, returning the live one
fn swap_road(system: &mut RoadSystem, road: Road) -> CommandResult<Road> {
    let old = system.del_road(road.id())?;
    system.add_road(road)?;
    Ok(old)
}

/// Bring a second road into contact with a first one.
///
/// With like ends touching (start to start, end to end) the second road is
/// moved rigidly so its touching end sits on the first road's end, facing
/// the opposite way. With unlike ends the second road is joined onto the
/// first one and removed, as [`MergeRoadsCommand`] does.
#[derive(Debug)]
pub struct SnapRoadsCommand {
    info: CommandInfo,
    /// Live roads swapped out on redo
    replaced: Vec<String>,
    custody: Custody<Vec<Road>, Vec<Road>>,
}

impl SnapRoadsCommand {
    const TEXT: &'static str = "Snap";

    pub fn new(system: &RoadSystem, first: &str, second: &str, contacts: ContactMask) -> Self {
        let snapped = match (system.road(first), system.road(second)) {
            _ if first == second => Err("cannot snap a road to itself"),
            (Some(a), Some(b)) => Self::snapped(a, b, contacts),
            _ => Err("road not found"),
        };
        match snapped {
            Ok((replaced, roads)) => Self {
                info: CommandInfo::new(Self::TEXT),
                replaced,
                custody: Custody::OwnsNew(roads),
            },
            Err(reason) => Self {
                info: CommandInfo::invalid(Self::TEXT, reason),
                replaced: Vec::new(),
                custody: Custody::Empty,
            },
        }
    }

    fn snapped(first: &Road, second: &Road, contacts: ContactMask) -> Result<(Vec<String>, Vec<Road>), &'static str> {
        let (a_end, b_end) = (contacts.first(), contacts.second());
        match (a_end, b_end) {
            (ContactPoint::End, ContactPoint::Start) | (ContactPoint::Start, ContactPoint::End) => {
                let joined = first
                    .joined(second, a_end == ContactPoint::Start)
                    .map_err(|_| "roads cannot be joined")?;
                let replaced = vec![first.id().to_string(), second.id().to_string()];
                Ok((replaced, vec![joined]))
            }
            _ => {
                let target = first.pose_at(a_end).map_err(|_| "road has no geometry")?;
                let from = second.pose_at(b_end).map_err(|_| "road has no geometry")?;
                let mut moved = second.clone();
                moved.rotate(&from.position, target.heading + PI - from.heading);
                moved.translate(&(target.position - from.position));
                Ok((vec![second.id().to_string()], vec![moved]))
            }
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let roads = self.custody.take_new()?;
        let old = self
            .replaced
            .iter()
            .map(|id| system.del_road(id))
            .collect::<Result<Vec<_>, _>>()?;
        for road in roads {
            system.add_road(road)?;
        }
        self.custody.hold_old(old);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let old = self.custody.take_old()?;
        let snapped_id = old
            .first()
            .map(|r| r.id().to_string())
            .ok_or(CommandError::Custody("snapped roads not held"))?;
        let snapped = system.del_road(&snapped_id)?;
        for road in old {
            system.add_road(road)?;
        }
        self.custody.hold_new(vec![snapped]);
        Ok(())
    }
}

/// Remove the first or last track of a road with the sections over it.
///
/// Removing the first track moves the rest of the road to start at s = 0.
/// Links and the road id are kept.
#[derive(Debug)]
pub struct RemoveTrackCommand {
    info: CommandInfo,
    road: String,
    custody: Custody<Road, Road>,
}

impl RemoveTrackCommand {
    const TEXT: &'static str = "Remove Track";

    /// `s` is the start of the track to remove
    pub fn new(system: &RoadSystem, road: &str, s: f64, at_start: bool) -> Self {
        let trimmed = match system.road(road) {
            None => Err("road not found"),
            Some(r) => Self::trimmed(r, s, at_start),
        };
        let (info, custody) = match trimmed {
            Ok(trimmed) => (CommandInfo::new(Self::TEXT), Custody::OwnsNew(trimmed)),
            Err(reason) => (CommandInfo::invalid(Self::TEXT, reason), Custody::Empty),
        };
        Self {
            info,
            road: road.to_string(),
            custody,
        }
    }

    fn trimmed(road: &Road, s: f64, at_start: bool) -> Result<Road, &'static str> {
        let starts = road.track_starts();
        if starts.len() < 2 {
            return Err("road has a single track");
        }
        let end_track = if at_start { starts.first() } else { starts.last() };
        if end_track.is_none_or(|t| (t - s).abs() > NUMERICAL_ZERO6) {
            return Err("track is not at this end of the road");
        }
        let cut = if at_start { starts[1] } else { s };
        let (head, tail) = road
            .split_before(cut, road.id(), road.id())
            .map_err(|_| "road cannot be cut at this track")?;
        let kept = if at_start { tail } else { head };

        let mut trimmed = road.clone();
        trimmed.replace_tracks(kept.track_map().clone());
        for kind in [
            SectionKind::Type,
            SectionKind::Elevation,
            SectionKind::Superelevation,
            SectionKind::Crossfall,
            SectionKind::Lane,
        ] {
            trimmed.replace_sections(kept.sections(kind));
        }
        debug!(road = %road.id(), s, at_start, length = trimmed.length(), "track removed");
        Ok(trimmed)
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let trimmed = self.custody.take_new()?;
        let old = swap_road(system, trimmed)?;
        self.custody.hold_old(old);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let old = self.custody.take_old()?;
        let trimmed = swap_road(system, old)?;
        self.custody.hold_new(trimmed);
        Ok(())
    }
}

/// Extend a road with a copy of a prototype road at its start or end.
#[derive(Debug)]
pub struct AppendRoadPrototypeCommand {
    info: CommandInfo,
    road: String,
    custody: Custody<Road, Road>,
}

impl AppendRoadPrototypeCommand {
    const TEXT: &'static str = "Append Prototype";

    pub fn new(system: &RoadSystem, road: &str, prototype: &Road, at_start: bool) -> Self {
        let extended = match system.road(road) {
            None => Err("road not found"),
            Some(_) if prototype.length() < NUMERICAL_ZERO6 => Err("prototype has no length"),
            Some(r) => r
                .joined(prototype, at_start)
                .map_err(|_| "prototype cannot be appended"),
        };
        let (info, custody) = match extended {
            Ok(extended) => (CommandInfo::new(Self::TEXT), Custody::OwnsNew(extended)),
            Err(reason) => (CommandInfo::invalid(Self::TEXT, reason), Custody::Empty),
        };
        Self {
            info,
            road: road.to_string(),
            custody,
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let extended = self.custody.take_new()?;
        let old = swap_road(system, extended)?;
        self.custody.hold_old(old);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let old = self.custody.take_old()?;
        let extended = swap_road(system, old)?;
        self.custody.hold_new(extended);
        Ok(())
    }
}

/// Replace every section of one kind with the sections of a prototype.
#[derive(Debug)]
pub struct ChangeSectionPrototypeCommand {
    info: CommandInfo,
    road: String,
    custody: Custody<SectionSet, SectionSet>,
}

impl ChangeSectionPrototypeCommand {
    const TEXT: &'static str = "Change Prototype";

    pub fn new(system: &RoadSystem, road: &str, prototype: &Road, kind: SectionKind) -> Self {
        let sections = prototype.sections(kind);
        let info = if system.road(road).is_none() {
            CommandInfo::invalid(Self::TEXT, "road not found")
        } else if sections.is_empty() {
            CommandInfo::invalid(Self::TEXT, "prototype has no sections of this kind")
        } else {
            CommandInfo::new(Self::TEXT)
        };
        Self {
            info,
            road: road.to_string(),
            custody: Custody::OwnsNew(sections),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let new = self.custody.take_new()?;
        let old = road.replace_sections(new);
        self.custody.hold_old(old);
        Ok(())
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let old = self.custody.take_old()?;
        let new = road.replace_sections(old);
        self.custody.hold_new(new);
        Ok(())
    }
}

impl_command!(
    NewRoadCommand,
    RemoveRoadCommand,
    MoveRoadCommand,
    RotateRoadCommand,
    SplitTrackComponentCommand,
    SplitRoadCommand,
    MergeRoadsCommand,
    SnapRoadsCommand,
    RemoveTrackCommand,
    AppendRoadPrototypeCommand,
    ChangeSectionPrototypeCommand
);
