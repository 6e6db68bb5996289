//! The road aggregate
//!
//! A road owns its reference line (track components keyed by start) and
//! five section containers. The road length is derived from the tracks and
//! is the end of the last section of every container.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::warn;

use roadkit_core::{
    Pose, RoadError, RoadResult, SMap, TrackComponent, TrackGeometry, NO_JUNCTION, NUMERICAL_ZERO6,
};

use crate::changes::Changes;
use crate::lane_section::LaneSection;
use crate::link::{ContactPoint, LinkType, RoadLink};
use crate::profile::{CrossfallSection, ElevationSection, SuperelevationSection, TypeSection};
use crate::section::{RoadSection, SectionContainer, SectionKind};

/// A section of any kind, used where commands handle sections generically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnySection {
    Type(TypeSection),
    Elevation(ElevationSection),
    Superelevation(SuperelevationSection),
    Crossfall(CrossfallSection),
    Lane(LaneSection),
}

impl AnySection {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Type(_) => SectionKind::Type,
            Self::Elevation(_) => SectionKind::Elevation,
            Self::Superelevation(_) => SectionKind::Superelevation,
            Self::Crossfall(_) => SectionKind::Crossfall,
            Self::Lane(_) => SectionKind::Lane,
        }
    }

    pub fn s_start(&self) -> f64 {
        match self {
            Self::Type(s) => s.s_start(),
            Self::Elevation(s) => s.s_start(),
            Self::Superelevation(s) => s.s_start(),
            Self::Crossfall(s) => s.s_start(),
            Self::Lane(s) => s.s_start(),
        }
    }

    pub fn set_s_start(&mut self, start: f64) {
        match self {
            Self::Type(s) => s.set_s_start(start),
            Self::Elevation(s) => s.set_s_start(start),
            Self::Superelevation(s) => s.set_s_start(start),
            Self::Crossfall(s) => s.set_s_start(start),
            Self::Lane(s) => s.set_s_start(start),
        }
    }
}

/// A whole container of one section kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "sections", rename_all = "lowercase")]
pub enum SectionSet {
    Type(SectionContainer<TypeSection>),
    Elevation(SectionContainer<ElevationSection>),
    Superelevation(SectionContainer<SuperelevationSection>),
    Crossfall(SectionContainer<CrossfallSection>),
    Lane(SectionContainer<LaneSection>),
}

impl SectionSet {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Type(_) => SectionKind::Type,
            Self::Elevation(_) => SectionKind::Elevation,
            Self::Superelevation(_) => SectionKind::Superelevation,
            Self::Crossfall(_) => SectionKind::Crossfall,
            Self::Lane(_) => SectionKind::Lane,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Type(c) => c.is_empty(),
            Self::Elevation(c) => c.is_empty(),
            Self::Superelevation(c) => c.is_empty(),
            Self::Crossfall(c) => c.is_empty(),
            Self::Lane(c) => c.is_empty(),
        }
    }
}

/// Run `$body` with `$c` bound to the container of `$kind` on `$road`.
macro_rules! with_container {
    (mut $road:expr, $kind:expr, |$c:ident| $body:expr) => {
        match $kind {
            SectionKind::Type => {
                let $c = &mut $road.type_sections;
                $body
            }
            SectionKind::Elevation => {
                let $c = &mut $road.elevation_sections;
                $body
            }
            SectionKind::Superelevation => {
                let $c = &mut $road.superelevation_sections;
                $body
            }
            SectionKind::Crossfall => {
                let $c = &mut $road.crossfall_sections;
                $body
            }
            SectionKind::Lane => {
                let $c = &mut $road.lane_sections;
                $body
            }
        }
    };
    ($road:expr, $kind:expr, |$c:ident| $body:expr) => {
        match $kind {
            SectionKind::Type => {
                let $c = &$road.type_sections;
                $body
            }
            SectionKind::Elevation => {
                let $c = &$road.elevation_sections;
                $body
            }
            SectionKind::Superelevation => {
                let $c = &$road.superelevation_sections;
                $body
            }
            SectionKind::Crossfall => {
                let $c = &$road.crossfall_sections;
                $body
            }
            SectionKind::Lane => {
                let $c = &$road.lane_sections;
                $body
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    id: String,
    pub name: String,
    junction: String,
    length: f64,
    predecessor: Option<RoadLink>,
    successor: Option<RoadLink>,
    tracks: SMap<TrackComponent>,
    type_sections: SectionContainer<TypeSection>,
    elevation_sections: SectionContainer<ElevationSection>,
    superelevation_sections: SectionContainer<SuperelevationSection>,
    crossfall_sections: SectionContainer<CrossfallSection>,
    lane_sections: SectionContainer<LaneSection>,
    #[serde(skip)]
    changes: Changes,
}

impl Road {
    /// Empty road outside any junction
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            junction: NO_JUNCTION.to_string(),
            length: 0.0,
            predecessor: None,
            successor: None,
            tracks: SMap::new(),
            type_sections: SectionContainer::new(),
            elevation_sections: SectionContainer::new(),
            superelevation_sections: SectionContainer::new(),
            crossfall_sections: SectionContainer::new(),
            lane_sections: SectionContainer::new(),
            changes: Changes::NONE,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.changes |= Changes::ID;
    }

    /// Id of the junction the road belongs to, `"-1"` when none
    pub fn junction(&self) -> &str {
        &self.junction
    }

    pub fn set_junction(&mut self, junction: impl Into<String>) {
        self.junction = junction.into();
        self.changes |= Changes::PARAMS;
    }

    pub fn is_in_junction(&self) -> bool {
        !self.junction.is_empty() && self.junction != NO_JUNCTION
    }

    pub fn changes(&self) -> Changes {
        self.changes
    }

    pub fn add_changes(&mut self, changes: Changes) {
        self.changes |= changes;
    }

    /// Clear the flags of the road and everything it owns
    pub fn clear_changes(&mut self) {
        self.changes.clear();
        self.type_sections.clear_changes();
        self.elevation_sections.clear_changes();
        self.superelevation_sections.clear_changes();
        self.crossfall_sections.clear_changes();
        self.lane_sections.clear_changes();
    }

    // Tracks

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Recompute the length as the sum of all track lengths
    pub fn update_length(&mut self) {
        self.length = self.tracks.values().map(|t| t.length()).sum();
        self.changes |= Changes::LENGTH;
    }

    pub fn tracks(&self) -> impl DoubleEndedIterator<Item = &TrackComponent> + '_ {
        self.tracks.values()
    }

    pub fn track_map(&self) -> &SMap<TrackComponent> {
        &self.tracks
    }

    /// Replace the whole reference line, returning the previous one
    pub fn replace_tracks(&mut self, tracks: SMap<TrackComponent>) -> SMap<TrackComponent> {
        let old = std::mem::replace(&mut self.tracks, tracks);
        self.changes |= Changes::TRACKS;
        self.update_length();
        old
    }

    pub fn track_starts(&self) -> Vec<f64> {
        self.tracks.keys().collect()
    }

    /// Track start within tolerance of `s`
    pub fn track_key_near(&self, s: f64) -> Option<f64> {
        self.tracks.key_near(s)
    }

    pub fn add_track(&mut self, track: TrackComponent) -> RoadResult<()> {
        let s = track.s_start();
        self.tracks
            .insert(s, track)
            .map_err(|_| RoadError::duplicate_section("track", s))?;
        self.changes |= Changes::TRACKS;
        self.update_length();
        Ok(())
    }

    pub fn del_track(&mut self, s: f64) -> RoadResult<TrackComponent> {
        let Some(track) = self.tracks.remove(s) else {
            warn!(road = %self.id, s, "cannot delete track: no track at this start");
            return Err(RoadError::TrackNotFound(s));
        };
        self.changes |= Changes::TRACKS;
        self.update_length();
        Ok(track)
    }

    /// Reassign track starts sequentially from 0 and recompute the length
    pub fn rebuild_track_component_list(&mut self) {
        let mut s = 0.0;
        for (_, mut track) in self.tracks.drain() {
            track.set_s_start(s);
            s += track.length();
            // Starts strictly increase, so the keys stay unique.
            let _ = self.tracks.insert(track.s_start(), track);
        }
        self.changes |= Changes::TRACKS;
        self.update_length();
    }

    /// The track containing `s`
    pub fn track_at(&self, s: f64) -> RoadResult<&TrackComponent> {
        if !s.is_finite() || s < -NUMERICAL_ZERO6 || s > self.length + NUMERICAL_ZERO6 {
            return Err(RoadError::OutOfRange {
                s,
                start: 0.0,
                end: self.length,
            });
        }
        self.tracks
            .containing(s.max(0.0))
            .map(|(_, t)| t)
            .ok_or(RoadError::OutOfRange {
                s,
                start: 0.0,
                end: self.length,
            })
    }

    pub fn global_point(&self, s: f64, d: f64) -> RoadResult<Point2<f64>> {
        self.track_at(s)?.global_point(s, d)
    }

    pub fn global_heading(&self, s: f64) -> RoadResult<f64> {
        self.track_at(s)?.global_heading(s)
    }

    pub fn global_tangent(&self, s: f64) -> RoadResult<Vector2<f64>> {
        self.track_at(s)?.global_tangent(s)
    }

    pub fn global_normal(&self, s: f64) -> RoadResult<Vector2<f64>> {
        self.track_at(s)?.global_normal(s)
    }

    /// Pose at the given road end
    pub fn pose_at(&self, end: ContactPoint) -> RoadResult<Pose> {
        let s = match end {
            ContactPoint::Start => 0.0,
            ContactPoint::End => self.length,
        };
        Ok(Pose {
            position: self.global_point(s, 0.0)?,
            heading: self.global_heading(s)?,
        })
    }

    pub fn translate(&mut self, offset: &Vector2<f64>) {
        for track in self.tracks.values_mut() {
            track.translate(offset);
        }
        self.changes |= Changes::TRACKS;
    }

    pub fn rotate(&mut self, pivot: &Point2<f64>, angle: f64) {
        for track in self.tracks.values_mut() {
            track.rotate(pivot, angle);
        }
        self.changes |= Changes::TRACKS;
    }

    // Links

    pub fn predecessor(&self) -> Option<&RoadLink> {
        self.predecessor.as_ref()
    }

    pub fn successor(&self) -> Option<&RoadLink> {
        self.successor.as_ref()
    }

    pub fn link(&self, link_type: LinkType) -> Option<&RoadLink> {
        match link_type {
            LinkType::Predecessor => self.predecessor.as_ref(),
            LinkType::Successor => self.successor.as_ref(),
        }
    }

    pub fn link_mut(&mut self, link_type: LinkType) -> Option<&mut RoadLink> {
        self.changes |= Changes::LINK;
        match link_type {
            LinkType::Predecessor => self.predecessor.as_mut(),
            LinkType::Successor => self.successor.as_mut(),
        }
    }

    /// Replace a link slot, returning the previous link
    pub fn set_link(&mut self, link_type: LinkType, link: Option<RoadLink>) -> Option<RoadLink> {
        self.changes |= Changes::LINK;
        match link_type {
            LinkType::Predecessor => std::mem::replace(&mut self.predecessor, link),
            LinkType::Successor => std::mem::replace(&mut self.successor, link),
        }
    }

    pub fn set_predecessor(&mut self, link: RoadLink) -> Option<RoadLink> {
        self.set_link(LinkType::Predecessor, Some(link))
    }

    pub fn set_successor(&mut self, link: RoadLink) -> Option<RoadLink> {
        self.set_link(LinkType::Successor, Some(link))
    }

    /// Clear a link slot; logs when the slot was empty
    pub fn del_link(&mut self, link_type: LinkType) -> Option<RoadLink> {
        let old = self.set_link(link_type, None);
        if old.is_none() {
            warn!(road = %self.id, %link_type, "no link to delete");
        }
        old
    }

    // Section containers

    pub fn type_sections(&self) -> &SectionContainer<TypeSection> {
        &self.type_sections
    }

    pub fn type_sections_mut(&mut self) -> &mut SectionContainer<TypeSection> {
        &mut self.type_sections
    }

    pub fn elevation_sections(&self) -> &SectionContainer<ElevationSection> {
        &self.elevation_sections
    }

    pub fn elevation_sections_mut(&mut self) -> &mut SectionContainer<ElevationSection> {
        &mut self.elevation_sections
    }

    pub fn superelevation_sections(&self) -> &SectionContainer<SuperelevationSection> {
        &self.superelevation_sections
    }

    pub fn superelevation_sections_mut(&mut self) -> &mut SectionContainer<SuperelevationSection> {
        &mut self.superelevation_sections
    }

    pub fn crossfall_sections(&self) -> &SectionContainer<CrossfallSection> {
        &self.crossfall_sections
    }

    pub fn crossfall_sections_mut(&mut self) -> &mut SectionContainer<CrossfallSection> {
        &mut self.crossfall_sections
    }

    pub fn lane_sections(&self) -> &SectionContainer<LaneSection> {
        &self.lane_sections
    }

    pub fn lane_sections_mut(&mut self) -> &mut SectionContainer<LaneSection> {
        &mut self.lane_sections
    }

    // Lane sections

    /// The lane section containing `s`
    pub fn lane_section(&self, s: f64) -> Option<&LaneSection> {
        self.lane_sections.get(s)
    }

    pub fn lane_section_mut(&mut self, s: f64) -> Option<&mut LaneSection> {
        self.lane_sections.get_mut(s)
    }

    /// The lane section preceding the one containing `s`
    pub fn lane_section_before(&self, s: f64) -> Option<&LaneSection> {
        self.lane_sections.get_before(s)
    }

    /// End of the lane section containing `s`
    pub fn lane_section_end(&self, s: f64) -> f64 {
        self.lane_sections.get_end(s, self.length)
    }

    /// The lane section starting exactly at `s`
    pub fn try_lane_section(&self, s: f64) -> RoadResult<&LaneSection> {
        self.lane_sections
            .get_exact(s)
            .ok_or_else(|| RoadError::section_not_found(SectionKind::Lane.to_string(), s))
    }

    pub fn try_lane_section_mut(&mut self, s: f64) -> RoadResult<&mut LaneSection> {
        self.lane_sections
            .get_exact_mut(s)
            .ok_or_else(|| RoadError::section_not_found(SectionKind::Lane.to_string(), s))
    }

    /// Lane section at a road end: the first for the start, the last for the end
    pub fn boundary_lane_section(&self, end: ContactPoint) -> Option<&LaneSection> {
        match end {
            ContactPoint::Start => self.lane_sections.first(),
            ContactPoint::End => self.lane_sections.last(),
        }
    }

    pub fn boundary_lane_section_mut(&mut self, end: ContactPoint) -> Option<&mut LaneSection> {
        match end {
            ContactPoint::Start => self.lane_sections.iter_mut().next(),
            ContactPoint::End => self.lane_sections.last_mut(),
        }
    }

    // Generic section access

    pub fn insert_section(&mut self, section: AnySection) -> RoadResult<()> {
        self.changes |= Changes::SECTIONS;
        match section {
            AnySection::Type(s) => self.type_sections.add(s),
            AnySection::Elevation(s) => self.elevation_sections.add(s),
            AnySection::Superelevation(s) => self.superelevation_sections.add(s),
            AnySection::Crossfall(s) => self.crossfall_sections.add(s),
            AnySection::Lane(s) => self.lane_sections.add(s),
        }
    }

    pub fn delete_section(&mut self, kind: SectionKind, s: f64) -> RoadResult<AnySection> {
        self.changes |= Changes::SECTIONS;
        Ok(match kind {
            SectionKind::Type => AnySection::Type(self.type_sections.delete(s)?),
            SectionKind::Elevation => AnySection::Elevation(self.elevation_sections.delete(s)?),
            SectionKind::Superelevation => {
                AnySection::Superelevation(self.superelevation_sections.delete(s)?)
            }
            SectionKind::Crossfall => AnySection::Crossfall(self.crossfall_sections.delete(s)?),
            SectionKind::Lane => AnySection::Lane(self.lane_sections.delete(s)?),
        })
    }

    pub fn move_section(&mut self, kind: SectionKind, old_s: f64, new_s: f64) -> RoadResult<()> {
        self.changes |= Changes::SECTIONS;
        with_container!(mut self, kind, |c| c.move_section(old_s, new_s))
    }

    /// Copy of the section of `kind` containing `s`
    pub fn section_at(&self, kind: SectionKind, s: f64) -> Option<AnySection> {
        match kind {
            SectionKind::Type => self.type_sections.get(s).cloned().map(AnySection::Type),
            SectionKind::Elevation => self
                .elevation_sections
                .get(s)
                .cloned()
                .map(AnySection::Elevation),
            SectionKind::Superelevation => self
                .superelevation_sections
                .get(s)
                .cloned()
                .map(AnySection::Superelevation),
            SectionKind::Crossfall => self
                .crossfall_sections
                .get(s)
                .cloned()
                .map(AnySection::Crossfall),
            SectionKind::Lane => self.lane_sections.get(s).cloned().map(AnySection::Lane),
        }
    }

    /// Start of the section preceding the one of `kind` containing `s`
    pub fn section_before_start(&self, kind: SectionKind, s: f64) -> Option<f64> {
        with_container!(self, kind, |c| c.get_before(s).map(|x| x.s_start()))
    }

    /// Start of the section of `kind` following `s`
    pub fn section_next_start(&self, kind: SectionKind, s: f64) -> Option<f64> {
        with_container!(self, kind, |c| c.get_next(s).map(|x| x.s_start()))
    }

    /// End of the section of `kind` containing `s`
    pub fn section_end(&self, kind: SectionKind, s: f64) -> f64 {
        let length = self.length;
        with_container!(self, kind, |c| c.get_end(s, length))
    }

    /// Whether a section of `kind` starts exactly at `s`
    pub fn has_section_at(&self, kind: SectionKind, s: f64) -> bool {
        with_container!(self, kind, |c| c.get_exact(s).is_some())
    }

    pub fn section_count(&self, kind: SectionKind) -> usize {
        with_container!(self, kind, |c| c.len())
    }

    /// Replace a whole container, returning the previous one
    pub fn replace_sections(&mut self, sections: SectionSet) -> SectionSet {
        self.changes |= Changes::SECTIONS;
        match sections {
            SectionSet::Type(c) => {
                SectionSet::Type(std::mem::replace(&mut self.type_sections, c))
            }
            SectionSet::Elevation(c) => {
                SectionSet::Elevation(std::mem::replace(&mut self.elevation_sections, c))
            }
            SectionSet::Superelevation(c) => {
                SectionSet::Superelevation(std::mem::replace(&mut self.superelevation_sections, c))
            }
            SectionSet::Crossfall(c) => {
                SectionSet::Crossfall(std::mem::replace(&mut self.crossfall_sections, c))
            }
            SectionSet::Lane(c) => {
                SectionSet::Lane(std::mem::replace(&mut self.lane_sections, c))
            }
        }
    }

    /// Copy of the container of `kind`
    pub fn sections(&self, kind: SectionKind) -> SectionSet {
        match kind {
            SectionKind::Type => SectionSet::Type(self.type_sections.clone()),
            SectionKind::Elevation => SectionSet::Elevation(self.elevation_sections.clone()),
            SectionKind::Superelevation => {
                SectionSet::Superelevation(self.superelevation_sections.clone())
            }
            SectionKind::Crossfall => SectionSet::Crossfall(self.crossfall_sections.clone()),
            SectionKind::Lane => SectionSet::Lane(self.lane_sections.clone()),
        }
    }

    /// Overlay the sections of `prototype`: every kind the prototype
    /// defines replaces this road's sections of that kind
    pub fn superpose_prototype(&mut self, prototype: &Road) {
        for kind in [
            SectionKind::Type,
            SectionKind::Elevation,
            SectionKind::Superelevation,
            SectionKind::Crossfall,
            SectionKind::Lane,
        ] {
            let sections = prototype.sections(kind);
            if !sections.is_empty() {
                self.replace_sections(sections);
            }
        }
    }

    // Structural operations

    /// Partition the road at `s` into two new roads.
    ///
    /// `s` must coincide with a track boundary strictly inside the road.
    /// The first road keeps coordinates `[0, s)`, the second one holds
    /// `[s, length)` shifted by `-s`. Links are left empty.
    pub fn split_before(&self, s: f64, id_a: &str, id_b: &str) -> RoadResult<(Road, Road)> {
        let s = self
            .tracks
            .key_near(s)
            .filter(|k| *k > NUMERICAL_ZERO6 && *k < self.length - NUMERICAL_ZERO6)
            .ok_or_else(|| {
                RoadError::Degenerate(format!("no inner track boundary at s = {s:.6}"))
            })?;

        let mut a = Road::new(id_a, self.name.clone());
        let mut b = Road::new(id_b, self.name.clone());
        a.junction = self.junction.clone();
        b.junction = self.junction.clone();

        for (start, track) in self.tracks.iter() {
            let mut piece = track.clone();
            if start < s {
                a.add_track(piece)?;
            } else {
                piece.set_s_start(start - s);
                b.add_track(piece)?;
            }
        }

        let length = self.length;
        (a.type_sections, b.type_sections) = self.type_sections.split_at(s, length)?;
        (a.elevation_sections, b.elevation_sections) =
            self.elevation_sections.split_at(s, length)?;
        (a.superelevation_sections, b.superelevation_sections) =
            self.superelevation_sections.split_at(s, length)?;
        (a.crossfall_sections, b.crossfall_sections) =
            self.crossfall_sections.split_at(s, length)?;
        (a.lane_sections, b.lane_sections) = self.lane_sections.split_at(s, length)?;
        Ok((a, b))
    }

    /// A copy of this road with `other` attached at one end.
    ///
    /// `other`'s reference line is moved rigidly so that it continues this
    /// road's start or end pose; its sections follow along. Links of this
    /// road are kept.
    pub fn joined(&self, other: &Road, at_start: bool) -> RoadResult<Road> {
        let mut joined = self.clone();
        joined.changes = Changes::TRACKS | Changes::SECTIONS | Changes::LENGTH;
        if at_start {
            let from = other.pose_at(ContactPoint::End)?;
            let to = self.pose_at(ContactPoint::Start)?;
            let offset = other.length;
            joined.tracks.clear();
            for track in other.tracks.values() {
                let mut piece = track.clone();
                piece.transform(&from, &to);
                joined.add_track(piece)?;
            }
            for track in self.tracks.values() {
                let mut piece = track.clone();
                piece.set_s_start(track.s_start() + offset);
                joined.add_track(piece)?;
            }
            joined.rebuild_track_component_list();

            joined.type_sections = other.type_sections.clone();
            joined.type_sections.append_shifted(&self.type_sections, offset)?;
            joined.elevation_sections = other.elevation_sections.clone();
            joined
                .elevation_sections
                .append_shifted(&self.elevation_sections, offset)?;
            joined.superelevation_sections = other.superelevation_sections.clone();
            joined
                .superelevation_sections
                .append_shifted(&self.superelevation_sections, offset)?;
            joined.crossfall_sections = other.crossfall_sections.clone();
            joined
                .crossfall_sections
                .append_shifted(&self.crossfall_sections, offset)?;
            joined.lane_sections = other.lane_sections.clone();
            joined
                .lane_sections
                .append_shifted(&self.lane_sections, offset)?;
        } else {
            let from = other.pose_at(ContactPoint::Start)?;
            let to = self.pose_at(ContactPoint::End)?;
            let offset = self.length;
            for track in other.tracks.values() {
                let mut piece = track.clone();
                piece.transform(&from, &to);
                piece.set_s_start(track.s_start() + offset);
                joined.add_track(piece)?;
            }
            joined
                .type_sections
                .append_shifted(&other.type_sections, offset)?;
            joined
                .elevation_sections
                .append_shifted(&other.elevation_sections, offset)?;
            joined
                .superelevation_sections
                .append_shifted(&other.superelevation_sections, offset)?;
            joined
                .crossfall_sections
                .append_shifted(&other.crossfall_sections, offset)?;
            joined
                .lane_sections
                .append_shifted(&other.lane_sections, offset)?;
        }
        joined.update_length();
        Ok(joined)
    }
}
