//! Generic s-indexed section container
//!
//! Type, elevation, superelevation, crossfall and lane sections share one
//! container: an ordered map from start coordinate to section, where each
//! section implicitly ends where the next one starts (or at the road end).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use roadkit_core::{canonical_s, RoadError, RoadResult, SMap, NUMERICAL_ZERO6};

use crate::changes::Changes;

/// The kinds of sections a road owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Type,
    Elevation,
    Superelevation,
    Crossfall,
    Lane,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Type => "type",
            Self::Elevation => "elevation",
            Self::Superelevation => "superelevation",
            Self::Crossfall => "crossfall",
            Self::Lane => "lane",
        };
        f.write_str(name)
    }
}

/// A section stored in a [`SectionContainer`].
pub trait RoadSection: Clone {
    const KIND: SectionKind;

    fn s_start(&self) -> f64;

    fn set_s_start(&mut self, s: f64);

    fn changes(&self) -> Changes;

    fn add_changes(&mut self, changes: Changes);

    fn clear_changes(&mut self);

    /// Copy of the part of this section covering `[from, to)`, starting at `from`.
    ///
    /// `from` lies inside the section. Profiles are re-based so that the
    /// copy describes the same curve.
    fn clip(&self, from: f64, to: f64) -> Self;
}

/// Ordered sections of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize",
    deserialize = "S: Deserialize<'de>"
))]
pub struct SectionContainer<S> {
    sections: SMap<S>,
}

impl<S> Default for SectionContainer<S> {
    fn default() -> Self {
        Self {
            sections: SMap::new(),
        }
    }
}

impl<S: RoadSection> SectionContainer<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a container from sections, rejecting duplicate starts
    pub fn from_sections(sections: impl IntoIterator<Item = S>) -> RoadResult<Self> {
        let mut container = Self::new();
        for section in sections {
            container.add(section)?;
        }
        Ok(container)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Insert a section keyed by its start.
    ///
    /// The section that contained the start before insertion now ends
    /// earlier and is flagged with [`Changes::LENGTH`].
    pub fn add(&mut self, mut section: S) -> RoadResult<()> {
        let s = canonical_s(section.s_start());
        if self.sections.contains_key(s) {
            return Err(RoadError::duplicate_section(S::KIND.to_string(), s));
        }
        if let Some((_, previous)) = self.sections.containing_mut(s) {
            previous.add_changes(Changes::LENGTH);
        }
        section.set_s_start(s);
        section.add_changes(Changes::START);
        self.sections
            .insert(s, section)
            .map_err(|_| RoadError::InvalidStart(s))
    }

    /// Remove the section starting exactly at `s`.
    ///
    /// The preceding section now extends further and is flagged with
    /// [`Changes::LENGTH`].
    pub fn delete(&mut self, s: f64) -> RoadResult<S> {
        let Some(section) = self.sections.remove(s) else {
            warn!(kind = %S::KIND, s, "cannot delete section: no section at this start");
            return Err(RoadError::section_not_found(S::KIND.to_string(), s));
        };
        if let Some((_, previous)) = self.sections.containing_mut(s) {
            previous.add_changes(Changes::LENGTH);
        }
        Ok(section)
    }

    /// Relocate the section starting at `old_s` to `new_s`.
    pub fn move_section(&mut self, old_s: f64, new_s: f64) -> RoadResult<()> {
        if !self.sections.contains_key(old_s) {
            warn!(kind = %S::KIND, old_s, new_s, "cannot move section: no section at this start");
            return Err(RoadError::section_not_found(S::KIND.to_string(), old_s));
        }
        if !self.sections.move_key(old_s, new_s) {
            warn!(kind = %S::KIND, old_s, new_s, "cannot move section: target start occupied");
            return Err(RoadError::duplicate_section(S::KIND.to_string(), new_s));
        }
        let new_s = canonical_s(new_s);
        if let Some(section) = self.sections.get_mut(new_s) {
            section.set_s_start(new_s);
            section.add_changes(Changes::START | Changes::LENGTH);
        }
        // The section now preceding the moved one changed its end.
        let previous_key = self.sections.before(new_s).map(|(k, _)| k);
        if let Some(previous) = previous_key.and_then(|k| self.sections.get_mut(k)) {
            previous.add_changes(Changes::LENGTH);
        }
        Ok(())
    }

    /// The section containing `s` (greatest start `<= s`)
    pub fn get(&self, s: f64) -> Option<&S> {
        self.sections.containing(s).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, s: f64) -> Option<&mut S> {
        self.sections.containing_mut(s).map(|(_, v)| v)
    }

    /// The section starting exactly at `s`
    pub fn get_exact(&self, s: f64) -> Option<&S> {
        self.sections.get(s)
    }

    pub fn get_exact_mut(&mut self, s: f64) -> Option<&mut S> {
        self.sections.get_mut(s)
    }

    /// The section immediately preceding the one containing `s`
    pub fn get_before(&self, s: f64) -> Option<&S> {
        self.sections.before(s).map(|(_, v)| v)
    }

    /// The first section starting after `s`
    pub fn get_next(&self, s: f64) -> Option<&S> {
        self.sections.next_after(s).map(|(_, v)| v)
    }

    /// End of the section containing `s`
    pub fn get_end(&self, s: f64, road_length: f64) -> f64 {
        self.sections.end_of(s, road_length)
    }

    /// Start key within tolerance of `s`
    pub fn key_near(&self, s: f64) -> Option<f64> {
        self.sections.key_near(s)
    }

    pub fn first(&self) -> Option<&S> {
        self.sections.first().map(|(_, v)| v)
    }

    pub fn last(&self) -> Option<&S> {
        self.sections.last().map(|(_, v)| v)
    }

    pub fn last_mut(&mut self) -> Option<&mut S> {
        self.sections.last_mut().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &S> + '_ {
        self.sections.values()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut S> + '_ {
        self.sections.values_mut()
    }

    pub fn starts(&self) -> impl DoubleEndedIterator<Item = f64> + '_ {
        self.sections.keys()
    }

    pub fn clear_changes(&mut self) {
        for section in self.sections.values_mut() {
            section.clear_changes();
        }
    }

    /// Partition the container at `s`.
    ///
    /// The first part keeps every section starting before `s`, clipped at
    /// `s`. The second part holds the sections starting at or after `s`,
    /// shifted by `-s`; when none starts exactly at `s`, the section
    /// containing `s` is clipped and re-based at 0.
    pub fn split_at(&self, s: f64, road_length: f64) -> RoadResult<(Self, Self)> {
        let mut before = Self::new();
        let mut after = Self::new();
        for (start, section) in self.sections.iter() {
            let end = self.sections.end_of(start, road_length);
            if start < s - NUMERICAL_ZERO6 {
                let piece = if end > s + NUMERICAL_ZERO6 {
                    section.clip(start, s)
                } else {
                    section.clone()
                };
                before.add(piece)?;
            } else {
                let mut piece = section.clone();
                piece.set_s_start(start - s);
                after.add(piece)?;
            }
        }
        if after.get_exact(0.0).is_none() {
            if let Some((start, dominating)) = self.sections.containing(s) {
                let end = self.sections.end_of(start, road_length);
                let mut piece = dominating.clip(s, end);
                piece.set_s_start(0.0);
                after.add(piece)?;
            }
        }
        Ok((before, after))
    }

    /// Append copies of `other`'s sections shifted by `offset`
    pub fn append_shifted(&mut self, other: &Self, offset: f64) -> RoadResult<()> {
        for section in other.iter() {
            let mut piece = section.clone();
            piece.set_s_start(section.s_start() + offset);
            self.add(piece)?;
        }
        Ok(())
    }

    /// Shift every section by `offset`
    pub fn shift(&mut self, offset: f64) -> RoadResult<()> {
        let sections: Vec<S> = self.sections.drain().into_iter().map(|(_, v)| v).collect();
        for mut section in sections {
            section.set_s_start(section.s_start() + offset);
            self.add(section)?;
        }
        Ok(())
    }
}
