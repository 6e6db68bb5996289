//! Lane section commands
//!
//! Every command here swaps whole lane sections: the replaced sections are
//! kept by the command, so undo reinstalls them untouched.

use roadkit_core::{RoadResult, MIN_LANESECTION_LENGTH};
use roadkit_model::{LaneSection, Road, RoadSection, RoadSystem};

use super::{road_mut, CommandInfo, Custody};
use crate::error::{CommandError, CommandResult};

/// Remove the sections starting at `starts` and insert copies of
/// `replacement`, returning what was removed.
///
/// The edit runs on a copy of the container; the road only changes when
/// every delete and add succeeded.
fn swap_sections(
    road: &mut Road,
    starts: &[f64],
    replacement: &[LaneSection],
) -> RoadResult<Vec<LaneSection>> {
    let mut staged = road.lane_sections().clone();
    let mut removed = Vec::with_capacity(starts.len());
    for s in starts {
        removed.push(staged.delete(*s)?);
    }
    for section in replacement {
        staged.add(section.clone())?;
    }
    *road.lane_sections_mut() = staged;
    Ok(removed)
}

/// Lane sections a command installs, and the ones it replaces
#[derive(Debug)]
struct SectionSwap {
    road: String,
    replaced: Vec<f64>,
    installed: Vec<f64>,
    custody: Custody<Vec<LaneSection>, Vec<LaneSection>>,
}

impl SectionSwap {
    fn new(road: &str, replaced: Vec<f64>, replacement: Vec<LaneSection>) -> Self {
        Self {
            road: road.to_string(),
            replaced,
            installed: replacement.iter().map(|s| s.s_start()).collect(),
            custody: Custody::OwnsNew(replacement),
        }
    }

    fn empty(road: &str) -> Self {
        Self {
            road: road.to_string(),
            replaced: Vec::new(),
            installed: Vec::new(),
            custody: Custody::Empty,
        }
    }

    fn install(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let new = self.custody.new_ref().ok_or(CommandError::Custody("replacement not held"))?;
        let old = swap_sections(road, &self.replaced, new)?;
        self.custody.hold_old(old);
        Ok(())
    }

    fn restore(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        let road = road_mut(system, &self.road)?;
        let old = self.custody.old_ref().ok_or(CommandError::Custody("replaced state not held"))?;
        let new = swap_sections(road, &self.installed, old)?;
        self.custody.hold_new(new);
        Ok(())
    }
}

/// Split the lane section containing `s` in two at `s`.
///
/// Refused closer than [`MIN_LANESECTION_LENGTH`] (or the configured
/// minimum) to either end of the section. The lanes of both halves link to the lane with the same id
/// across the cut.
#[derive(Debug)]
pub struct SplitLaneSectionCommand {
    info: CommandInfo,
    swap: SectionSwap,
}

impl SplitLaneSectionCommand {
    const TEXT: &'static str = "Split LaneSection";

    pub fn new(system: &RoadSystem, road: &str, s: f64) -> Self {
        Self::with_min_length(system, road, s, MIN_LANESECTION_LENGTH)
    }

    /// Split with a custom minimum length for either half
    pub fn with_min_length(system: &RoadSystem, road: &str, s: f64, min_length: f64) -> Self {
        let rejected = |reason: &str| Self {
            info: CommandInfo::invalid(Self::TEXT, reason),
            swap: SectionSwap::empty(road),
        };
        let Some(r) = system.road(road) else {
            return rejected("road not found");
        };
        let Some(section) = r.lane_section(s) else {
            return rejected("no lane section at this position");
        };
        let start = section.s_start();
        let end = r.lane_section_end(start);
        if s - start < min_length || end - s < min_length {
            return rejected("split too close to the lane section ends");
        }

        let mut low = section.clip(start, s);
        let mut high = section.clip(s, end);
        for lane in low.lanes_mut() {
            let id = lane.id();
            lane.set_successor(Some(id));
        }
        for lane in high.lanes_mut() {
            let id = lane.id();
            lane.set_predecessor(Some(id));
        }
        Self {
            info: CommandInfo::new(Self::TEXT),
            swap: SectionSwap::new(road, vec![start], vec![low, high]),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.swap.install(system)
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.swap.restore(system)
    }
}

/// Merge two consecutive lane sections into one.
///
/// The merged section keeps the lanes of the lower section; width and road
/// mark entries of the upper section are appended to the lanes with the
/// same id.
#[derive(Debug)]
pub struct MergeLaneSectionCommand {
    info: CommandInfo,
    swap: SectionSwap,
}

impl MergeLaneSectionCommand {
    const TEXT: &'static str = "Merge LaneSection";

    pub fn new(system: &RoadSystem, road: &str, low: f64, high: f64) -> Self {
        let merged = system.road(road).and_then(|r| {
            let lower = r.lane_sections().get_exact(low)?;
            let upper = r.lane_sections().get_exact(high)?;
            let consecutive = r
                .lane_sections()
                .get_next(lower.s_start())
                .is_some_and(|next| next.s_start() == upper.s_start());
            consecutive.then(|| LaneSection::merged(lower, upper))
        });
        match merged {
            Some(section) => Self {
                info: CommandInfo::new(Self::TEXT),
                swap: SectionSwap::new(road, vec![low, high], vec![section]),
            },
            None => Self {
                info: CommandInfo::invalid(Self::TEXT, "lane sections are not neighbours"),
                swap: SectionSwap::empty(road),
            },
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.swap.install(system)
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.swap.restore(system)
    }
}

/// Remove the lane section starting at `s`, joining its neighbours.
///
/// The section before it is merged with the section after it; the removed
/// range is covered by the lower neighbour's last entries. Refused for the
/// first and the last lane section.
#[derive(Debug)]
pub struct RemoveLaneSectionCommand {
    info: CommandInfo,
    swap: SectionSwap,
}

impl RemoveLaneSectionCommand {
    const TEXT: &'static str = "Remove LaneSection";

    pub fn new(system: &RoadSystem, road: &str, s: f64) -> Self {
        let rejected = |reason: &str| Self {
            info: CommandInfo::invalid(Self::TEXT, reason),
            swap: SectionSwap::empty(road),
        };
        let Some(r) = system.road(road) else {
            return rejected("road not found");
        };
        let Some(middle) = r.lane_sections().get_exact(s) else {
            return rejected("no lane section at this start");
        };
        let Some(low) = r.lane_section_before(s) else {
            return rejected("no lane section to the left");
        };
        let Some(high) = r.lane_sections().get_next(middle.s_start()) else {
            return rejected("no lane section to the right");
        };
        Self {
            info: CommandInfo::new(Self::TEXT),
            swap: SectionSwap::new(
                road,
                vec![low.s_start(), middle.s_start(), high.s_start()],
                vec![LaneSection::merged(low, high)],
            ),
        }
    }

    fn apply(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.swap.install(system)
    }

    fn revert(&mut self, system: &mut RoadSystem) -> CommandResult<()> {
        self.swap.restore(system)
    }
}

impl_command!(
    SplitLaneSectionCommand,
    MergeLaneSectionCommand,
    RemoveLaneSectionCommand
);
