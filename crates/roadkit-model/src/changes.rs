//! Change flags raised by model mutations
//!
//! Observers (renderers, property panels) poll these flags after a command
//! ran and clear them once they have refreshed.

use std::ops::{BitOr, BitOrAssign};

/// A set of change flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Changes(u32);

impl Changes {
    pub const NONE: Changes = Changes(0);
    /// The element's extent along s changed
    pub const LENGTH: Changes = Changes(1 << 0);
    /// The element's start coordinate changed
    pub const START: Changes = Changes(1 << 1);
    pub const ID: Changes = Changes(1 << 2);
    pub const TYPE: Changes = Changes(1 << 3);
    /// Predecessor or successor changed
    pub const LINK: Changes = Changes(1 << 4);
    pub const WIDTH: Changes = Changes(1 << 5);
    pub const ROAD_MARK: Changes = Changes(1 << 6);
    /// Lanes were added, removed or renumbered
    pub const LANES: Changes = Changes(1 << 7);
    pub const PARAMS: Changes = Changes(1 << 8);
    pub const TRACKS: Changes = Changes(1 << 9);
    pub const SECTIONS: Changes = Changes(1 << 10);
    pub const CONNECTIONS: Changes = Changes(1 << 11);

    /// Whether every flag of `other` is set
    pub fn contains(self, other: Changes) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Changes) {
        self.0 |= other.0;
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

impl BitOr for Changes {
    type Output = Changes;

    fn bitor(self, rhs: Changes) -> Changes {
        Changes(self.0 | rhs.0)
    }
}

impl BitOrAssign for Changes {
    fn bitor_assign(&mut self, rhs: Changes) {
        self.0 |= rhs.0;
    }
}
