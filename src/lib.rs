//! # RoadKit
//!
//! Editing core for OpenDRIVE road networks:
//! - s-indexed section containers for road type, elevation,
//!   superelevation, crossfall and lane sections
//! - lanes with width polynomials, road marks and lane links
//! - reversible edit commands with an undo stack
//! - road link inference between nearby road ends
//!
//! ## Architecture
//!
//! RoadKit is organized as a workspace with multiple crates:
//!
//! 1. **roadkit-core** - Constants, errors, s-keyed maps, polynomials, track geometry
//! 2. **roadkit-model** - Roads, sections, lanes, links, junctions, the road system
//! 3. **roadkit-editor** - Commands, undo stack, link inference, editing session
//! 4. **roadkit-settings** - Editor configuration
//! 5. **roadkit** - Re-exports, logging setup and the demo binary

pub use roadkit_core::{
    Cubic, Pose, RoadError, RoadResult, SMap, TrackComponent, TrackGeometry,
    DEFAULT_LINK_THRESHOLD, MIN_LANESECTION_LENGTH, MIN_SPLIT_MARGIN, NUMERICAL_ZERO6,
    NUMERICAL_ZERO8,
};

pub use roadkit_model::{
    AnySection, ContactPoint, ElementType, Fiddleyard, Junction, JunctionConnection, Lane,
    LaneSection, LaneType, LaneWidth, LinkType, Road, RoadLink, RoadPrototype, RoadSection,
    RoadSystem, SectionContainer, SectionKind,
};

pub use roadkit_editor::{
    commands, Command, CommandError, CommandResult, EditCommand, LaneRef, RoadEditor, UndoStack,
};

pub use roadkit_settings::{EditorConfig, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Console output with target, thread and line information. The filter is
/// read from `RUST_LOG` and defaults to INFO.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
