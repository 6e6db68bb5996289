use std::path::Path;

use anyhow::Context;
use tracing::info;

use roadkit::{init_logging, EditorConfig, Pose, RoadEditor, RoadPrototype, RoadSystem};

/// Builds a short corridor of three straight roads with small gaps between them.
fn corridor() -> anyhow::Result<RoadSystem> {
    let mut system = RoadSystem::new();
    for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
        let x = i as f64 * 30.5;
        let road = RoadPrototype::straight(id, Pose::new(x, 0.0, 0.0), 30.0, 2, 2, 3.5)
            .with_name(format!("corridor {id}"))
            .build()?;
        system.add_road(road)?;
    }
    Ok(system)
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!(
        "RoadKit {} (built {})",
        roadkit::VERSION,
        roadkit::BUILD_DATE
    );

    let config = match std::env::args().nth(1) {
        Some(path) => EditorConfig::load_from_file(Path::new(&path))
            .with_context(|| format!("loading configuration from {path}"))?,
        None => EditorConfig::load_or_default(&EditorConfig::default_path()?)?,
    };

    let mut editor = RoadEditor::with_config(corridor()?, config);
    editor.link_all_roads()?;
    editor.split_lane_section("b", 12.0)?;
    editor.split_track_and_road("c", 15.0)?;
    info!(
        "{} roads, {} undo steps",
        editor.system().road_count(),
        editor.history().undo_count()
    );

    editor.undo()?;
    info!(
        "after undo of \"{}\": {} roads",
        editor.history().redo_text().unwrap_or_default(),
        editor.system().road_count()
    );

    println!("{}", serde_json::to_string_pretty(editor.system())?);
    Ok(())
}
