use roadkit_editor::commands::{
    MergeLaneSectionCommand, RemoveLaneSectionCommand, SplitLaneSectionCommand,
};
use roadkit_editor::{Command, UndoStack};

use crate::common::{close, lane_section_starts, road_with_lanes, snapshot, system_of};

#[test]
fn test_split_lane_section() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 2)]);
    let before = snapshot(&system);

    let mut cmd = SplitLaneSectionCommand::new(&system, "r", 12.0);
    assert!(cmd.is_valid());
    cmd.redo(&mut system).unwrap();
    assert_eq!(lane_section_starts(&system, "r"), vec![0.0, 12.0]);

    let road = system.road("r").unwrap();
    let low = road.try_lane_section(0.0).unwrap();
    let high = road.try_lane_section(12.0).unwrap();
    assert_eq!(low.lane_ids(), high.lane_ids());
    assert_eq!(low.lane(-2).unwrap().successor(), Some(-2));
    assert_eq!(high.lane(-2).unwrap().predecessor(), Some(-2));
    assert!(close(high.lane_width(-1, 12.0), 3.0));
    assert!(close(road.lane_section_end(12.0), 30.0));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_split_near_section_ends_rejected() {
    let system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    assert!(!SplitLaneSectionCommand::new(&system, "r", 0.5).is_valid());
    assert!(!SplitLaneSectionCommand::new(&system, "r", 29.5).is_valid());
    assert!(!SplitLaneSectionCommand::new(&system, "missing", 10.0).is_valid());
    assert!(SplitLaneSectionCommand::new(&system, "r", 1.5).is_valid());
}

#[test]
fn test_merge_lane_sections() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let mut history = UndoStack::new();
    history
        .push(SplitLaneSectionCommand::new(&system, "r", 12.0), &mut system)
        .unwrap();
    let split = snapshot(&system);

    assert!(!MergeLaneSectionCommand::new(&system, "r", 12.0, 0.0).is_valid());
    let merge = MergeLaneSectionCommand::new(&system, "r", 0.0, 12.0);
    assert!(history.push(merge, &mut system).unwrap());
    assert_eq!(lane_section_starts(&system, "r"), vec![0.0]);
    let merged = system.road("r").unwrap().try_lane_section(0.0).unwrap();
    assert!(close(merged.lane_width(1, 20.0), 3.0));

    history.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), split);
}

#[test]
fn test_remove_lane_section_joins_neighbours() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let mut history = UndoStack::new();
    history
        .push(SplitLaneSectionCommand::new(&system, "r", 10.0), &mut system)
        .unwrap();
    history
        .push(SplitLaneSectionCommand::new(&system, "r", 20.0), &mut system)
        .unwrap();
    let before = snapshot(&system);

    assert!(!RemoveLaneSectionCommand::new(&system, "r", 0.0).is_valid());
    assert!(!RemoveLaneSectionCommand::new(&system, "r", 20.0).is_valid());
    assert!(!RemoveLaneSectionCommand::new(&system, "r", 15.0).is_valid());

    let remove = RemoveLaneSectionCommand::new(&system, "r", 10.0);
    assert!(history.push(remove, &mut system).unwrap());
    assert_eq!(lane_section_starts(&system, "r"), vec![0.0]);

    history.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
    assert_eq!(lane_section_starts(&system, "r"), vec![0.0, 10.0, 20.0]);
}
