use nalgebra::Vector2;

use roadkit_core::Cubic;
use roadkit_editor::commands::{
    InsertLaneWidthCommand, LaneWidthMovePointsCommand, SetLaneWidthCommand, WidthRef,
};
use roadkit_editor::{Command, LaneRef, UndoStack};
use roadkit_model::{LaneWidth, RoadSystem};

use crate::common::{close, road_with_lanes, snapshot, system_of};

fn width_at(system: &RoadSystem, lane: &LaneRef, ds: f64) -> f64 {
    lane.resolve(system).unwrap().width(ds)
}

#[test]
fn test_set_width_at_entry_end() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, 1);
    let before = snapshot(&system);

    let mut cmd = SetLaneWidthCommand::new(&system, vec![WidthRef::end(lane.clone(), 0.0)], 4.5, true);
    cmd.redo(&mut system).unwrap();
    assert!(close(width_at(&system, &lane, 0.0), 3.0));
    assert!(close(width_at(&system, &lane, 15.0), 3.75));
    assert!(close(width_at(&system, &lane, 30.0), 4.5));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_relative_width_adds_to_current_value() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, -1);

    let points = vec![WidthRef::start(lane.clone(), 0.0), WidthRef::end(lane.clone(), 0.0)];
    let mut cmd = SetLaneWidthCommand::new(&system, points, 0.5, false);
    cmd.redo(&mut system).unwrap();
    assert!(close(width_at(&system, &lane, 0.0), 3.5));
    assert!(close(width_at(&system, &lane, 30.0), 3.5));

    let shrink = vec![WidthRef::start(lane.clone(), 0.0)];
    let mut cmd = SetLaneWidthCommand::new(&system, shrink, -10.0, false);
    cmd.redo(&mut system).unwrap();
    assert!(close(width_at(&system, &lane, 0.0), 0.0));
}

#[test]
fn test_set_width_rejections() {
    let system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, 1);
    let point = || vec![WidthRef::end(lane.clone(), 0.0)];

    assert!(!SetLaneWidthCommand::new(&system, Vec::new(), 3.0, true).is_valid());
    assert!(!SetLaneWidthCommand::new(&system, point(), -1.0, true).is_valid());
    assert!(!SetLaneWidthCommand::new(&system, point(), 0.0, false).is_valid());
    let missing = vec![WidthRef::end(lane.clone(), 7.0)];
    assert!(!SetLaneWidthCommand::new(&system, missing, 3.0, true).is_valid());
}

#[test]
fn test_consecutive_width_edits_merge() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, 1);
    let point = || vec![WidthRef::end(lane.clone(), 0.0)];
    let before = snapshot(&system);
    let mut history = UndoStack::new();

    for step in [0.25, 0.25, 0.5] {
        let cmd = SetLaneWidthCommand::new(&system, point(), step, false);
        assert!(history.push(cmd, &mut system).unwrap());
    }
    assert_eq!(history.undo_count(), 1);
    assert!(close(width_at(&system, &lane, 30.0), 4.0));

    let cmd = SetLaneWidthCommand::new(&system, point(), 2.0, true);
    history.push(cmd, &mut system).unwrap();
    assert_eq!(history.undo_count(), 1);
    assert!(close(width_at(&system, &lane, 30.0), 2.0));

    history.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_move_width_point_along_s() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, 1);
    let mut history = UndoStack::new();
    let insert = InsertLaneWidthCommand::new(&system, &lane, LaneWidth::new(10.0, Cubic::constant(3.0)));
    assert!(history.push(insert, &mut system).unwrap());
    let before = snapshot(&system);

    let mut cmd = LaneWidthMovePointsCommand::new(
        &system,
        vec![WidthRef::start(lane.clone(), 10.0)],
        Vector2::new(2.0, 0.5),
    );
    assert!(cmd.is_valid());
    assert!(!cmd.is_width_only());
    cmd.redo(&mut system).unwrap();

    let moved = lane.resolve(&system).unwrap();
    assert!(moved.width_entry(12.0).is_some());
    assert!(moved.width_entry(10.0).is_none());
    assert!(close(moved.width(12.0), 3.5));
    assert!(close(moved.width(30.0), 3.0));
    assert!(close(moved.width(11.0), 3.0));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_width_point_on_section_start_only_changes_width() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, 1);

    let mut cmd = LaneWidthMovePointsCommand::new(
        &system,
        vec![WidthRef::start(lane.clone(), 0.0)],
        Vector2::new(3.0, 1.0),
    );
    assert!(cmd.is_width_only());
    cmd.redo(&mut system).unwrap();
    let moved = lane.resolve(&system).unwrap();
    assert!(moved.width_entry(0.0).is_some());
    assert!(close(moved.width(0.0), 4.0));
    assert!(close(moved.width(30.0), 3.0));
}

#[test]
fn test_width_drag_merges() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, -1);
    let mut history = UndoStack::new();
    let insert = InsertLaneWidthCommand::new(&system, &lane, LaneWidth::new(10.0, Cubic::constant(3.0)));
    history.push(insert, &mut system).unwrap();
    let before = snapshot(&system);

    let first = LaneWidthMovePointsCommand::new(
        &system,
        vec![WidthRef::start(lane.clone(), 10.0)],
        Vector2::new(1.0, 0.0),
    );
    history.push(first, &mut system).unwrap();
    let second = LaneWidthMovePointsCommand::new(
        &system,
        vec![WidthRef::start(lane.clone(), 11.0)],
        Vector2::new(1.0, 0.25),
    );
    history.push(second, &mut system).unwrap();

    assert_eq!(history.undo_count(), 2);
    let moved = lane.resolve(&system).unwrap();
    assert!(moved.width_entry(12.0).is_some());
    assert!(close(moved.width(12.0), 3.25));

    history.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_clamped_relative_edit_does_not_merge() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, 1);
    let point = || vec![WidthRef::end(lane.clone(), 0.0)];
    let mut history = UndoStack::new();

    let shrink = SetLaneWidthCommand::new(&system, point(), -4.0, false);
    history.push(shrink, &mut system).unwrap();
    assert!(close(width_at(&system, &lane, 30.0), 0.0));

    let grow = SetLaneWidthCommand::new(&system, point(), 2.0, false);
    history.push(grow, &mut system).unwrap();
    assert_eq!(history.undo_count(), 2);
    let live = snapshot(&system);
    assert!(close(width_at(&system, &lane, 30.0), 2.0));

    history.undo(&mut system).unwrap();
    assert!(close(width_at(&system, &lane, 30.0), 0.0));
    history.redo(&mut system).unwrap();
    assert_eq!(snapshot(&system), live);

    let absolute = SetLaneWidthCommand::new(&system, point(), 3.5, true);
    history.push(absolute, &mut system).unwrap();
    assert_eq!(history.undo_count(), 2);
    assert!(close(width_at(&system, &lane, 30.0), 3.5));
}
