use proptest::prelude::*;

use roadkit_editor::commands::{
    InsertLaneCommand, RemoveLaneCommand, SetLaneIdCommand, SetLaneLinkIdCommand,
    SplitLaneSectionCommand,
};
use roadkit_editor::{Command, LaneRef, UndoStack};
use roadkit_model::{ContactPoint, Lane, LaneType, RoadLink};

use crate::common::{lane_ids, road_with_lanes, snapshot, system_of};

#[test]
fn test_insert_lane_shifts_outer_lanes() {
    let mut system = system_of([road_with_lanes("r", 20.0, 2, 1)]);
    let before = snapshot(&system);

    let lane = Lane::with_width(1, LaneType::Shoulder, 1.5);
    let mut cmd = InsertLaneCommand::new(&system, "r", 0.0, lane);
    assert!(cmd.is_valid());
    cmd.redo(&mut system).unwrap();

    assert_eq!(lane_ids(&system, "r", 0.0), vec![-1, 0, 1, 2, 3]);
    let section = system.road("r").unwrap().try_lane_section(0.0).unwrap();
    assert_eq!(section.lane(1).unwrap().lane_type(), LaneType::Shoulder);
    assert_eq!(section.lane(2).unwrap().lane_type(), LaneType::Driving);
    assert!(section.has_contiguous_ids());

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_insert_lane_rejects_gaps_and_center() {
    let system = system_of([road_with_lanes("r", 20.0, 2, 1)]);
    let lane = |id| Lane::with_width(id, LaneType::Driving, 3.0);

    assert!(!InsertLaneCommand::new(&system, "r", 0.0, lane(0)).is_valid());
    assert!(!InsertLaneCommand::new(&system, "r", 0.0, lane(4)).is_valid());
    assert!(!InsertLaneCommand::new(&system, "r", 0.0, lane(-3)).is_valid());
    assert!(!InsertLaneCommand::new(&system, "r", 5.0, lane(1)).is_valid());
    assert!(InsertLaneCommand::new(&system, "r", 0.0, lane(3)).is_valid());
    assert!(InsertLaneCommand::new(&system, "r", 0.0, lane(-2)).is_valid());

    let rejected = InsertLaneCommand::new(&system, "r", 0.0, lane(0));
    assert_eq!(rejected.text(), "Insert Lane (invalid!)");
}

#[test]
fn test_remove_lane_renumbers_and_remaps_neighbour_links() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 3)]);
    let mut history = UndoStack::new();
    assert!(history
        .push(SplitLaneSectionCommand::new(&system, "r", 10.0), &mut system)
        .unwrap());
    let before = snapshot(&system);

    let remove = RemoveLaneCommand::new(&system, &LaneRef::new("r", 10.0, -1));
    assert!(history.push(remove, &mut system).unwrap());
    assert_eq!(lane_ids(&system, "r", 10.0), vec![-2, -1, 0, 1]);

    let first = system.road("r").unwrap().try_lane_section(0.0).unwrap();
    assert_eq!(first.lane(-1).unwrap().successor(), None);
    assert_eq!(first.lane(-2).unwrap().successor(), Some(-1));
    assert_eq!(first.lane(-3).unwrap().successor(), Some(-2));
    assert_eq!(first.lane(1).unwrap().successor(), Some(1));

    history.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_remove_center_lane_rejected() {
    let system = system_of([road_with_lanes("r", 20.0, 1, 1)]);
    assert!(!RemoveLaneCommand::new(&system, &LaneRef::new("r", 0.0, 0)).is_valid());
    assert!(!RemoveLaneCommand::new(&system, &LaneRef::new("r", 0.0, 2)).is_valid());
}

#[test]
fn test_set_lane_id_requires_free_id() {
    let mut system = system_of([road_with_lanes("r", 20.0, 2, 1)]);
    let lane = LaneRef::new("r", 0.0, 2);
    assert!(!SetLaneIdCommand::new(&system, &lane, 1).is_valid());
    assert!(!SetLaneIdCommand::new(&system, &lane, 0).is_valid());

    let mut cmd = SetLaneIdCommand::new(&system, &lane, 5);
    cmd.redo(&mut system).unwrap();
    assert_eq!(lane_ids(&system, "r", 0.0), vec![-1, 0, 1, 5]);
    cmd.undo(&mut system).unwrap();
    assert_eq!(lane_ids(&system, "r", 0.0), vec![-1, 0, 1, 2]);
}

#[test]
fn test_lane_link_on_unlinked_road_end_rejected() {
    let mut system = system_of([road_with_lanes("r", 20.0, 1, 1), road_with_lanes("q", 20.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, -1);
    assert!(!SetLaneLinkIdCommand::successor(&system, &lane, -2).is_valid());
    assert!(!SetLaneLinkIdCommand::predecessor(&system, &lane, 0).is_valid());

    system
        .road_mut("r")
        .unwrap()
        .set_successor(RoadLink::road("q", ContactPoint::Start));
    let mut cmd = SetLaneLinkIdCommand::successor(&system, &lane, -2);
    assert!(cmd.is_valid());
    cmd.redo(&mut system).unwrap();
    assert_eq!(lane.resolve(&system).unwrap().successor(), Some(-2));
    cmd.undo(&mut system).unwrap();
    assert_eq!(lane.resolve(&system).unwrap().successor(), Some(-1));
}

proptest! {
    #[test]
    fn lane_ids_stay_contiguous(ops in prop::collection::vec((any::<bool>(), -4i32..=4), 1..12)) {
        let mut system = system_of([road_with_lanes("r", 30.0, 2, 2)]);
        let initial = snapshot(&system);
        let mut history = UndoStack::new();

        for (insert, id) in ops {
            if insert {
                let lane = Lane::with_width(id, LaneType::Driving, 3.0);
                let cmd = InsertLaneCommand::new(&system, "r", 0.0, lane);
                history.push(cmd, &mut system).unwrap();
            } else {
                let cmd = RemoveLaneCommand::new(&system, &LaneRef::new("r", 0.0, id));
                history.push(cmd, &mut system).unwrap();
            }
            let section = system.road("r").unwrap().try_lane_section(0.0).unwrap();
            prop_assert!(section.has_contiguous_ids());
        }

        while history.can_undo() {
            history.undo(&mut system).unwrap();
        }
        prop_assert_eq!(snapshot(&system), initial);
    }
}

#[test]
fn test_lane_edits_refused_on_gapped_section() {
    let mut system = system_of([road_with_lanes("r", 20.0, 2, 1)]);
    let mut history = UndoStack::new();
    let renumber = SetLaneIdCommand::new(&system, &LaneRef::new("r", 0.0, 2), 3);
    assert!(history.push(renumber, &mut system).unwrap());
    assert_eq!(lane_ids(&system, "r", 0.0), vec![-1, 0, 1, 3]);
    let before = snapshot(&system);

    let insert = InsertLaneCommand::new(&system, "r", 0.0, Lane::with_width(1, LaneType::Driving, 3.0));
    assert!(!insert.is_valid());
    assert!(!history.push(insert, &mut system).unwrap());
    assert!(!RemoveLaneCommand::new(&system, &LaneRef::new("r", 0.0, 1)).is_valid());
    assert_eq!(snapshot(&system), before);
    assert_eq!(history.undo_count(), 1);
}

#[test]
fn test_failed_insert_keeps_section_and_lane() {
    let mut system = system_of([road_with_lanes("r", 20.0, 2, 1)]);
    let mut insert =
        InsertLaneCommand::new(&system, "r", 0.0, Lane::with_width(1, LaneType::Shoulder, 1.0));
    assert!(insert.is_valid());

    let mut renumber = SetLaneIdCommand::new(&system, &LaneRef::new("r", 0.0, 2), 3);
    renumber.redo(&mut system).unwrap();
    let gapped = snapshot(&system);

    assert!(insert.redo(&mut system).is_err());
    assert_eq!(snapshot(&system), gapped);
    assert!(!insert.is_applied());

    renumber.undo(&mut system).unwrap();
    insert.redo(&mut system).unwrap();
    assert_eq!(lane_ids(&system, "r", 0.0), vec![-1, 0, 1, 2, 3]);
    let section = system.road("r").unwrap().try_lane_section(0.0).unwrap();
    assert_eq!(section.lane(1).unwrap().lane_type(), LaneType::Shoulder);
}
