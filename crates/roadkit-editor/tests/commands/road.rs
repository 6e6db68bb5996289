use nalgebra::{Point2, Vector2};

use roadkit_core::{Pose, MIN_SPLIT_MARGIN};
use roadkit_editor::commands::{
    split_track_road, AppendRoadPrototypeCommand, ChangeSectionPrototypeCommand,
    InsertSectionCommand, MergeRoadsCommand, MoveRoadCommand, NewRoadCommand, RemoveRoadCommand,
    RemoveTrackCommand, RotateRoadCommand, SnapRoadsCommand, SplitRoadCommand,
    SplitTrackComponentCommand,
};
use roadkit_editor::{Command, ContactMask, UndoStack};
use roadkit_model::{
    AnySection, ContactPoint, ElementType, Fiddleyard, Junction, JunctionConnection, RoadLink,
    RoadPrototype, RoadType, SectionKind, TypeSection,
};

use crate::common::{
    close, lane_ids, road_with_lanes, snapshot, straight, system_of, two_track_road,
};

#[test]
fn test_new_and_remove_road() {
    let mut system = system_of([road_with_lanes("a", 10.0, 1, 1)]);
    assert!(!NewRoadCommand::new(&system, road_with_lanes("a", 5.0, 1, 1)).is_valid());

    let mut new = NewRoadCommand::new(&system, road_with_lanes("b", 5.0, 1, 1));
    new.redo(&mut system).unwrap();
    assert_eq!(system.road_count(), 2);
    new.undo(&mut system).unwrap();
    assert!(system.road("b").is_none());

    let mut remove = RemoveRoadCommand::new(&system, "a");
    remove.redo(&mut system).unwrap();
    assert_eq!(system.road_count(), 0);
    remove.undo(&mut system).unwrap();
    assert!(system.road("a").is_some());
    assert!(!RemoveRoadCommand::new(&system, "missing").is_valid());
}

#[test]
fn test_split_road_redirects_neighbours() {
    let mut r = two_track_road("r", 20.0, 10.0);
    r.set_predecessor(RoadLink::road("p", ContactPoint::End));
    r.set_successor(RoadLink::road("s", ContactPoint::Start));
    let mut p = straight("p", -10.0, 0.0, 0.0, 10.0);
    p.set_successor(RoadLink::road("r", ContactPoint::Start));
    let mut s = straight("s", 30.0, 0.0, 0.0, 10.0);
    s.set_predecessor(RoadLink::road("r", ContactPoint::End));
    let mut system = system_of([p, r, s]);
    let before = snapshot(&system);

    let mut cmd = SplitRoadCommand::new(&system, "r", 19.0);
    assert!(cmd.is_valid());
    let (first, second) = {
        let (a, b) = cmd.halves();
        (a.to_string(), b.to_string())
    };
    cmd.redo(&mut system).unwrap();

    assert!(system.road("r").is_none());
    let a = system.road(&first).unwrap();
    let b = system.road(&second).unwrap();
    assert!(close(a.length(), 20.0));
    assert!(close(b.length(), 10.0));
    assert!(a.predecessor().unwrap().targets_road("p"));
    assert_eq!(a.successor(), Some(&RoadLink::road(second.clone(), ContactPoint::Start)));
    assert_eq!(b.predecessor(), Some(&RoadLink::road(first.clone(), ContactPoint::End)));
    assert!(b.successor().unwrap().targets_road("s"));
    assert!(system.road("p").unwrap().successor().unwrap().targets_road(&first));
    assert!(system.road("s").unwrap().predecessor().unwrap().targets_road(&second));

    let end = b.global_point(b.length(), 0.0).unwrap();
    assert!(close(end.x, 30.0) && close(end.y, 0.0));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_split_road_redirects_junction_and_fiddleyard() {
    let mut r = two_track_road("r", 20.0, 10.0);
    r.set_predecessor(RoadLink::junction("j", ContactPoint::End));
    r.set_successor(RoadLink::new(ElementType::Fiddleyard, "f", ContactPoint::Start));
    let mut c = straight("c", -10.0, 0.0, 0.0, 10.0);
    c.set_successor(RoadLink::road("r", ContactPoint::Start));
    let mut system = system_of([r, c]);

    let mut junction = Junction::new("j", "crossing");
    junction.add_connection(JunctionConnection::new("jc0", "r", "c", ContactPoint::End));
    junction.add_connection(JunctionConnection::new("jc1", "x", "y", ContactPoint::Start));
    system.add_junction(junction).unwrap();
    system
        .add_fiddleyard(Fiddleyard::new("f", "yard", "r", ContactPoint::End))
        .unwrap();
    let before = snapshot(&system);

    let mut cmd = SplitRoadCommand::new(&system, "r", 20.0);
    let (first, second) = {
        let (a, b) = cmd.halves();
        (a.to_string(), b.to_string())
    };
    cmd.redo(&mut system).unwrap();

    let junction = system.junction("j").unwrap();
    assert_eq!(junction.connection("jc0").unwrap().incoming_road, first);
    assert_eq!(junction.connection("jc1").unwrap().incoming_road, "x");
    assert_eq!(
        system.road("c").unwrap().successor(),
        Some(&RoadLink::road(first.clone(), ContactPoint::Start))
    );
    assert_eq!(system.fiddleyard("f").unwrap().element_id, second);
    assert_eq!(
        system.road(&first).unwrap().predecessor(),
        Some(&RoadLink::junction("j", ContactPoint::End))
    );
    assert_eq!(system.road(&second).unwrap().successor().unwrap().element_id, "f");

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_split_road_rejected_near_ends() {
    let system = system_of([two_track_road("r", 20.0, 10.0)]);
    assert!(!SplitRoadCommand::new(&system, "r", 0.3).is_valid());
    assert!(!SplitRoadCommand::new(&system, "r", 29.8).is_valid());
    assert!(!SplitRoadCommand::new(&system, "r", 3.0).is_valid());
    assert!(!SplitRoadCommand::new(&system, "r", 27.0).is_valid());
    assert!(SplitRoadCommand::with_margin(&system, "r", 21.0, 0.1).is_valid());
}

#[test]
fn test_split_self_loop_links_halves() {
    let mut r = two_track_road("r", 20.0, 10.0);
    r.set_predecessor(RoadLink::road("r", ContactPoint::End));
    r.set_successor(RoadLink::road("r", ContactPoint::Start));
    let mut system = system_of([r]);

    let mut cmd = SplitRoadCommand::new(&system, "r", 20.0);
    let (first, second) = {
        let (a, b) = cmd.halves();
        (a.to_string(), b.to_string())
    };
    cmd.redo(&mut system).unwrap();
    let a = system.road(&first).unwrap();
    let b = system.road(&second).unwrap();
    assert_eq!(a.predecessor(), Some(&RoadLink::road(second.clone(), ContactPoint::End)));
    assert_eq!(b.successor(), Some(&RoadLink::road(first.clone(), ContactPoint::Start)));
}

#[test]
fn test_split_track_and_road() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let before = snapshot(&system);

    let mut cmd = split_track_road(&system, "r", 12.0, MIN_SPLIT_MARGIN);
    assert!(cmd.is_valid());
    assert_eq!(cmd.children().len(), 2);
    cmd.redo(&mut system).unwrap();

    assert_eq!(system.road_count(), 2);
    let mut lengths: Vec<f64> = system.roads().map(|r| r.length()).collect();
    lengths.sort_by(f64::total_cmp);
    assert!(close(lengths[0], 12.0) && close(lengths[1], 18.0));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_split_track_component() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let before = snapshot(&system);

    let mut cmd = SplitTrackComponentCommand::new(&system, "r", 10.0);
    cmd.redo(&mut system).unwrap();
    assert_eq!(system.road("r").unwrap().track_starts(), vec![0.0, 10.0]);
    assert!(close(system.road("r").unwrap().length(), 30.0));
    assert!(!SplitTrackComponentCommand::new(&system, "r", 10.0).is_valid());

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_merge_roads() {
    let a = straight("a", 0.0, 0.0, 0.0, 10.0);
    let b = straight("b", 50.0, 20.0, 1.0, 20.0);
    let mut system = system_of([a, b]);
    let before = snapshot(&system);

    assert!(!MergeRoadsCommand::new(&system, "a", "a", false).is_valid());
    let mut cmd = MergeRoadsCommand::new(&system, "a", "b", false);
    cmd.redo(&mut system).unwrap();

    assert!(system.road("b").is_none());
    let merged = system.road("a").unwrap();
    assert!(close(merged.length(), 30.0));
    let end = merged.global_point(30.0, 0.0).unwrap();
    assert!((end.x - 30.0).abs() < 1e-6 && end.y.abs() < 1e-6);
    assert_eq!(merged.lane_sections().len(), 2);

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_move_road_merges_consecutive_moves() {
    let mut system = system_of([straight("a", 3.0, 4.0, 0.0, 10.0)]);
    let before = snapshot(&system);
    let mut history = UndoStack::new();
    let roads = vec!["a".to_string()];

    for _ in 0..3 {
        let cmd = MoveRoadCommand::new(&system, roads.clone(), Vector2::new(1.0, -1.0));
        history.push(cmd, &mut system).unwrap();
    }
    assert_eq!(history.undo_count(), 1);
    let start = system.road("a").unwrap().global_point(0.0, 0.0).unwrap();
    assert!(close(start.x, 6.0) && close(start.y, 1.0));

    assert!(!MoveRoadCommand::new(&system, roads.clone(), Vector2::zeros()).is_valid());
    history.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_rotate_road_around_pivot() {
    let mut system = system_of([straight("a", 10.0, 0.0, 0.0, 10.0)]);
    let before = snapshot(&system);
    let roads = vec!["a".to_string()];

    let mut cmd = RotateRoadCommand::new(
        &system,
        roads,
        Point2::origin(),
        std::f64::consts::FRAC_PI_2,
    );
    cmd.redo(&mut system).unwrap();
    let start = system.road("a").unwrap().global_point(0.0, 0.0).unwrap();
    assert!(start.x.abs() < 1e-9 && close(start.y, 10.0));
    assert!(close(
        system.road("a").unwrap().global_heading(0.0).unwrap(),
        std::f64::consts::FRAC_PI_2
    ));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_append_prototype_at_end() {
    let mut system = system_of([straight("a", 0.0, 0.0, 0.0, 10.0)]);
    let before = snapshot(&system);
    let prototype = RoadPrototype::straight("proto", Pose::new(0.0, 0.0, 0.0), 5.0, 2, 2, 3.5)
        .build()
        .unwrap();

    let mut cmd = AppendRoadPrototypeCommand::new(&system, "a", &prototype, false);
    cmd.redo(&mut system).unwrap();
    let road = system.road("a").unwrap();
    assert!(close(road.length(), 15.0));
    assert_eq!(road.lane_sections().len(), 2);
    assert_eq!(lane_ids(&system, "a", 10.0), vec![-2, -1, 0, 1, 2]);

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_change_section_prototype() {
    let mut system = system_of([road_with_lanes("a", 20.0, 1, 1)]);
    let before = snapshot(&system);
    let prototype = RoadPrototype::straight("proto", Pose::new(0.0, 0.0, 0.0), 20.0, 3, 2, 3.5)
        .build()
        .unwrap();

    let mut cmd = ChangeSectionPrototypeCommand::new(&system, "a", &prototype, SectionKind::Lane);
    cmd.redo(&mut system).unwrap();
    assert_eq!(lane_ids(&system, "a", 0.0), vec![-2, -1, 0, 1, 2, 3]);
    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);

    let bare = roadkit_model::Road::new("bare", "bare");
    assert!(!ChangeSectionPrototypeCommand::new(&system, "a", &bare, SectionKind::Lane).is_valid());
}

#[test]
fn test_snap_like_ends_moves_second_road() {
    let a = straight("a", 0.0, 0.0, 0.0, 10.0);
    let b = straight("b", 40.0, 30.0, 1.0, 10.0);
    let mut system = system_of([a, b]);
    let before = snapshot(&system);

    let ends = ContactMask::new(ContactPoint::End, ContactPoint::End);
    let mut cmd = SnapRoadsCommand::new(&system, "a", "b", ends);
    assert_eq!(cmd.text(), "Snap");
    cmd.redo(&mut system).unwrap();

    assert_eq!(system.road_count(), 2);
    let b = system.road("b").unwrap();
    let end = b.global_point(b.length(), 0.0).unwrap();
    let start = b.global_point(0.0, 0.0).unwrap();
    assert!((end.x - 10.0).abs() < 1e-6 && end.y.abs() < 1e-6);
    assert!((start.x - 20.0).abs() < 1e-6 && start.y.abs() < 1e-6);
    assert!((b.global_heading(0.0).unwrap().cos() + 1.0).abs() < 1e-9);
    let a_start = system.road("a").unwrap().global_point(0.0, 0.0).unwrap();
    assert!(close(a_start.x, 0.0) && close(a_start.y, 0.0));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);

    let starts = ContactMask::new(ContactPoint::Start, ContactPoint::Start);
    SnapRoadsCommand::new(&system, "a", "b", starts)
        .redo(&mut system)
        .unwrap();
    let b = system.road("b").unwrap();
    let end = b.global_point(b.length(), 0.0).unwrap();
    assert!((end.x + 10.0).abs() < 1e-6 && end.y.abs() < 1e-6);
}

#[test]
fn test_snap_unlike_ends_joins_roads() {
    let a = straight("a", 0.0, 0.0, 0.0, 10.0);
    let b = straight("b", 40.0, 30.0, 1.0, 10.0);
    let mut system = system_of([a, b]);
    let before = snapshot(&system);

    let contacts = ContactMask::new(ContactPoint::Start, ContactPoint::End);
    assert!(!SnapRoadsCommand::new(&system, "a", "a", contacts).is_valid());
    assert!(!SnapRoadsCommand::new(&system, "a", "missing", contacts).is_valid());

    let mut cmd = SnapRoadsCommand::new(&system, "a", "b", contacts);
    cmd.redo(&mut system).unwrap();

    assert!(system.road("b").is_none());
    let joined = system.road("a").unwrap();
    assert!(close(joined.length(), 20.0));
    let start = joined.global_point(0.0, 0.0).unwrap();
    assert!((start.x + 10.0).abs() < 1e-6 && start.y.abs() < 1e-6);
    assert_eq!(joined.lane_sections().len(), 2);

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
    cmd.redo(&mut system).unwrap();
    assert_eq!(system.road_count(), 1);
}

fn town(s: f64) -> AnySection {
    AnySection::Type(TypeSection::new(s, RoadType::Town))
}

#[test]
fn test_remove_track_at_end() {
    let mut system = system_of([two_track_road("r", 20.0, 10.0)]);
    InsertSectionCommand::new(&system, "r", town(25.0))
        .redo(&mut system)
        .unwrap();
    system
        .road_mut("r")
        .unwrap()
        .set_successor(RoadLink::road("s", ContactPoint::Start));
    let before = snapshot(&system);

    assert!(!RemoveTrackCommand::new(&system, "r", 0.0, false).is_valid());
    assert!(!RemoveTrackCommand::new(&system, "r", 20.0, true).is_valid());

    let mut cmd = RemoveTrackCommand::new(&system, "r", 20.0, false);
    assert!(cmd.is_valid());
    cmd.redo(&mut system).unwrap();

    let road = system.road("r").unwrap();
    assert_eq!(road.track_starts(), vec![0.0]);
    assert!(close(road.length(), 20.0));
    assert_eq!(road.type_sections().starts().collect::<Vec<_>>(), vec![0.0]);
    assert!(road.successor().unwrap().targets_road("s"));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_remove_track_at_start_rebases_road() {
    let mut system = system_of([two_track_road("r", 20.0, 10.0)]);
    InsertSectionCommand::new(&system, "r", town(25.0))
        .redo(&mut system)
        .unwrap();
    let before = snapshot(&system);

    let mut cmd = RemoveTrackCommand::new(&system, "r", 0.0, true);
    cmd.redo(&mut system).unwrap();

    let road = system.road("r").unwrap();
    assert_eq!(road.track_starts(), vec![0.0]);
    assert!(close(road.length(), 10.0));
    assert_eq!(road.type_sections().starts().collect::<Vec<_>>(), vec![0.0, 5.0]);
    assert_eq!(road.lane_sections().starts().collect::<Vec<_>>(), vec![0.0]);
    let start = road.global_point(0.0, 0.0).unwrap();
    assert!(close(start.x, 20.0) && close(start.y, 0.0));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);

    let single = system_of([straight("one", 0.0, 0.0, 0.0, 10.0)]);
    assert!(!RemoveTrackCommand::new(&single, "one", 0.0, true).is_valid());
}
