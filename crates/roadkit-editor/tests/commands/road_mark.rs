use roadkit_editor::commands::{
    RoadMarkProperty, RoadMarkRef, SetRoadMarkPropertyCommand, SetRoadMarkSOffsetCommand,
};
use roadkit_editor::{Command, LaneRef, UndoStack};
use roadkit_model::{LaneRoadMark, RoadMarkColor, RoadMarkType, RoadMarkWeight};

use crate::common::{road_with_lanes, snapshot, system_of};

#[test]
fn test_set_property_on_several_marks() {
    let mut system = system_of([road_with_lanes("r", 20.0, 1, 1)]);
    let before = snapshot(&system);
    let marks = vec![
        RoadMarkRef::new(LaneRef::new("r", 0.0, 1), 0.0),
        RoadMarkRef::new(LaneRef::new("r", 0.0, -1), 0.0),
    ];

    let mut cmd = SetRoadMarkPropertyCommand::new(
        &system,
        marks.clone(),
        RoadMarkProperty::Color(RoadMarkColor::Yellow),
    );
    cmd.redo(&mut system).unwrap();
    for mark in &marks {
        let lane = mark.lane.resolve(&system).unwrap();
        assert_eq!(lane.road_mark(0.0).unwrap().color, RoadMarkColor::Yellow);
    }
    assert!(!SetRoadMarkPropertyCommand::new(
        &system,
        marks.clone(),
        RoadMarkProperty::Color(RoadMarkColor::Yellow)
    )
    .is_valid());

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_set_property_rejections() {
    let system = system_of([road_with_lanes("r", 20.0, 1, 1)]);
    let mark = RoadMarkRef::new(LaneRef::new("r", 0.0, 1), 0.0);
    let missing = RoadMarkRef::new(LaneRef::new("r", 0.0, 1), 4.0);

    let width = RoadMarkProperty::Width(-0.1);
    assert!(!SetRoadMarkPropertyCommand::new(&system, vec![mark.clone()], width).is_valid());
    let bold = RoadMarkProperty::Weight(RoadMarkWeight::Bold);
    assert!(!SetRoadMarkPropertyCommand::new(&system, vec![missing], bold).is_valid());
    assert!(!SetRoadMarkPropertyCommand::new(&system, Vec::new(), bold).is_valid());
    assert!(SetRoadMarkPropertyCommand::new(&system, vec![mark], bold).is_valid());
}

#[test]
fn test_drag_road_mark_between_neighbours() {
    let mut system = system_of([road_with_lanes("r", 20.0, 1, 1)]);
    let lane = LaneRef::new("r", 0.0, 1);
    {
        let lane = lane.resolve_mut(&mut system).unwrap();
        lane.add_road_mark(LaneRoadMark::new(8.0, RoadMarkType::Solid)).unwrap();
        lane.add_road_mark(LaneRoadMark::new(15.0, RoadMarkType::Broken)).unwrap();
    }
    let before = snapshot(&system);
    let mut history = UndoStack::new();

    let mark = RoadMarkRef::new(lane.clone(), 8.0);
    assert!(!SetRoadMarkSOffsetCommand::new(&system, &mark, 15.0).is_valid());
    assert!(!SetRoadMarkSOffsetCommand::new(&system, &mark, 0.0).is_valid());
    assert!(!SetRoadMarkSOffsetCommand::new(&system, &mark, 8.0).is_valid());

    for (from, to) in [(8.0, 9.0), (9.0, 10.0), (10.0, 12.0)] {
        let mark = RoadMarkRef::new(lane.clone(), from);
        assert!(history
            .push(SetRoadMarkSOffsetCommand::new(&system, &mark, to), &mut system)
            .unwrap());
    }
    assert_eq!(history.undo_count(), 1);
    let moved = lane.resolve(&system).unwrap();
    assert_eq!(moved.road_mark(12.0).unwrap().mark_type, RoadMarkType::Solid);
    assert_eq!(moved.road_mark(12.0).unwrap().s_offset, 12.0);
    assert!(moved.road_mark(8.0).is_none());

    history.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}
