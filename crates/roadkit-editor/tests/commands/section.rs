use roadkit_core::Cubic;
use roadkit_editor::commands::{DeleteSectionCommand, InsertSectionCommand, MoveSectionCommand};
use roadkit_editor::{Command, UndoStack};
use roadkit_model::{
    AnySection, ElevationSection, RoadSystem, RoadType, SectionKind, TypeSection,
};

use crate::common::{road_with_lanes, snapshot, system_of};

fn town(s: f64) -> AnySection {
    AnySection::Type(TypeSection::new(s, RoadType::Town))
}

fn type_starts(system: &RoadSystem) -> Vec<f64> {
    system.road("r").unwrap().type_sections().starts().collect()
}

#[test]
fn test_insert_section_shortens_containing_section() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let before = snapshot(&system);

    let mut cmd = InsertSectionCommand::new(&system, "r", town(10.0));
    assert!(cmd.is_valid());
    cmd.redo(&mut system).unwrap();

    assert_eq!(type_starts(&system), vec![0.0, 10.0]);
    let road = system.road("r").unwrap();
    assert_eq!(road.section_end(SectionKind::Type, 0.0), 10.0);
    assert_eq!(road.section_end(SectionKind::Type, 10.0), 30.0);

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_insert_section_rejections() {
    let system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    assert!(!InsertSectionCommand::new(&system, "r", town(0.0)).is_valid());
    assert!(!InsertSectionCommand::new(&system, "r", town(30.0)).is_valid());
    assert!(!InsertSectionCommand::new(&system, "r", town(-1.0)).is_valid());
    assert!(!InsertSectionCommand::new(&system, "missing", town(5.0)).is_valid());
}

#[test]
fn test_delete_section() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    InsertSectionCommand::new(&system, "r", town(10.0))
        .redo(&mut system)
        .unwrap();
    let before = snapshot(&system);

    assert!(!DeleteSectionCommand::new(&system, "r", SectionKind::Type, 0.0).is_valid());
    assert!(!DeleteSectionCommand::new(&system, "r", SectionKind::Type, 5.0).is_valid());

    let mut cmd = DeleteSectionCommand::new(&system, "r", SectionKind::Type, 10.0);
    cmd.redo(&mut system).unwrap();
    assert_eq!(type_starts(&system), vec![0.0]);
    assert_eq!(
        system.road("r").unwrap().section_end(SectionKind::Type, 0.0),
        30.0
    );

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_delete_only_section() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let mut cmd = DeleteSectionCommand::new(&system, "r", SectionKind::Elevation, 0.0);
    assert!(cmd.is_valid());
    cmd.redo(&mut system).unwrap();
    assert_eq!(system.road("r").unwrap().section_count(SectionKind::Elevation), 0);

    let late = AnySection::Elevation(ElevationSection::new(12.0, Cubic::constant(2.0)));
    assert!(!InsertSectionCommand::new(&system, "r", late).is_valid());

    let root = AnySection::Elevation(ElevationSection::new(0.0, Cubic::constant(2.0)));
    let mut insert = InsertSectionCommand::new(&system, "r", root);
    assert!(insert.is_valid());
    insert.redo(&mut system).unwrap();
    let starts: Vec<f64> = system.road("r").unwrap().elevation_sections().starts().collect();
    assert_eq!(starts, vec![0.0]);
}

#[test]
fn test_move_section_between_neighbours() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    for s in [10.0, 20.0] {
        InsertSectionCommand::new(&system, "r", town(s))
            .redo(&mut system)
            .unwrap();
    }
    let before = snapshot(&system);

    assert!(!MoveSectionCommand::new(&system, "r", SectionKind::Type, 10.0, 20.0).is_valid());
    assert!(!MoveSectionCommand::new(&system, "r", SectionKind::Type, 10.0, 0.0).is_valid());
    assert!(!MoveSectionCommand::new(&system, "r", SectionKind::Type, 0.0, 5.0).is_valid());
    assert!(!MoveSectionCommand::new(&system, "r", SectionKind::Type, 10.0, 10.0).is_valid());

    let mut cmd = MoveSectionCommand::new(&system, "r", SectionKind::Type, 10.0, 15.0);
    cmd.redo(&mut system).unwrap();
    assert_eq!(type_starts(&system), vec![0.0, 15.0, 20.0]);

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_section_drag_merges() {
    let mut system = system_of([road_with_lanes("r", 30.0, 1, 1)]);
    let mut history = UndoStack::new();
    history
        .push(InsertSectionCommand::new(&system, "r", town(10.0)), &mut system)
        .unwrap();
    let before = snapshot(&system);

    for (old, new) in [(10.0, 12.0), (12.0, 14.0), (14.0, 16.0)] {
        let cmd = MoveSectionCommand::new(&system, "r", SectionKind::Type, old, new);
        assert!(history.push(cmd, &mut system).unwrap());
    }
    assert_eq!(history.undo_count(), 2);
    assert_eq!(type_starts(&system), vec![0.0, 16.0]);

    history.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}
