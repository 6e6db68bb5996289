use std::f64::consts::{FRAC_PI_2, PI};

use roadkit_core::{Pose, TrackComponent, DEFAULT_LINK_THRESHOLD};
use roadkit_editor::commands::{RemoveRoadLinkCommand, SetRoadLinkCommand, SetRoadLinkRoadsCommand};
use roadkit_editor::{candidate_pairs, Command, RoadEditor};
use roadkit_model::{
    ContactPoint, ElementType, Junction, LinkType, RoadLink, RoadPrototype, RoadSystem,
};

use crate::common::{road_with_lanes, snapshot, straight, system_of};

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Every road link between two roads has its counterpart
fn assert_links_symmetric(system: &RoadSystem) {
    for road in system.roads() {
        for slot in [LinkType::Predecessor, LinkType::Successor] {
            let Some(link) = road.link(slot).filter(|l| l.is_road()) else {
                continue;
            };
            let other = system.road(&link.element_id).unwrap();
            let back = other.link(LinkType::at_end(link.contact_point)).unwrap();
            assert!(back.targets_road(road.id()));
            assert_eq!(back.contact_point, slot.own_end());
        }
    }
}

#[test]
fn test_link_end_to_start() {
    let mut system = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", 11.0, 0.0, 0.0, 10.0),
    ]);
    let before = snapshot(&system);

    let mut cmd = SetRoadLinkRoadsCommand::new(&system, &ids(&["a", "b"]), DEFAULT_LINK_THRESHOLD);
    assert!(cmd.is_valid());
    assert_eq!(cmd.link_count(), 2);
    cmd.redo(&mut system).unwrap();

    let a = system.road("a").unwrap();
    let b = system.road("b").unwrap();
    assert_eq!(a.successor(), Some(&RoadLink::road("b", ContactPoint::Start)));
    assert_eq!(b.predecessor(), Some(&RoadLink::road("a", ContactPoint::End)));
    assert!(a.predecessor().is_none());
    assert_links_symmetric(&system);

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_link_start_to_start_swaps_lane_sides() {
    let mut system = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", -1.0, 0.0, PI, 10.0),
    ]);
    let mut cmd = SetRoadLinkRoadsCommand::new(&system, &ids(&["a", "b"]), DEFAULT_LINK_THRESHOLD);
    cmd.redo(&mut system).unwrap();

    let a = system.road("a").unwrap();
    assert_eq!(a.predecessor(), Some(&RoadLink::road("b", ContactPoint::Start)));
    assert_links_symmetric(&system);

    let a_lanes = a.try_lane_section(0.0).unwrap();
    assert_eq!(a_lanes.lane(1).unwrap().predecessor(), Some(-1));
    assert_eq!(a_lanes.lane(-1).unwrap().predecessor(), Some(1));
    let b_lanes = system.road("b").unwrap().try_lane_section(0.0).unwrap();
    assert_eq!(b_lanes.lane(-1).unwrap().predecessor(), Some(1));
}

#[test]
fn test_ends_beyond_threshold_are_not_linked() {
    let system = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", 16.0, 0.0, 0.0, 10.0),
    ]);
    assert!(candidate_pairs(&system, &ids(&["a", "b"]), 5.0).is_empty());
    let cmd = SetRoadLinkRoadsCommand::new(&system, &ids(&["a", "b"]), 5.0);
    assert!(!cmd.is_valid());
    assert!(SetRoadLinkRoadsCommand::new(&system, &ids(&["a", "b"]), 7.0).is_valid());
    assert!(!SetRoadLinkRoadsCommand::new(&system, &ids(&["a", "missing"]), 7.0).is_valid());
}

#[test]
fn test_candidates_sorted_by_distance() {
    let system = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", 13.0, 0.0, 0.0, 10.0),
        straight("c", 10.5, 0.0, 0.0, 10.0),
    ]);
    let pairs = candidate_pairs(&system, &ids(&["a", "b", "c"]), DEFAULT_LINK_THRESHOLD);
    assert!(!pairs.is_empty());
    assert!(pairs.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert_eq!((pairs[0].first.as_str(), pairs[0].second.as_str()), ("a", "c"));
}

#[test]
fn test_junction_road_links_through_connection() {
    let mut system = system_of([straight("a", 0.0, 0.0, 0.0, 10.0)]);
    system.add_junction(Junction::new("j", "junction")).unwrap();
    let connecting = RoadPrototype::straight("c", Pose::new(10.5, 0.0, 0.0), 8.0, 1, 1, 3.0)
        .in_junction("j")
        .build()
        .unwrap();
    system.add_road(connecting).unwrap();
    let before = snapshot(&system);

    let mut cmd = SetRoadLinkRoadsCommand::new(&system, &ids(&["a", "c"]), DEFAULT_LINK_THRESHOLD);
    assert_eq!(cmd.connection_count(), 1);
    cmd.redo(&mut system).unwrap();

    let a = system.road("a").unwrap();
    let link = a.successor().unwrap();
    assert_eq!(link.element_type, ElementType::Junction);
    assert_eq!(link.element_id, "j");
    let c = system.road("c").unwrap();
    assert_eq!(c.predecessor(), Some(&RoadLink::road("a", ContactPoint::End)));

    let junction = system.junction("j").unwrap();
    assert_eq!(junction.connections().len(), 1);
    let connection = &junction.connections()[0];
    assert_eq!(connection.incoming_road, "a");
    assert_eq!(connection.connecting_road, "c");
    assert_eq!(connection.contact_point, ContactPoint::Start);
    let lane_links: Vec<(i32, i32)> = connection.lane_links.iter().map(|l| (l.from, l.to)).collect();
    assert_eq!(lane_links, vec![(-1, -1), (0, 0), (1, 1)]);

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_set_and_remove_single_link() {
    let mut system = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", 10.0, 0.0, 0.0, 10.0),
    ]);
    let before = snapshot(&system);

    let link = Some(RoadLink::road("b", ContactPoint::Start));
    let mut set = SetRoadLinkCommand::new(&system, "a", LinkType::Successor, link.clone(), None);
    set.redo(&mut system).unwrap();
    assert_eq!(system.road("a").unwrap().successor(), link.as_ref());
    assert!(!SetRoadLinkCommand::new(&system, "a", LinkType::Successor, link, None).is_valid());

    let mut remove = RemoveRoadLinkCommand::new(&system, "a");
    remove.redo(&mut system).unwrap();
    assert!(system.road("a").unwrap().successor().is_none());
    remove.undo(&mut system).unwrap();
    set.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}

#[test]
fn test_editor_links_all_roads() {
    let system = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", 10.2, 0.0, 0.0, 10.0),
        straight("c", 20.4, 0.0, 0.0, 10.0),
    ]);
    let mut editor = RoadEditor::new(system);
    assert!(editor.link_all_roads().unwrap());
    assert_links_symmetric(editor.system());
    let b = editor.system().road("b").unwrap();
    assert!(b.predecessor().unwrap().targets_road("a"));
    assert!(b.successor().unwrap().targets_road("c"));

    editor.undo().unwrap();
    assert!(editor.system().roads().all(|r| r.predecessor().is_none() && r.successor().is_none()));
}

#[test]
fn test_junction_connection_lanes_swap_for_like_ends() {
    let mut system = system_of([straight("a", 0.0, 0.0, 0.0, 10.0)]);
    system.add_junction(Junction::new("j", "junction")).unwrap();
    let connecting = RoadPrototype::straight("c", Pose::new(18.5, 0.0, PI), 8.0, 1, 1, 3.0)
        .in_junction("j")
        .build()
        .unwrap();
    system.add_road(connecting).unwrap();

    let mut cmd = SetRoadLinkRoadsCommand::new(&system, &ids(&["a", "c"]), DEFAULT_LINK_THRESHOLD);
    cmd.redo(&mut system).unwrap();

    assert_eq!(
        system.road("a").unwrap().successor(),
        Some(&RoadLink::junction("j", ContactPoint::End))
    );
    let connection = &system.junction("j").unwrap().connections()[0];
    assert_eq!(connection.contact_point, ContactPoint::End);
    let lane_links: Vec<(i32, i32)> = connection.lane_links.iter().map(|l| (l.from, l.to)).collect();
    assert_eq!(lane_links, vec![(1, -1), (0, 0), (-1, 1)]);
}

/// Three line tracks forming a closed triangle with 10 m sides
fn triangle_loop(id: &str) -> roadkit_model::Road {
    let mut road = road_with_lanes(id, 10.0, 1, 1);
    let apex = 10.0 * (PI / 3.0).sin();
    road.add_track(TrackComponent::line(10.0, Pose::new(10.0, 0.0, 2.0 * PI / 3.0), 10.0))
        .unwrap();
    road.add_track(TrackComponent::line(20.0, Pose::new(5.0, apex, 4.0 * PI / 3.0), 10.0))
        .unwrap();
    road
}

#[test]
fn test_closed_road_links_to_itself() {
    let mut system = system_of([triangle_loop("loop")]);
    let before = snapshot(&system);

    let pairs = candidate_pairs(&system, &ids(&["loop"]), DEFAULT_LINK_THRESHOLD);
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].is_loop());
    assert_eq!(pairs[0].contacts.first(), ContactPoint::Start);
    assert_eq!(pairs[0].contacts.second(), ContactPoint::End);
    assert!(pairs[0].distance < 1e-6);

    let mut cmd = SetRoadLinkRoadsCommand::new(&system, &ids(&["loop"]), DEFAULT_LINK_THRESHOLD);
    cmd.redo(&mut system).unwrap();
    let road = system.road("loop").unwrap();
    assert_eq!(road.predecessor(), Some(&RoadLink::road("loop", ContactPoint::End)));
    assert_eq!(road.successor(), Some(&RoadLink::road("loop", ContactPoint::Start)));
    let lane = road.try_lane_section(0.0).unwrap().lane(1).unwrap();
    assert_eq!(lane.predecessor(), Some(1));
    assert_eq!(lane.successor(), Some(1));

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);

    let open = system_of([straight("open", 0.0, 0.0, 0.0, 10.0)]);
    assert!(candidate_pairs(&open, &ids(&["open"]), DEFAULT_LINK_THRESHOLD).is_empty());
}

#[test]
fn test_far_pairs_pruned_by_road_lengths() {
    // b runs back towards a; its end lies 4.8 m beyond a's end.
    let reachable = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", 24.8, 0.0, PI, 10.0),
    ]);
    let pairs = candidate_pairs(&reachable, &ids(&["a", "b"]), 5.0);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].contacts.first(), ContactPoint::End);
    assert_eq!(pairs[0].contacts.second(), ContactPoint::End);

    let pruned = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", 25.5, 0.0, PI, 10.0),
    ]);
    assert!(candidate_pairs(&pruned, &ids(&["a", "b"]), 5.0).is_empty());
    assert!(candidate_pairs(&pruned, &ids(&["a", "b"]), 5.6).len() == 1);
}

#[test]
fn test_end_claimed_twice_keeps_farthest_link() {
    let mut system = system_of([
        straight("a", 0.0, 0.0, 0.0, 10.0),
        straight("b", 10.0, 1.0, FRAC_PI_2, 10.0),
        straight("c", 10.0, -2.0, -FRAC_PI_2, 10.0),
    ]);
    let before = snapshot(&system);

    let pairs = candidate_pairs(&system, &ids(&["a", "b", "c"]), 5.0);
    let order: Vec<(&str, &str)> = pairs
        .iter()
        .map(|p| (p.first.as_str(), p.second.as_str()))
        .collect();
    assert_eq!(order, vec![("a", "b"), ("a", "c"), ("b", "c")]);

    let mut cmd = SetRoadLinkRoadsCommand::new(&system, &ids(&["a", "b", "c"]), 5.0);
    assert_eq!(cmd.link_count(), 3);
    cmd.redo(&mut system).unwrap();

    assert_eq!(
        system.road("a").unwrap().successor(),
        Some(&RoadLink::road("c", ContactPoint::Start))
    );
    assert_eq!(
        system.road("b").unwrap().predecessor(),
        Some(&RoadLink::road("c", ContactPoint::Start))
    );
    assert_eq!(
        system.road("c").unwrap().predecessor(),
        Some(&RoadLink::road("b", ContactPoint::Start))
    );

    cmd.undo(&mut system).unwrap();
    assert_eq!(snapshot(&system), before);
}
