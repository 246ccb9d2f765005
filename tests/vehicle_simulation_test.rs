//! Vehicle engine: placement, spawn search, stepping and the behavior helper

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use road_traffic::simulation::behaviors::{self, Basic};
use road_traffic::simulation::{
    Point, RoadId, RoadNetwork, SimConfig, SimError, VehicleId, VehicleSimulation,
};

/// Two 100-unit roads feeding into each other
fn two_road_loop() -> RoadNetwork {
    let mut network = RoadNetwork::new();
    let a = network.add_road((0.0, 0.0), (100.0, 0.0), None).unwrap();
    let b = network.add_road((100.0, 0.0), (0.0, 0.0), None).unwrap();
    network.connect(a, b).unwrap();
    network.connect(b, a).unwrap();
    network
}

fn idle() -> Rc<dyn behaviors::Behavior> {
    behaviors::from_fn(|_, _, _| Ok(()))
}

#[test]
fn test_spawn_places_vehicle_as_requested() {
    let mut sim = VehicleSimulation::new(two_road_loop(), &SimConfig::with_seed(1));
    let id = sim.spawn(4.0, RoadId(1), 12.5, idle()).unwrap();

    assert_eq!(id, VehicleId(0));
    let vehicle = sim.vehicle(id).unwrap();
    assert_eq!(vehicle.road_id(), RoadId(1));
    assert_eq!(vehicle.position(), 12.5);
    assert_eq!(vehicle.state.length, 4.0);
    assert!(vehicle.memory().is_empty());

    assert!(matches!(
        sim.spawn(4.0, RoadId(2), 0.0, idle()),
        Err(SimError::RoadNotFound { .. })
    ));
    assert_eq!(sim.len(), 1);
    assert_eq!(
        sim.vehicle(VehicleId(3)).unwrap_err(),
        SimError::VehicleNotFound(VehicleId(3))
    );
}

#[test]
fn test_spawn_search_keeps_vehicles_apart() {
    let min_separation = 5.0;
    for seed in 0..5 {
        let mut sim = VehicleSimulation::new(two_road_loop(), &SimConfig::with_seed(seed));
        for _ in 0..12 {
            sim.spawn_random(5.0, min_separation, idle())
                .expect("plenty of room on 200 units of road");
        }

        let vehicles = sim.vehicles();
        for (i, a) in vehicles.iter().enumerate() {
            for b in &vehicles[i + 1..] {
                if a.road_id() == b.road_id() {
                    assert!(
                        (a.position() - b.position()).abs() > min_separation,
                        "{:?} and {:?} overlap",
                        a.placement,
                        b.placement
                    );
                }
            }
        }
    }
}

#[test]
fn test_spawn_search_positions_stay_on_road() {
    let mut sim = VehicleSimulation::new(two_road_loop(), &SimConfig::with_seed(3));
    for _ in 0..50 {
        let point = sim.find_free_spawn_point(0.0).unwrap();
        assert!(point.road_id == RoadId(0) || point.road_id == RoadId(1));
        assert!((0.0..100.0).contains(&point.position));
    }
}

#[test]
fn test_spawn_search_gives_up_when_saturated() {
    let mut network = RoadNetwork::new();
    network.add_road((0.0, 0.0), (10.0, 0.0), None).unwrap();
    let config = SimConfig {
        max_spawn_attempts: 50,
        ..SimConfig::with_seed(9)
    };
    let mut sim = VehicleSimulation::new(network, &config);

    sim.spawn_random(2.0, 20.0, idle()).expect("empty road has room");
    assert_eq!(
        sim.spawn_random(2.0, 20.0, idle()).unwrap_err(),
        SimError::NoSpawnSpace {
            attempts: 50,
            min_separation: 20.0
        }
    );
    assert_eq!(sim.len(), 1);

    let mut empty = VehicleSimulation::new(RoadNetwork::new(), &config);
    assert_eq!(
        empty.find_free_spawn_point(1.0).unwrap_err(),
        SimError::EmptyNetwork
    );
}

#[test]
fn test_helper_remaining_distance_and_advance() {
    let mut network = RoadNetwork::new();
    network.add_road((0.0, 0.0), (10.0, 0.0), None).unwrap();
    let mut sim = VehicleSimulation::new(network, &SimConfig::with_seed(1));

    let seen_remaining = Rc::new(Cell::new(f32::NAN));
    let behavior = {
        let seen_remaining = Rc::clone(&seen_remaining);
        behaviors::from_fn(move |_, _, helper| {
            seen_remaining.set(helper.remaining_distance_on_road());
            helper.advance(3.0);
            Ok(())
        })
    };
    let id = sim.spawn(2.0, RoadId(0), 7.0, behavior).unwrap();

    let report = sim.step();
    assert!(report.failures.is_empty());
    assert_eq!(seen_remaining.get(), 3.0);
    assert_eq!(sim.vehicle(id).unwrap().position(), 10.0);
}

#[test]
fn test_take_random_next_road_picks_a_successor() {
    let mut network = RoadNetwork::new();
    for i in 0..6 {
        let y = i as f32 * 10.0;
        network.add_road((0.0, y), (50.0, y), None).unwrap();
    }
    network.connect(RoadId(0), RoadId(2)).unwrap();
    network.connect(RoadId(0), RoadId(5)).unwrap();

    let mut sim = VehicleSimulation::new(network, &SimConfig::with_seed(11));
    let behavior = behaviors::from_fn(|_, _, helper| {
        helper.take_random_next_road()?;
        Ok(())
    });
    for i in 0..40 {
        sim.spawn(1.0, RoadId(0), i as f32, Rc::clone(&behavior)).unwrap();
    }

    let report = sim.step();
    assert!(report.failures.is_empty());

    let mut landed = [0; 6];
    for vehicle in sim.vehicles() {
        assert!(vehicle.road_id() == RoadId(2) || vehicle.road_id() == RoadId(5));
        assert_eq!(vehicle.position(), 0.0);
        landed[vehicle.road_id().0] += 1;
    }
    assert!(landed[2] > 0 && landed[5] > 0, "both successors get used: {:?}", landed);
}

#[test]
fn test_dead_end_leaves_vehicle_in_place() {
    let mut network = RoadNetwork::new();
    network.add_road((0.0, 0.0), (10.0, 0.0), None).unwrap();
    let mut sim = VehicleSimulation::new(network, &SimConfig::with_seed(1));
    let id = sim.spawn(1.0, RoadId(0), 9.0, Rc::new(Basic::default())).unwrap();

    let report = sim.step();
    assert_eq!(report.behaviors_run, 1);
    assert_eq!(report.failures, vec![(id, SimError::DeadEnd { road: RoadId(0) })]);

    let vehicle = sim.vehicle(id).unwrap();
    assert_eq!(vehicle.road_id(), RoadId(0));
    assert_eq!(vehicle.position(), 9.0);
}

#[test]
fn test_position_is_not_clamped() {
    let mut sim = VehicleSimulation::new(two_road_loop(), &SimConfig::with_seed(2));
    let behavior = behaviors::from_fn(|_, _, helper| {
        if helper.remaining_distance_on_road() > 3.0 {
            helper.advance(10.0);
        } else {
            helper.take_random_next_road()?;
        }
        Ok(())
    });
    let id = sim.spawn(5.0, RoadId(0), 95.0, behavior).unwrap();

    // Remaining distance 5 > 3, so the vehicle overshoots the road end
    sim.step();
    let vehicle = sim.vehicle(id).unwrap();
    assert_eq!(vehicle.road_id(), RoadId(0));
    assert_eq!(vehicle.position(), 105.0);

    // Now remaining is negative and it turns onto the only successor
    sim.step();
    let vehicle = sim.vehicle(id).unwrap();
    assert_eq!(vehicle.road_id(), RoadId(1));
    assert_eq!(vehicle.position(), 0.0);
    assert_eq!(sim.tick(), 2);
}

#[test]
fn test_step_runs_each_behavior_once_in_spawn_order() {
    let mut sim = VehicleSimulation::new(two_road_loop(), &SimConfig::with_seed(4));
    let calls = Rc::new(RefCell::new(Vec::new()));
    let behavior = {
        let calls = Rc::clone(&calls);
        behaviors::from_fn(move |_, _, helper| {
            calls.borrow_mut().push(helper.remaining_distance_on_road());
            Ok(())
        })
    };
    for position in [10.0, 50.0, 30.0] {
        sim.spawn(1.0, RoadId(0), position, Rc::clone(&behavior)).unwrap();
    }

    let report = sim.step();
    assert_eq!(report.behaviors_run, 3);
    assert_eq!(report.tick, 1);
    assert_eq!(*calls.borrow(), vec![90.0, 50.0, 70.0]);
}

#[test]
fn test_behavior_memory_persists_across_steps() {
    let mut sim = VehicleSimulation::new(two_road_loop(), &SimConfig::with_seed(5));
    let behavior = behaviors::from_fn(|vehicle, memory, _| {
        *memory.entry("steps".to_string()).or_insert(0.0) += 1.0;
        vehicle.speed = 2.5;
        Ok(())
    });
    let a = sim.spawn(1.0, RoadId(0), 0.0, Rc::clone(&behavior)).unwrap();
    let b = sim.spawn(1.0, RoadId(1), 0.0, behavior).unwrap();

    for _ in 0..3 {
        sim.step();
    }

    assert_eq!(sim.vehicle(a).unwrap().memory().get("steps"), Some(&3.0));
    assert_eq!(sim.vehicle(b).unwrap().memory().get("steps"), Some(&3.0));
    assert_eq!(sim.vehicle(a).unwrap().state.speed, 2.5);
}

#[test]
fn test_builtin_behaviors_keep_vehicles_on_the_network() {
    for name in behaviors::BEHAVIOR_NAMES {
        let network = road_traffic::simulation::scenarios::SCENARIOS[1]
            .create_network()
            .unwrap();
        let mut sim = VehicleSimulation::new(network, &SimConfig::with_seed(21));
        for _ in 0..8 {
            sim.spawn_random(5.0, 5.0, behaviors::by_name(name).unwrap())
                .unwrap();
        }

        for _ in 0..500 {
            let report = sim.step();
            assert!(report.failures.is_empty(), "{} failed: {:?}", name, report.failures);
        }
        for vehicle in sim.vehicles() {
            let road = sim.network().road(vehicle.road_id()).unwrap();
            assert!(vehicle.position() >= 0.0 && vehicle.position() <= road.distance + 1e-3);
        }
    }
}

#[test]
fn test_cruise_tracks_distance_in_memory() {
    let mut sim = VehicleSimulation::new(two_road_loop(), &SimConfig::with_seed(6));
    let id = sim
        .spawn(1.0, RoadId(0), 0.0, behaviors::by_name("cruise").unwrap())
        .unwrap();

    for _ in 0..4 {
        sim.step();
    }

    // Default speed limit 1, three times the limit per step
    let vehicle = sim.vehicle(id).unwrap();
    assert_eq!(vehicle.position(), 12.0);
    assert_eq!(vehicle.state.speed, 3.0);
    assert_eq!(vehicle.memory().get("odometer"), Some(&12.0));
}

#[test]
fn test_snapshot_projects_vehicle_points() {
    let mut network = RoadNetwork::new();
    network.add_road((0.0, 0.0), (10.0, 0.0), None).unwrap();
    network.add_road((0.0, 0.0), (0.0, 20.0), None).unwrap();
    let mut sim = VehicleSimulation::new(network, &SimConfig::with_seed(1));
    sim.spawn(4.0, RoadId(0), 5.0, idle()).unwrap();
    sim.spawn(2.0, RoadId(1), 10.0, idle()).unwrap();

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.len(), 2);

    assert_eq!(snapshot[0].center, Point::new(5.0, 0.0));
    assert_eq!(snapshot[0].front, Point::new(7.0, 0.0));
    assert_eq!(snapshot[0].back, Point::new(3.0, 0.0));

    assert_eq!(snapshot[1].road_id, RoadId(1));
    assert_eq!(snapshot[1].center, Point::new(0.0, 10.0));
    assert_eq!(snapshot[1].front, Point::new(0.0, 11.0));
    assert_eq!(snapshot[1].back, Point::new(0.0, 9.0));
}
