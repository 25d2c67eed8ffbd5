use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use elevator::error::UnitError;
use elevator::modules::bank::Bank;
use elevator::utilities::direction::Direction;
use elevator::utilities::elevator_status::Behaviour;
use elevator::utilities::events::{ElevatorEvent, RecordingSink};
use shared_resources::call::Intent;
use shared_resources::config::{BankConfig, TimingConfig};
use shared_resources::request::Request;

fn config(num_elevators: u8) -> BankConfig {
    let mut config = BankConfig::default();
    config.elevator.num_elevators = num_elevators;
    config.timing = TimingConfig::instant();
    config
}

fn wait_for(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn cab_call_is_served_by_its_own_car() {
    let events = Arc::new(RecordingSink::new());
    let bank = Bank::start(&config(2), events.clone()).unwrap();

    bank.submit(Request::cab(6), Some(2)).unwrap();
    wait_for("car 2 to serve floor 6", || {
        bank.snapshot()
            .elevators
            .iter()
            .any(|car| car.id == 2 && car.floor == 6 && car.cab_calls.is_empty() && !car.door_open)
    });

    let car_one = bank.snapshot().elevators.into_iter().find(|car| car.id == 1).unwrap();
    assert_eq!(car_one.floor, 1);
    assert_eq!(events.count(|event| matches!(event, ElevatorEvent::DoorOpened { unit: 2, floor: 6 })), 1);
    bank.shutdown();
}

#[test]
fn every_hall_call_is_serviced_exactly_once() {
    let events = Arc::new(RecordingSink::new());
    let bank = Bank::start(&config(4), events.clone()).unwrap();

    let floors = [3, 17, 9, 12, 20, 5, 14];
    for (i, &floor) in floors.iter().enumerate() {
        let intent = if i % 2 == 0 { Intent::Up } else { Intent::Down };
        bank.submit(Request::hall(floor, intent), None).unwrap();
    }
    wait_for("every floor to be serviced", || {
        events.count(|event| matches!(event, ElevatorEvent::CallServiced { .. })) >= floors.len()
    });
    assert!(bank.registry().snapshot().is_empty());

    for floor in floors {
        let serviced = events.count(|event| matches!(event, ElevatorEvent::CallServiced { floor: f, .. } if *f == floor));
        assert_eq!(serviced, 1, "floor {} serviced {} times", floor, serviced);
    }
    bank.shutdown();
}

#[test]
fn stopped_car_stays_put() {
    let events = Arc::new(RecordingSink::new());
    let bank = Bank::start(&config(1), events.clone()).unwrap();

    bank.submit(Request::cab(20), Some(1)).unwrap();
    wait_for("car to leave the ground floor", || bank.snapshot().elevators[0].floor > 3);
    bank.handle(1).unwrap().alarm();

    let frozen = bank.snapshot().elevators[0].clone();
    assert_eq!(frozen.behaviour, Behaviour::Stopped);
    assert_eq!(frozen.direction, Direction::Idle);
    thread::sleep(Duration::from_millis(50));
    let later = bank.snapshot().elevators[0].clone();
    assert!(later.floor <= frozen.floor + 1);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(bank.snapshot().elevators[0].floor, later.floor);

    assert_eq!(
        bank.submit(Request::cab(2), Some(1)),
        Err(UnitError::Stopped { id: 1 })
    );
    assert_eq!(
        bank.submit(Request::hall(2, Intent::Up), None),
        Err(UnitError::NoRunningUnit)
    );
    assert_eq!(events.count(|event| matches!(event, ElevatorEvent::Alarm { unit: 1 })), 1);
    bank.shutdown();
}

#[test]
fn routing_errors_are_reported() {
    let bank = Bank::start(&config(2), Arc::new(RecordingSink::new())).unwrap();
    assert_eq!(bank.submit(Request::cab(4), Some(9)), Err(UnitError::UnknownUnit { id: 9 }));
    assert!(matches!(
        bank.submit(Request::hall(40, Intent::Up), None),
        Err(UnitError::Request(_))
    ));
    assert!(bank.registry().snapshot().is_empty());
    bank.shutdown();
}

#[test]
fn hall_buttons_follow_the_registry() {
    let mut config = config(1);
    // Slow enough that the call is still outstanding when we look.
    config.timing.travel = Duration::from_secs(5);
    let bank = Bank::start(&config, Arc::new(RecordingSink::new())).unwrap();

    bank.submit(Request::hall(15, Intent::Down), None).unwrap();
    let snapshot = bank.snapshot();
    assert_eq!(snapshot.hall_buttons.len(), 20);
    assert_eq!(snapshot.hall_buttons[14], [false, true]);

    let started = Instant::now();
    bank.shutdown();
    assert!(started.elapsed() < Duration::from_secs(5));
}
