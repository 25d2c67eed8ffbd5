use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::utilities::direction::Direction;

#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub enum Behaviour {
    Idle,
    Moving,
    DoorOpen,
    Stopped,
}

impl Behaviour {
    pub fn as_string(&self) -> String {
        match self {
            Behaviour::Idle => String::from("idle"),
            Behaviour::Moving => String::from("moving"),
            Behaviour::DoorOpen => String::from("doorOpen"),
            Behaviour::Stopped => String::from("stopped"),
        }
    }
}

/// What the outside world may see of one car.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ElevatorStatus {
    pub id: u8,
    pub behaviour: Behaviour,
    pub floor: u8,
    pub direction: Direction,
    pub door_open: bool,
    pub cab_calls: Vec<u8>,
}

impl ElevatorStatus {
    pub fn new(id: u8, floor: u8) -> Self {
        ElevatorStatus {
            id: id,
            behaviour: Behaviour::Idle,
            floor: floor,
            direction: Direction::Idle,
            door_open: false,
            cab_calls: Vec::new(),
        }
    }
}

/// Read-only copy of every car's state, published by the cars themselves.
#[derive(Debug, Default)]
pub struct BankStatus {
    elevators: RwLock<BTreeMap<u8, ElevatorStatus>>,
}

impl BankStatus {
    pub fn new() -> Self {
        BankStatus::default()
    }

    pub fn update(&self, status: ElevatorStatus) {
        self.elevators.write().insert(status.id, status);
    }

    pub fn mark_stopped(&self, id: u8) {
        if let Some(status) = self.elevators.write().get_mut(&id) {
            status.behaviour = Behaviour::Stopped;
            status.direction = Direction::Idle;
        }
    }

    pub fn get(&self, id: u8) -> Option<ElevatorStatus> {
        self.elevators.read().get(&id).cloned()
    }

    pub fn snapshot(&self) -> Vec<ElevatorStatus> {
        self.elevators.read().values().cloned().collect()
    }
}

/// Everything a front end needs for one frame.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct BankSnapshot {
    pub elevators: Vec<ElevatorStatus>,
    /// `[up, down]` per floor, lowest floor first.
    pub hall_buttons: Vec<[bool; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_stopped_forces_idle_direction() {
        let status = BankStatus::new();
        let mut car = ElevatorStatus::new(2, 5);
        car.direction = Direction::Up;
        car.behaviour = Behaviour::Moving;
        status.update(car);

        status.mark_stopped(2);
        let car = status.get(2).unwrap();
        assert_eq!(car.behaviour, Behaviour::Stopped);
        assert_eq!(car.direction, Direction::Idle);
        assert_eq!(car.floor, 5);
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let status = BankStatus::new();
        for id in [3, 1, 2] {
            status.update(ElevatorStatus::new(id, 1));
        }
        let ids: Vec<u8> = status.snapshot().iter().map(|car| car.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
