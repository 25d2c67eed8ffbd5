//! The dispatcher: every outstanding hall call, shared by all cars.
//!
//! Cars read snapshots on every tick and write when they retire a floor;
//! button presses write when they add a call. All access goes through a
//! [`WriterPriorityLock`] so a steady stream of polling cars can never keep
//! a removal or insertion waiting.

use crate::call::Call;
use crate::config::ElevatorConfig;
use crate::error::RequestError;
use crate::request::Request;
use crate::writer_priority::WriterPriorityLock;

pub struct RequestRegistry {
    floors: ElevatorConfig,
    hall_requests: WriterPriorityLock<Vec<Request>>,
}

impl RequestRegistry {
    pub fn new(floors: ElevatorConfig) -> Self {
        RequestRegistry {
            floors: floors,
            hall_requests: WriterPriorityLock::new(Vec::new()),
        }
    }

    pub fn floors(&self) -> &ElevatorConfig {
        &self.floors
    }

    /// Adds a hall call. Returns `Ok(false)` when the same button at the
    /// same floor is already outstanding.
    pub fn insert(&self, request: Request) -> Result<bool, RequestError> {
        self.floors.check_floor(request.floor)?;
        if !request.call.is_hall() {
            return Err(RequestError::NotAHallCall { floor: request.floor });
        }

        let mut hall_requests = self.hall_requests.write();
        if hall_requests.iter().any(|existing| existing.same_button(&request)) {
            return Ok(false);
        }
        tracing::debug!(floor = request.floor, call = %request.call, "hall call added");
        hall_requests.push(request);
        Ok(true)
    }

    /// Clears both hall buttons at `floor`. Only the caller that actually
    /// removed something sees `true`.
    pub fn remove(&self, floor: u8) -> bool {
        let mut hall_requests = self.hall_requests.write();
        let initial_len = hall_requests.len();
        hall_requests.retain(|request| request.floor != floor);
        let removed = hall_requests.len() < initial_len;
        if removed {
            tracing::debug!(floor = floor, "hall calls cleared");
        }
        removed
    }

    pub fn snapshot(&self) -> Vec<Request> {
        self.hall_requests.read().clone()
    }

    /// `[up, down]` button state per floor, lowest floor first.
    pub fn hall_buttons(&self) -> Vec<[bool; 2]> {
        let mut buttons = vec![[false; Call::num_hall_calls() as usize]; self.floors.num_floors as usize];
        for request in self.hall_requests.read().iter() {
            buttons[self.floors.index(request.floor)][request.call as usize] = true;
        }
        buttons
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::call::Intent;

    fn registry() -> RequestRegistry {
        RequestRegistry::new(ElevatorConfig {
            num_floors: 20,
            lowest_floor: 1,
            num_elevators: 5,
        })
    }

    #[test]
    fn duplicate_hall_call_is_stored_once() {
        let registry = registry();
        assert_eq!(registry.insert(Request::hall(5, Intent::Up)), Ok(true));
        assert_eq!(registry.insert(Request::hall(5, Intent::Up)), Ok(false));
        assert_eq!(registry.insert(Request::hall(5, Intent::Down)), Ok(true));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.iter().filter(|r| r.call == Call::HallUp).count(), 1);
    }

    #[test]
    fn remove_clears_both_directions_once() {
        let registry = registry();
        registry.insert(Request::hall(7, Intent::Up)).unwrap();
        registry.insert(Request::hall(7, Intent::Down)).unwrap();
        registry.insert(Request::hall(3, Intent::Up)).unwrap();

        assert!(registry.remove(7));
        assert!(!registry.remove(7));
        assert_eq!(registry.snapshot().len(), 1);

        registry.insert(Request::hall(7, Intent::Down)).unwrap();
        assert!(registry.remove(7));
    }

    #[test]
    fn rejects_floors_outside_the_building() {
        let registry = registry();
        assert_eq!(
            registry.insert(Request::hall(0, Intent::Up)),
            Err(RequestError::FloorOutOfRange { floor: 0, lowest: 1, highest: 20 })
        );
        assert!(registry.insert(Request::hall(21, Intent::Down)).is_err());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn empty_building_rejects_every_call() {
        let registry = RequestRegistry::new(ElevatorConfig {
            num_floors: 0,
            lowest_floor: 1,
            num_elevators: 1,
        });
        assert!(registry.insert(Request::hall(1, Intent::Up)).is_err());
        assert!(registry.hall_buttons().is_empty());
    }

    #[test]
    fn rejects_cab_calls() {
        let registry = registry();
        assert_eq!(registry.insert(Request::cab(4)), Err(RequestError::NotAHallCall { floor: 4 }));
    }

    #[test]
    fn snapshot_keeps_insertion_order() {
        let registry = registry();
        for floor in [9, 2, 14] {
            registry.insert(Request::hall(floor, Intent::Down)).unwrap();
        }
        let floors: Vec<u8> = registry.snapshot().iter().map(|r| r.floor).collect();
        assert_eq!(floors, vec![9, 2, 14]);
    }

    #[test]
    fn hall_buttons_mirror_outstanding_calls() {
        let registry = registry();
        registry.insert(Request::hall(1, Intent::Up)).unwrap();
        registry.insert(Request::hall(20, Intent::Down)).unwrap();
        let buttons = registry.hall_buttons();
        assert_eq!(buttons.len(), 20);
        assert_eq!(buttons[0], [true, false]);
        assert_eq!(buttons[19], [false, true]);
        assert_eq!(buttons[10], [false, false]);
    }

    #[test]
    fn racing_removals_service_each_floor_once() {
        let registry = Arc::new(registry());
        for floor in 1..=20 {
            registry.insert(Request::hall(floor, Intent::Up)).unwrap();
        }
        let serviced = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (registry, serviced) = (registry.clone(), serviced.clone());
                thread::spawn(move || {
                    for floor in 1..=20 {
                        if registry.remove(floor) {
                            serviced.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(serviced.load(Ordering::SeqCst), 20);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn concurrent_duplicate_inserts_collapse() {
        let registry = Arc::new(registry());
        let inserted = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (registry, inserted) = (registry.clone(), inserted.clone());
                thread::spawn(move || {
                    if registry.insert(Request::hall(12, Intent::Up)).unwrap() {
                        inserted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(inserted.load(Ordering::SeqCst), 1);
        assert_eq!(registry.snapshot().len(), 1);
    }
}
