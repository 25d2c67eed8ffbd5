use std::collections::BTreeMap;
use std::time::SystemTime;

use shared_resources::request::Request;

use crate::utilities::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStop {
    pub floor: u8,
    pub created_at: SystemTime,
}

/// Every floor a car currently has a reason to visit: its own cab calls
/// followed by the hall calls from one registry snapshot.
#[derive(Debug, Clone, Default)]
pub struct Requests {
    pending: Vec<PendingStop>,
}

impl Requests {
    pub fn merge(cab_calls: &BTreeMap<u8, SystemTime>, hall_requests: &[Request]) -> Self {
        let cab = cab_calls.iter().map(|(&floor, &created_at)| PendingStop {
            floor: floor,
            created_at: created_at,
        });
        let hall = hall_requests.iter().map(|request| PendingStop {
            floor: request.floor,
            created_at: request.created_at,
        });
        Requests { pending: cab.chain(hall).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn has_request_at(&self, floor: u8) -> bool {
        self.pending.iter().any(|stop| stop.floor == floor)
    }

    pub fn nearest_above(&self, floor: u8) -> Option<u8> {
        self.pending.iter().map(|stop| stop.floor).filter(|&f| f > floor).min()
    }

    pub fn nearest_below(&self, floor: u8) -> Option<u8> {
        self.pending.iter().map(|stop| stop.floor).filter(|&f| f < floor).max()
    }

    fn nearest_in_direction(&self, floor: u8, direction: Direction) -> Option<u8> {
        match direction {
            Direction::Up => self.nearest_above(floor),
            Direction::Down => self.nearest_below(floor),
            Direction::Idle => None,
        }
    }

    /// Oldest pending stop; on equal timestamps the first one merged wins.
    pub fn earliest(&self) -> Option<&PendingStop> {
        self.pending.iter().min_by_key(|stop| stop.created_at)
    }

    /// Picks the next floor to visit and updates the heading.
    ///
    /// A moving car keeps its direction while anything is left ahead of it
    /// and only turns around once that side is exhausted. An idle car first
    /// tries to resume the direction it last travelled in, then heads
    /// towards the oldest request.
    pub fn next_stop(&self, floor: u8, direction: &mut Direction, last_direction: &mut Direction) -> Option<u8> {
        if self.is_empty() {
            if *direction != Direction::Idle {
                *last_direction = *direction;
            }
            *direction = Direction::Idle;
            return None;
        }

        if self.has_request_at(floor) {
            return Some(floor);
        }

        match *direction {
            Direction::Up | Direction::Down => {
                if let Some(target) = self.nearest_in_direction(floor, *direction) {
                    return Some(target);
                }
                let reversed = direction.opposite();
                let target = self.nearest_in_direction(floor, reversed);
                if target.is_some() {
                    *direction = reversed;
                }
                target
            },
            Direction::Idle => {
                if let Some(target) = self.nearest_in_direction(floor, *last_direction) {
                    *direction = *last_direction;
                    return Some(target);
                }
                let earliest = self.earliest()?;
                let heading = Direction::towards(floor, earliest.floor);
                let target = self.nearest_in_direction(floor, heading);
                if target.is_some() {
                    *direction = heading;
                }
                target
            },
        }
    }
}
