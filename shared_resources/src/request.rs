use std::fmt;
use std::time::SystemTime;

use super::call::Call;

/// One service demand. Immutable once created.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct Request {
    pub floor: u8,
    pub call: Call,
    pub created_at: SystemTime,
}

impl Request {
    pub fn new(floor: u8, call: Call) -> Self {
        Request::with_created_at(floor, call, SystemTime::now())
    }

    pub fn with_created_at(floor: u8, call: Call, created_at: SystemTime) -> Self {
        Request {
            floor: floor,
            call: call,
            created_at: created_at,
        }
    }

    pub fn cab(floor: u8) -> Self {
        Request::new(floor, Call::Cab)
    }

    pub fn hall(floor: u8, intent: super::call::Intent) -> Self {
        Request::new(floor, Call::hall(intent))
    }

    /// Two requests are duplicates when they name the same button on the
    /// same floor, regardless of when they were made.
    pub fn same_button(&self, other: &Request) -> bool {
        self.floor == other.floor && self.call == other.call
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at floor {}", self.call, self.floor)
    }
}
