/// ----- DOORS MODULE -----
/// Keeps track of whether the door is open and holds the car in place for
/// the door and travel times. Every hold ends early once the car is halted.

use std::time::Duration;

use crossbeam_channel::{select, Receiver};

pub struct Doors {
    open: bool,
    halt_rx: Receiver<()>,
}

impl Doors {
    pub fn new(halt_rx: Receiver<()>) -> Self {
        Doors {
            open: false,
            halt_rx: halt_rx,
        }
    }

    pub fn halt_rx(&self) -> Receiver<()> {
        self.halt_rx.clone()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens the door and waits for people to get on and off.
    /// Returns false if the wait was cut short by a halt.
    pub fn open(&mut self, dwell: Duration) -> bool {
        self.open = true;
        self.hold(dwell)
    }

    /// The door only counts as closed once the whole closing time has passed.
    pub fn close(&mut self, dwell: Duration) -> bool {
        if !self.hold(dwell) {
            return false;
        }
        self.open = false;
        true
    }

    pub fn hold(&self, duration: Duration) -> bool {
        select! {
            recv(self.halt_rx) -> _ => false,
            default(duration) => true,
        }
    }
}
