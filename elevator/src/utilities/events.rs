use parking_lot::Mutex;

/// Discrete things a car reports while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevatorEvent {
    Idle { unit: u8, floor: u8 },
    Moved { unit: u8, floor: u8 },
    DoorOpened { unit: u8, floor: u8 },
    DoorClosed { unit: u8, floor: u8 },
    CallServiced { unit: u8, floor: u8 },
    Alarm { unit: u8 },
    Stopped { unit: u8 },
}

pub trait EventSink: Send + Sync {
    fn record(&self, event: &ElevatorEvent);
}

pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &ElevatorEvent) {
        match *event {
            ElevatorEvent::Idle { unit, floor } => tracing::info!(unit, floor, "idle"),
            ElevatorEvent::Moved { unit, floor } => tracing::info!(unit, floor, "moving"),
            ElevatorEvent::DoorOpened { unit, floor } => tracing::info!(unit, floor, "door opened"),
            ElevatorEvent::DoorClosed { unit, floor } => tracing::info!(unit, floor, "door closed"),
            ElevatorEvent::CallServiced { unit, floor } => tracing::info!(unit, floor, "hall call serviced"),
            ElevatorEvent::Alarm { unit } => tracing::warn!(unit, "alarm, elevator stopped"),
            ElevatorEvent::Stopped { unit } => tracing::info!(unit, "stopped"),
        }
    }
}

/// Keeps every event in memory, for inspecting a run afterwards.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ElevatorEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn events(&self) -> Vec<ElevatorEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&ElevatorEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(*event)).count()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &ElevatorEvent) {
        self.events.lock().push(*event);
    }
}
