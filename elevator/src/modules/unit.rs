/// ----- UNIT MODULE -----
/// One car. The unit owns its floor, heading, door and cab calls and is
/// driven by its own loop; everyone else talks to it through an
/// `ElevatorHandle`. Hall calls live in the shared registry, which every
/// unit polls and from which the unit that serves a floor removes them.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use parking_lot::Mutex;

use shared_resources::config::{ElevatorConfig, TimingConfig};
use shared_resources::request::Request;
use shared_resources::request_registry::RequestRegistry;

use crate::error::UnitError;
use crate::modules::doors::Doors;
use crate::utilities::direction::Direction;
use crate::utilities::elevator_status::{BankStatus, Behaviour, ElevatorStatus};
use crate::utilities::events::{ElevatorEvent, EventSink};
use crate::utilities::requests::Requests;

#[derive(Debug, Clone)]
enum UnitCommand {
    CabCall(Request),
    OpenDoor,
    CloseDoor,
}

/// State shared between a unit and its handles.
struct Control {
    stopped: AtomicBool,
    halt_tx: Mutex<Option<Sender<()>>>,
}

impl Control {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Returns true for the call that actually stopped the unit.
    fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        // Disconnecting the halt channel wakes any dwell in progress.
        self.halt_tx.lock().take();
        true
    }
}

/// Shared environment every unit in a bank is built with.
#[derive(Clone)]
pub struct UnitContext {
    pub floors: ElevatorConfig,
    pub timing: TimingConfig,
    pub registry: Arc<RequestRegistry>,
    pub status: Arc<BankStatus>,
    pub events: Arc<dyn EventSink>,
}

pub struct ElevatorUnit {
    id: u8,
    floors: ElevatorConfig,
    timing: TimingConfig,
    floor: u8,
    direction: Direction,
    last_direction: Direction,
    doors: Doors,
    cab_calls: BTreeMap<u8, SystemTime>,
    was_idle: bool,
    halted: bool,
    registry: Arc<RequestRegistry>,
    status: Arc<BankStatus>,
    events: Arc<dyn EventSink>,
    control: Arc<Control>,
    commands_rx: Receiver<UnitCommand>,
}

/// Control surface for one unit, usable from any thread.
#[derive(Clone)]
pub struct ElevatorHandle {
    id: u8,
    floors: ElevatorConfig,
    registry: Arc<RequestRegistry>,
    status: Arc<BankStatus>,
    events: Arc<dyn EventSink>,
    control: Arc<Control>,
    commands_tx: Sender<UnitCommand>,
}

impl ElevatorUnit {
    /// Builds a unit parked with its door closed at the lowest floor.
    pub fn new(id: u8, context: UnitContext) -> (ElevatorUnit, ElevatorHandle) {
        let (commands_tx, commands_rx) = unbounded();
        let (halt_tx, halt_rx) = unbounded();
        let control = Arc::new(Control {
            stopped: AtomicBool::new(false),
            halt_tx: Mutex::new(Some(halt_tx)),
        });

        let unit = ElevatorUnit {
            id: id,
            floors: context.floors,
            timing: context.timing,
            floor: context.floors.lowest_floor,
            direction: Direction::Idle,
            last_direction: Direction::Idle,
            doors: Doors::new(halt_rx),
            cab_calls: BTreeMap::new(),
            was_idle: false,
            halted: false,
            registry: context.registry.clone(),
            status: context.status.clone(),
            events: context.events.clone(),
            control: control.clone(),
            commands_rx: commands_rx,
        };
        let handle = ElevatorHandle {
            id: id,
            floors: context.floors,
            registry: context.registry,
            status: context.status,
            events: context.events,
            control: control,
            commands_tx: commands_tx,
        };
        unit.publish();
        (unit, handle)
    }

    pub fn door_open(&self) -> bool {
        self.doors.is_open()
    }

    pub fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    /// Ticks the unit on its configured cadence until it is stopped.
    pub fn run(mut self) {
        let timer = tick(self.timing.tick);
        let halt_rx = self.doors.halt_rx();
        tracing::info!(unit = self.id, floor = self.floor, "elevator started");

        loop {
            select! {
                recv(timer) -> _ => self.move_once(),
                recv(halt_rx) -> _ => {
                    self.halt();
                    break;
                },
            }
        }
        tracing::info!(unit = self.id, floor = self.floor, "elevator loop finished");
    }

    /// Same as `ElevatorHandle::add`, for callers that own the unit.
    pub fn add(&mut self, request: Request) -> Result<(), UnitError> {
        if self.is_stopped() {
            return Err(UnitError::Stopped { id: self.id });
        }
        self.floors.check_floor(request.floor)?;
        if request.call.is_hall() {
            self.registry.insert(request)?;
        } else {
            self.add_cab_call(request);
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.control.stop() {
            self.events.record(&ElevatorEvent::Stopped { unit: self.id });
        }
        self.halt();
    }

    /// One scheduling step: pick the next stop, then either serve the
    /// current floor or travel a single floor towards the target.
    pub fn move_once(&mut self) {
        if self.is_stopped() {
            self.halt();
            return;
        }
        self.apply_commands();
        if self.is_stopped() {
            self.halt();
            return;
        }

        let requests = Requests::merge(&self.cab_calls, &self.registry.snapshot());
        // The snapshot may have waited behind writers.
        if self.is_stopped() {
            self.halt();
            return;
        }
        if requests.is_empty() {
            self.go_idle();
            if !self.was_idle {
                self.was_idle = true;
                self.events.record(&ElevatorEvent::Idle { unit: self.id, floor: self.floor });
                self.publish();
            }
            return;
        }
        self.was_idle = false;

        let target = match requests.next_stop(self.floor, &mut self.direction, &mut self.last_direction) {
            Some(target) => target,
            None => {
                self.publish();
                return;
            },
        };

        if target == self.floor {
            self.serve_floor();
        } else {
            self.travel_towards(target);
        }
    }

    fn add_cab_call(&mut self, request: Request) {
        self.cab_calls.entry(request.floor).or_insert(request.created_at);
        self.publish();
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands_rx.try_recv() {
            match command {
                UnitCommand::CabCall(request) => self.add_cab_call(request),
                UnitCommand::OpenDoor => {
                    if !self.doors.is_open() && !self.open_door() {
                        return;
                    }
                },
                UnitCommand::CloseDoor => {
                    if self.doors.is_open() && !self.close_door() {
                        return;
                    }
                },
            }
        }
    }

    fn go_idle(&mut self) {
        if self.direction != Direction::Idle {
            self.last_direction = self.direction;
        }
        self.direction = Direction::Idle;
    }

    /// Door open, cab call dropped and hall calls taken off the registry
    /// while the door is still open, then door closed.
    fn serve_floor(&mut self) {
        if self.is_stopped() {
            return;
        }
        if !self.doors.is_open() && !self.open_door() {
            return;
        }
        self.cab_calls.remove(&self.floor);
        if self.registry.remove(self.floor) {
            self.events.record(&ElevatorEvent::CallServiced { unit: self.id, floor: self.floor });
        }
        self.publish();
        self.close_door();
    }

    fn travel_towards(&mut self, target: u8) {
        if self.doors.is_open() && !self.close_door() {
            return;
        }
        if self.is_stopped() {
            return;
        }
        match Direction::towards(self.floor, target) {
            Direction::Up => self.floor += 1,
            Direction::Down => self.floor -= 1,
            Direction::Idle => return,
        }
        self.events.record(&ElevatorEvent::Moved { unit: self.id, floor: self.floor });
        self.publish();
        self.doors.hold(self.timing.travel);
    }

    fn open_door(&mut self) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.events.record(&ElevatorEvent::DoorOpened { unit: self.id, floor: self.floor });
        self.publish_door(true);
        self.doors.open(self.timing.door_open)
    }

    fn close_door(&mut self) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.events.record(&ElevatorEvent::DoorClosed { unit: self.id, floor: self.floor });
        let closed = self.doors.close(self.timing.door_close);
        self.publish();
        closed
    }

    /// Final bookkeeping once stopped; later calls change nothing.
    fn halt(&mut self) {
        if self.halted {
            return;
        }
        self.halted = true;
        self.go_idle();
        self.publish();
    }

    fn behaviour(&self, door_open: bool) -> Behaviour {
        if self.is_stopped() {
            Behaviour::Stopped
        } else if door_open {
            Behaviour::DoorOpen
        } else if self.direction == Direction::Idle {
            Behaviour::Idle
        } else {
            Behaviour::Moving
        }
    }

    fn publish(&self) {
        self.publish_door(self.doors.is_open());
    }

    fn publish_door(&self, door_open: bool) {
        let direction = if self.is_stopped() { Direction::Idle } else { self.direction };
        self.status.update(ElevatorStatus {
            id: self.id,
            behaviour: self.behaviour(door_open),
            floor: self.floor,
            direction: direction,
            door_open: door_open,
            cab_calls: self.cab_calls.keys().copied().collect(),
        });
    }
}

impl ElevatorHandle {
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    /// Cab calls go to this unit; hall calls go to the shared registry
    /// where any unit may claim them. Duplicates are accepted silently.
    pub fn add(&self, request: Request) -> Result<(), UnitError> {
        self.ensure_running()?;
        self.floors.check_floor(request.floor)?;
        if request.call.is_hall() {
            self.registry.insert(request)?;
            Ok(())
        } else {
            self.send(UnitCommand::CabCall(request))
        }
    }

    pub fn open_door(&self) -> Result<(), UnitError> {
        self.ensure_running()?;
        self.send(UnitCommand::OpenDoor)
    }

    pub fn close_door(&self) -> Result<(), UnitError> {
        self.ensure_running()?;
        self.send(UnitCommand::CloseDoor)
    }

    /// Stops the unit without waiting for it. Idempotent.
    pub fn stop(&self) {
        self.halt();
    }

    /// Emergency stop. The unit never moves again.
    pub fn alarm(&self) {
        if self.halt() {
            self.events.record(&ElevatorEvent::Alarm { unit: self.id });
        }
    }

    fn halt(&self) -> bool {
        if !self.control.stop() {
            return false;
        }
        self.status.mark_stopped(self.id);
        self.events.record(&ElevatorEvent::Stopped { unit: self.id });
        true
    }

    fn ensure_running(&self) -> Result<(), UnitError> {
        if self.control.is_stopped() {
            return Err(UnitError::Stopped { id: self.id });
        }
        Ok(())
    }

    fn send(&self, command: UnitCommand) -> Result<(), UnitError> {
        self.commands_tx.send(command).map_err(|_| UnitError::Stopped { id: self.id })
    }
}
