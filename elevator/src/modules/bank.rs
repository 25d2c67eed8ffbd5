/// ----- BANK MODULE -----
/// Builds the shared registry and one unit per configured car, runs every
/// unit on its own thread and routes requests to them.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use shared_resources::config::BankConfig;
use shared_resources::request::Request;
use shared_resources::request_registry::RequestRegistry;

use crate::error::UnitError;
use crate::modules::unit::{ElevatorHandle, ElevatorUnit, UnitContext};
use crate::utilities::elevator_status::{BankSnapshot, BankStatus};
use crate::utilities::events::EventSink;

pub struct Bank {
    registry: Arc<RequestRegistry>,
    status: Arc<BankStatus>,
    handles: Vec<ElevatorHandle>,
    threads: Vec<JoinHandle<()>>,
}

impl Bank {
    /// Starts units numbered from 1.
    pub fn start(config: &BankConfig, events: Arc<dyn EventSink>) -> std::io::Result<Self> {
        let registry = Arc::new(RequestRegistry::new(config.elevator));
        let status = Arc::new(BankStatus::new());
        let context = UnitContext {
            floors: config.elevator,
            timing: config.timing,
            registry: registry.clone(),
            status: status.clone(),
            events: events,
        };

        let mut handles = Vec::new();
        let mut threads = Vec::new();
        for id in 1..=config.elevator.num_elevators {
            let (unit, handle) = ElevatorUnit::new(id, context.clone());
            let spawned = thread::Builder::new()
                .name(format!("elevator_{}", id))
                .spawn(move || unit.run());
            match spawned {
                Ok(thread) => {
                    handles.push(handle);
                    threads.push(thread);
                },
                Err(err) => {
                    tracing::error!(unit = id, error = %err, "could not start elevator thread");
                    stop_all(&handles, threads);
                    return Err(err);
                },
            }
        }

        Ok(Bank {
            registry: registry,
            status: status,
            handles: handles,
            threads: threads,
        })
    }

    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    pub fn handle(&self, id: u8) -> Result<&ElevatorHandle, UnitError> {
        self.handles
            .iter()
            .find(|handle| handle.id() == id)
            .ok_or(UnitError::UnknownUnit { id: id })
    }

    /// Hands `request` to `unit`, or for hall calls without a unit, to the
    /// first unit still running.
    pub fn submit(&self, request: Request, unit: Option<u8>) -> Result<(), UnitError> {
        match unit {
            Some(id) => self.handle(id)?.add(request),
            None => self
                .handles
                .iter()
                .find(|handle| !handle.is_stopped())
                .ok_or(UnitError::NoRunningUnit)?
                .add(request),
        }
    }

    pub fn snapshot(&self) -> BankSnapshot {
        BankSnapshot {
            elevators: self.status.snapshot(),
            hall_buttons: self.registry.hall_buttons(),
        }
    }

    /// Stops every unit and waits for their loops to finish.
    pub fn shutdown(self) {
        stop_all(&self.handles, self.threads);
    }
}

fn stop_all(handles: &[ElevatorHandle], threads: Vec<JoinHandle<()>>) {
    for handle in handles {
        handle.stop();
    }
    for thread in threads {
        if thread.join().is_err() {
            tracing::error!("elevator thread panicked");
        }
    }
}
