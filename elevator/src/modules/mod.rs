use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{select, tick};
use tracing_subscriber::EnvFilter;

use shared_resources::config::{BankConfig, LoggingConfig};

use crate::error::UnitError;
use crate::utilities::debug::Debug;
use crate::utilities::events::TracingSink;

pub mod bank;
pub mod doors;
pub mod io;
pub mod unit;

use bank::Bank;
use io::BankCommand;

const REDRAW_PERIOD: Duration = Duration::from_millis(250);

/// The terminal belongs to the status view, so events go to a file.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file)
        .with_context(|| format!("opening log file {}", logging.file))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

fn execute(bank: &Bank, command: BankCommand) -> Result<(), UnitError> {
    match command {
        BankCommand::Submit { request, unit } => bank.submit(request, unit),
        BankCommand::OpenDoor(id) => bank.handle(id)?.open_door(),
        BankCommand::CloseDoor(id) => bank.handle(id)?.close_door(),
        BankCommand::Stop(id) => {
            bank.handle(id)?.stop();
            Ok(())
        },
        BankCommand::Alarm(id) => {
            bank.handle(id)?.alarm();
            Ok(())
        },
        BankCommand::Quit => Ok(()),
    }
}

pub fn run() -> anyhow::Result<()> {
    // READ CONFIGURATION
    let config = BankConfig::get().context("reading configuration")?;
    init_logging(&config.logging)?;
    tracing::info!(
        elevators = config.elevator.num_elevators,
        floors = config.elevator.num_floors,
        "starting elevator bank"
    );

    // INITIALIZE ELEVATORS
    let bank = Bank::start(&config, Arc::new(TracingSink))?;

    // INITIALIZE INPUTS MODULE
    let command_rx = io::init()?;

    let mut debug = Debug::new(config.elevator);
    let redraw = tick(REDRAW_PERIOD);

    loop {
        select! {
            recv(command_rx) -> msg => {
                match msg {
                    Ok(Ok(BankCommand::Quit)) | Err(_) => break,
                    Ok(Ok(command)) => {
                        if let Err(err) = execute(&bank, command) {
                            debug.set_message(err.to_string());
                        }
                    },
                    Ok(Err(err)) => debug.set_message(err.to_string()),
                }
            },
            recv(redraw) -> _ => {
                debug.printstatus(&bank.snapshot())?;
            },
        }
    }

    println!("STOPPING PROGRAM...");
    tracing::info!("shutting down elevator bank");
    bank.shutdown();
    Ok(())
}
