/// ----- I/O MODULE -----
/// Reads operator commands from stdin, one per line, and forwards them on
/// a channel for the main loop to act on.

use std::io::{self, BufRead};
use std::thread;

use crossbeam_channel::{unbounded, Receiver};
use thiserror::Error;

use shared_resources::call::Intent;
use shared_resources::request::Request;

#[derive(Debug, Clone)]
pub enum BankCommand {
    Submit { request: Request, unit: Option<u8> },
    OpenDoor(u8),
    CloseDoor(u8),
    Stop(u8),
    Alarm(u8),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0}")]
    Unknown(String),
    #[error("{command} expects: {usage}")]
    Usage { command: String, usage: &'static str },
    #[error("{0} is not a number")]
    NotANumber(String),
    #[error("{0}")]
    Intent(String),
}

fn number(word: &str) -> Result<u8, ParseCommandError> {
    word.parse::<u8>().map_err(|_| ParseCommandError::NotANumber(word.to_string()))
}

pub fn parse_command(line: &str) -> Result<BankCommand, ParseCommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let (command, args) = match words.split_first() {
        Some((command, args)) => (command.to_ascii_lowercase(), args),
        None => return Err(ParseCommandError::Empty),
    };
    let usage = |usage: &'static str| ParseCommandError::Usage { command: command.clone(), usage: usage };

    match (command.as_str(), args) {
        ("cab", [unit, floor]) => Ok(BankCommand::Submit {
            request: Request::cab(number(floor)?),
            unit: Some(number(unit)?),
        }),
        ("cab", _) => Err(usage("cab <unit> <floor>")),
        ("hall", [floor, intent]) | ("hall", [floor, intent, _]) => {
            let intent = intent.parse::<Intent>().map_err(ParseCommandError::Intent)?;
            let unit = match args.get(2) {
                Some(unit) => Some(number(unit)?),
                None => None,
            };
            Ok(BankCommand::Submit {
                request: Request::hall(number(floor)?, intent),
                unit: unit,
            })
        },
        ("hall", _) => Err(usage("hall <floor> up|down [unit]")),
        ("open", [unit]) => Ok(BankCommand::OpenDoor(number(unit)?)),
        ("close", [unit]) => Ok(BankCommand::CloseDoor(number(unit)?)),
        ("stop", [unit]) => Ok(BankCommand::Stop(number(unit)?)),
        ("alarm", [unit]) | ("sos", [unit]) => Ok(BankCommand::Alarm(number(unit)?)),
        ("open", _) | ("close", _) | ("stop", _) | ("alarm", _) | ("sos", _) => Err(usage("<unit>")),
        ("quit", []) | ("exit", []) => Ok(BankCommand::Quit),
        _ => Err(ParseCommandError::Unknown(command.clone())),
    }
}

/// Spawns the stdin reader. The channel yields `Quit` when stdin closes.
pub fn init() -> io::Result<Receiver<Result<BankCommand, ParseCommandError>>> {
    let (command_tx, command_rx) = unbounded();
    thread::Builder::new().name("stdin_commands".to_string()).spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            if command_tx.send(parse_command(&line)).is_err() {
                return;
            }
        }
        command_tx.send(Ok(BankCommand::Quit)).ok();
    })?;
    Ok(command_rx)
}
