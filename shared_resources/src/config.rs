use std::fs;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::error::{ConfigError, RequestError};

const CONFIG_PATH: &str = "config.json";
const FALLBACK_CONFIG_PATH: &str = "_config.json";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct ConfigFile {
    pub elevator: HashMap<String, u8>,
    pub timing: HashMap<String, u64>,
    #[serde(default)]
    pub logging: HashMap<String, String>,
}

/// Floors served by the bank and how many cars serve them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorConfig {
    pub num_floors: u8,
    pub lowest_floor: u8,
    pub num_elevators: u8,
}

impl ElevatorConfig {
    /// Saturates for configurations `BankConfig::validate` would reject.
    pub fn highest_floor(&self) -> u8 {
        self.lowest_floor.saturating_add(self.num_floors.saturating_sub(1))
    }

    pub fn contains(&self, floor: u8) -> bool {
        self.num_floors > 0 && floor >= self.lowest_floor && floor <= self.highest_floor()
    }

    pub fn check_floor(&self, floor: u8) -> Result<(), RequestError> {
        if self.contains(floor) {
            Ok(())
        } else {
            Err(RequestError::FloorOutOfRange {
                floor: floor,
                lowest: self.lowest_floor,
                highest: self.highest_floor(),
            })
        }
    }

    pub fn floors(&self) -> impl DoubleEndedIterator<Item = u8> {
        let lowest = self.lowest_floor;
        (0..self.num_floors).filter_map(move |offset| lowest.checked_add(offset))
    }

    /// Row index of `floor` in per-floor tables.
    pub fn index(&self, floor: u8) -> usize {
        (floor - self.lowest_floor) as usize
    }
}

/// How long each physical action holds a car in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub tick: Duration,
    pub door_open: Duration,
    pub door_close: Duration,
    pub travel: Duration,
}

impl TimingConfig {
    /// No dwell at all, used to drive cars tick by tick.
    pub fn instant() -> Self {
        TimingConfig {
            tick: Duration::from_millis(1),
            door_open: Duration::ZERO,
            door_close: Duration::ZERO,
            travel: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub file: String,
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankConfig {
    pub elevator: ElevatorConfig,
    pub timing: TimingConfig,
    pub logging: LoggingConfig,
}

impl Default for BankConfig {
    fn default() -> Self {
        BankConfig {
            elevator: ElevatorConfig {
                num_floors: 20,
                lowest_floor: 1,
                num_elevators: 5,
            },
            timing: TimingConfig {
                tick: Duration::from_millis(500),
                door_open: Duration::from_millis(1200),
                door_close: Duration::from_millis(1200),
                travel: Duration::from_millis(1000),
            },
            logging: LoggingConfig {
                file: String::from("elevator_log.txt"),
                filter: String::from("info"),
            },
        }
    }
}

fn read_config_file(file_path: Option<&str>) -> Result<ConfigFile, ConfigError> {
    let config_contents = match file_path {
        Some(path) => fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source: source,
        })?,
        None => match fs::read_to_string(CONFIG_PATH) {
            Ok(content) => content,
            Err(_) => {
                tracing::info!("No configuration file provided, using default settings...");
                fs::read_to_string(FALLBACK_CONFIG_PATH).map_err(|source| ConfigError::Io {
                    path: FALLBACK_CONFIG_PATH.to_string(),
                    source: source,
                })?
            },
        },
    };
    Ok(serde_json::from_str(&config_contents)?)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct EnvArgs {
    config_path: Option<String>,
    num_elevators: Option<u8>,
}

fn parse_env_args(args: &[String]) -> EnvArgs {
    let mut parsed = EnvArgs::default();

    for arg_pair in args.chunks_exact(2) {
        match arg_pair[0].as_str() {
            "--config" => {
                parsed.config_path = Some(arg_pair[1].clone());
            },
            "--elevators" => {
                parsed.num_elevators = match arg_pair[1].parse::<u8>() {
                    Ok(num) => Some(num),
                    Err(_) => {
                        tracing::warn!("elevators {} is not a number, skipping...", arg_pair[1]);
                        parsed.num_elevators
                    },
                };
            },
            _ => tracing::warn!("illegal argument {}, skipping...", arg_pair[0]),
        }
    }
    parsed
}

fn lookup<T: Copy>(
    map: &HashMap<String, T>,
    section: &'static str,
    key: &'static str,
) -> Result<T, ConfigError> {
    map.get(key).copied().ok_or(ConfigError::MissingKey { section: section, key: key })
}

impl BankConfig {
    /// Reads the configuration file named on the command line (or the
    /// default files) and applies command line overrides.
    pub fn get() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().skip(1).collect();
        let env_args = parse_env_args(&args);
        let config_file = read_config_file(env_args.config_path.as_deref())?;
        let mut config = BankConfig::from_file(config_file)?;
        if let Some(num_elevators) = env_args.num_elevators {
            config.elevator.num_elevators = num_elevators;
            config.validate()?;
        }
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        BankConfig::from_file(serde_json::from_str(contents)?)
    }

    pub fn from_file(config_file: ConfigFile) -> Result<Self, ConfigError> {
        let defaults = BankConfig::default();
        let millis = |key: &'static str| lookup(&config_file.timing, "timing", key).map(Duration::from_millis);

        let config = BankConfig {
            elevator: ElevatorConfig {
                num_floors: lookup(&config_file.elevator, "elevator", "num_floors")?,
                lowest_floor: lookup(&config_file.elevator, "elevator", "lowest_floor")?,
                num_elevators: lookup(&config_file.elevator, "elevator", "num_elevators")?,
            },
            timing: TimingConfig {
                tick: millis("tick_ms")?,
                door_open: millis("door_open_ms")?,
                door_close: millis("door_close_ms")?,
                travel: millis("travel_ms")?,
            },
            logging: LoggingConfig {
                file: config_file.logging.get("file").cloned().unwrap_or(defaults.logging.file),
                filter: config_file.logging.get("filter").cloned().unwrap_or(defaults.logging.filter),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.elevator.num_floors == 0 {
            return Err(ConfigError::Invalid(String::from("num_floors must be at least 1")));
        }
        if self.elevator.lowest_floor.checked_add(self.elevator.num_floors - 1).is_none() {
            return Err(ConfigError::Invalid(format!(
                "{} floors starting at {} do not fit in a floor number",
                self.elevator.num_floors, self.elevator.lowest_floor
            )));
        }
        if self.elevator.num_elevators == 0 {
            return Err(ConfigError::Invalid(String::from("num_elevators must be at least 1")));
        }
        if self.timing.tick.is_zero() {
            return Err(ConfigError::Invalid(String::from("tick_ms must be positive")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "elevator": { "num_floors": 10, "lowest_floor": 0, "num_elevators": 3 },
        "timing": { "tick_ms": 250, "door_open_ms": 1000, "door_close_ms": 800, "travel_ms": 500 },
        "logging": { "file": "bank.log" }
    }"#;

    #[test]
    fn parses_sample_file() {
        let config = BankConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.elevator.num_floors, 10);
        assert_eq!(config.elevator.highest_floor(), 9);
        assert_eq!(config.timing.door_close, Duration::from_millis(800));
        assert_eq!(config.logging.file, "bank.log");
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn missing_key_is_reported() {
        let err = BankConfig::from_json(r#"{ "elevator": {}, "timing": {} }"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { section: "elevator", key: "num_floors" }));
    }

    #[test]
    fn rejects_floor_range_overflow() {
        let json = SAMPLE.replace("\"lowest_floor\": 0", "\"lowest_floor\": 250");
        assert!(matches!(BankConfig::from_json(&json), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn floor_range_checks() {
        let elevator = BankConfig::default().elevator;
        assert!(elevator.contains(1));
        assert!(elevator.contains(20));
        assert!(!elevator.contains(0));
        assert_eq!(
            elevator.check_floor(21),
            Err(RequestError::FloorOutOfRange { floor: 21, lowest: 1, highest: 20 })
        );
        assert_eq!(elevator.index(20), 19);
    }

    #[test]
    fn empty_floor_range_contains_nothing() {
        let elevator = ElevatorConfig {
            num_floors: 0,
            lowest_floor: 1,
            num_elevators: 1,
        };
        assert_eq!(elevator.highest_floor(), 1);
        assert!(!elevator.contains(1));
        assert_eq!(elevator.floors().count(), 0);
        assert!(elevator.check_floor(1).is_err());
    }

    #[test]
    fn env_args_are_read_pairwise() {
        let args: Vec<String> = ["--config", "bank.json", "--elevators", "x", "--elevators", "3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let parsed = parse_env_args(&args);
        assert_eq!(parsed.config_path.as_deref(), Some("bank.json"));
        assert_eq!(parsed.num_elevators, Some(3));
    }
}
