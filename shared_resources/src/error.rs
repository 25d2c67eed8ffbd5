use thiserror::Error;

/// Rejections produced at the boundary before a request enters shared state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("floor {floor} is outside the served range {lowest}..={highest}")]
    FloorOutOfRange { floor: u8, lowest: u8, highest: u8 },

    #[error("cab call at floor {floor} cannot be shared between elevators")]
    NotAHallCall { floor: u8 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration is missing {section}.{key}")]
    MissingKey { section: &'static str, key: &'static str },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
