use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong before the first month is simulated. Once a configuration passed
/// validation, the simulation itself cannot fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config file at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_path_to_error::Error<serde_yaml::Error>,
    },
    #[error("invalid value '{value}' for override '{key}'")]
    InvalidOverride { key: String, value: String },
    #[error("invalid KEY=VALUE: no `=` found in `{0}`")]
    MalformedOverride(String),
    #[error("'{key}' must not be negative, but was {value}")]
    NegativeValue { key: &'static str, value: f64 },
    #[error("'{key}' must be greater than zero, but was {value}")]
    NonPositiveValue { key: &'static str, value: f64 },
    #[error("config module '{key}' must be of type {expected}")]
    ModuleType { key: String, expected: &'static str },
    #[error("a simulation needs to run for at least one month")]
    NoMonths,
    #[error("the population has no agents")]
    EmptyPopulation,
    #[error("the inertia table must be sorted by months and contain probabilities within [0, 1]")]
    InvalidInertiaPolicy,
    #[error("missing setting: {0}")]
    MissingSetting(String),
    #[error("failed to write output to {path:?}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize config")]
    Serialize(#[from] serde_yaml::Error),
}
