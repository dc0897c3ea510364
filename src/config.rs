use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BAND: u64 = 5;
const DEFAULT_NUMBER: u64 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Traveller shown on the dashboard page.
    pub band: u64,
    pub number: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            band: DEFAULT_BAND,
            number: DEFAULT_NUMBER,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            data_dir: lookup("FLAP_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            band: parse_or("FLAP_BAND", lookup("FLAP_BAND"), defaults.band),
            number: parse_or("FLAP_NUMBER", lookup("FLAP_NUMBER"), defaults.number),
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={value:?}, using {default}");
            default
        }),
    }
}
