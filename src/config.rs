//! Runtime settings for the measurement session.
//!
//! Settings are loaded from built-in defaults, an optional TOML file, and
//! `GOIO_`-prefixed environment variables, in that precedence order:
//!
//! ```text
//! GOIO_SETTLE_TIME_MS=2000
//! GOIO_READ_CAPACITY=50
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Tunables of the acquisition workflow, with the reference defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Sampling period sent to the device, in seconds.
    pub measurement_period_s: f64,
    /// How long to let the device buffer samples before reading.
    pub settle_time_ms: u64,
    /// Raw measurement buffer capacity for one read.
    pub read_capacity: usize,
    /// Acknowledgement bound for configure and command calls.
    pub command_timeout_ms: u32,
}

impl Settings {
    /// Loads settings, layering an optional TOML file and environment
    /// overrides over the defaults.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("measurement_period_s", 0.040_f64)?
            .set_default("settle_time_ms", 1000_i64)?
            .set_default("read_capacity", 100_i64)?
            .set_default("command_timeout_ms", 2000_i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        builder = builder.add_source(Environment::with_prefix("GOIO"));

        builder.build()?.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            measurement_period_s: 0.040,
            settle_time_ms: 1000,
            read_capacity: 100,
            command_timeout_ms: 2000,
        }
    }
}
