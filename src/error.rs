//! Error types.
//!
//! The simulation itself has no failure modes: everything it consumes is
//! validated once when the stage is loaded.  What can fail is reading that
//! configuration and opening an audio device, and both degrade gracefully at
//! the call site.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read stage file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stage file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A tuning value is outside the range the simulation can handle.
    #[error("stage value '{name}' = {value} is outside {expected}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },

    #[error("stage colour '{0}' is not a #rrggbb hex string")]
    InvalidColor(String),
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("no audio output device available: {0}")]
    DeviceUnavailable(String),

    #[error("failed to queue audio: {0}")]
    Playback(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
