//! Configuration
//!
//! Startup configuration is a plain, `Clone`-able struct passed by value into the `Client` and
//! Executor constructors (§9: "no process-wide mutable singletons"). It is layered from `clap`
//! command-line arguments over an optional config file; see [`crate::cli`] for the arguments
//! themselves.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

/// The name of this application
pub const APP_NAME: &str = "trainbot";

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The subtitle. You know, for flavor.
pub const APP_SUBTITLE: &str = "An autonomous train-empire bot";

/// Exit code for a normal stop (no error).
pub const EXIT_OK: i32 = 0;
/// Exit code for a protocol or authentication error (§6).
pub const EXIT_PROTOCOL_ERROR: i32 = 2;
/// Exit code for a socket or timeout error (§6).
pub const EXIT_TRANSPORT_ERROR: i32 = 3;

/// Startup configuration, consumed once before connecting (§4.8).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Per-call timeout in seconds; `None` means unlimited (§4.2).
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub num_players: Option<u32>,
    #[serde(default)]
    pub num_turns: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("host is missing: pass --host or set it in the config file")]
    HostMissing,
    #[error("port is missing: pass --port or set it in the config file")]
    PortMissing,
    #[error("username is missing: pass --username or set it in the config file")]
    UsernameMissing,
}

impl Config {
    /// Loads a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlays `other`'s present fields on top of `self`, preferring `other`. Used to let
    /// explicit CLI flags override a config file's defaults.
    pub fn overlay(self, other: Config) -> Config {
        Config {
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            timeout: other.timeout.or(self.timeout),
            username: other.username.or(self.username),
            password: other.password.or(self.password),
            game: other.game.or(self.game),
            num_players: other.num_players.or(self.num_players),
            num_turns: other.num_turns.or(self.num_turns),
        }
    }

    /// Fails fast (before any socket is opened) if the fields required to connect and log in are
    /// missing (§7: "Configuration ... fatal before connect").
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_none() {
            return Err(ConfigError::HostMissing);
        }
        if self.port.is_none() {
            return Err(ConfigError::PortMissing);
        }
        if self.username.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::UsernameMissing);
        }
        Ok(())
    }
}
