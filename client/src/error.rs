//! The bot binary's top-level error type (§3, §4.9): composes the per-subsystem `thiserror`
//! enums from `common` into one sum type `main` can match on to pick an exit code (§6).

use thiserror::Error;

use common::{conf, conf::ConfigError, error::ClientError, error::PlanningError};

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Planning failures are non-fatal and handled entirely inside the Executor (§7); this
    /// variant exists only so a caller diagnosing a run can report one uniformly if it's ever
    /// surfaced outside that loop.
    #[error(transparent)]
    Planning(#[from] PlanningError),
}

impl BotError {
    /// Maps this error onto one of the CLI exit codes in §6.
    pub fn exit_code(&self) -> i32 {
        match self {
            BotError::Config(_) => conf::EXIT_PROTOCOL_ERROR,
            BotError::Client(ClientError::Transport(_)) => conf::EXIT_TRANSPORT_ERROR,
            BotError::Client(_) => conf::EXIT_PROTOCOL_ERROR,
            BotError::Planning(_) => conf::EXIT_PROTOCOL_ERROR,
        }
    }
}
