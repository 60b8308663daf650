//! The subsystem error taxonomy (§7, §9: "exception-for-error-reporting maps to a result/error
//! sum type"). Each subsystem gets its own `thiserror` enum; [`ClientError`] composes the ones a
//! caller of [`crate::client::Client`] actually needs to handle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error while framing a message: {0}")]
    Io(#[from] std::io::Error),
    #[error("server sent a negative body length ({0})")]
    NegativeLength(i32),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no connection has been established; call connect() before issuing requests")]
    NotConnected,
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("server rejected the request: {status:?} {message}")]
    BadServerResponse {
        status: crate::codec::Status,
        message: String,
    },
    #[error("username is missing and no default was configured")]
    UsernameMissing,
    #[error("host is missing from the configuration")]
    HostMissing,
    #[error("port is missing from the configuration")]
    PortMissing,
}

/// Describes why the Planner could not produce a route for a train this tick. Non-fatal per §7 --
/// the Executor logs this and leaves the train stopped, to be retried next tick.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanningError {
    #[error("no post of the required goods type is reachable from the train's current point")]
    NoReachableTarget,
    #[error("the train's current point is not known to the graph")]
    UnknownPosition,
}
