//! A persistent TCP connection with a per-call timeout, serializing one in-flight request at a
//! time (§4.2). `Transport` owns the socket exclusively; there is no concurrent access.

use std::time::Duration;

use tokio::{net::TcpStream, time};

use crate::{
    codec::{self, Action, Status},
    error::TransportError,
};

/// Either a fixed per-call timeout, or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Seconds(u64),
    Unlimited,
}

impl Timeout {
    fn as_duration(self) -> Option<Duration> {
        match self {
            Self::Seconds(secs) => Some(Duration::from_secs(secs)),
            Self::Unlimited => None,
        }
    }
}

pub struct Transport {
    stream: Option<TcpStream>,
    timeout: Timeout,
}

impl Transport {
    pub fn new(timeout: Timeout) -> Self {
        Self { stream: None, timeout }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub async fn connect(&mut self, host: &str, port: u16) -> Result<(), TransportError> {
        let stream =
            TcpStream::connect((host, port))
                .await
                .map_err(|source| TransportError::Connect { host: host.to_string(), port, source })?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn close(&mut self) {
        self.stream = None;
    }

    /// Sends `action`/`body` and returns the decoded response, applying this transport's
    /// timeout to the full send-then-receive round trip (§4.2: "a per-call timeout applies to
    /// both send and receive").
    pub async fn call(&mut self, action: Action, body: &[u8]) -> Result<(Status, Vec<u8>), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        let round_trip = async {
            codec::write_request(stream, action, body).await?;
            let response = codec::read_response(stream).await?;
            Ok::<_, TransportError>(response)
        };

        match self.timeout.as_duration() {
            Some(duration) => time::timeout(duration, round_trip)
                .await
                .map_err(|_| TransportError::Timeout(duration))?,
            None => round_trip.await,
        }
    }
}
