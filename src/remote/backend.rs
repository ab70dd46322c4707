use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{ChatRequest, HealthStatus};

/// Everything that can go wrong while obtaining a reply.
///
/// All variants surface to the user as a single notice (timeout and
/// cancellation get their own wording); the detail is for the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Endpoint misconfigured (unparseable URL).
    Config(String),
    /// Transport-level failure (DNS, connection refused, reset).
    Network(String),
    /// Endpoint answered with a non-success status.
    Api { status: u16, message: String },
    /// Body was not a JSON object with a string `reply`.
    Parse(String),
    /// No answer within the configured bound.
    TimedOut(Duration),
    /// User aborted the outstanding turn.
    Cancelled,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Config(msg) => write!(f, "config error: {msg}"),
            RemoteError::Network(msg) => write!(f, "network error: {msg}"),
            RemoteError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            RemoteError::Parse(msg) => write!(f, "parse error: {msg}"),
            RemoteError::TimedOut(after) => {
                write!(f, "no reply after {}s", after.as_secs())
            }
            RemoteError::Cancelled => write!(f, "cancelled by user"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// The remote chat collaborator.
///
/// One call per turn, request/response. Implementations must not retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short label used in the title bar and logs.
    fn name(&self) -> &str;

    /// Sends one turn and returns the reply text verbatim.
    async fn send(&self, request: &ChatRequest) -> Result<String, RemoteError>;

    /// Probes the endpoint's health route.
    async fn health(&self) -> Result<HealthStatus, RemoteError>;
}
