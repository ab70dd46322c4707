//! The single suspension point of a turn.
//!
//! A call to the backend is raced against a timeout and a cancellation
//! token, so every dispatched turn resolves: with a reply, a backend error,
//! `TimedOut`, or `Cancelled`.

use std::time::Duration;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::backend::{ChatBackend, RemoteError};
use super::types::ChatRequest;

pub async fn run_turn(
    backend: &dyn ChatBackend,
    request: &ChatRequest,
    timeout: Duration,
    cancel: CancellationToken,
) -> Result<String, RemoteError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!("Turn cancelled before the endpoint answered");
            Err(RemoteError::Cancelled)
        }
        outcome = tokio::time::timeout(timeout, backend.send(request)) => match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!("Endpoint did not answer within {}s", timeout.as_secs());
                Err(RemoteError::TimedOut(timeout))
            }
        },
    }
}
