//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::config::{Notices, ReplyRendering, ResolvedConfig};
use crate::core::state::App;
use crate::remote::{ChatBackend, ChatRequest, HealthStatus, RemoteError};

/// What a [`ScriptedBackend`] does on its next `send`.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(String),
    Fail(RemoteError),
    /// Never resolves.
    Hang,
}

/// A backend that plays back canned outcomes and records every request.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
    health_hangs: bool,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            health_hangs: false,
        }
    }

    /// A backend whose health endpoint never answers.
    pub fn with_hanging_health(script: Vec<Scripted>) -> Self {
        Self {
            health_hangs: true,
            ..Self::new(script)
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, RemoteError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(err)) => Err(err),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(RemoteError::Network("script exhausted".to_string())),
        }
    }

    async fn health(&self) -> Result<HealthStatus, RemoteError> {
        if self.health_hangs {
            std::future::pending::<()>().await;
        }
        Ok(HealthStatus {
            status: "ok".to_string(),
            message: None,
        })
    }
}

/// Resolved config with defaults and a short timeout.
pub fn test_config() -> ResolvedConfig {
    ResolvedConfig {
        endpoint: "http://localhost:8000/chat".to_string(),
        request_timeout: Duration::from_secs(5),
        reply_rendering: ReplyRendering::PlainText,
        notices: Notices::default(),
    }
}

/// Creates a test App talking to an empty scripted backend.
pub fn test_app() -> App {
    App::new(
        Arc::new(ScriptedBackend::new(Vec::new())),
        &test_config(),
    )
}
