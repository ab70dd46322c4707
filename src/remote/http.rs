//! HTTP implementation of [`ChatBackend`].
//!
//! Plain JSON request/response, no auth, no streaming. The health route is
//! the root of the chat endpoint's origin.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;

use super::backend::{ChatBackend, RemoteError};
use super::types::{ChatReply, ChatRequest, HealthStatus};

pub struct HttpChatBackend {
    chat_url: Url,
    health_url: Url,
    label: String,
    client: reqwest::Client,
}

impl HttpChatBackend {
    /// Builds a backend for `endpoint` (e.g. `http://localhost:8000/chat`).
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        let chat_url = Url::parse(endpoint)
            .map_err(|e| RemoteError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
        if !matches!(chat_url.scheme(), "http" | "https") {
            return Err(RemoteError::Config(format!(
                "unsupported scheme '{}' in endpoint '{endpoint}'",
                chat_url.scheme()
            )));
        }
        let health_url = chat_url
            .join("/")
            .map_err(|e| RemoteError::Config(e.to_string()))?;
        let label = match (chat_url.host_str(), chat_url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => endpoint.to_string(),
        };

        Ok(Self {
            chat_url,
            health_url,
            label,
            client: reqwest::Client::new(),
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    pub fn health_url(&self) -> &Url {
        &self.health_url
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &str {
        &self.label
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, RemoteError> {
        info!(
            "POST {} (message_len={}, history_len={})",
            self.chat_url,
            request.message.len(),
            request.history.len()
        );

        let response = self
            .client
            .post(self.chat_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Chat endpoint status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Chat endpoint error: {} - {}", status.as_u16(), body);
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or(body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let reply: ChatReply =
            serde_json::from_str(&body).map_err(|e| RemoteError::Parse(e.to_string()))?;

        debug!("Reply received ({} bytes)", reply.reply.len());
        Ok(reply.reply)
    }

    async fn health(&self) -> Result<HealthStatus, RemoteError> {
        let response = self
            .client
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_url_is_origin_root() {
        let backend = HttpChatBackend::new("http://localhost:8000/chat").unwrap();
        assert_eq!(backend.chat_url().as_str(), "http://localhost:8000/chat");
        assert_eq!(backend.health_url().as_str(), "http://localhost:8000/");
        assert_eq!(backend.name(), "localhost:8000");
    }

    #[test]
    fn label_omits_default_port() {
        let backend = HttpChatBackend::new("https://chat.example.com/api/chat").unwrap();
        assert_eq!(backend.name(), "chat.example.com");
        assert_eq!(backend.health_url().as_str(), "https://chat.example.com/");
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        let err = HttpChatBackend::new("not a url").err().unwrap();
        assert!(matches!(err, RemoteError::Config(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = HttpChatBackend::new("ftp://localhost/chat").err().unwrap();
        assert!(matches!(err, RemoteError::Config(msg) if msg.contains("ftp")));
    }
}
