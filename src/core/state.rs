//! # Application State
//!
//! Core business state for Parley. This module contains domain logic only,
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ChatBackend>   // remote chat collaborator
//! ├── conversation: Conversation      // append-only message thread
//! ├── draft: String                   // text bound to the input box
//! ├── in_flight: Option<TurnId>       // Some while a call is outstanding
//! ├── health: EndpointHealth          // result of the startup probe
//! ├── status_message: String          // status bar text
//! ├── request_timeout: Duration       // bound on every call
//! ├── reply_rendering: ReplyRendering // trust choice for model replies
//! └── notices: Notices                // user-facing failure texts
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::{Notices, ReplyRendering, ResolvedConfig};
use crate::remote::{ChatBackend, HistoryTurn, TurnRole};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    /// Local notice about a failed turn. Never sent to the endpoint.
    Error,
}

impl Role {
    /// The wire role for this message, or `None` if it stays local.
    pub fn context_role(self) -> Option<TurnRole> {
        match self {
            Role::User => Some(TurnRole::User),
            Role::Model => Some(TurnRole::Model),
            Role::Error => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            role: Role::Error,
            content: content.into(),
        }
    }
}

/// Ordered, append-only message thread.
///
/// There is deliberately no way to edit or remove an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The user/model subsequence in order, as sent in `history`.
    pub fn context_payload(&self) -> Vec<HistoryTurn> {
        self.messages
            .iter()
            .filter_map(|msg| {
                msg.role.context_role().map(|role| HistoryTurn {
                    role,
                    content: msg.content.clone(),
                })
            })
            .collect()
    }
}

/// Identifies one dispatched turn. Completions carry it back so a stale
/// completion can never release a newer turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

/// Outcome of the startup health probe. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointHealth {
    Unknown,
    Online,
    Offline,
}

impl EndpointHealth {
    pub fn label(&self) -> &'static str {
        match self {
            EndpointHealth::Unknown => "checking",
            EndpointHealth::Online => "online",
            EndpointHealth::Offline => "offline",
        }
    }
}

pub struct App {
    pub backend: Arc<dyn ChatBackend>,
    pub conversation: Conversation,
    pub draft: String,
    pub(crate) in_flight: Option<TurnId>,
    next_turn: u64,
    pub health: EndpointHealth,
    pub status_message: String,
    pub request_timeout: Duration,
    pub reply_rendering: ReplyRendering,
    pub notices: Notices,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, config: &ResolvedConfig) -> Self {
        Self {
            backend,
            conversation: Conversation::new(),
            draft: String::new(),
            in_flight: None,
            next_turn: 0,
            health: EndpointHealth::Unknown,
            status_message: String::new(),
            request_timeout: config.request_timeout,
            reply_rendering: config.reply_rendering,
            notices: config.notices.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<TurnId> {
        self.in_flight
    }

    /// Whether the submit affordance is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_busy() && !self.draft.trim().is_empty()
    }

    pub(crate) fn allocate_turn(&mut self) -> TurnId {
        self.next_turn += 1;
        TurnId(self.next_turn)
    }
}
