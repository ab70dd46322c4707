//! # Actions
//!
//! Everything that can happen in Parley becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! Endpoint answers? That's `Action::TurnCompleted { turn, outcome }`.
//!
//! The `update()` function applies an action to the state and returns the
//! `Effect` the adapter must perform. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::core::state::{App, EndpointHealth, Message, TurnId};
use crate::remote::{ChatRequest, HealthStatus, RemoteError};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The input box content changed.
    UpdateDraft(String),
    /// Submit the current draft.
    Submit,
    /// Ask the in-flight turn to stop.
    CancelTurn,
    /// A dispatched turn resolved.
    TurnCompleted {
        turn: TurnId,
        outcome: Result<String, RemoteError>,
    },
    /// The startup health probe resolved.
    HealthChecked(Result<HealthStatus, RemoteError>),
    Quit,
}

/// A turn the adapter must send: exactly one remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub turn: TurnId,
    pub request: ChatRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Dispatch(Dispatch),
    /// Trip the cancellation token of this turn. The turn still completes
    /// through `TurnCompleted`.
    Cancel(TurnId),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::UpdateDraft(text) => {
            app.draft = text;
            Effect::None
        }
        Action::Submit => submit(app),
        Action::CancelTurn => match app.in_flight {
            Some(turn) => {
                info!("Cancel requested for {}", turn);
                app.status_message = "Cancelling...".to_string();
                Effect::Cancel(turn)
            }
            None => Effect::None,
        },
        Action::TurnCompleted { turn, outcome } => {
            complete(app, turn, outcome);
            Effect::None
        }
        Action::HealthChecked(result) => {
            match result {
                Ok(status) if status.is_ok() => {
                    info!("Endpoint healthy: {:?}", status.message);
                    app.health = EndpointHealth::Online;
                }
                Ok(status) => {
                    warn!("Endpoint reports status {:?}", status.status);
                    app.health = EndpointHealth::Offline;
                }
                Err(e) => {
                    warn!("Health probe failed: {}", e);
                    app.health = EndpointHealth::Offline;
                }
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App) -> Effect {
    // Admission: rejected submits leave no trace, not even a log line.
    if app.is_busy() || app.draft.trim().is_empty() {
        return Effect::None;
    }

    // The history must be captured before the new user turn is appended:
    // the typed text travels in `message`, and filtering the post-append
    // thread would send it twice.
    let history = app.conversation.context_payload();

    let text = std::mem::take(&mut app.draft);
    app.conversation.push(Message::user(text.clone()));

    let turn = app.allocate_turn();
    app.in_flight = Some(turn);
    app.status_message = "Processing...".to_string();

    info!(
        "Dispatching {} ({} bytes, {} history turns)",
        turn,
        text.len(),
        history.len()
    );

    Effect::Dispatch(Dispatch {
        turn,
        request: ChatRequest {
            message: text,
            history,
        },
    })
}

fn complete(app: &mut App, turn: TurnId, outcome: Result<String, RemoteError>) {
    if app.in_flight != Some(turn) {
        debug!("Ignoring completion for {} (in flight: {:?})", turn, app.in_flight);
        return;
    }

    match outcome {
        Ok(reply) => {
            info!("{} answered ({} bytes)", turn, reply.len());
            app.conversation.push(Message::model(reply));
        }
        Err(e) => {
            warn!("{} failed: {}", turn, e);
            let notice = match e {
                RemoteError::TimedOut(_) => &app.notices.timeout,
                RemoteError::Cancelled => &app.notices.cancelled,
                _ => &app.notices.failure,
            };
            app.conversation.push(Message::error(notice.clone()));
        }
    }

    app.in_flight = None;
    app.status_message.clear();
}
