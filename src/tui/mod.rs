//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and performs the
//! `Effect`s that `update` returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Turn lifecycle
//!
//! `Effect::Dispatch` spawns exactly one tokio task running
//! [`run_turn`](crate::remote::run_turn). The task always reports back with
//! `Action::TurnCompleted`, whether the call answered, failed, timed out or
//! was cancelled. `Esc` only trips the task's `CancellationToken`, so the
//! busy flag is released in one place.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (landing page, turn in flight): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms and only redraws on events.

mod component;
mod components;
mod event;
pub mod rich_text;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio_util::sync::CancellationToken;

use crate::core::action::{Action, Dispatch, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, TurnId};
use crate::remote::{ChatBackend, HttpChatBackend, RemoteError, run_turn};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Presentation state that core logic never sees.
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub pulse_value: f32,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            pulse_value: 0.0,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter be told apart from Enter.
        // Terminals without it ignore the request; Ctrl+J still works there.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// The remote collaborator for a resolved config.
pub fn build_backend(config: &ResolvedConfig) -> Result<Arc<dyn ChatBackend>, RemoteError> {
    Ok(Arc::new(HttpChatBackend::new(&config.endpoint)?))
}

/// The turn whose task is currently running, with the means to stop it.
struct ActiveTurn {
    turn: TurnId,
    cancel: CancellationToken,
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend = build_backend(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let mut app = App::new(backend, &config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Background tasks report back through this channel.
    let (tx, rx) = mpsc::channel();
    spawn_health_check(app.backend.clone(), app.request_timeout, tx.clone());

    let mut active: Option<ActiveTurn> = None;
    let start_time = Instant::now();
    let mut needs_redraw = true;

    'main: loop {
        let animating = app.is_busy() || app.conversation.is_empty();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            tui.pulse_value = (elapsed * 3.0).sin() * 0.5 + 0.5;
            let spinner_frame = (elapsed * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain every pending event before the next draw.
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(&app, &mut tui, &event)
                && apply(&mut app, &mut tui, action, &tx, &mut active)
            {
                break 'main;
            }
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if apply(&mut app, &mut tui, action, &tx, &mut active) {
                break 'main;
            }
        }
    }

    if let Some(ActiveTurn { turn, cancel }) = active.take() {
        info!("Cancelling {} on exit", turn);
        cancel.cancel();
    }

    ratatui::restore();
    Ok(())
}

/// Decides what a terminal event means for the application.
///
/// Editing and scrolling are handled here and only surface as an action when
/// core state must change.
fn route_event(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => Some(Action::Quit),
        // Esc never quits; the thread lives only in memory.
        TuiEvent::Escape if app.is_busy() => Some(Action::CancelTurn),
        TuiEvent::Escape => None,
        TuiEvent::Resize => None,
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(event);
            None
        }
        _ => {
            tui.input_box.disabled = app.is_busy();
            match tui.input_box.handle_event(event)? {
                InputEvent::Changed(text) => Some(Action::UpdateDraft(text)),
                InputEvent::Submit => Some(Action::Submit),
                InputEvent::CursorMoved => None,
            }
        }
    }
}

/// Runs one action through `update` and performs its effect.
///
/// Returns `true` when the application should exit.
fn apply(
    app: &mut App,
    tui: &mut TuiState,
    action: Action,
    tx: &mpsc::Sender<Action>,
    active: &mut Option<ActiveTurn>,
) -> bool {
    if let Action::TurnCompleted { turn, .. } = &action
        && active.as_ref().is_some_and(|a| a.turn == *turn)
    {
        *active = None;
    }

    let quit = match update(app, action) {
        Effect::None => false,
        Effect::Dispatch(dispatch) => {
            let turn = dispatch.turn;
            let cancel = spawn_turn(app, dispatch, tx.clone());
            *active = Some(ActiveTurn { turn, cancel });
            // Follow the new turn even if the user had scrolled away.
            tui.message_list.stick_to_bottom = true;
            false
        }
        Effect::Cancel(turn) => {
            match active.as_ref() {
                Some(a) if a.turn == turn => a.cancel.cancel(),
                _ => warn!("Cancel requested for {} but no task is running", turn),
            }
            false
        }
        Effect::Quit => true,
    };

    if tui.input_box.text() != app.draft {
        tui.input_box.set_text(&app.draft);
    }
    quit
}

/// Spawns the single remote call for `dispatch`. The returned token stops it.
fn spawn_turn(app: &App, dispatch: Dispatch, tx: mpsc::Sender<Action>) -> CancellationToken {
    let Dispatch { turn, request } = dispatch;
    let backend = app.backend.clone();
    let timeout = app.request_timeout;
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    info!(
        "Spawning {} against {} (timeout {}s)",
        turn,
        backend.name(),
        timeout.as_secs()
    );

    tokio::spawn(async move {
        let started = Instant::now();
        let outcome = run_turn(backend.as_ref(), &request, timeout, task_cancel).await;
        debug!(
            "{} resolved in {}ms (ok: {})",
            turn,
            started.elapsed().as_millis(),
            outcome.is_ok()
        );
        if tx.send(Action::TurnCompleted { turn, outcome }).is_err() {
            warn!("Failed to deliver completion for {}: receiver dropped", turn);
        }
    });

    cancel
}

/// Checks the endpoint once, bounded like a turn. The result only feeds the
/// title bar.
fn spawn_health_check(backend: Arc<dyn ChatBackend>, timeout: Duration, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        let result = match tokio::time::timeout(timeout, backend.health()).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::TimedOut(timeout)),
        };
        if tx.send(Action::HealthChecked(result)).is_err() {
            warn!("Failed to deliver health check: receiver dropped");
        }
    });
}
