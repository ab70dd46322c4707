//! # Core Application Logic
//!
//! The conversation controller. It knows nothing about any specific UI
//! technology and performs no I/O: the adapter feeds it actions and carries
//! out the effects it returns.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (thread, draft,│
//!                    │    in-flight turn)      │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    └───────────┬─────────────┘
//!                                │ Effect::Dispatch
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │  ── spawns turn ──────▶  │   remote   │
//!     │  Adapter   │  ◀── TurnCompleted ───── │ (HTTP/JSON)│
//!     │ (ratatui)  │                          │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `App`, `Conversation`, `Message`: everything the controller owns
//! - [`action`]: the `Action` enum, the `Effect` enum and `update()`
//! - [`config`]: layered configuration (defaults, file, env, CLI)

pub mod action;
pub mod config;
pub mod state;
