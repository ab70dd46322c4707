//! # TUI Components
//!
//! Stateless components take everything as props and are rebuilt each frame:
//! - `TitleBar`: endpoint, health and status line
//! - `LandingPage`: greeting shown before the first message
//! - `MessageView`: one conversation entry
//!
//! Stateful components keep presentation state between frames:
//! - `InputBox`: the draft editor
//! - `MessageList` / `MessageListState`: scrollable thread with cached heights
//!
//! Components never read `App` directly. The parent copies what they need
//! into props, which keeps each file testable with a `TestBackend`.

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub use input_box::{InputBox, InputEvent};
pub mod message;
pub use message::MessageView;
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
pub mod landing;
pub use landing::LandingPage;
