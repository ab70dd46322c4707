pub mod backend;
pub mod http;
pub mod turn;
pub mod types;

pub use backend::{ChatBackend, RemoteError};
pub use http::HttpChatBackend;
pub use turn::run_turn;
pub use types::{ChatReply, ChatRequest, HealthStatus, HistoryTurn, TurnRole};
