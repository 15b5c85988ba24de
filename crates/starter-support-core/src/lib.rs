pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod state;

// Re-export main types for convenience
pub use config::Config;
pub use controller::{Mode, Route, RouteKind, Session};
pub use error::GatewayError;
pub use gateway::SupportClient;
pub use state::{ChatMessage, ChatRole, Conversation};
