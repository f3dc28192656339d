//! Lead chat - session lifecycle and qualification protocol
//!
//! A visitor supplies contact details, then talks to a remote qualification
//! assistant until it marks the lead qualified. Rendering is left to the
//! embedder, which subscribes to [`engine::ConversationSnapshot`]s.

pub mod config;
pub mod engine;
pub mod gateway;
pub mod session;
pub mod state_machine;
pub mod store;

pub use config::ChatConfig;
pub use engine::{ConversationEngine, ConversationSnapshot, ExchangeOutcome, SubmitError};
pub use gateway::{AssistantGateway, AssistantReply, ExchangeRequest, GatewayError, HttpGateway};
pub use session::{Profile, Session, SessionController, SessionError};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
