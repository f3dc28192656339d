//! Runtime configuration from the environment

use std::path::PathBuf;

pub const DEFAULT_ASSISTANT_URL: &str = "http://localhost:8000/chat";
pub const DEFAULT_LOG_FILTER: &str = "lead_chat=info";

/// Configuration for the chat front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Full URL of the assistant's chat endpoint
    pub assistant_url: String,
    /// SQLite file holding the saved session
    pub store_path: PathBuf,
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let assistant_url = lookup("LEAD_CHAT_ASSISTANT_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ASSISTANT_URL.to_string());

        let store_path = lookup("LEAD_CHAT_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(
                || {
                    let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                    PathBuf::from(home).join(".lead-chat").join("session.db")
                },
                PathBuf::from,
            );

        Self {
            assistant_url,
            store_path,
        }
    }
}
