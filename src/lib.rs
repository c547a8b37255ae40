// Public modules
pub mod boot;
pub mod chat;
pub mod client;
pub mod client_id;
pub mod client_logger;
pub mod decoder;
pub mod editor;
pub mod error;
pub mod history;
pub mod lock;
pub mod observability;
pub mod render;
pub mod sse;
pub mod theme;
pub mod types;

// Re-exports
pub use boot::{BootTiming, live_transition, run_boot};
pub use chat::{ChatArgs, ChatConfig, ChatSession, TurnOutcome};
pub use client::{ChatBackend, ChatClient};
pub use client_id::get_or_create_client_id;
pub use client_logger::{ChatLogger, JsonLinesLogger};
pub use editor::{Key, KeyOutcome, LineEditor};
pub use error::{Error, Result};
pub use history::ConversationHistory;
pub use lock::ActivityLock;
pub use observability::register_biometrics;
pub use render::{AnsiScreen, Screen};
pub use types::*;
