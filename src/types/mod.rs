// Public modules
pub mod chat_chunk;
pub mod chat_request;
pub mod message;

// Re-exports
pub use chat_chunk::{ChatChunk, ChunkChoice, ChunkDelta};
pub use chat_request::ChatRequest;
pub use message::{Message, MessageRole};
