//! Single-shot client adapter for a Bedrock-style runtime endpoint.
//!
//! The module contains the runtime client plus typed request/response
//! wrappers for the three invocation shapes used by the CLI commands:
//! raw model invocation, multimodal conversation, and streamed token
//! generation. Each operation is one HTTP call; nothing here retries,
//! queues, or caches.

/// Runtime client, connection configuration, and error types.
pub mod client;
/// Converse API message and response types.
pub mod converse;
/// Titan-style text embedding types.
pub mod embed;
/// Streamed response chunk decoding.
pub mod stream;

pub use client::{RuntimeClient, RuntimeConfig, RuntimeError};
pub use converse::{ContentBlock, ConverseOutput, ImageBlock, Message, Role, TokenUsage};
pub use embed::EmbedOutput;
pub use stream::{Chunk, ChunkStream};
