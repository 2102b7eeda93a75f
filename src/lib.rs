//! Single-shot client tools for a Bedrock-style model runtime.
//!
//! The crate wraps one HTTP call per operation (model invocation,
//! multimodal conversation, and streamed token generation) and exposes
//! them both as a library ([`bedrock`]) and as CLI subcommands
//! ([`commands`]).

/// Runtime client adapter and request/response types.
pub mod bedrock;
/// CLI command implementations.
pub mod commands;
/// Local TOML profile configuration.
pub mod config;
