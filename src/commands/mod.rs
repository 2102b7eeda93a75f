//! CLI command implementations.
//!
//! Each submodule owns one subcommand: argument struct, resolution of
//! flags against the optional profile, and console output.

use std::io::{self, Read};

use owo_colors::OwoColorize;

use crate::bedrock::{RuntimeConfig, RuntimeError};
use crate::config::ProfileConfig;

/// `config` subcommand implementation.
pub mod config;
/// `describe` subcommand implementation.
pub mod describe;
/// `embed` subcommand implementation.
pub mod embed;
/// `stream` subcommand implementation.
pub mod stream;

/// Loads the named profile, or an empty one when no name is given.
pub(crate) fn load_profile_or_default(name: Option<&str>) -> Result<ProfileConfig, String> {
    match name {
        Some(name) => crate::config::load_profile(name),
        None => Ok(ProfileConfig::default()),
    }
}

/// Builds the runtime configuration from flags, profile, and environment.
///
/// Flags win over profile values; credentials always come from the
/// environment.
pub(crate) fn runtime_config(
    profile: &ProfileConfig,
    region: Option<String>,
    endpoint: Option<String>,
) -> Result<RuntimeConfig, String> {
    let region = region.or_else(|| profile.region.clone());
    let mut config = RuntimeConfig::from_env(region.as_deref()).map_err(|err| err.to_string())?;
    if let Some(endpoint) = endpoint.or_else(|| profile.endpoint.clone()) {
        config = config.with_endpoint(endpoint);
    }
    if let Some(timeout) = profile.timeout {
        config = config.with_timeout(timeout);
    }
    Ok(config)
}

/// Returns the positional text, falling back to stdin.
pub(crate) fn read_text(positional: Option<String>) -> Result<String, String> {
    if let Some(text) = positional {
        return Ok(text);
    }
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .map_err(|err| format!("Failed to read prompt from stdin: {err}"))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("No prompt provided: pass it as an argument or pipe it on stdin.".to_string());
    }
    Ok(trimmed.to_string())
}

/// Formats a runtime failure for the console.
pub(crate) fn render_error(err: RuntimeError) -> String {
    match &err {
        RuntimeError::Client { message, .. } => {
            tracing::error!("A client error occurred: {message}");
            format!("{} {message}", "A client error occurred:".red())
        }
        _ => err.to_string(),
    }
}
