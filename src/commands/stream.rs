use std::io::{self, Write};

use clap::Args;
use serde_json::json;

use crate::bedrock::RuntimeClient;
use crate::commands::{load_profile_or_default, read_text, render_error, runtime_config};

const DEFAULT_MODEL: &str = "anthropic.claude-v2:1";
const DEFAULT_MAX_TOKENS: u32 = 4000;

#[derive(Debug, Args, Clone)]
pub struct StreamArgs {
    /// Prompt to complete; read from stdin when omitted.
    prompt: Option<String>,
    /// Text completion model id.
    #[arg(long)]
    model: Option<String>,
    /// Maximum number of tokens to generate.
    #[arg(long)]
    max_tokens: Option<u32>,
    /// Region override.
    #[arg(long)]
    region: Option<String>,
    /// Endpoint URL override.
    #[arg(long)]
    endpoint: Option<String>,
    /// Named profile from the config file.
    #[arg(long)]
    profile: Option<String>,
    /// Print the request payload and exit without calling the endpoint.
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: StreamArgs) -> Result<(), String> {
    let profile = load_profile_or_default(args.profile.as_deref())?;
    let model = args
        .model
        .or_else(|| profile.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let max_tokens = args
        .max_tokens
        .or(profile.max_tokens)
        .unwrap_or(DEFAULT_MAX_TOKENS);
    let prompt = read_text(args.prompt)?;

    let payload = json!({
        "prompt": format!("\n\nHuman: {prompt}\n\nAssistant:"),
        "max_tokens_to_sample": max_tokens,
    });

    if args.dry_run {
        println!(
            "{}",
            serde_json::to_string_pretty(&payload)
                .map_err(|err| format!("Failed to render payload: {err}"))?
        );
        return Ok(());
    }

    let config = runtime_config(&profile, args.region, args.endpoint)?;
    let client = RuntimeClient::new(config);
    let mut stream = client
        .invoke_stream(&model, &payload)
        .await
        .map_err(render_error)?;

    let mut stdout = io::stdout();
    while let Some(event) = stream.next().await {
        let chunk = event.map_err(render_error)?;
        if let Some(text) = chunk.text() {
            write!(stdout, "{text}")
                .and_then(|_| stdout.flush())
                .map_err(|err| format!("Failed to write to stdout: {err}"))?;
        }
    }
    println!();
    Ok(())
}
