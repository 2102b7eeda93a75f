use clap::Args;
use owo_colors::OwoColorize;
use serde_json::json;

use crate::bedrock::RuntimeClient;
use crate::commands::{load_profile_or_default, read_text, render_error, runtime_config};

const DEFAULT_MODEL: &str = "amazon.titan-embed-text-v1";
const EMBEDDING_PREVIEW_DIMS: usize = 8;

#[derive(Debug, Args, Clone)]
pub struct EmbedArgs {
    /// Text to embed; read from stdin when omitted.
    text: Option<String>,
    /// Embedding model id.
    #[arg(long)]
    model: Option<String>,
    /// Region override.
    #[arg(long)]
    region: Option<String>,
    /// Endpoint URL override.
    #[arg(long)]
    endpoint: Option<String>,
    /// Named profile from the config file.
    #[arg(long)]
    profile: Option<String>,
    /// Print the raw response document as JSON.
    #[arg(long)]
    json: bool,
    /// Print the request payload and exit without calling the endpoint.
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: EmbedArgs) -> Result<(), String> {
    let profile = load_profile_or_default(args.profile.as_deref())?;
    let model = args
        .model
        .or_else(|| profile.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let input_text = read_text(args.text)?;
    let payload = json!({ "inputText": input_text });

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

    if args.json {
        let document = client
            .invoke(&model, &payload)
            .await
            .map_err(render_error)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&document)
                .map_err(|err| format!("Failed to render response: {err}"))?
        );
        return Ok(());
    }

    let output = client
        .embed(&model, &input_text)
        .await
        .map_err(render_error)?;

    let preview = output
        .embedding
        .iter()
        .take(EMBEDDING_PREVIEW_DIMS)
        .map(|value| format!("{value:.4}"))
        .collect::<Vec<_>>()
        .join(", ");
    if output.embedding.len() > EMBEDDING_PREVIEW_DIMS {
        println!(
            "Generated an embedding with {} dimensions: [{preview}, ...]",
            output.embedding.len()
        );
    } else {
        println!("Generated an embedding: [{preview}]");
    }
    println!("Input token count: {}", output.input_text_token_count);
    println!(
        "{}",
        format!("Finished generating an embedding with model {model}.").green()
    );
    Ok(())
}
