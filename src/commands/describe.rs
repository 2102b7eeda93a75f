use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use image::ImageFormat;
use owo_colors::OwoColorize;

use crate::bedrock::{ContentBlock, Message, RuntimeClient};
use crate::commands::{load_profile_or_default, render_error, runtime_config};

const DEFAULT_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
const DEFAULT_PROMPT: &str = "What's in this image?";

#[derive(Debug, Args, Clone)]
pub struct DescribeArgs {
    /// Text prompt accompanying the image.
    prompt: Option<String>,
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,
    /// Multimodal conversation model id.
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
    /// Print the request messages and exit without calling the endpoint.
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: DescribeArgs) -> Result<(), String> {
    let profile = load_profile_or_default(args.profile.as_deref())?;
    let model = args
        .model
        .or_else(|| profile.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let prompt = args.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    let bytes = fs::read(&args.image)
        .map_err(|err| format!("Failed to read image '{}': {err}", args.image.display()))?;
    let format = image_format_tag(&args.image, &bytes)?;
    let message = Message::user(prompt).with_image(format, &bytes);

    if args.dry_run {
        println!(
            "{}",
            serde_json::to_string_pretty(&[&message])
                .map_err(|err| format!("Failed to render messages: {err}"))?
        );
        return Ok(());
    }

    let config = runtime_config(&profile, args.region, args.endpoint)?;
    let client = RuntimeClient::new(config);
    let output = client
        .converse(&model, &[message])
        .await
        .map_err(render_error)?;

    let reply = &output.output.message;
    println!("Role: {}", reply.role.as_str());
    for block in &reply.content {
        if let ContentBlock::Text(text) = block {
            println!("Text: {text}");
        }
    }
    if let Some(usage) = &output.usage {
        println!("Input tokens: {}", usage.input_tokens);
        if let Some(count) = usage.output_tokens {
            println!("Output tokens: {count}");
        }
        if let Some(count) = usage.total_tokens {
            println!("Total tokens: {count}");
        }
    }
    if let Some(stop_reason) = &output.stop_reason {
        println!("Stop reason: {stop_reason}");
    }
    println!(
        "{}",
        format!("Finished generating text with model {model}.").green()
    );
    Ok(())
}

/// Determines the provider format tag, sniffing the bytes first and
/// falling back to the file extension.
fn image_format_tag(path: &Path, bytes: &[u8]) -> Result<String, String> {
    if let Ok(format) = image::guess_format(bytes) {
        let tag = match format {
            ImageFormat::Png => Some("png"),
            ImageFormat::Jpeg => Some("jpeg"),
            ImageFormat::Gif => Some("gif"),
            ImageFormat::WebP => Some("webp"),
            _ => None,
        };
        if let Some(tag) = tag {
            return Ok(tag.to_string());
        }
    }

    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            format!(
                "Cannot determine image format for '{}'.",
                path.display()
            )
        })?;
    Ok(if ext == "jpg" { "jpeg".to_string() } else { ext })
}

#[cfg(test)]
mod tests {
    use super::image_format_tag;
    use std::path::Path;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn format_is_sniffed_from_bytes() {
        let tag = image_format_tag(Path::new("photo.bin"), PNG_MAGIC).unwrap();
        assert_eq!(tag, "png");
    }

    #[test]
    fn extension_is_the_fallback_and_jpg_maps_to_jpeg() {
        let tag = image_format_tag(Path::new("scan.JPG"), b"not an image").unwrap();
        assert_eq!(tag, "jpeg");
        let tag = image_format_tag(Path::new("anim.gif"), b"???").unwrap();
        assert_eq!(tag, "gif");
    }

    #[test]
    fn missing_extension_on_unknown_bytes_is_an_error() {
        assert!(image_format_tag(Path::new("mystery"), b"???").is_err());
    }
}
