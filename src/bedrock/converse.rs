use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human/user role.
    User,
    /// Assistant role.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One part of a message body: plain text or an image attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBlock {
    /// Plain text content.
    Text(String),
    /// Image content with a format tag and base64 payload.
    Image(ImageBlock),
}

/// Image attachment sent alongside a text prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Image format tag (`jpeg`, `png`, `gif`, or `webp`).
    pub format: String,
    /// Image payload.
    pub source: ImageSource,
}

/// Image payload wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    /// Base64-encoded image bytes.
    pub bytes: String,
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message author.
    pub role: Role,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Builds a user message with a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text(text.into())],
        }
    }

    /// Appends an image block, base64-encoding the raw bytes.
    pub fn with_image(mut self, format: impl Into<String>, bytes: &[u8]) -> Self {
        self.content.push(ContentBlock::Image(ImageBlock {
            format: format.into(),
            source: ImageSource {
                bytes: STANDARD.encode(bytes),
            },
        }));
        self
    }
}

/// Converse request body.
#[derive(Debug, Serialize)]
pub(crate) struct ConverseRequest<'a> {
    pub messages: &'a [Message],
}

/// Model reply plus accounting returned by the converse operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseOutput {
    /// Generated reply.
    pub output: OutputBlock,
    /// Why generation stopped, when the model reports it.
    pub stop_reason: Option<String>,
    /// Token accounting, when the endpoint reports it.
    pub usage: Option<TokenUsage>,
}

/// Wrapper around the generated message.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputBlock {
    /// The assistant's reply.
    pub message: Message,
}

/// Token accounting returned alongside generated output.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Tokens consumed by the request.
    pub input_tokens: u32,
    /// Tokens generated by the model.
    pub output_tokens: Option<u32>,
    /// Input plus output tokens.
    pub total_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::{ContentBlock, ConverseOutput, ConverseRequest, Message, Role};

    #[test]
    fn text_and_image_blocks_serialize_to_provider_shape() {
        let message = Message::user("What's in this image?").with_image("jpeg", &[0xff, 0xd8]);
        let body = serde_json::to_value(ConverseRequest {
            messages: std::slice::from_ref(&message),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "messages": [{
                    "role": "user",
                    "content": [
                        {"text": "What's in this image?"},
                        {"image": {"format": "jpeg", "source": {"bytes": "/9g="}}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn output_deserializes_message_usage_and_stop_reason() {
        let raw = r#"{
            "output": {"message": {"role": "assistant", "content": [{"text": "A cat."}]}},
            "stopReason": "end_turn",
            "usage": {"inputTokens": 120, "outputTokens": 5, "totalTokens": 125}
        }"#;
        let output: ConverseOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(output.output.message.role, Role::Assistant);
        assert!(matches!(
            output.output.message.content.first(),
            Some(ContentBlock::Text(text)) if text == "A cat."
        ));
        assert_eq!(output.stop_reason.as_deref(), Some("end_turn"));
        let usage = output.usage.unwrap();
        assert_eq!(usage.input_tokens, 120);
        assert_eq!(usage.output_tokens, Some(5));
        assert_eq!(usage.total_tokens, Some(125));
    }

    #[test]
    fn usage_counters_beyond_input_are_optional() {
        let raw = r#"{
            "output": {"message": {"role": "assistant", "content": [{"text": "ok"}]}},
            "usage": {"inputTokens": 3}
        }"#;
        let output: ConverseOutput = serde_json::from_str(raw).unwrap();
        let usage = output.usage.unwrap();
        assert_eq!(usage.input_tokens, 3);
        assert_eq!(usage.output_tokens, None);
        assert_eq!(usage.total_tokens, None);
        assert_eq!(output.stop_reason, None);
    }
}
