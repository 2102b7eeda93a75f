use serde::{Deserialize, Serialize};

/// Titan embedding request body; `inputText` is the provider contract field.
#[derive(Debug, Serialize)]
pub(crate) struct TitanEmbedRequest<'a> {
    #[serde(rename = "inputText")]
    pub input_text: &'a str,
}

/// Embedding returned by a Titan-style text embedding model.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedOutput {
    /// Dense vector representation of the input text.
    pub embedding: Vec<f64>,
    /// Number of tokens the model counted in the input.
    #[serde(rename = "inputTextTokenCount")]
    pub input_text_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::{EmbedOutput, TitanEmbedRequest};

    #[test]
    fn request_serializes_with_provider_field_name() {
        let body = serde_json::to_value(TitanEmbedRequest {
            input_text: "What are the different services that you offer?",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"inputText": "What are the different services that you offer?"})
        );
    }

    #[test]
    fn output_deserializes_embedding_and_token_count() {
        let output: EmbedOutput = serde_json::from_str(
            r#"{"embedding": [0.1, 0.2], "inputTextTokenCount": 1}"#,
        )
        .unwrap();
        assert_eq!(output.embedding, vec![0.1, 0.2]);
        assert_eq!(output.input_text_token_count, 1);
    }
}
