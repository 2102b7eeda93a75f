use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;

use crate::bedrock::client::RuntimeError;

/// One decoded unit of a streamed response.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk document exactly as the model produced it.
    pub body: Value,
}

impl Chunk {
    /// Generated text fragment, when the document carries one.
    pub fn text(&self) -> Option<&str> {
        for field in ["completion", "outputText"] {
            if let Some(text) = self.body.get(field).and_then(Value::as_str) {
                return Some(text);
            }
        }
        None
    }
}

/// One event line on the wire; non-chunk events carry no `chunk` member.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    chunk: Option<EventChunk>,
}

#[derive(Debug, Deserialize)]
struct EventChunk {
    /// Base64 of the chunk JSON document.
    bytes: String,
}

/// Pull-based iterator over a streamed model response.
///
/// Owns the underlying HTTP response; dropping the stream closes the
/// connection. The sequence is finite and cannot be restarted; a new
/// call must be issued to replay it.
#[derive(Debug)]
pub struct ChunkStream {
    response: reqwest::Response,
    buffer: Vec<u8>,
    done: bool,
}

impl ChunkStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Waits for the next chunk.
    ///
    /// Returns `None` once the remote side closes the stream. Event
    /// lines without a chunk payload are skipped.
    pub async fn next(&mut self) -> Option<Result<Chunk, RuntimeError>> {
        loop {
            while let Some(line) = take_line(&mut self.buffer) {
                match decode_event_line(&line) {
                    Ok(Some(chunk)) => return Some(Ok(chunk)),
                    Ok(None) => {}
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                }
            }

            if self.done {
                if self.buffer.is_empty() {
                    return None;
                }
                // Final line without a trailing newline.
                let line = std::mem::take(&mut self.buffer);
                return match decode_event_line(&line) {
                    Ok(Some(chunk)) => Some(Ok(chunk)),
                    Ok(None) => None,
                    Err(err) => Some(Err(err)),
                };
            }

            match self.response.chunk().await {
                Ok(Some(bytes)) => self.buffer.extend_from_slice(&bytes),
                Ok(None) => self.done = true,
                Err(source) => {
                    self.done = true;
                    self.buffer.clear();
                    return Some(Err(RuntimeError::Request { source }));
                }
            }
        }
    }
}

fn take_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let pos = buffer.iter().position(|&byte| byte == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=pos).collect();
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Some(line)
}

fn decode_event_line(line: &[u8]) -> Result<Option<Chunk>, RuntimeError> {
    if line.iter().all(|byte| byte.is_ascii_whitespace()) {
        return Ok(None);
    }
    let envelope: EventEnvelope =
        serde_json::from_slice(line).map_err(|err| RuntimeError::Malformed {
            detail: format!("event line is not valid JSON: {err}"),
        })?;
    let Some(chunk) = envelope.chunk else {
        return Ok(None);
    };
    let raw = STANDARD
        .decode(chunk.bytes.as_bytes())
        .map_err(|err| RuntimeError::Malformed {
            detail: format!("chunk bytes are not valid base64: {err}"),
        })?;
    let body = serde_json::from_slice(&raw).map_err(|err| RuntimeError::Malformed {
        detail: format!("chunk payload is not valid JSON: {err}"),
    })?;
    Ok(Some(Chunk { body }))
}
