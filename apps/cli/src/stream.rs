//! Incremental decode loop for the analysis response body.
//!
//! The service sends unframed UTF-8 Markdown in arbitrary chunks. Chunk
//! boundaries can fall inside a multi-byte character, so undecodable tails are
//! carried over to the next chunk instead of being replaced.

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::errors::ClientError;

const REPLACEMENT: char = '\u{FFFD}';

/// Streaming UTF-8 decoder: feed chunks, get back whatever text is complete.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    /// Decodes `chunk` together with any bytes held back from the previous call.
    /// Invalid sequences become U+FFFD; an incomplete trailing sequence is kept.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(REPLACEMENT);
                            rest = &tail[bad..];
                        }
                        None => {
                            self.pending = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Ends the stream. A dangling partial sequence decodes to a single U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT.to_string()
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Reads chunks until the stream ends, handing each decoded piece to `on_chunk`
/// and returning the concatenation.
///
/// The first transport error ends the loop. A body that ends without a single
/// byte is reported as `EmptyResponse`.
pub async fn accumulate<S, E, F>(stream: S, mut on_chunk: F) -> Result<String, ClientError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
    F: FnMut(&str),
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = Utf8ChunkDecoder::default();
    let mut output = String::new();
    let mut received = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ClientError::Stream(e.to_string()))?;
        received += chunk.len();

        let text = decoder.decode(&chunk);
        if !text.is_empty() {
            on_chunk(&text);
            output.push_str(&text);
        }
    }

    if decoder.has_pending() {
        tracing::warn!("Response ended inside a UTF-8 sequence");
        let tail = decoder.finish();
        on_chunk(&tail);
        output.push_str(&tail);
    }

    if received == 0 {
        return Err(ClientError::EmptyResponse);
    }
    tracing::debug!("Stream complete: {received} bytes, {} chars", output.chars().count());
    Ok(output)
}
