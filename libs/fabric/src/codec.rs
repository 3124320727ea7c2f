use bazaar_core::protocol::MAX_DATAGRAM;

use crate::error::{Error, Result};

/// Text codec for the whitespace-token wire format
///
/// One message per datagram, no length prefix: the datagram size is the
/// message length.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl TextCodec {
    /// Encode a message, refusing anything that won't fit in one datagram
    pub fn encode(&self, message: &str) -> Result<Vec<u8>> {
        let bytes = message.as_bytes();
        if bytes.len() > MAX_DATAGRAM {
            return Err(Error::PayloadTooLarge(bytes.len()));
        }
        Ok(bytes.to_vec())
    }

    /// Decode a datagram payload into trimmed text
    ///
    /// Returns `None` for empty or non-UTF-8 payloads.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        let text = std::str::from_utf8(bytes).ok()?;
        let text = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}
