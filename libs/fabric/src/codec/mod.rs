use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub mod json;

pub use self::json::JsonCodec;

/// Codec trait for serializing and deserializing messages
pub trait Codec: Send + Sync {
    /// Encode a value into bytes
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    /// Decode bytes into a value
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;

    /// Encode a value into a text message
    fn encode_text<T: Serialize>(&self, value: &T) -> Result<String> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes).map_err(|e| crate::Error::Codec(e.to_string()))
    }

    /// Decode a text message into a value
    fn decode_text<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        self.decode(text.as_bytes())
    }
}
