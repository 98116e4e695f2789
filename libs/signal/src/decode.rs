use serde_json::Value;
use tether_core::{ChunkEnvelope, ResponseEnvelope};
use tether_fabric::codec::{Codec, JsonCodec};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::file::RemoteFile;
use crate::session::Session;
use crate::validate::Validator;

/// Decoded result of a forwarded call
#[derive(Debug)]
pub enum Remote {
    Value(Value),
    Files(Vec<RemoteFile>),
}

impl Remote {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Files(_) => None,
        }
    }

    pub fn into_files(self) -> Option<Vec<RemoteFile>> {
        match self {
            Self::Files(files) => Some(files),
            Self::Value(_) => None,
        }
    }
}

/// Validate then decode a reply read from a persistent channel
///
/// Rejected or unrecognised replies are dropped.
pub(crate) fn persistent_response(
    raw: &str,
    validator: &dyn Validator,
) -> Option<ResponseEnvelope> {
    if !validator.validate(raw) {
        info!("data validation returned false; the data will not be used");
        return None;
    }
    match envelope(raw) {
        Ok(envelope) => {
            debug!(kind = kind(&envelope), "decoded response");
            Some(envelope)
        }
        Err(e) => {
            warn!(error = %e, "discarding unrecognised response");
            None
        }
    }
}

/// Decode an evaluator reply, falling back to `{data: None}`
pub(crate) fn direct_response(raw: &str) -> ResponseEnvelope {
    envelope(raw).unwrap_or_else(|e| {
        debug!(error = %e, "evaluator reply is not a response envelope");
        ResponseEnvelope::default()
    })
}

/// Turn a reply into the caller-facing result
///
/// File handles stay bound to `session` for chunk retrieval.
pub(crate) fn into_remote(envelope: ResponseEnvelope, session: &Session) -> Option<Remote> {
    match envelope {
        ResponseEnvelope::Value { data: Value::Null } => None,
        ResponseEnvelope::Value { data } => Some(Remote::Value(data)),
        ResponseEnvelope::Files { data } => Some(Remote::Files(
            data.into_iter()
                .map(|descriptor| RemoteFile::new(descriptor, session.clone()))
                .collect(),
        )),
    }
}

/// Decode one streamed chunk; `None` when the text is not a chunk
pub(crate) fn chunk(raw: &str) -> Option<ChunkEnvelope> {
    JsonCodec
        .decode_text(raw)
        .map_err(|e| warn!(error = %e, "discarding malformed chunk"))
        .ok()
}

/// Byte form of chunk data
///
/// Arrays of octets map to themselves, strings to their UTF-8 bytes and
/// `null` to nothing; other shapes have no byte form.
pub(crate) fn to_bytes(data: &Value) -> Option<Vec<u8>> {
    match data {
        Value::Null => Some(Vec::new()),
        Value::String(text) => Some(text.as_bytes().to_vec()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect(),
        _ => None,
    }
}

/// Parse a reply, logging the keys it carries
fn envelope(raw: &str) -> Result<ResponseEnvelope> {
    let value: Value = JsonCodec.decode_text(raw)?;
    if let Some(fields) = value.as_object() {
        debug!(keys = ?fields.keys().collect::<Vec<_>>(), "reply keys");
    }
    Ok(serde_json::from_value(value).map_err(tether_core::Error::from)?)
}

fn kind(envelope: &ResponseEnvelope) -> &'static str {
    match envelope {
        ResponseEnvelope::Value { .. } => "value",
        ResponseEnvelope::Files { .. } => "files",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::AcceptAll;
    use serde_json::json;

    #[test]
    fn rejected_reply_is_dropped_before_decoding() {
        let reject = |_: &str| false;
        assert!(persistent_response(r#"{"type":"value","data":1}"#, &reject).is_none());
    }

    #[test]
    fn reply_without_kind_is_dropped() {
        assert!(persistent_response(r#"{"data":1}"#, &AcceptAll).is_none());
    }

    #[test]
    fn other_kinds_decode_as_values() {
        assert_eq!(
            persistent_response(r#"{"type":"blob","data":1}"#, &AcceptAll),
            Some(ResponseEnvelope::Value { data: json!(1) })
        );
        assert_eq!(
            direct_response(r#"{"type":"text","data":"42"}"#),
            ResponseEnvelope::Value { data: json!("42") }
        );
    }

    #[test]
    fn garbage_from_evaluator_becomes_empty_value() {
        assert_eq!(direct_response("<html>"), ResponseEnvelope::Value { data: Value::Null });
        assert_eq!(direct_response(""), ResponseEnvelope::default());
    }

    #[test]
    fn evaluator_value_passes_through() {
        assert_eq!(
            direct_response(r#"{"type":"value","data":"ok"}"#),
            ResponseEnvelope::Value { data: json!("ok") }
        );
    }

    #[test]
    fn byte_forms() {
        assert_eq!(to_bytes(&json!("a")), Some(b"a".to_vec()));
        assert_eq!(to_bytes(&json!([0, 127, 255])), Some(vec![0, 127, 255]));
        assert_eq!(to_bytes(&Value::Null), Some(Vec::new()));
        assert_eq!(to_bytes(&json!([256])), None);
        assert_eq!(to_bytes(&json!({"a": 1})), None);
    }

    #[test]
    fn malformed_chunk_is_none() {
        assert!(chunk("nope").is_none());
        let parsed = chunk(r#"{"data":"b","end":true}"#).unwrap();
        assert!(parsed.end);
    }
}
