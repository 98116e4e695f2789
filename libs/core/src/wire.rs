use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outbound remote call: `{"func": .., "args": [..], "kwargs": {..}}`
///
/// Produced by signal-builders, never by the interceptor itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallDescriptor {
    pub func: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl CallDescriptor {
    /// Create a descriptor for `func` with no arguments
    pub fn new(func: impl Into<String>) -> Self {
        Self {
            func: func.into(),
            args: Vec::new(),
            kwargs: Map::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a keyword argument
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}

/// Inbound reply to an ordinary call
///
/// The `type` tag must be present. `files` carries a file listing; every
/// other kind is a plain value whose `data` is passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", try_from = "TaggedData")]
pub enum ResponseEnvelope {
    Value {
        #[serde(default)]
        data: Value,
    },
    Files {
        data: Vec<FileDescriptor>,
    },
}

impl Default for ResponseEnvelope {
    /// `{data: None}`, the stand-in for an undecodable reply
    fn default() -> Self {
        Self::Value { data: Value::Null }
    }
}

/// Wire shape every reply shares before its kind is inspected
#[derive(Deserialize)]
struct TaggedData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl TryFrom<TaggedData> for ResponseEnvelope {
    type Error = serde_json::Error;

    fn try_from(raw: TaggedData) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "files" => Ok(Self::Files {
                data: serde_json::from_value(raw.data)?,
            }),
            _ => Ok(Self::Value { data: raw.data }),
        }
    }
}

/// One piece of a streamed file: `{"data": .., "end": bool}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChunkEnvelope {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub end: bool,
}

/// Metadata of one uploaded file as listed by a `files` reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime: String,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "last-modified")]
    pub last_modified: u64,
    #[serde(rename = "file-id")]
    pub id: FileId,
}

/// Opaque identifier the remote side assigns to an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileId {
    Number(u64),
    Text(String),
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for FileId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&FileId> for Value {
    fn from(id: &FileId) -> Self {
        match id {
            FileId::Number(n) => Value::from(*n),
            FileId::Text(s) => Value::from(s.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_builder_fills_args_and_kwargs() {
        let descriptor = CallDescriptor::new("setContent")
            .arg("main")
            .kwarg("content", "<p>hi</p>");

        let wire = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            wire,
            json!({"func": "setContent", "args": ["main"], "kwargs": {"content": "<p>hi</p>"}})
        );
    }

    #[test]
    fn descriptor_tolerates_missing_arg_lists() {
        let descriptor: CallDescriptor = serde_json::from_str(r#"{"func": "reload"}"#).unwrap();
        assert_eq!(descriptor, CallDescriptor::new("reload"));
    }

    #[test]
    fn value_response_decodes() {
        let response: ResponseEnvelope =
            serde_json::from_str(r#"{"type": "value", "data": [1, 2]}"#).unwrap();
        assert_eq!(response, ResponseEnvelope::Value { data: json!([1, 2]) });
    }

    #[test]
    fn files_response_uses_wire_field_names() {
        let raw = r#"{
            "type": "files",
            "data": [
                {"name": "a.txt", "size": 3, "type": "text/plain", "last-modified": 1700000000000, "file-id": 0},
                {"name": "b.png", "size": 10, "type": "image/png", "last-modified": 1, "file-id": "x7"}
            ]
        }"#;

        let ResponseEnvelope::Files { data } =
            serde_json::from_str::<ResponseEnvelope>(raw).unwrap()
        else {
            panic!("expected a files response");
        };
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].mime, "text/plain");
        assert_eq!(data[0].last_modified, 1_700_000_000_000);
        assert_eq!(data[0].id, FileId::Number(0));
        assert_eq!(data[1].id, FileId::from("x7"));
    }

    #[test]
    fn response_without_type_is_rejected() {
        assert!(serde_json::from_str::<ResponseEnvelope>(r#"{"data": 1}"#).is_err());
    }

    #[test]
    fn other_kinds_pass_data_through() {
        let response: ResponseEnvelope =
            serde_json::from_str(r#"{"type": "text", "data": "42"}"#).unwrap();
        assert_eq!(response, ResponseEnvelope::Value { data: json!("42") });
    }

    #[test]
    fn files_response_with_bad_listing_is_rejected() {
        let raw = r#"{"type": "files", "data": [{"name": "a.txt"}]}"#;
        assert!(serde_json::from_str::<ResponseEnvelope>(raw).is_err());
    }

    #[test]
    fn chunk_defaults_to_open_null() {
        let chunk: ChunkEnvelope = serde_json::from_str("{}").unwrap();
        assert_eq!(chunk.data, Value::Null);
        assert!(!chunk.end);
    }

    #[test]
    fn file_id_converts_to_json() {
        assert_eq!(Value::from(&FileId::Number(4)), json!(4));
        assert_eq!(Value::from(&FileId::from("f")), json!("f"));
        assert_eq!(FileId::from("f").to_string(), "f");
    }
}
