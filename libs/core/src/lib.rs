//! Tether Core - wire contract shared by every tether crate
//!
//! Defines the messages exchanged with a remote UI runtime: outbound call
//! descriptors, ordinary responses, streamed file chunks and the file
//! listings carried by `files` responses.

pub mod error;
pub mod wire;

pub use error::{Error, Result};
pub use wire::{CallDescriptor, ChunkEnvelope, FileDescriptor, FileId, ResponseEnvelope};
