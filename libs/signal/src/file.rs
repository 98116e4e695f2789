use std::fmt;
use std::io::{self, Write};

use serde_json::Value;
use tether_core::{CallDescriptor, ChunkEnvelope, FileDescriptor, FileId};
use tether_fabric::codec::{Codec, JsonCodec};
use tracing::{debug, info, warn};

use crate::channel::{acquire, ChannelHandle};
use crate::decode;
use crate::session::Session;

/// An uploaded file held by the remote runtime
///
/// Only created from a `files` reply. Contents are pulled on demand through
/// [`RemoteFile::chunks`]; set [`is_binary`](Self::is_binary) first to get
/// bytes instead of decoded data.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub name: String,
    pub size: u64,
    pub mime: String,
    /// Milliseconds since the Unix epoch
    pub last_modified: u64,
    pub is_binary: bool,
    id: FileId,
    session: Session,
}

impl RemoteFile {
    pub(crate) fn new(descriptor: FileDescriptor, session: Session) -> Self {
        Self {
            name: descriptor.name,
            size: descriptor.size,
            mime: descriptor.mime,
            last_modified: descriptor.last_modified,
            is_binary: false,
            id: descriptor.id,
            session,
        }
    }

    pub fn id(&self) -> &FileId {
        &self.id
    }

    /// Call that asks the remote side to stream this file
    pub fn request(&self) -> CallDescriptor {
        CallDescriptor::new(self.session.save_file_function())
            .kwarg("file-id", &self.id)
            .kwarg("binary", self.is_binary)
    }

    /// Start a fresh retrieval of the file contents
    ///
    /// Nothing is sent until the first chunk is pulled. Each call starts a
    /// new round trip: iterating twice fetches the file twice.
    pub fn chunks(&self) -> Chunks {
        Chunks {
            session: self.session.clone(),
            request: self.request(),
            binary: self.is_binary,
            state: State::Idle,
        }
    }

    /// Write every chunk to `target`, flushing after each one
    pub fn save<W: Write>(&self, target: &mut W) -> io::Result<()> {
        for chunk in self.chunks() {
            chunk.write_to(target)?;
            target.flush()?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RemoteFile {
    type Item = Chunk;
    type IntoIter = Chunks;

    fn into_iter(self) -> Chunks {
        self.chunks()
    }
}

impl fmt::Display for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<File {}>", self.name)
    }
}

/// One piece of file content
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Data(Value),
    Bytes(Vec<u8>),
}

impl Chunk {
    fn write_to<W: Write>(&self, target: &mut W) -> io::Result<()> {
        match self {
            Self::Bytes(bytes) => target.write_all(bytes),
            Self::Data(Value::String(text)) => target.write_all(text.as_bytes()),
            Self::Data(Value::Null) => Ok(()),
            Self::Data(other) => target.write_all(other.to_string().as_bytes()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Streaming,
    Ended,
}

/// Lazy, forward-only sequence of file chunks
///
/// Ends after the chunk flagged `end`, or silently at the first message
/// that fails validation or decoding.
#[derive(Debug)]
pub struct Chunks {
    session: Session,
    request: CallDescriptor,
    binary: bool,
    state: State,
}

impl Chunks {
    fn pull(&mut self) -> Option<ChunkEnvelope> {
        match self.session.channel().clone() {
            ChannelHandle::Persistent(channel) => {
                let mut channel = acquire(&*channel)
                    .map_err(|e| warn!(error = %e, "file retrieval skipped"))
                    .ok()?;
                if self.state == State::Idle {
                    let text = JsonCodec
                        .encode_text(&self.request)
                        .map_err(|e| warn!(error = %e, "could not encode file request"))
                        .ok()?;
                    channel
                        .send(&text)
                        .map_err(|e| warn!(error = %e, "file request failed"))
                        .ok()?;
                    debug!(func = %self.request.func, "sent signal");
                    self.state = State::Streaming;
                }
                let raw = channel
                    .receive()
                    .map_err(|e| warn!(error = %e, "file stream interrupted"))
                    .ok()?;
                drop(channel);
                if !self.session.validator().validate(&raw) {
                    info!("data validation returned false; the data will not be used");
                    return None;
                }
                decode::chunk(&raw)
            }
            ChannelHandle::Direct(evaluator) => {
                let raw = acquire(&*evaluator)
                    .map_err(|e| warn!(error = %e, "file retrieval skipped"))
                    .ok()?
                    .evaluate(&self.request.func, &self.request.kwargs)
                    .map_err(|e| warn!(error = %e, "evaluator failed"))
                    .ok()?;
                debug!(func = %self.request.func, "sent signal");
                let envelope = decode::chunk(&raw)?;
                if !envelope.end {
                    warn!("evaluator payload not flagged as final; treating it as whole");
                }
                Some(ChunkEnvelope { end: true, ..envelope })
            }
        }
    }
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.state == State::Ended {
            return None;
        }

        let Some(envelope) = self.pull() else {
            self.state = State::Ended;
            return None;
        };
        self.state = if envelope.end {
            State::Ended
        } else {
            State::Streaming
        };

        if !self.binary {
            return Some(Chunk::Data(envelope.data));
        }
        match decode::to_bytes(&envelope.data) {
            Some(bytes) => Some(Chunk::Bytes(bytes)),
            None => {
                warn!("chunk has no byte form; passing it through as data");
                Some(Chunk::Data(envelope.data))
            }
        }
    }
}
