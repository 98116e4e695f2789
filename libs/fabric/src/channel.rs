use std::net::SocketAddr;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::transport::{TcpTransport, Transport, UnixTransport};

/// High-level channel for bidirectional communication
///
/// Combines a transport and codec for persistent connections. Frames carry
/// UTF-8 text, so structured messages and pre-encoded text share the wire.
pub struct Channel<C> {
    transport: Box<dyn Transport>,
    codec: C,
}

impl<C: Codec> Channel<C> {
    /// Create a channel from an existing transport
    pub fn from_transport(transport: impl Transport + 'static, codec: C) -> Self {
        Self {
            transport: Box::new(transport),
            codec,
        }
    }

    /// Open a TCP channel
    pub async fn tcp(addr: SocketAddr, codec: C) -> Result<Self> {
        let transport = TcpTransport::connect(addr).await?;
        Ok(Self::from_transport(transport, codec))
    }

    /// Open a Unix socket channel
    pub async fn unix(path: impl AsRef<Path>, codec: C) -> Result<Self> {
        let transport = UnixTransport::connect(path).await?;
        Ok(Self::from_transport(transport, codec))
    }

    /// Codec used for structured messages
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Send a message over the channel
    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let text = self.codec.encode_text(message)?;
        self.send_text(&text).await
    }

    /// Receive a message from the channel
    pub async fn receive<T: DeserializeOwned>(&mut self) -> Result<T> {
        let text = self.receive_text().await?;
        self.codec.decode_text(&text)
    }

    /// Send an already encoded text message
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.transport.send(text.as_bytes()).await
    }

    /// Receive the next message as raw text, without decoding it
    pub async fn receive_text(&mut self) -> Result<String> {
        let bytes = self.transport.receive().await?;
        String::from_utf8(bytes).map_err(|e| Error::InvalidFrame(e.to_string()))
    }

    /// Close the channel
    pub async fn close(mut self) -> Result<()> {
        self.transport.close().await
    }
}
