use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::channel::Channel;
use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::transport::{
    TcpTransportBuilder, Transport, TransportListener, UnixTransport, UnixTransportBuilder,
};

/// Blocking facade over [`Channel`]
///
/// Every call stalls the calling thread until the transport completes. The
/// channel drives its own current-thread runtime, so it must not be used
/// from inside an async context.
pub struct BlockingChannel<C> {
    runtime: Runtime,
    channel: Channel<C>,
}

impl<C: Codec> BlockingChannel<C> {
    /// Connect with a transport produced by `connect`
    ///
    /// The transport is created on this channel's runtime, which its socket
    /// stays registered with for the channel's lifetime.
    pub fn connect<F, Fut, T>(codec: C, connect: F) -> Result<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
        T: Transport + 'static,
    {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let transport = runtime.block_on(connect())?;
        Ok(Self::from_transport(runtime, transport, codec))
    }

    /// Wrap a transport already registered with `runtime`
    pub fn from_transport<T>(runtime: Runtime, transport: T, codec: C) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            runtime,
            channel: Channel::from_transport(transport, codec),
        }
    }

    /// Wait for the remote side to connect to a listener produced by `bind`
    ///
    /// The first accepted connection becomes the channel; the listener is
    /// closed afterwards.
    pub fn accept<F, Fut, L>(codec: C, bind: F) -> Result<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<L>>,
        L: TransportListener,
        L::Transport: 'static,
    {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let transport = runtime.block_on(async {
            let mut listener = bind().await?;
            let transport = listener.accept().await?;
            listener.close().await?;
            debug!("remote side connected");
            Ok::<_, Error>(transport)
        })?;
        Ok(Self::from_transport(runtime, transport, codec))
    }

    /// Open a TCP channel with no timeouts
    pub fn tcp(addr: SocketAddr, codec: C) -> Result<Self> {
        Self::tcp_with(TcpTransportBuilder::new().address(addr), codec)
    }

    /// Open a TCP channel from a configured builder
    pub fn tcp_with(builder: TcpTransportBuilder, codec: C) -> Result<Self> {
        Self::connect(codec, || builder.connect())
    }

    /// Open a Unix socket channel with no timeouts
    pub fn unix(path: impl AsRef<Path>, codec: C) -> Result<Self> {
        Self::unix_with(UnixTransport::builder().path(path), codec)
    }

    /// Open a Unix socket channel from a configured builder
    pub fn unix_with(builder: UnixTransportBuilder, codec: C) -> Result<Self> {
        Self::connect(codec, || builder.connect())
    }

    /// Codec used for structured messages
    pub fn codec(&self) -> &C {
        self.channel.codec()
    }

    /// Send a message, blocking until it is written
    pub fn send<T: Serialize>(&mut self, message: &T) -> Result<()> {
        self.runtime.block_on(self.channel.send(message))
    }

    /// Block until the next message arrives and decode it
    pub fn receive<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.runtime.block_on(self.channel.receive())
    }

    /// Send an already encoded text message
    pub fn send_text(&mut self, text: &str) -> Result<()> {
        self.runtime.block_on(self.channel.send_text(text))
    }

    /// Block until the next message arrives and return it as raw text
    pub fn receive_text(&mut self) -> Result<String> {
        self.runtime.block_on(self.channel.receive_text())
    }

    /// Close the channel and shut its runtime down
    pub fn close(self) -> Result<()> {
        let Self { runtime, channel } = self;
        runtime.block_on(channel.close())?;
        debug!("blocking channel closed");
        Ok(())
    }
}
