//! Tether Fabric - framed transports and codecs for the remote UI link
//!
//! Provides length-prefixed transports (TCP, Unix sockets), a JSON codec
//! for structured text messages, and a blocking channel facade for callers
//! that run outside of an async runtime.
//!
//! # Example
//!
//! ```no_run
//! use tether_fabric::{BlockingChannel, codec::JsonCodec};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let addr = "127.0.0.1:8080".parse()?;
//! let mut channel = BlockingChannel::tcp(addr, JsonCodec)?;
//! channel.send_text(r#"{"func": "reload", "args": [], "kwargs": {}}"#)?;
//! let reply = channel.receive_text()?;
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod channel;
pub mod codec;
pub mod error;
pub mod transport;

// Re-exports for convenience
pub use blocking::BlockingChannel;
pub use channel::Channel;
pub use error::{Error, Result};
