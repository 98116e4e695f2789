//! Tether Signal - remote invocation disguised as local method calls
//!
//! A [`Signal`] wraps a method body. While the invoking object is in
//! [`ForwardingMode::Remote`], every call also runs the method's registered
//! [`SignalBuilder`], ships the resulting [`CallDescriptor`] over the
//! object's [`Session`] and, for [`ReturnPolicy::Remote`] methods, decodes
//! the reply into a [`Remote`] value or a set of streamable [`RemoteFile`]s.
//!
//! Transport and decoding failures never reach the caller: they are logged
//! and the call simply produces no remote result.

pub mod builder;
pub mod channel;
pub mod context;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod file;
pub mod interceptor;
pub mod mode;
pub mod registry;
pub mod session;
pub mod validate;

pub use builder::SignalBuilder;
pub use channel::{ChannelHandle, Evaluator, PersistentChannel};
pub use context::{CallContext, Forwarding};
pub use decode::Remote;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use file::{Chunk, Chunks, RemoteFile};
pub use interceptor::{ReturnPolicy, Returned, Signal};
pub use mode::ForwardingMode;
pub use registry::{ProtocolConfig, Registry};
pub use session::Session;
pub use validate::{AcceptAll, Validator};

pub use tether_core::{CallDescriptor, FileId};
