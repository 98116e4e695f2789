use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use tether_fabric::codec::Codec;
use tether_fabric::BlockingChannel;

use crate::error::{Error, Result};

/// Bidirectional text channel with blocking send and receive
///
/// Strict request/response alternation is assumed: there are no
/// correlation ids, so only one call may be in flight at a time.
pub trait PersistentChannel {
    fn send(&mut self, text: &str) -> Result<()>;

    /// Block until the next inbound message arrives
    fn receive(&mut self) -> Result<String>;
}

impl<C: Codec> PersistentChannel for BlockingChannel<C> {
    fn send(&mut self, text: &str) -> Result<()> {
        Ok(self.send_text(text)?)
    }

    fn receive(&mut self) -> Result<String> {
        Ok(self.receive_text()?)
    }
}

/// Synchronous in-process entry point into an embedded remote runtime
///
/// The reply comes back from the call itself; there is no receive step.
pub trait Evaluator {
    fn evaluate(&mut self, func: &str, kwargs: &Map<String, Value>) -> Result<String>;
}

impl<F> Evaluator for F
where
    F: FnMut(&str, &Map<String, Value>) -> Result<String>,
{
    fn evaluate(&mut self, func: &str, kwargs: &Map<String, Value>) -> Result<String> {
        self(func, kwargs)
    }
}

/// Shared handle to whichever transport a page talks through
///
/// Owned by the page; elements and file handles hold clones.
#[derive(Clone)]
pub enum ChannelHandle {
    Persistent(Rc<RefCell<dyn PersistentChannel>>),
    Direct(Rc<RefCell<dyn Evaluator>>),
}

impl ChannelHandle {
    pub fn persistent(channel: impl PersistentChannel + 'static) -> Self {
        Self::Persistent(Rc::new(RefCell::new(channel)))
    }

    pub fn direct(evaluator: impl Evaluator + 'static) -> Self {
        Self::Direct(Rc::new(RefCell::new(evaluator)))
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }
}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistent(_) => f.write_str("ChannelHandle::Persistent"),
            Self::Direct(_) => f.write_str("ChannelHandle::Direct"),
        }
    }
}

/// Exclusive access to a shared transport for the duration of one exchange
pub(crate) fn acquire<T: ?Sized>(cell: &RefCell<T>) -> Result<RefMut<'_, T>> {
    cell.try_borrow_mut().map_err(|_| Error::Busy)
}
