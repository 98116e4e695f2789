use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use tether_core::CallDescriptor;
use tether_fabric::codec::{Codec, JsonCodec};
use tracing::{debug, warn};

use crate::channel::{acquire, ChannelHandle, Evaluator, PersistentChannel};
use crate::decode::{self, Remote};
use crate::error::Result;
use crate::registry::ProtocolConfig;
use crate::validate::{AcceptAll, Validator};

/// Everything a page needs to reach its remote runtime
///
/// Cheap to clone: the channel and validator are shared. Pages own one;
/// elements resolve their owning page's session instead of carrying one.
#[derive(Clone)]
pub struct Session {
    channel: ChannelHandle,
    validator: Rc<dyn Validator>,
    save_file: Rc<str>,
}

impl Session {
    pub fn new(channel: ChannelHandle) -> Self {
        Self {
            channel,
            validator: Rc::new(AcceptAll),
            save_file: ProtocolConfig::default().save_file_function.into(),
        }
    }

    /// Session over a persistent bidirectional channel
    pub fn persistent(channel: impl PersistentChannel + 'static) -> Self {
        Self::new(ChannelHandle::persistent(channel))
    }

    /// Session over an in-process evaluator
    pub fn direct(evaluator: impl Evaluator + 'static) -> Self {
        Self::new(ChannelHandle::direct(evaluator))
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Rc::new(validator);
        self
    }

    /// Apply protocol-wide settings
    pub fn with_config(mut self, config: &ProtocolConfig) -> Self {
        self.save_file = config.save_file_function.as_str().into();
        self
    }

    pub fn channel(&self) -> &ChannelHandle {
        &self.channel
    }

    pub fn validator(&self) -> &dyn Validator {
        &*self.validator
    }

    /// Remote function that streams an uploaded file back
    pub fn save_file_function(&self) -> &str {
        &self.save_file
    }

    /// Transmit `descriptor` and, when `expect_reply` is set, decode the answer
    ///
    /// Failures are logged and yield `None`.
    pub fn send(&self, descriptor: &CallDescriptor, expect_reply: bool) -> Option<Remote> {
        match &self.channel {
            ChannelHandle::Persistent(channel) => {
                let mut channel = acquire_or_log(&**channel)?;
                let raw = match exchange(&mut *channel, descriptor, expect_reply) {
                    Ok(Some(raw)) => raw,
                    Ok(None) => return None,
                    Err(e) => {
                        warn!(func = %descriptor.func, error = %e, "persistent exchange failed");
                        return None;
                    }
                };
                drop(channel);
                let envelope = decode::persistent_response(&raw, self.validator())?;
                decode::into_remote(envelope, self)
            }
            ChannelHandle::Direct(evaluator) => {
                let out = acquire_or_log(&**evaluator)?
                    .evaluate(&descriptor.func, &descriptor.kwargs);
                debug!(func = %descriptor.func, "sent signal");
                if !expect_reply {
                    if let Err(e) = out {
                        warn!(func = %descriptor.func, error = %e, "evaluator failed");
                    }
                    return None;
                }
                let envelope = match out {
                    Ok(raw) => decode::direct_response(&raw),
                    Err(e) => {
                        warn!(func = %descriptor.func, error = %e, "evaluator failed");
                        Default::default()
                    }
                };
                decode::into_remote(envelope, self)
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("channel", &self.channel)
            .field("save_file", &self.save_file)
            .finish_non_exhaustive()
    }
}

fn exchange(
    channel: &mut dyn PersistentChannel,
    descriptor: &CallDescriptor,
    expect_reply: bool,
) -> Result<Option<String>> {
    let text = JsonCodec.encode_text(descriptor)?;
    channel.send(&text)?;
    debug!(func = %descriptor.func, "sent signal");
    if !expect_reply {
        return Ok(None);
    }
    let raw = channel.receive()?;
    debug!(func = %descriptor.func, "data received");
    Ok(Some(raw))
}

fn acquire_or_log<T: ?Sized>(cell: &RefCell<T>) -> Option<RefMut<'_, T>> {
    acquire(cell)
        .map_err(|e| warn!(error = %e, "overlapping remote calls are not supported"))
        .ok()
}
