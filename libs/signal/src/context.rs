use serde::Serialize;
use serde_json::{Map, Value};

use crate::mode::ForwardingMode;
use crate::session::Session;

/// An object whose methods can be wrapped by a [`Signal`](crate::Signal)
///
/// Snapshots taken before a forwarded call are plain clones, so `Clone`
/// should stay shallow (shared handles, not deep copies).
pub trait Forwarding: Clone {
    /// Current forwarding mode of this instance
    fn mode(&self) -> ForwardingMode;

    /// Session to forward through, if any is reachable
    ///
    /// A page returns its own session; an element returns its owning
    /// page's.
    fn session(&self) -> Option<Session>;
}

/// What a signal-builder sees of one intercepted call
///
/// Lives only for the duration of the dispatch.
#[derive(Debug)]
pub struct CallContext<'a, O, A, R> {
    /// Name the method was registered under
    pub method: &'static str,
    /// Bound arguments, defaults applied
    pub args: &'a A,
    /// What the method body returned locally
    pub return_value: &'a R,
    /// The invoking object, after the body ran
    pub object: &'a O,
    /// The invoking object as it was before the body ran
    pub original: &'a O,
}

impl<O, A: Serialize, R> CallContext<'_, O, A, R> {
    /// Bound arguments as a keyword map
    ///
    /// `None` unless `A` serializes to a JSON object.
    pub fn kwargs(&self) -> Option<Map<String, Value>> {
        match serde_json::to_value(self.args) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}
