use serde::{Deserialize, Serialize};

use crate::context::{CallContext, Forwarding};
use crate::decode::Remote;
use crate::dispatch::Dispatcher;
use crate::mode::ForwardingMode;

/// Which value a wrapped call hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnPolicy {
    /// The method body's own return value; sends are fire-and-forget
    #[default]
    Local,
    /// The decoded remote reply; sends block for one inbound message
    Remote,
}

impl ReturnPolicy {
    pub fn expects_reply(self) -> bool {
        self == Self::Remote
    }
}

/// Outcome of a wrapped call
#[derive(Debug)]
pub enum Returned<R> {
    /// The method is registered as returning nothing
    Nothing,
    /// The body's value: the policy is local, or the call was not forwarded
    Local(R),
    /// The forwarded call's reply; `None` when it was unusable or absent
    Remote(Option<Remote>),
}

impl<R> Returned<R> {
    pub fn into_local(self) -> Option<R> {
        match self {
            Self::Local(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_remote(self) -> Option<Remote> {
        match self {
            Self::Remote(remote) => remote,
            _ => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

/// A method wrapped for remote forwarding
///
/// Obtained from [`Registry::signal`](crate::Registry::signal). The method
/// itself calls [`Signal::invoke`] with its body, so callers keep the
/// ordinary method signature.
pub struct Signal<O, A, R> {
    name: &'static str,
    policy: ReturnPolicy,
    returns_nothing: bool,
    dispatcher: Dispatcher<O, A, R>,
}

impl<O, A, R> Signal<O, A, R> {
    pub(crate) fn new(
        name: &'static str,
        policy: ReturnPolicy,
        returns_nothing: bool,
        dispatcher: Dispatcher<O, A, R>,
    ) -> Self {
        Self {
            name,
            policy,
            returns_nothing,
            dispatcher,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> ReturnPolicy {
        self.policy
    }
}

impl<O: Forwarding, A, R> Signal<O, A, R> {
    /// Run `body` on `object`, forwarding the call when the object asks for it
    ///
    /// In [`ForwardingMode::Local`] this is exactly `body(object, &args)`
    /// with no transport activity, whatever the return policy.
    pub fn invoke<F>(&self, object: &mut O, args: A, body: F) -> Returned<R>
    where
        F: FnOnce(&mut O, &A) -> R,
    {
        let original = match object.mode() {
            ForwardingMode::Remote => Some(object.clone()),
            ForwardingMode::Local => None,
        };

        let value = body(object, &args);

        let forwarded = original.map(|original| {
            let session = object.session();
            let context = CallContext {
                method: self.name,
                args: &args,
                return_value: &value,
                object: &*object,
                original: &original,
            };
            self.dispatcher
                .dispatch(&context, session.as_ref(), self.policy.expects_reply())
        });

        if self.returns_nothing {
            return Returned::Nothing;
        }
        match (self.policy, forwarded) {
            (ReturnPolicy::Remote, Some(remote)) => Returned::Remote(remote),
            _ => Returned::Local(value),
        }
    }
}
