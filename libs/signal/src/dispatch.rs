use tracing::debug;

use crate::builder::SignalBuilder;
use crate::context::CallContext;
use crate::decode::Remote;
use crate::session::Session;

/// Runs a method's signal-builder and hands the result to the session
pub struct Dispatcher<O, A, R> {
    builder: Option<Box<dyn SignalBuilder<O, A, R>>>,
}

impl<O, A, R> Dispatcher<O, A, R> {
    pub(crate) fn new(builder: Option<Box<dyn SignalBuilder<O, A, R>>>) -> Self {
        Self { builder }
    }

    pub fn has_builder(&self) -> bool {
        self.builder.is_some()
    }

    /// Build and send the remote call for one intercepted invocation
    ///
    /// No builder, an empty descriptor or no reachable session all mean
    /// nothing is transmitted.
    pub fn dispatch(
        &self,
        context: &CallContext<'_, O, A, R>,
        session: Option<&Session>,
        expect_reply: bool,
    ) -> Option<Remote> {
        let builder = self.builder.as_ref()?;
        let descriptor = builder
            .build(context)
            .filter(|descriptor| !descriptor.func.is_empty());
        let Some(descriptor) = descriptor else {
            debug!(method = context.method, "signal-builder opted out");
            return None;
        };
        let Some(session) = session else {
            debug!(method = context.method, "no channel reachable; call stays local");
            return None;
        };
        session.send(&descriptor, expect_reply)
    }
}
