use tether_core::CallDescriptor;

use crate::context::CallContext;

/// Builds the remote call paired with a wrapped method
///
/// Returning `None` (or a descriptor with an empty `func`) keeps that one
/// call local even while forwarding is on.
pub trait SignalBuilder<O, A, R> {
    fn build(&self, context: &CallContext<'_, O, A, R>) -> Option<CallDescriptor>;
}

impl<O, A, R, F> SignalBuilder<O, A, R> for F
where
    F: Fn(&CallContext<'_, O, A, R>) -> Option<CallDescriptor>,
{
    fn build(&self, context: &CallContext<'_, O, A, R>) -> Option<CallDescriptor> {
        self(context)
    }
}
