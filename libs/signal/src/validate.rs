/// Gate applied to every raw message read from a persistent channel
///
/// `false` means "discard, do not use"; it never triggers a retry.
pub trait Validator {
    fn validate(&self, raw: &str) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&str) -> bool,
{
    fn validate(&self, raw: &str) -> bool {
        self(raw)
    }
}

/// Validator that trusts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _raw: &str) -> bool {
        true
    }
}
