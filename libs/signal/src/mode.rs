use serde::{Deserialize, Serialize};

/// Whether calls on an object are mirrored to the remote runtime
///
/// Checked once at the top of every wrapped call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardingMode {
    /// Run the method body only
    #[default]
    Local,
    /// Run the body, then forward the call
    Remote,
}

impl ForwardingMode {
    pub fn is_remote(self) -> bool {
        self == Self::Remote
    }
}
