use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::debug;

use crate::builder::SignalBuilder;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::interceptor::{ReturnPolicy, Signal};

/// Protocol-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Methods whose wrapped call returns nothing
    pub no_return: BTreeSet<String>,
    /// Private (`_`-prefixed) methods allowed to carry a signal-builder
    pub included_private: BTreeSet<String>,
    /// Remote function that streams an uploaded file back
    pub save_file_function: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            no_return: BTreeSet::new(),
            included_private: BTreeSet::from(["_open_another_page".to_string()]),
            save_file_function: "_saveFile".to_string(),
        }
    }
}

impl ProtocolConfig {
    /// Parse settings from JSON; missing keys keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Core(e.into()))
    }

    /// Whether `name` may be paired with a signal-builder
    pub fn is_exposed(&self, name: &str) -> bool {
        !name.starts_with('_') || self.included_private.contains(name)
    }
}

/// Explicit pairing of wrapped methods with their signal-builders
///
/// Each method name can be registered once.
#[derive(Debug, Default)]
pub struct Registry {
    config: ProtocolConfig,
    registered: BTreeSet<&'static str>,
}

impl Registry {
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            registered: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains(name)
    }

    /// Wrap method `name`, forwarding through `builder`
    ///
    /// Private names must be listed in `included_private`.
    pub fn signal<O, A, R, B>(
        &mut self,
        name: &'static str,
        policy: ReturnPolicy,
        builder: B,
    ) -> Result<Signal<O, A, R>>
    where
        B: SignalBuilder<O, A, R> + 'static,
    {
        if !self.config.is_exposed(name) {
            return Err(Error::Registration(format!(
                "private method `{name}` is not in included_private"
            )));
        }
        let builder: Box<dyn SignalBuilder<O, A, R>> = Box::new(builder);
        self.register(name, policy, Some(builder))
    }

    /// Wrap method `name` without a signal-builder; it never forwards
    pub fn local<O, A, R>(
        &mut self,
        name: &'static str,
        policy: ReturnPolicy,
    ) -> Result<Signal<O, A, R>> {
        self.register(name, policy, None)
    }

    fn register<O, A, R>(
        &mut self,
        name: &'static str,
        policy: ReturnPolicy,
        builder: Option<Box<dyn SignalBuilder<O, A, R>>>,
    ) -> Result<Signal<O, A, R>> {
        if !self.registered.insert(name) {
            return Err(Error::Registration(format!(
                "method `{name}` is already registered"
            )));
        }
        let returns_nothing = self.config.no_return.contains(name);
        debug!(method = name, ?policy, returns_nothing, "registered signal");
        Ok(Signal::new(name, policy, returns_nothing, Dispatcher::new(builder)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_remote_runtime() {
        let config = ProtocolConfig::default();
        assert_eq!(config.save_file_function, "_saveFile");
        assert!(config.is_exposed("set_content"));
        assert!(config.is_exposed("_open_another_page"));
        assert!(!config.is_exposed("_internal"));
    }

    #[test]
    fn json_overrides_only_given_keys() {
        let config = ProtocolConfig::from_json(r#"{"no_return": ["close"]}"#).unwrap();
        assert!(config.no_return.contains("close"));
        assert_eq!(config.save_file_function, "_saveFile");
        assert!(config.included_private.contains("_open_another_page"));
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(
            ProtocolConfig::from_json("{"),
            Err(Error::Core(tether_core::Error::Serialization(_)))
        ));
    }
}
