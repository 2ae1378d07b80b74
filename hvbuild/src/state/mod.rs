//! Per-build state shared between steps.
//!
//! ## Architecture
//!
//! ```text
//! StateBag: StateKey → StateValue
//!
//! vmName  → VmName(String)          produced before VM creation
//! driver  → Driver(Arc<dyn Driver>) produced by the builder
//! config  → Config(BuildConfig)     produced by prepare, mutated by steps
//! ui      → Ui(Arc<dyn Ui>)         produced by the builder
//! error   → Error(HvbuildError)     written by whichever step halts
//! ```
//!
//! The bag is owned by the runner and lent to each step as `&mut StateBag`.
//! Nothing is removed implicitly: a value written by one step is visible to
//! every later step and to the address resolvers.
//!
//! Typed accessors fail with `MissingKey` when a key was never written and
//! `WrongKind` when a key holds a value of another kind.

use std::collections::BTreeMap;
use std::sync::Arc;

use hvbuild_shared::errors::{HvbuildError, HvbuildResult};

use crate::config::BuildConfig;
use crate::driver::Driver;
use crate::ui::Ui;

/// Well-known state keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    VmName,
    Driver,
    Config,
    Ui,
    /// Terminal error of a halted pipeline.
    Error,
}

impl StateKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::VmName => "vmName",
            StateKey::Driver => "driver",
            StateKey::Config => "config",
            StateKey::Ui => "ui",
            StateKey::Error => "error",
        }
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values that can live in the bag.
pub enum StateValue {
    VmName(String),
    Driver(Arc<dyn Driver>),
    Config(Box<BuildConfig>),
    Ui(Arc<dyn Ui>),
    Error(HvbuildError),
}

impl StateValue {
    /// Human-readable kind, used in `WrongKind` errors.
    pub fn kind(&self) -> &'static str {
        match self {
            StateValue::VmName(_) => "vm name",
            StateValue::Driver(_) => "driver",
            StateValue::Config(_) => "build config",
            StateValue::Ui(_) => "ui",
            StateValue::Error(_) => "error",
        }
    }
}

impl std::fmt::Debug for StateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateValue::VmName(name) => f.debug_tuple("VmName").field(name).finish(),
            StateValue::Config(config) => f.debug_tuple("Config").field(config).finish(),
            StateValue::Error(err) => f.debug_tuple("Error").field(err).finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

#[derive(Debug, Default)]
pub struct StateBag {
    entries: BTreeMap<StateKey, StateValue>,
}

impl StateBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing whatever the key held before.
    pub fn put(&mut self, key: StateKey, value: StateValue) {
        tracing::trace!(key = %key, kind = value.kind(), "state put");
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: StateKey) -> Option<&StateValue> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: StateKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = StateKey> + '_ {
        self.entries.keys().copied()
    }

    // ========================================================================
    // TYPED ACCESSORS
    // ========================================================================

    pub fn put_vm_name(&mut self, vm_name: impl Into<String>) {
        self.put(StateKey::VmName, StateValue::VmName(vm_name.into()));
    }

    pub fn put_driver(&mut self, driver: Arc<dyn Driver>) {
        self.put(StateKey::Driver, StateValue::Driver(driver));
    }

    pub fn put_config(&mut self, config: BuildConfig) {
        self.put(StateKey::Config, StateValue::Config(Box::new(config)));
    }

    pub fn put_ui(&mut self, ui: Arc<dyn Ui>) {
        self.put(StateKey::Ui, StateValue::Ui(ui));
    }

    pub fn put_error(&mut self, err: HvbuildError) {
        self.put(StateKey::Error, StateValue::Error(err));
    }

    pub fn vm_name(&self) -> HvbuildResult<&str> {
        match self.require(StateKey::VmName)? {
            StateValue::VmName(name) => Ok(name.as_str()),
            other => Err(wrong_kind(StateKey::VmName, "vm name", other)),
        }
    }

    pub fn driver(&self) -> HvbuildResult<Arc<dyn Driver>> {
        match self.require(StateKey::Driver)? {
            StateValue::Driver(driver) => Ok(Arc::clone(driver)),
            other => Err(wrong_kind(StateKey::Driver, "driver", other)),
        }
    }

    pub fn config(&self) -> HvbuildResult<&BuildConfig> {
        match self.require(StateKey::Config)? {
            StateValue::Config(config) => Ok(config.as_ref()),
            other => Err(wrong_kind(StateKey::Config, "build config", other)),
        }
    }

    pub fn config_mut(&mut self) -> HvbuildResult<&mut BuildConfig> {
        match self.entries.get_mut(&StateKey::Config) {
            Some(StateValue::Config(config)) => Ok(config.as_mut()),
            Some(other) => Err(wrong_kind(StateKey::Config, "build config", other)),
            None => Err(HvbuildError::MissingKey(StateKey::Config.as_str())),
        }
    }

    pub fn ui(&self) -> HvbuildResult<Arc<dyn Ui>> {
        match self.require(StateKey::Ui)? {
            StateValue::Ui(ui) => Ok(Arc::clone(ui)),
            other => Err(wrong_kind(StateKey::Ui, "ui", other)),
        }
    }

    /// The recorded terminal error, if a step halted.
    pub fn error(&self) -> Option<&HvbuildError> {
        match self.entries.get(&StateKey::Error) {
            Some(StateValue::Error(err)) => Some(err),
            _ => None,
        }
    }

    fn require(&self, key: StateKey) -> HvbuildResult<&StateValue> {
        self.entries
            .get(&key)
            .ok_or(HvbuildError::MissingKey(key.as_str()))
    }
}

fn wrong_kind(key: StateKey, expected: &'static str, found: &StateValue) -> HvbuildError {
    HvbuildError::WrongKind {
        key: key.as_str(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingUi, StubDriver};

    #[test]
    fn test_typed_round_trip() {
        let mut state = StateBag::new();
        state.put_vm_name("build-vm");
        state.put_driver(Arc::new(StubDriver::default()));
        state.put_ui(Arc::new(RecordingUi::default()));

        assert_eq!(state.vm_name().unwrap(), "build-vm");
        assert!(state.driver().is_ok());
        assert!(state.ui().is_ok());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_missing_key() {
        let state = StateBag::new();
        assert_eq!(
            state.vm_name().unwrap_err(),
            HvbuildError::MissingKey("vmName")
        );
        assert!(matches!(
            state.config().unwrap_err(),
            HvbuildError::MissingKey("config")
        ));
    }

    #[test]
    fn test_wrong_kind() {
        let mut state = StateBag::new();
        state.put(StateKey::VmName, StateValue::Error(HvbuildError::Cancelled));

        let err = state.vm_name().unwrap_err();
        assert_eq!(
            err,
            HvbuildError::WrongKind {
                key: "vmName",
                expected: "vm name",
                found: "error",
            }
        );
    }

    #[test]
    fn test_config_mut_writes_in_place() {
        let mut state = StateBag::new();
        state.put_config(BuildConfig::default());

        state.config_mut().unwrap().generation = 2;

        assert_eq!(state.config().unwrap().generation, 2);
    }

    #[test]
    fn test_keys_are_ordered() {
        let mut state = StateBag::new();
        state.put_error(HvbuildError::Cancelled);
        state.put_vm_name("vm");
        state.put_config(BuildConfig::default());

        let keys: Vec<_> = state.keys().collect();
        assert_eq!(keys, vec![StateKey::VmName, StateKey::Config, StateKey::Error]);
    }

    #[test]
    fn test_error_is_readable_after_put() {
        let mut state = StateBag::new();
        state.put_error(HvbuildError::Capability("no nesting".into()));
        assert_eq!(
            state.error(),
            Some(&HvbuildError::Capability("no nesting".into()))
        );
        assert!(state.contains(StateKey::Error));
    }
}
