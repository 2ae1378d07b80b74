//! Test doubles for the driver, host probe and ui.

use std::collections::HashMap;

use async_trait::async_trait;
use hvbuild_shared::errors::{HvbuildError, HvbuildResult};
use parking_lot::Mutex;

use crate::driver::{Driver, HostProbe};
use crate::ui::Ui;

fn not_stubbed(call: &str) -> HvbuildError {
    HvbuildError::Driver(format!("{} not stubbed", call))
}

/// Driver returning canned results and counting calls per method.
pub(crate) struct StubDriver {
    pub(crate) mac: HvbuildResult<String>,
    pub(crate) ip: HvbuildResult<String>,
    pub(crate) vm_id: HvbuildResult<String>,
    pub(crate) vm_exists: HvbuildResult<bool>,
    pub(crate) generation: HvbuildResult<u32>,
    pub(crate) snapshot_exists: HvbuildResult<bool>,
    pub(crate) is_vm_on: HvbuildResult<bool>,
    pub(crate) calls: Mutex<HashMap<&'static str, usize>>,
}

impl Default for StubDriver {
    fn default() -> Self {
        Self {
            mac: Err(not_stubbed("mac")),
            ip: Err(not_stubbed("ip_address")),
            vm_id: Err(not_stubbed("vm_id")),
            vm_exists: Ok(true),
            generation: Ok(1),
            snapshot_exists: Ok(true),
            is_vm_on: Ok(false),
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl StubDriver {
    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls.lock().get(method).copied().unwrap_or(0)
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().entry(method).or_insert(0) += 1;
    }
}

#[async_trait]
impl Driver for StubDriver {
    async fn mac(&self, _vm_name: &str) -> HvbuildResult<String> {
        self.record("mac");
        self.mac.clone()
    }

    async fn ip_address(&self, _mac: &str) -> HvbuildResult<String> {
        self.record("ip_address");
        self.ip.clone()
    }

    async fn vm_id(&self, _vm_name: &str) -> HvbuildResult<String> {
        self.record("vm_id");
        self.vm_id.clone()
    }

    async fn vm_exists(&self, _vm_name: &str) -> HvbuildResult<bool> {
        self.record("vm_exists");
        self.vm_exists.clone()
    }

    async fn vm_generation(&self, _vm_name: &str) -> HvbuildResult<u32> {
        self.record("vm_generation");
        self.generation.clone()
    }

    async fn snapshot_exists(&self, _vm_name: &str, _snapshot_name: &str) -> HvbuildResult<bool> {
        self.record("snapshot_exists");
        self.snapshot_exists.clone()
    }

    async fn is_vm_on(&self, _vm_name: &str) -> HvbuildResult<bool> {
        self.record("is_vm_on");
        self.is_vm_on.clone()
    }
}

/// Host probe with canned answers. Defaults describe a roomy, capable host
/// without an external switch.
pub(crate) struct StubProbe {
    pub(crate) available: bool,
    pub(crate) virtualization_extensions: HvbuildResult<bool>,
    pub(crate) available_memory_mb: HvbuildResult<f64>,
    pub(crate) external_switch: HvbuildResult<Option<String>>,
}

impl Default for StubProbe {
    fn default() -> Self {
        Self {
            available: true,
            virtualization_extensions: Ok(true),
            available_memory_mb: Ok(64.0 * 1024.0),
            external_switch: Ok(None),
        }
    }
}

#[async_trait]
impl HostProbe for StubProbe {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn has_virtualization_extensions(&self) -> HvbuildResult<bool> {
        self.virtualization_extensions.clone()
    }

    async fn available_memory_mb(&self) -> HvbuildResult<f64> {
        self.available_memory_mb.clone()
    }

    async fn external_online_switch(&self) -> HvbuildResult<Option<String>> {
        self.external_switch.clone()
    }
}

/// Ui that keeps every message for inspection.
#[derive(Default)]
pub(crate) struct RecordingUi {
    says: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub(crate) fn says(&self) -> Vec<String> {
        self.says.lock().clone()
    }

    pub(crate) fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Ui for RecordingUi {
    fn say(&self, message: &str) {
        self.says.lock().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}
