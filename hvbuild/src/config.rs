//! Build configuration.
//!
//! Field names follow the Packer Hyper-V builder templates so existing
//! templates deserialize unchanged.

use hvbuild_shared::errors::{ConfigError, HvbuildError, HvbuildResult};
use serde::{Deserialize, Serialize};

use crate::comm::CommConfig;
use crate::constants::memory::{DEFAULT_RAM_SIZE_MB, MAX_RAM_SIZE_MB, MIN_RAM_SIZE_MB};
use crate::constants::vm::{DEFAULT_GENERATION, NAME_PREFIX};
use crate::driver::HostProbe;
use crate::steps::detect_switch_name;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    #[serde(flatten)]
    pub comm: CommConfig,

    /// Name of the build within the template. Used for generated names.
    #[serde(alias = "packer_build_name")]
    pub build_name: String,

    // === VM ===
    /// Defaults to `hvbuild-{build_name}`.
    pub vm_name: String,
    /// 1 or 2. Replaced by the clone source's generation when cloning.
    pub generation: u32,
    /// Guest RAM in MB.
    #[serde(alias = "memory")]
    pub ram_size: u32,
    pub enable_virtualization_extensions: bool,
    /// Detected when empty.
    pub switch_name: String,

    // === Clone source ===
    pub clone_from_vm_name: String,
    pub clone_from_snapshot_name: String,
    pub clone_from_vmcx_path: String,
}

impl BuildConfig {
    pub fn from_json(json: &str) -> HvbuildResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| HvbuildError::Config(format!("invalid build configuration: {}", e)))
    }

    /// Apply defaults and validate every section.
    ///
    /// All problems are collected into a single `ConfigValidation` error.
    /// Safe to call more than once.
    pub async fn prepare(&mut self, probe: &dyn HostProbe) -> HvbuildResult<()> {
        let mut errs = self.comm.prepare();

        if self.vm_name.is_empty() {
            self.vm_name = format!("{}-{}", NAME_PREFIX, self.build_name);
        }
        if self.generation == 0 {
            self.generation = DEFAULT_GENERATION;
        }
        if self.ram_size == 0 {
            self.ram_size = DEFAULT_RAM_SIZE_MB;
        }

        if !(1..=2).contains(&self.generation) {
            errs.push(ConfigError::InvalidGeneration(self.generation));
        }
        if !(MIN_RAM_SIZE_MB..=MAX_RAM_SIZE_MB).contains(&self.ram_size) {
            errs.push(ConfigError::RamSize {
                value: self.ram_size,
                min: MIN_RAM_SIZE_MB,
                max: MAX_RAM_SIZE_MB,
            });
        }

        if !self.clone_from_vm_name.is_empty() && !self.clone_from_vmcx_path.is_empty() {
            errs.push(ConfigError::CloneSourceConflict);
        }
        if !self.clone_from_snapshot_name.is_empty() && self.clone_from_vm_name.is_empty() {
            errs.push(ConfigError::SnapshotWithoutCloneSource);
        }

        if !errs.is_empty() {
            tracing::debug!(count = errs.len(), "Build configuration rejected");
            return Err(HvbuildError::ConfigValidation(errs));
        }

        if self.switch_name.is_empty() {
            self.switch_name = detect_switch_name(probe, &self.build_name).await;
        }

        tracing::debug!(
            vm_name = %self.vm_name,
            generation = self.generation,
            ram_size = self.ram_size,
            switch_name = %self.switch_name,
            communicator = %self.comm.comm.comm_type,
            "Build configuration prepared"
        );
        Ok(())
    }
}
