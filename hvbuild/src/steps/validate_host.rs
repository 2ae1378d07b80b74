//! Step: host checks that need the hypervisor tooling.
//!
//! Runs before VM creation so an unsupported host fails fast. Only the
//! virtualization extensions check is fatal; the memory check is advisory.

use std::sync::Arc;

use async_trait::async_trait;
use hvbuild_shared::errors::{HvbuildError, HvbuildResult};

use super::{halt, warn};
use crate::constants::memory::LOW_RAM_MB;
use crate::constants::vm::NAME_PREFIX;
use crate::driver::HostProbe;
use crate::pipeline::{BuildContext, BuildStep, StepAction};
use crate::state::StateBag;

const NO_NESTING_SUPPORT: &str = "this version of Hyper-V does not support virtual machine \
     virtualization extensions; use Windows 10 or Windows Server 2016 or newer";

const LOW_MEMORY_WARNING: &str =
    "Hyper-V might fail to create a VM if there is not enough free memory in the system.";

pub struct ValidateHostEnvironmentStep {
    enable_virtualization_extensions: bool,
    ram_size: u32,
    probe: Arc<dyn HostProbe>,
}

impl ValidateHostEnvironmentStep {
    pub fn new(enable_virtualization_extensions: bool, ram_size: u32, probe: Arc<dyn HostProbe>) -> Self {
        Self {
            enable_virtualization_extensions,
            ram_size,
            probe,
        }
    }

    /// Free memory after the guest is allocated, or `None` when it can't be
    /// measured.
    async fn memory_margin_mb(&self, ctx: &BuildContext) -> HvbuildResult<Option<f64>> {
        let available = ctx.run(async { Ok(self.probe.is_available().await) }).await?;
        if !available {
            tracing::debug!("Host probe unavailable, skipping memory check");
            return Ok(None);
        }

        match ctx.run(self.probe.available_memory_mb()).await {
            Ok(free_mb) => Ok(Some(free_mb - f64::from(self.ram_size))),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                tracing::debug!(error = %e, "Could not read free host memory");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl BuildStep for ValidateHostEnvironmentStep {
    async fn run(&mut self, ctx: &BuildContext, state: &mut StateBag) -> StepAction {
        let step = self.name();

        if self.enable_virtualization_extensions {
            match ctx.run(self.probe.has_virtualization_extensions()).await {
                Ok(true) => {
                    tracing::debug!("Host supports virtualization extensions");
                }
                Ok(false) => {
                    let err = HvbuildError::Capability(NO_NESTING_SUPPORT.to_string());
                    return halt(step, state, err);
                }
                Err(e) if e.is_cancelled() => return halt(step, state, e),
                Err(e) => {
                    let err = HvbuildError::Capability(format!(
                        "failed detecting virtualization extensions support: {}",
                        e
                    ));
                    return halt(step, state, err);
                }
            }
        }

        match self.memory_margin_mb(ctx).await {
            Ok(Some(margin)) if margin < LOW_RAM_MB => {
                tracing::debug!(margin_mb = margin, ram_size = self.ram_size, "Low host memory");
                warn(step, state, LOW_MEMORY_WARNING);
            }
            Ok(_) => {}
            Err(e) => return halt(step, state, e),
        }

        StepAction::Continue
    }

    fn cleanup(&mut self, _state: &mut StateBag) {}

    fn name(&self) -> &str {
        "validate_host_environment"
    }
}

/// Pick a virtual switch for the VM.
///
/// Uses an external switch bound to an online adapter when the host has one,
/// otherwise `hvbuild-{build_name}`. Never fails.
pub async fn detect_switch_name(probe: &dyn HostProbe, build_name: &str) -> String {
    if probe.is_available().await {
        match probe.external_online_switch().await {
            Ok(Some(name)) if !name.is_empty() => {
                tracing::info!(switch_name = %name, "Detected external online virtual switch");
                return name;
            }
            Ok(_) => tracing::debug!("No external online virtual switch found"),
            Err(e) => tracing::debug!(error = %e, "Virtual switch detection failed"),
        }
    }

    format!("{}-{}", NAME_PREFIX, build_name)
}
