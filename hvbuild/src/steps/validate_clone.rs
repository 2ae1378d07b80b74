//! Step: verify a named clone source VM.
//!
//! Captures the source VM's generation into the build config; later steps
//! read it from there.

use async_trait::async_trait;
use hvbuild_shared::errors::{HvbuildError, HvbuildResult};

use super::{halt, say, warn};
use crate::driver::Driver;
use crate::pipeline::{BuildContext, BuildStep, StepAction};
use crate::state::StateBag;

#[derive(Debug, Default)]
pub struct ValidateCloneSourceStep;

impl ValidateCloneSourceStep {
    pub fn new() -> Self {
        Self
    }
}

/// Outcome of a successful validation.
struct CloneSource {
    generation: u32,
    running: bool,
}

async fn inspect_source(
    ctx: &BuildContext,
    driver: &dyn Driver,
    vm_name: &str,
    snapshot_name: &str,
) -> HvbuildResult<CloneSource> {
    let exists = ctx.run(driver.vm_exists(vm_name)).await.map_err(|e| {
        source_error(e, |e| {
            format!("Failed detecting if virtual machine to clone from exists: {}", e)
        })
    })?;
    if !exists {
        return Err(HvbuildError::SourceValidation(format!(
            "Virtual machine '{}' to clone from does not exist.",
            vm_name
        )));
    }

    let generation = ctx.run(driver.vm_generation(vm_name)).await.map_err(|e| {
        source_error(e, |e| {
            format!("Failed detecting virtual machine to clone from generation: {}", e)
        })
    })?;

    if !snapshot_name.is_empty() {
        let snapshot_exists = ctx
            .run(driver.snapshot_exists(vm_name, snapshot_name))
            .await
            .map_err(|e| {
                source_error(e, |e| {
                    format!(
                        "Failed detecting if virtual machine snapshot to clone from exists: {}",
                        e
                    )
                })
            })?;
        if !snapshot_exists {
            return Err(HvbuildError::SourceValidation(format!(
                "Virtual machine snapshot '{}' on virtual machine '{}' to clone from does not exist.",
                snapshot_name, vm_name
            )));
        }
    }

    let running = ctx.run(driver.is_vm_on(vm_name)).await.map_err(|e| {
        source_error(e, |e| {
            format!("Failed detecting if virtual machine to clone is running: {}", e)
        })
    })?;

    Ok(CloneSource {
        generation,
        running,
    })
}

/// Wrap a driver failure, passing cancellation through untouched.
fn source_error(err: HvbuildError, message: impl FnOnce(&HvbuildError) -> String) -> HvbuildError {
    if err.is_cancelled() {
        err
    } else {
        HvbuildError::SourceValidation(message(&err))
    }
}

#[async_trait]
impl BuildStep for ValidateCloneSourceStep {
    async fn run(&mut self, ctx: &BuildContext, state: &mut StateBag) -> StepAction {
        let step = self.name();

        let (vm_name, snapshot_name) = match state.config() {
            Ok(config) => (
                config.clone_from_vm_name.clone(),
                config.clone_from_snapshot_name.clone(),
            ),
            Err(e) => return halt(step, state, e),
        };

        if vm_name.is_empty() {
            return StepAction::Continue;
        }

        let driver = match state.driver() {
            Ok(driver) => driver,
            Err(e) => return halt(step, state, e),
        };

        say(state, "Validating clone source VM...");
        let source = match inspect_source(ctx, driver.as_ref(), &vm_name, &snapshot_name).await {
            Ok(source) => source,
            Err(e) => return halt(step, state, e),
        };

        match state.config_mut() {
            Ok(config) => config.generation = source.generation,
            Err(e) => return halt(step, state, e),
        }
        tracing::info!(
            clone_from_vm_name = %vm_name,
            generation = source.generation,
            running = source.running,
            "Validated clone source"
        );

        if source.running {
            warn(
                step,
                state,
                &format!("Cloning from a virtual machine that is running ({}).", vm_name),
            );
        }

        StepAction::Continue
    }

    fn cleanup(&mut self, _state: &mut StateBag) {}

    fn name(&self) -> &str {
        "validate_clone_source"
    }
}
