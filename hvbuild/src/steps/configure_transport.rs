//! Step: fill in the hvsock VM id once the VM exists.
//!
//! Preparation lets an hvsock config through without a VM id. This step
//! detects it from the driver before the communicator dials.

use async_trait::async_trait;
use hvbuild_shared::PsrpTransport;
use hvbuild_shared::errors::{HvbuildError, HvbuildResult};

use super::{halt, say};
use crate::pipeline::{BuildContext, BuildStep, StepAction};
use crate::state::StateBag;

#[derive(Debug, Default)]
pub struct ConfigureRuntimeTransportStep;

impl ConfigureRuntimeTransportStep {
    pub fn new() -> Self {
        Self
    }
}

/// Whether the build still needs a detected VM id.
fn needs_vm_id(state: &StateBag) -> HvbuildResult<bool> {
    let comm = &state.config()?.comm;
    Ok(comm.is_psrp()
        && comm.psrp.transport == PsrpTransport::HvSocket
        && comm.psrp.vm_id.is_empty())
}

#[async_trait]
impl BuildStep for ConfigureRuntimeTransportStep {
    async fn run(&mut self, ctx: &BuildContext, state: &mut StateBag) -> StepAction {
        let step = self.name();

        match needs_vm_id(state) {
            Ok(true) => {}
            Ok(false) => return StepAction::Continue,
            Err(e) => return halt(step, state, e),
        }

        let (vm_name, driver) = match state.vm_name().and_then(|name| {
            let driver = state.driver()?;
            Ok((name.to_string(), driver))
        }) {
            Ok(found) => found,
            Err(e) => return halt(step, state, e),
        };

        say(state, "Auto-detecting VM ID for PSRP HvSocket connection...");
        let vm_id = match ctx.run(driver.vm_id(&vm_name)).await {
            Ok(vm_id) => vm_id,
            Err(e) if e.is_cancelled() => return halt(step, state, e),
            Err(e) => {
                let err = HvbuildError::Resolution(format!("error getting VM ID: {}", e));
                return halt(step, state, err);
            }
        };

        say(state, &format!("Detected VM ID: {}", vm_id));
        tracing::info!(vm_name = %vm_name, vm_id = %vm_id, "Configured hvsock VM ID");

        match state.config_mut() {
            Ok(config) => {
                config.comm.psrp.vm_id = vm_id;
                StepAction::Continue
            }
            Err(e) => halt(step, state, e),
        }
    }

    fn cleanup(&mut self, _state: &mut StateBag) {}

    fn name(&self) -> &str {
        "configure_runtime_transport"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::{CommConfig, Communicator};
    use crate::config::BuildConfig;
    use crate::testing::{RecordingUi, StubDriver};
    use std::sync::Arc;

    fn psrp_config(transport: &str, vm_id: &str) -> BuildConfig {
        let mut comm = CommConfig {
            comm: Communicator {
                comm_type: "psrp".into(),
                ..Default::default()
            },
            psrp_transport: transport.into(),
            psrp_host: "10.0.0.5".into(),
            psrp_vmid: vm_id.into(),
            ..Default::default()
        };
        assert!(comm.prepare().is_empty());
        BuildConfig {
            comm,
            ..Default::default()
        }
    }

    fn state_with(config: BuildConfig, driver: StubDriver) -> (StateBag, Arc<StubDriver>, Arc<RecordingUi>) {
        let driver = Arc::new(driver);
        let ui = Arc::new(RecordingUi::default());
        let mut state = StateBag::new();
        state.put_vm_name("build-vm");
        state.put_driver(driver.clone());
        state.put_ui(ui.clone());
        state.put_config(config);
        (state, driver, ui)
    }

    #[tokio::test]
    async fn test_detects_vm_id_for_hvsock() {
        let (mut state, driver, ui) = state_with(
            psrp_config("hvsock", ""),
            StubDriver {
                vm_id: Ok("ABCD-1234".into()),
                ..Default::default()
            },
        );
        let (ctx, _handle) = BuildContext::new();

        let action = ConfigureRuntimeTransportStep::new().run(&ctx, &mut state).await;

        assert_eq!(action, StepAction::Continue);
        assert_eq!(state.config().unwrap().comm.psrp.vm_id, "ABCD-1234");
        assert_eq!(driver.calls("vm_id"), 1);
        assert_eq!(ui.says().last().map(String::as_str), Some("Detected VM ID: ABCD-1234"));
        assert!(ui.errors().is_empty());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let (mut state, driver, _ui) = state_with(
            psrp_config("hvsock", ""),
            StubDriver {
                vm_id: Ok("ABCD-1234".into()),
                ..Default::default()
            },
        );
        let (ctx, _handle) = BuildContext::new();
        let mut step = ConfigureRuntimeTransportStep::new();

        let first = step.run(&ctx, &mut state).await;
        let second = step.run(&ctx, &mut state).await;

        assert_eq!(first, StepAction::Continue);
        assert_eq!(second, StepAction::Continue);
        assert_eq!(state.config().unwrap().comm.psrp.vm_id, "ABCD-1234");
        assert_eq!(driver.calls("vm_id"), 1);
    }

    #[tokio::test]
    async fn test_user_vm_id_is_never_overwritten() {
        let (mut state, driver, _ui) = state_with(
            psrp_config("hvsock", "USER-0001"),
            StubDriver {
                vm_id: Ok("ABCD-1234".into()),
                ..Default::default()
            },
        );
        let (ctx, _handle) = BuildContext::new();

        let action = ConfigureRuntimeTransportStep::new().run(&ctx, &mut state).await;

        assert_eq!(action, StepAction::Continue);
        assert_eq!(state.config().unwrap().comm.psrp.vm_id, "USER-0001");
        assert_eq!(driver.calls("vm_id"), 0);
    }

    #[tokio::test]
    async fn test_skips_wsman_and_other_communicators() {
        let mut ssh = BuildConfig::default();
        ssh.comm.comm.comm_type = "ssh".into();

        for config in [psrp_config("wsman", ""), ssh] {
            let (mut state, driver, _ui) = state_with(config, StubDriver::default());
            let (ctx, _handle) = BuildContext::new();

            let action = ConfigureRuntimeTransportStep::new().run(&ctx, &mut state).await;

            assert_eq!(action, StepAction::Continue);
            assert_eq!(driver.calls("vm_id"), 0);
        }
    }

    #[tokio::test]
    async fn test_driver_failure_halts_with_error() {
        let (mut state, _driver, ui) = state_with(
            psrp_config("hvsock", ""),
            StubDriver {
                vm_id: Err(HvbuildError::Driver("VM not found".into())),
                ..Default::default()
            },
        );
        let (ctx, _handle) = BuildContext::new();

        let action = ConfigureRuntimeTransportStep::new().run(&ctx, &mut state).await;

        assert_eq!(action, StepAction::Halt);
        let err = state.error().expect("error key must be set");
        assert!(err.to_string().starts_with("error getting VM ID:"));
        assert_eq!(ui.errors(), vec![err.to_string()]);
        assert!(state.config().unwrap().comm.psrp.vm_id.is_empty());
    }

    #[tokio::test]
    async fn test_missing_vm_name_halts() {
        let mut state = StateBag::new();
        state.put_config(psrp_config("hvsock", ""));
        state.put_driver(Arc::new(StubDriver::default()));
        let (ctx, _handle) = BuildContext::new();

        let action = ConfigureRuntimeTransportStep::new().run(&ctx, &mut state).await;

        assert_eq!(action, StepAction::Halt);
        assert_eq!(state.error(), Some(&HvbuildError::MissingKey("vmName")));
    }

    #[tokio::test]
    async fn test_cancelled_halts_without_error() {
        let (mut state, driver, ui) = state_with(
            psrp_config("hvsock", ""),
            StubDriver {
                vm_id: Ok("ABCD-1234".into()),
                ..Default::default()
            },
        );
        let (ctx, handle) = BuildContext::new();
        handle.cancel();

        let action = ConfigureRuntimeTransportStep::new().run(&ctx, &mut state).await;

        assert_eq!(action, StepAction::Halt);
        assert!(state.error().is_none());
        assert!(ui.errors().is_empty());
        assert!(state.config().unwrap().comm.psrp.vm_id.is_empty());
        assert_eq!(driver.calls("vm_id"), 0);
    }
}
