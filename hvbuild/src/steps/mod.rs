//! Concrete build steps.
//!
//! Each step reads what it needs from the state bag, awaits its driver or
//! probe calls through [`BuildContext::run`](crate::pipeline::BuildContext::run),
//! and reports a fatal condition through [`halt`].

mod configure_transport;
mod validate_clone;
mod validate_host;

pub use configure_transport::ConfigureRuntimeTransportStep;
pub use validate_clone::ValidateCloneSourceStep;
pub use validate_host::{ValidateHostEnvironmentStep, detect_switch_name};

use hvbuild_shared::errors::HvbuildError;

use crate::pipeline::StepAction;
use crate::state::StateBag;

/// Record a fatal step error and stop the pipeline.
///
/// The error is written under the state bag's error key and mirrored to the
/// ui. A cancelled call halts without recording anything.
pub(crate) fn halt(step: &str, state: &mut StateBag, err: HvbuildError) -> StepAction {
    if err.is_cancelled() {
        tracing::info!(step = %step, "Step cancelled");
        return StepAction::Halt;
    }

    tracing::error!(step = %step, error = %err, "Step failed");
    match state.ui() {
        Ok(ui) => ui.error(&err.to_string()),
        Err(e) => tracing::warn!(step = %step, error = %e, "No ui to report step failure"),
    }
    state.put_error(err);
    StepAction::Halt
}

/// Forward a non-fatal condition to the ui.
pub(crate) fn warn(step: &str, state: &StateBag, message: &str) {
    tracing::warn!(step = %step, "{}", message);
    if let Ok(ui) = state.ui() {
        ui.warn(message);
    }
}

pub(crate) fn say(state: &StateBag, message: &str) {
    if let Ok(ui) = state.ui() {
        ui.say(message);
    }
}
