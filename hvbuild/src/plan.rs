//! Step ordering for a build.

use std::sync::Arc;

use crate::config::BuildConfig;
use crate::driver::HostProbe;
use crate::pipeline::BoxedStep;
use crate::steps::{
    ConfigureRuntimeTransportStep, ValidateCloneSourceStep, ValidateHostEnvironmentStep,
};

/// Steps this crate contributes to a build, in run order.
///
/// Host and clone-source checks come first so a bad host or source fails
/// before anything is created. VM creation and boot happen between the clone
/// check and transport configuration, outside this crate.
pub fn build_steps(config: &BuildConfig, probe: Arc<dyn HostProbe>) -> Vec<BoxedStep> {
    let validate_host: BoxedStep = Box::new(ValidateHostEnvironmentStep::new(
        config.enable_virtualization_extensions,
        config.ram_size,
        probe,
    ));
    let validate_clone: BoxedStep = Box::new(ValidateCloneSourceStep::new());
    let configure_transport: BoxedStep = Box::new(ConfigureRuntimeTransportStep::new());

    vec![validate_host, validate_clone, configure_transport]
}
