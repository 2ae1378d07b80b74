//! Hyper-V build orchestration.
//!
//! A build is a sequence of steps run over one shared [`state::StateBag`].
//! This crate provides the steps that validate the host and clone source and
//! finish the communicator configuration once the VM exists, plus the
//! resolvers the communicator calls to find the guest when it dials.
//!
//! ```ignore
//! let probe: Arc<dyn HostProbe> = Arc::new(PowerShellDriver::new());
//! let mut config = BuildConfig::from_json(&template)?;
//! config.prepare(probe.as_ref()).await?;
//!
//! let mut runner = StepRunner::new(plan::build_steps(&config, probe));
//! // ... put vmName, driver, ui and config into the state bag, then:
//! runner.run_to_completion(&ctx, &mut state).await?;
//! let host = comm::resolver_for(&state.config()?.comm).resolve(&state).await?;
//! ```

pub mod comm;
pub mod config;
pub mod constants;
pub mod driver;
mod logging;
pub mod pipeline;
pub mod plan;
pub mod state;
pub mod steps;
pub mod ui;
mod util;

#[cfg(test)]
mod testing;

pub use config::BuildConfig;
pub use hvbuild_shared::{
    AuthType, ConfigError, HvbuildError, HvbuildResult, PsrpTransport,
};
pub use logging::{LogOptions, init_logging};
pub use util::parse_duration;
