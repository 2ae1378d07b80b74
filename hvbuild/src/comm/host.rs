//! Guest address resolution.
//!
//! Resolvers run lazily, when the communicator is ready to dial, and only read
//! from the state bag. Retrying a resolver is always safe.

use async_trait::async_trait;
use hvbuild_shared::errors::{HvbuildError, HvbuildResult};
use hvbuild_shared::PsrpTransport;

use super::CommConfig;
use crate::state::StateBag;

/// Produces the address (IP, host name or VM GUID) the communicator dials.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, state: &StateBag) -> HvbuildResult<String>;
}

/// Network address of the guest.
///
/// A non-empty `host` wins without touching the state bag. Otherwise the
/// driver maps the VM's MAC address to its current IP.
pub async fn comm_host(host: &str, state: &StateBag) -> HvbuildResult<String> {
    if !host.is_empty() {
        tracing::debug!(host = %host, "Using configured host");
        return Ok(host.to_string());
    }

    let vm_name = state.vm_name()?;
    let driver = state.driver()?;

    let mac = driver.mac(vm_name).await.map_err(|e| {
        HvbuildError::Resolution(format!(
            "failed to get MAC address of VM '{}': {}",
            vm_name, e
        ))
    })?;

    let ip = driver.ip_address(&mac).await.map_err(|e| {
        HvbuildError::Resolution(format!(
            "failed to get IP address for MAC {} of VM '{}': {}",
            mac, vm_name, e
        ))
    })?;

    tracing::debug!(vm_name = %vm_name, mac = %mac, ip = %ip, "Resolved guest IP address");
    Ok(ip)
}

/// Address for a PSRP session: the VM GUID for hvsock, the IP for wsman.
///
/// Without a communicator config this falls back to IP detection.
// TODO: make a missing config an error once no caller builds a PsrpHost
// resolver for a non-PSRP build.
pub async fn psrp_host(config: Option<&CommConfig>, state: &StateBag) -> HvbuildResult<String> {
    let Some(config) = config else {
        tracing::warn!("No PSRP communicator config available, falling back to IP detection");
        return comm_host("", state).await;
    };

    match config.psrp.transport {
        PsrpTransport::HvSocket => {
            if !config.psrp.vm_id.is_empty() {
                tracing::debug!(vm_id = %config.psrp.vm_id, "Using configured VM ID");
                return Ok(config.psrp.vm_id.clone());
            }

            let vm_name = state.vm_name()?;
            let driver = state.driver()?;

            tracing::info!(vm_name = %vm_name, "Auto-detecting VM GUID");
            let vm_id = driver.vm_id(vm_name).await.map_err(|e| {
                HvbuildError::Resolution(format!("failed to get VM ID of '{}': {}", vm_name, e))
            })?;

            tracing::info!(vm_name = %vm_name, vm_id = %vm_id, "Detected VM GUID");
            Ok(vm_id)
        }
        PsrpTransport::WsMan => comm_host(&config.psrp.host, state).await,
    }
}

/// Resolver for SSH and WinRM.
#[derive(Debug, Clone, Default)]
pub struct CommHost {
    host: String,
}

impl CommHost {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

#[async_trait]
impl HostResolver for CommHost {
    async fn resolve(&self, state: &StateBag) -> HvbuildResult<String> {
        comm_host(&self.host, state).await
    }
}

/// Resolver for PSRP.
///
/// Reads the communicator config from the state bag at dial time so it sees
/// a VM id written during the build.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsrpHost;

#[async_trait]
impl HostResolver for PsrpHost {
    async fn resolve(&self, state: &StateBag) -> HvbuildResult<String> {
        let config = match state.config() {
            Ok(config) => Some(&config.comm),
            Err(e) => {
                tracing::debug!(error = %e, "Build config unavailable for PSRP resolution");
                None
            }
        };
        psrp_host(config, state).await
    }
}

/// Pick the resolver matching the configured communicator.
pub fn resolver_for(config: &CommConfig) -> Box<dyn HostResolver> {
    if config.is_psrp() {
        Box::new(PsrpHost)
    } else {
        Box::new(CommHost::new(config.comm.host()))
    }
}
