//! Communicator configuration covering SSH, WinRM and PSRP.

use hvbuild_shared::{AuthType, ConfigError, PsrpTransport};
use serde::{Deserialize, Serialize};

use super::communicator::Communicator;
use super::psrp::PsrpConfig;
use crate::constants::PSRP_COMM_TYPE;
use crate::util::parse_duration;

/// Raw user settings for every communicator type plus the resolved PSRP
/// settings derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommConfig {
    /// SSH / WinRM settings and the communicator type selector.
    #[serde(flatten)]
    pub comm: Communicator,

    /// Filled by [`CommConfig::prepare`]; not user-facing.
    #[serde(skip)]
    pub psrp: PsrpConfig,

    // === PSRP connection ===
    /// Only used with wsman; ignored for hvsock.
    pub psrp_host: String,
    /// Defaults to 5985 (HTTP) or 5986 (HTTPS).
    pub psrp_port: u16,
    pub psrp_username: String,
    pub psrp_password: String,
    /// Go-style duration. Defaults to `5m`.
    pub psrp_timeout: String,

    // === PSRP transport ===
    /// `wsman` (default) or `hvsock`.
    pub psrp_transport: String,
    /// VM GUID for hvsock. Detected at build time when empty.
    pub psrp_vmid: String,
    /// Defaults to `Microsoft.PowerShell`.
    pub psrp_configuration_name: String,

    // === PSRP TLS ===
    pub psrp_use_tls: bool,
    pub psrp_insecure: bool,

    // === PSRP authentication ===
    /// `basic`, `ntlm`, `kerberos` or `negotiate` (default).
    pub psrp_auth_type: String,
    pub psrp_domain: String,
    pub psrp_realm: String,
}

impl CommConfig {
    pub fn is_psrp(&self) -> bool {
        self.comm.comm_type == PSRP_COMM_TYPE
    }

    /// Resolve and validate the communicator settings.
    ///
    /// For PSRP the raw fields are merged into [`PsrpConfig`] and validated
    /// there. With hvsock a missing VM id is not reported: the VM does not
    /// exist yet and its id is detected during the build. Any other type is
    /// validated by the generic communicator alone.
    pub fn prepare(&mut self) -> Vec<ConfigError> {
        if !self.is_psrp() {
            return self.comm.prepare();
        }

        self.populate_psrp_config();
        let mut errs = self.psrp.prepare();

        if self.psrp.transport == PsrpTransport::HvSocket {
            errs.retain(|err| *err != ConfigError::PsrpVmIdRequired);
        }

        errs
    }

    /// Copy the raw `psrp_*` fields into `self.psrp`.
    ///
    /// Unparsable timeouts and unknown transport or auth names leave the
    /// current value in place.
    fn populate_psrp_config(&mut self) {
        let psrp = &mut self.psrp;
        psrp.host = self.psrp_host.clone();
        psrp.port = self.psrp_port;
        psrp.username = self.psrp_username.clone();
        psrp.password = self.psrp_password.clone();

        if !self.psrp_timeout.is_empty() {
            match parse_duration(&self.psrp_timeout) {
                Some(timeout) => psrp.timeout = timeout,
                None => tracing::debug!(
                    psrp_timeout = %self.psrp_timeout,
                    "Ignoring unparsable psrp_timeout"
                ),
            }
        }

        if let Some(transport) = PsrpTransport::from_name(&self.psrp_transport) {
            psrp.transport = transport;
        }

        psrp.vm_id = self.psrp_vmid.clone();
        psrp.configuration_name = self.psrp_configuration_name.clone();
        psrp.use_tls = self.psrp_use_tls;
        psrp.insecure_skip_verify = self.psrp_insecure;

        if let Some(auth_type) = AuthType::from_name(&self.psrp_auth_type) {
            psrp.auth_type = auth_type;
        }

        psrp.domain = self.psrp_domain.clone();
        psrp.realm = self.psrp_realm.clone();
    }
}
