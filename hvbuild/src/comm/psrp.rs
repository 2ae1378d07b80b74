//! Resolved PowerShell remoting connection settings.

use std::time::Duration;

use hvbuild_shared::{AuthType, ConfigError, PsrpTransport};

use crate::constants::psrp::{
    DEFAULT_CONFIGURATION_NAME, DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, DEFAULT_TIMEOUT,
};

/// Internal PSRP settings, populated from the raw `psrp_*` fields.
///
/// Settings of the inactive transport are kept as-is so the config can be
/// re-resolved later. `vm_id` is the only field written after preparation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsrpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    pub transport: PsrpTransport,
    pub vm_id: String,
    pub configuration_name: String,
    pub use_tls: bool,
    pub insecure_skip_verify: bool,
    pub auth_type: AuthType,
    pub domain: String,
    pub realm: String,
}

impl PsrpConfig {
    /// Apply defaults, then validate.
    pub fn prepare(&mut self) -> Vec<ConfigError> {
        if self.port == 0 {
            self.port = if self.use_tls {
                DEFAULT_HTTPS_PORT
            } else {
                DEFAULT_HTTP_PORT
            };
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.configuration_name.is_empty() {
            self.configuration_name = DEFAULT_CONFIGURATION_NAME.to_string();
        }

        let mut errs = Vec::new();
        match self.transport {
            PsrpTransport::WsMan if self.host.is_empty() => {
                errs.push(ConfigError::PsrpHostRequired);
            }
            PsrpTransport::HvSocket if self.vm_id.is_empty() => {
                errs.push(ConfigError::PsrpVmIdRequired);
            }
            _ => {}
        }

        if self.auth_type == AuthType::Basic
            && (self.username.is_empty() || self.password.is_empty())
        {
            errs.push(ConfigError::PsrpBasicCredentialsRequired);
        }

        errs
    }

    /// Address the session dials: the VM GUID for hvsock, the host for wsman.
    pub fn target(&self) -> &str {
        match self.transport {
            PsrpTransport::HvSocket => &self.vm_id,
            PsrpTransport::WsMan => &self.host,
        }
    }
}
