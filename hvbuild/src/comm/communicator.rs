//! Generic SSH / WinRM communicator settings.

use hvbuild_shared::ConfigError;
use serde::{Deserialize, Serialize};

use crate::util::parse_duration;

const DEFAULT_SSH_PORT: u16 = 22;
const DEFAULT_WINRM_HTTP_PORT: u16 = 5985;
const DEFAULT_WINRM_HTTPS_PORT: u16 = 5986;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Communicator {
    /// `ssh` (default), `winrm` or `none`.
    #[serde(rename = "communicator")]
    pub comm_type: String,

    pub ssh_host: String,
    pub ssh_port: u16,
    pub ssh_username: String,
    pub ssh_password: String,
    pub ssh_timeout: String,

    pub winrm_host: String,
    pub winrm_port: u16,
    pub winrm_username: String,
    pub winrm_password: String,
    pub winrm_timeout: String,
    pub winrm_use_ssl: bool,
    pub winrm_insecure: bool,
}

impl Communicator {
    /// Apply defaults and validate. Unlike the PSRP settings, a malformed
    /// timeout here is an error.
    pub fn prepare(&mut self) -> Vec<ConfigError> {
        if self.comm_type.is_empty() {
            self.comm_type = "ssh".to_string();
        }

        let mut errs = Vec::new();
        match self.comm_type.as_str() {
            "ssh" => {
                if self.ssh_port == 0 {
                    self.ssh_port = DEFAULT_SSH_PORT;
                }
                if self.ssh_username.is_empty() {
                    errs.push(ConfigError::Required("ssh_username"));
                }
                check_timeout("ssh_timeout", &self.ssh_timeout, &mut errs);
            }
            "winrm" => {
                if self.winrm_port == 0 {
                    self.winrm_port = if self.winrm_use_ssl {
                        DEFAULT_WINRM_HTTPS_PORT
                    } else {
                        DEFAULT_WINRM_HTTP_PORT
                    };
                }
                if self.winrm_username.is_empty() {
                    errs.push(ConfigError::Required("winrm_username"));
                }
                check_timeout("winrm_timeout", &self.winrm_timeout, &mut errs);
            }
            "none" => {}
            other => errs.push(ConfigError::UnknownCommunicator(other.to_string())),
        }

        errs
    }

    /// Static host override for the active communicator; empty means
    /// auto-detect.
    pub fn host(&self) -> &str {
        match self.comm_type.as_str() {
            "ssh" | "" => &self.ssh_host,
            "winrm" => &self.winrm_host,
            _ => "",
        }
    }
}

fn check_timeout(field: &'static str, value: &str, errs: &mut Vec<ConfigError>) {
    if !value.is_empty() && parse_duration(value).is_none() {
        errs.push(ConfigError::InvalidTimeout {
            field,
            value: value.to_string(),
        });
    }
}
