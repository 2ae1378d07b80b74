//! PowerShell remoting transport and authentication selectors.

use serde::{Deserialize, Serialize};

/// How a PSRP session reaches the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PsrpTransport {
    /// WS-Management over HTTP(S), addressed by host.
    #[default]
    #[serde(rename = "wsman")]
    WsMan,
    /// Hyper-V socket (PowerShell Direct), addressed by VM GUID.
    #[serde(rename = "hvsock")]
    HvSocket,
}

impl PsrpTransport {
    /// Map a user-supplied selector. Unknown names yield `None` so callers can
    /// keep whatever value they already had.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wsman" => Some(Self::WsMan),
            "hvsock" => Some(Self::HvSocket),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WsMan => "wsman",
            Self::HvSocket => "hvsock",
        }
    }
}

impl std::fmt::Display for PsrpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Basic,
    Ntlm,
    Kerberos,
    #[default]
    Negotiate,
}

impl AuthType {
    /// Same policy as [`PsrpTransport::from_name`]: `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "basic" => Some(Self::Basic),
            "ntlm" => Some(Self::Ntlm),
            "kerberos" => Some(Self::Kerberos),
            "negotiate" => Some(Self::Negotiate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Ntlm => "ntlm",
            Self::Kerberos => "kerberos",
            Self::Negotiate => "negotiate",
        }
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
