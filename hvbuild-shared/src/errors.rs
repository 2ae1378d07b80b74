//! Error types for hvbuild.
//!
//! Two layers:
//! - `ConfigError`: a single field-level problem found while preparing configuration.
//!   Typed so callers can match on the kind instead of the message.
//! - `HvbuildError`: everything a build can fail with at run time.
//!
//! Every variant carries owned data so the error is `Clone`. A halted step both
//! records the error in the state bag and hands it back to the runner.

use thiserror::Error;

pub type HvbuildResult<T> = Result<T, HvbuildError>;

/// A configuration problem detected at preparation time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("psrp_host is required for wsman transport")]
    PsrpHostRequired,

    /// Only resolvable once the VM exists; filtered out for hvsock.
    #[error("psrp_vmid is required for hvsock transport")]
    PsrpVmIdRequired,

    #[error("psrp_username and psrp_password are required for basic authentication")]
    PsrpBasicCredentialsRequired,

    #[error("unknown communicator type: {0}")]
    UnknownCommunicator(String),

    #[error("{0} must be specified")]
    Required(&'static str),

    #[error("failed to parse {field}: {value:?} is not a valid duration")]
    InvalidTimeout { field: &'static str, value: String },

    #[error("ram_size must be between {min} and {max} MB, got {value}")]
    RamSize { value: u32, min: u32, max: u32 },

    #[error("generation must be 1 or 2, got {0}")]
    InvalidGeneration(u32),

    #[error("clone_from_vm_name and clone_from_vmcx_path can't both be specified")]
    CloneSourceConflict,

    #[error("clone_from_snapshot_name requires clone_from_vm_name")]
    SnapshotWithoutCloneSource,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HvbuildError {
    /// Aggregated preparation-time failures. Never raised once steps run.
    #[error("{}", join_config_errors(.0))]
    ConfigValidation(Vec<ConfigError>),

    #[error("configuration error: {0}")]
    Config(String),

    /// The guest address could not be determined when dialing.
    #[error("{0}")]
    Resolution(String),

    /// A required host capability is missing or could not be queried.
    #[error("{0}")]
    Capability(String),

    /// A clone source VM or snapshot is missing or its state is unknown.
    #[error("{0}")]
    SourceValidation(String),

    #[error("state key '{0}' is not set")]
    MissingKey(&'static str),

    #[error("state key '{key}' holds {found}, expected {expected}")]
    WrongKind {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("driver error: {0}")]
    Driver(String),

    #[error("build cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl HvbuildError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HvbuildError::Cancelled)
    }
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} configuration error(s): {}", errors.len(), joined)
}
