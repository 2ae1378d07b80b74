//! Build configuration constants.
//!
//! Centralized location for defaults and limits.

/// Communicator type string that selects PowerShell remoting.
pub const PSRP_COMM_TYPE: &str = "psrp";

/// PowerShell remoting defaults
pub mod psrp {
    use std::time::Duration;

    /// WSMan over HTTP
    pub const DEFAULT_HTTP_PORT: u16 = 5985;

    /// WSMan over HTTPS
    pub const DEFAULT_HTTPS_PORT: u16 = 5986;

    /// Connection timeout when none (or an unparsable one) is configured
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

    /// Session configuration used for hvsock connections
    pub const DEFAULT_CONFIGURATION_NAME: &str = "Microsoft.PowerShell";
}

/// Guest and host memory thresholds (all values in MB)
pub mod memory {
    /// Headroom the host should keep after the guest's RAM is allocated
    pub const LOW_RAM_MB: f64 = 256.0;

    pub const DEFAULT_RAM_SIZE_MB: u32 = 1024;

    pub const MIN_RAM_SIZE_MB: u32 = 32;

    pub const MAX_RAM_SIZE_MB: u32 = 32 * 1024;
}

/// VM naming and hardware defaults
pub mod vm {
    /// Prefix for generated VM and switch names
    pub const NAME_PREFIX: &str = "hvbuild";

    pub const DEFAULT_GENERATION: u32 = 1;
}
