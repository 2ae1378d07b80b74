//! Communicator configuration and guest address resolution.
//!
//! ## Architecture
//!
//! ```text
//! prepare time:  CommConfig::prepare ─→ Communicator::prepare   (ssh, winrm, none)
//!                                   └─→ PsrpConfig::prepare     (psrp, hvsock VM id deferred)
//!
//! dial time:     resolver_for(&CommConfig) ─→ CommHost  (static host or MAC → IP)
//!                                         └─→ PsrpHost  (VM GUID or IP)
//! ```

mod communicator;
mod config;
pub mod host;
mod psrp;

pub use communicator::Communicator;
pub use config::CommConfig;
pub use host::{CommHost, HostResolver, PsrpHost, comm_host, psrp_host, resolver_for};
pub use psrp::PsrpConfig;
