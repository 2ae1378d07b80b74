//! Types shared between the hvbuild orchestration crate and communicator code.

pub mod errors;
pub mod transport;

pub use errors::{ConfigError, HvbuildError, HvbuildResult};
pub use transport::{AuthType, PsrpTransport};
