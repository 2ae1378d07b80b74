//! Small helpers shared across modules.

mod duration;

pub use duration::parse_duration;
