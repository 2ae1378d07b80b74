//! User-facing messaging sink.

/// Where steps report progress to the person running the build.
///
/// Errors sent here mirror the error recorded in the state bag when a step halts.
pub trait Ui: Send + Sync {
    fn say(&self, message: &str);

    /// Non-fatal condition. Never accompanied by a halt.
    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Forwards messages to `tracing` under the `hvbuild::ui` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingUi;

impl Ui for TracingUi {
    fn say(&self, message: &str) {
        tracing::info!(target: "hvbuild::ui", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "hvbuild::ui", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "hvbuild::ui", "{}", message);
    }
}
