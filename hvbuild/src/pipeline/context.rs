//! Cancellation context passed to every step.

use std::future::Future;

use hvbuild_shared::errors::{HvbuildError, HvbuildResult};
use tokio::sync::watch;

/// Read side of the cancellation signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BuildContext {
    cancelled: watch::Receiver<bool>,
}

/// Write side of the cancellation signal, held by whoever may abort the build.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        tracing::info!("Build cancellation requested");
        self.tx.send_replace(true);
    }
}

impl BuildContext {
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { cancelled: rx }, CancelHandle { tx })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Await one blocking call, giving up as soon as cancellation is signalled.
    ///
    /// Returns `HvbuildError::Cancelled` without polling `fut` if the build was
    /// already cancelled.
    pub async fn run<T, F>(&self, fut: F) -> HvbuildResult<T>
    where
        F: Future<Output = HvbuildResult<T>>,
    {
        if self.is_cancelled() {
            return Err(HvbuildError::Cancelled);
        }

        let mut rx = self.cancelled.clone();
        tokio::select! {
            result = fut => result,
            _ = wait_cancelled(&mut rx) => Err(HvbuildError::Cancelled),
        }
    }
}

async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Handle dropped without cancelling: never fires.
            std::future::pending::<()>().await;
        }
    }
}
