//! Build step trait.

use async_trait::async_trait;

use super::BuildContext;
use crate::state::StateBag;

/// What the runner should do after a step returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Continue,
    /// Stop the pipeline. The step has recorded the reason under the
    /// state bag's error key (unless it stopped because of cancellation).
    Halt,
}

/// A unit of work in a build.
///
/// Steps run one at a time, in order, over the same state bag. A step that
/// allocates nothing implements `cleanup` as a no-op; cleanup must be safe to
/// call even if `run` never executed or made no change.
#[async_trait]
pub trait BuildStep: Send + Sync {
    async fn run(&mut self, ctx: &BuildContext, state: &mut StateBag) -> StepAction;

    fn cleanup(&mut self, state: &mut StateBag);

    /// Get human-readable step name for logging.
    fn name(&self) -> &str;
}

pub type BoxedStep = Box<dyn BuildStep>;
