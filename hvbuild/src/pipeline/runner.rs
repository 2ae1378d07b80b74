//! Sequential step runner.
//!
//! Runs steps in order over one state bag, stops at the first halt or on
//! cancellation, then cleans up every step that started, newest first.

use super::metrics::{PipelineMetrics, StepMetrics};
use super::step::{BoxedStep, StepAction};
use super::BuildContext;
use crate::state::StateBag;
use hvbuild_shared::errors::{HvbuildError, HvbuildResult};
use std::time::Instant;

pub struct StepRunner {
    steps: Vec<BoxedStep>,
}

impl StepRunner {
    pub fn new(steps: Vec<BoxedStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run all steps and report metrics regardless of outcome.
    ///
    /// A halted pipeline is reported through `PipelineMetrics::halted`; the
    /// reason is whatever the halting step put under the state bag's error key.
    pub async fn run(&mut self, ctx: &BuildContext, state: &mut StateBag) -> PipelineMetrics {
        let total_start = Instant::now();
        let mut step_metrics = Vec::with_capacity(self.steps.len());
        let mut started = 0;
        let mut halted = false;
        let mut cancelled = false;

        for step in self.steps.iter_mut() {
            if ctx.is_cancelled() {
                tracing::info!(step = %step.name(), "Build cancelled, skipping remaining steps");
                cancelled = true;
                break;
            }

            let name = step.name().to_string();
            tracing::debug!(step = %name, "Running step");
            let step_start = Instant::now();

            started += 1;
            let action = step.run(ctx, state).await;

            let duration_ms = step_start.elapsed().as_millis();
            tracing::debug!(step = %name, ?action, duration_ms = duration_ms as u64, "Step finished");
            step_metrics.push(StepMetrics {
                name,
                duration_ms,
                action,
            });

            if action == StepAction::Halt {
                halted = true;
                cancelled = ctx.is_cancelled();
                break;
            }
        }

        for step in self.steps[..started].iter_mut().rev() {
            tracing::trace!(step = %step.name(), "Cleaning up step");
            step.cleanup(state);
        }

        PipelineMetrics {
            total_duration_ms: total_start.elapsed().as_millis(),
            steps: step_metrics,
            halted,
            cancelled,
        }
    }

    /// Run all steps and turn a halt into the recorded error.
    pub async fn run_to_completion(
        &mut self,
        ctx: &BuildContext,
        state: &mut StateBag,
    ) -> HvbuildResult<PipelineMetrics> {
        let metrics = self.run(ctx, state).await;

        if metrics.cancelled {
            return Err(HvbuildError::Cancelled);
        }
        if metrics.halted {
            let err = state.error().cloned().unwrap_or_else(|| {
                let step = metrics.steps.last().map(|s| s.name.as_str()).unwrap_or("unknown");
                HvbuildError::Internal(format!("step {} halted without recording an error", step))
            });
            tracing::error!(error = %err, "Build halted");
            return Err(err);
        }

        Ok(metrics)
    }
}
