//! Sequential build-step execution.
//!
//! ## Architecture
//!
//! ```text
//! StepRunner → BuildStep → StateBag
//!
//! - StepRunner: runs steps in order, stops at the first Halt, cleans up in reverse
//! - BuildStep: one unit of work, reads and writes the shared StateBag
//! - BuildContext: cancellation signal observed at every blocking call
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use hvbuild::pipeline::{BuildContext, StepRunner};
//! use hvbuild::state::StateBag;
//!
//! let (ctx, cancel) = BuildContext::new();
//! let mut state = StateBag::new();
//! let mut runner = StepRunner::new(steps);
//! let metrics = runner.run_to_completion(&ctx, &mut state).await?;
//! println!("build took {}ms", metrics.total_duration_ms);
//! ```

mod context;
mod metrics;
mod runner;
mod step;

pub use context::{BuildContext, CancelHandle};
pub use metrics::{PipelineMetrics, StepMetrics};
pub use runner::StepRunner;
pub use step::{BoxedStep, BuildStep, StepAction};
