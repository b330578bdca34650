pub mod runtime;
pub mod scheduler;
pub mod state;

pub use runtime::{RunOutcome, RuntimeOptions, ScopeRuntime, StopReason, StreamEndPolicy};
pub use scheduler::FrameScheduler;
pub use state::{PipelineState, TickPhase};
