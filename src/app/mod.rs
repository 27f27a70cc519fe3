//! Application layer: batch orchestration and session wiring.

pub mod batch;
pub mod session;

pub use batch::{BatchOrchestrator, BatchPlan, BatchSummary, ItemOutcome, ItemStatus};
pub use session::WithdrawSession;
