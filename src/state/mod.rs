//! State module for tracking mirror progress
//!
//! # Components
//!
//! - `TaskState`: Where a task is in its lifecycle (discovered, enqueued, in flight, completed)
//! - `TaskOutcome`: How a completed task ended

mod task_state;

// Re-export main types
pub use task_state::{TaskOutcome, TaskState};
