//! Deciding and committing catch attempts.

pub mod probability;
mod workflow;

pub use probability::{attempt, probability, FixedDraw, RandomSource, ThreadRngSource};
pub use workflow::{CatchResult, CatchWorkflow};
