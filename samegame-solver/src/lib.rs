//! Batch harness for SameGame policies.
//!
//! Runs policies over board files, aggregates their scores and persists the
//! shared transposition table between runs.

pub mod checkpoint;
pub mod runner;
pub mod stats;
