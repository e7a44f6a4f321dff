//! telemetry/mod.rs
//! Stream performance counters, stage clocks, derived snapshots and
//! debug-level gated tracing.

pub mod counters;
pub mod snapshot;
pub mod timers;
pub mod trace;

pub use counters::*;
pub use snapshot::*;
pub use timers::*;
