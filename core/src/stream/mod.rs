//! stream/mod.rs
//! Streaming writer and reader over a chunk engine.

pub mod buffer;
pub mod reader;
pub mod writer;

pub use buffer::GrowthPolicy;
pub use reader::Reader;
pub use writer::Writer;

/// Lifecycle shared by both stream directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamState {
    Idle,
    Active,
    Closed,
}
