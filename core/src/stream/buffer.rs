//! stream/buffer.rs
//! Growth policy shared by the writer's output buffer and the reader's
//! input and output buffers.
//!
//! Design notes:
//! - On every insufficient-buffer signal the growth increment doubles and the
//!   new output length is `remaining + increment`. A buffer never shrinks.
//! - The reader's input buffer doubles whenever it fills.
//! - An optional ceiling is applied once by clamping; a request beyond a buffer
//!   already at the ceiling fails with `BufferLimitExceeded`.

use crate::types::QzError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    increment: usize,
    limit: Option<usize>,
}

impl GrowthPolicy {
    pub fn new(increment: usize, limit: Option<usize>) -> Self {
        Self { increment: increment.max(1), limit }
    }

    pub fn increment(&self) -> usize {
        self.increment
    }

    /// Initial buffer length, clamped to the ceiling.
    pub fn initial_len(&self, configured: usize) -> usize {
        match self.limit {
            Some(limit) => configured.min(limit),
            None => configured,
        }
    }

    /// New output buffer length after the engine reported the current one too
    /// small, with `remaining` bytes of work still outstanding.
    pub fn next_output_len(&mut self, remaining: usize, current: usize) -> Result<usize, QzError> {
        self.increment = self.increment.saturating_mul(2);
        let mut want = remaining.saturating_add(self.increment);
        if want <= current {
            want = current.saturating_add(self.increment);
        }
        self.clamp(want, current)
    }

    /// New input buffer length once the current one is full.
    pub fn next_input_len(&self, current: usize) -> Result<usize, QzError> {
        self.clamp(current.saturating_mul(2).max(1), current)
    }

    fn clamp(&self, want: usize, current: usize) -> Result<usize, QzError> {
        match self.limit {
            Some(limit) if want > limit => {
                if current < limit {
                    Ok(limit)
                } else {
                    Err(QzError::BufferLimitExceeded { requested: want, limit })
                }
            }
            _ => Ok(want),
        }
    }
}
