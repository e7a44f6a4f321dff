//! engine/mod.rs
//! Chunk-engine contract consumed by the stream writer and reader.
//!
//! Design notes:
//! - One engine value serves one stream for its whole life; sessions are
//!   started and closed on it repeatedly across `reset`.
//! - `compress`/`decompress` report how much input was consumed and how much
//!   output was produced. `QzError::InsufficientBuffer` means the output slice
//!   was too small and nothing was consumed; the caller retries with the same
//!   input and a larger output slice. Every other error is terminal.

pub mod software;

pub use software::SoftwareEngine;

use crate::params::ParameterSet;
use crate::types::QzError;

/// Outcome of one engine call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    pub consumed: usize,
    pub produced: usize,
}

pub trait Engine: Send {
    fn start_session(&mut self, params: &ParameterSet) -> Result<(), QzError>;
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError>;
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError>;
    /// Mark the next compress call's input as the end of the stream.
    fn set_last(&mut self, last: bool);
    /// `NotYetStarted` when no session is open.
    fn close(&mut self) -> Result<(), QzError>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn start_session(&mut self, params: &ParameterSet) -> Result<(), QzError> {
        (**self).start_session(params)
    }

    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError> {
        (**self).compress(input, output)
    }

    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError> {
        (**self).decompress(input, output)
    }

    fn set_last(&mut self, last: bool) {
        (**self).set_last(last)
    }

    fn close(&mut self) -> Result<(), QzError> {
        (**self).close()
    }
}
