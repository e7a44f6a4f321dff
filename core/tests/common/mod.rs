//! Scripted engine for stream tests.
//!
//! Compression and decompression are both the identity: each call copies at
//! most `chunk` bytes of input to output. An output slice shorter than
//! `min_output` is answered with `InsufficientBuffer`, and `fail_on` injects a
//! terminal error on the n-th data call (1-based).

#![allow(dead_code)]

use std::io::{self, Write};

use qzio_core::engine::{Engine, Step};
use qzio_core::params::ParameterSet;
use qzio_core::types::QzError;

#[derive(Debug, Default)]
pub struct FakeEngine {
    pub chunk: usize,
    pub min_output: usize,
    pub fail_on: Option<(usize, QzError)>,

    pub active: bool,
    pub starts: usize,
    pub closes: usize,
    pub calls: usize,
    pub insufficient: usize,
    pub consumed_total: usize,
    pub last_seen: Vec<bool>,
    pub output_lens: Vec<usize>,
    last: bool,
}

impl FakeEngine {
    pub fn new(chunk: usize) -> Self {
        Self { chunk, ..Default::default() }
    }

    pub fn needing_output(mut self, min_output: usize) -> Self {
        self.min_output = min_output;
        self
    }

    pub fn failing_on(mut self, call: usize, err: QzError) -> Self {
        self.fail_on = Some((call, err));
        self
    }

    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError> {
        if !self.active {
            return Err(QzError::NotYetStarted);
        }
        self.calls += 1;
        self.last_seen.push(self.last);
        self.output_lens.push(output.len());

        if let Some((n, err)) = &self.fail_on {
            if *n == self.calls {
                return Err(err.clone());
            }
        }
        if output.len() < self.min_output {
            self.insufficient += 1;
            return Err(QzError::InsufficientBuffer);
        }
        let n = input.len().min(self.chunk).min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        self.consumed_total += n;
        Ok(Step { consumed: n, produced: n })
    }
}

impl Engine for FakeEngine {
    fn start_session(&mut self, _params: &ParameterSet) -> Result<(), QzError> {
        self.starts += 1;
        self.active = true;
        self.last = false;
        Ok(())
    }

    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError> {
        self.step(input, output)
    }

    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError> {
        self.step(input, output)
    }

    fn set_last(&mut self, last: bool) {
        self.last = last;
    }

    fn close(&mut self) -> Result<(), QzError> {
        self.closes += 1;
        if !self.active {
            return Err(QzError::NotYetStarted);
        }
        self.active = false;
        Ok(())
    }
}

/// Sink that accepts nothing.
pub struct ZeroSink;

impl Write for ZeroSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Deterministic, moderately compressible payload.
pub fn sample_payload(len: usize) -> Vec<u8> {
    let words: [&[u8]; 6] = [b"alpha ", b"beta ", b"gamma ", b"delta ", b"qz ", b"stream\n"];
    let mut out = Vec::with_capacity(len + 8);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[(i * 7 + i / 3) % words.len()]);
        i += 1;
    }
    out.truncate(len);
    out
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}
