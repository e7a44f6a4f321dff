//! stream/reader.rs
//! Decompressing `io::Read` adapter over a chunk engine.
//!
//! Design notes:
//! - Upstream is read to end of stream into a growable input buffer before the
//!   first decompress call; the engine then walks it member by member.
//! - Decompressed bytes sit in an output window that is drained into caller
//!   buffers before the engine is called again.
//! - Bytes already copied out in a failing call are returned; the error is
//!   kept and surfaces on the next call.

use std::io::{self, Read};

use tracing::{debug_span, trace_span, Span};

use crate::engine::{Engine, SoftwareEngine};
use crate::params::{
    apply_options, DebugLevel, EnvOverrides, ParameterSet, ParameterTarget, QzOption, TargetRole,
};
use crate::qz_trace;
use crate::stream::buffer::GrowthPolicy;
use crate::stream::StreamState;
use crate::telemetry::{PerfCounters, Stage, StageClock};
use crate::types::QzError;
use crate::utils::RunningCrc;

pub struct Reader<R: Read, E: Engine = SoftwareEngine> {
    source: R,
    engine: E,
    overrides: EnvOverrides,
    staged: ParameterSet,
    effective: ParameterSet,

    state: StreamState,
    session_open: bool,
    err: Option<QzError>,
    close_result: Option<Result<(), QzError>>,

    input: Vec<u8>,
    input_offset: usize,
    input_read: usize,
    stream_done: bool,
    upstream_total: u64,

    output: Vec<u8>,
    output_offset: usize,
    output_left: usize,
    growth: GrowthPolicy,

    perf: PerfCounters,
    crc: RunningCrc,
    span: Span,
}

impl<R: Read> Reader<R, SoftwareEngine> {
    pub fn new(source: R) -> Self {
        Self::with_engine(source, SoftwareEngine::new())
    }
}

impl<R: Read, E: Engine> Reader<R, E> {
    pub fn with_engine(source: R, engine: E) -> Self {
        let staged = ParameterSet::default();
        Self {
            source,
            engine,
            overrides: EnvOverrides::none(),
            growth: GrowthPolicy::new(staged.buffer_growth, staged.max_buffer_len),
            effective: staged.clone(),
            staged,
            state: StreamState::Idle,
            session_open: false,
            err: None,
            close_result: None,
            input: Vec::new(),
            input_offset: 0,
            input_read: 0,
            stream_done: false,
            upstream_total: 0,
            output: Vec::new(),
            output_offset: 0,
            output_left: 0,
            perf: PerfCounters::default(),
            crc: RunningCrc::new(),
            span: Span::none(),
        }
    }

    pub fn with_overrides(mut self, overrides: EnvOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn apply(&mut self, options: &[QzOption]) -> Result<(), QzError> {
        apply_options(self, options)
    }

    pub fn params(&self) -> &ParameterSet {
        match self.state {
            StreamState::Idle => &self.staged,
            _ => &self.effective,
        }
    }

    pub fn perf(&self) -> PerfCounters {
        self.perf
    }

    /// CRC-32 of every byte delivered to the caller this session.
    pub fn crc32(&self) -> u32 {
        self.crc.value()
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn debug_level(&self) -> DebugLevel {
        self.effective.debug_level
    }

    fn fail(&mut self, err: QzError) -> QzError {
        qz_trace!(self.debug_level(), DebugLevel::Low, error = %err, "reader error");
        self.err = Some(err.clone());
        err
    }

    /// Keep `err` sticky; hand back what was already delivered, if anything.
    fn fail_after(&mut self, produced: usize, err: QzError) -> Result<usize, QzError> {
        let err = self.fail(err);
        if produced > 0 {
            Ok(produced)
        } else {
            Err(err)
        }
    }

    fn start_session(&mut self) -> Result<(), QzError> {
        let effective = self.staged.resolve(&self.overrides);
        self.span = debug_span!("qz_reader", algorithm = %effective.algorithm, level = effective.level);
        let _enter = self.span.clone().entered();

        self.engine.start_session(&effective)?;
        self.session_open = true;

        self.perf = PerfCounters::default();
        self.crc.reset();
        self.growth = GrowthPolicy::new(effective.buffer_growth, effective.max_buffer_len);

        self.input = vec![0u8; self.growth.initial_len(effective.input_buf_len)];
        self.output = vec![0u8; self.growth.initial_len(effective.output_buf_len)];

        self.input_offset = 0;
        self.input_read = 0;
        self.stream_done = false;
        self.upstream_total = 0;
        self.output_offset = 0;
        self.output_left = 0;

        self.effective = effective;
        self.state = StreamState::Active;
        qz_trace!(self.debug_level(), DebugLevel::Low, input_len = self.input.len(), "reader session started");
        Ok(())
    }

    fn teardown(&mut self) {
        if self.session_open {
            let _ = self.engine.close();
            self.session_open = false;
        }
    }

    /// Read upstream to end of stream, growing the input buffer when it fills.
    fn fill_input(&mut self) -> Result<(), QzError> {
        let _region = trace_span!("input").entered();
        self.input_offset = 0;
        self.input_read = 0;

        while !self.stream_done {
            if self.input_read == self.input.len() {
                let clock = StageClock::start(Stage::Copy);
                let new_len = self.growth.next_input_len(self.input.len())?;
                qz_trace!(
                    self.debug_level(),
                    DebugLevel::Med,
                    from = self.input.len(),
                    to = new_len,
                    "expand input buffer"
                );
                self.input.resize(new_len, 0);
                self.perf.record(clock);
            }

            let clock = StageClock::start(Stage::Read);
            let res = self.source.read(&mut self.input[self.input_read..]);
            self.perf.record(clock);

            match res {
                Ok(0) => self.stream_done = true,
                Ok(n) => {
                    self.input_read += n;
                    self.upstream_total += n as u64;
                    qz_trace!(
                        self.debug_level(),
                        DebugLevel::Med,
                        read = n,
                        buffered = self.input_read,
                        capacity = self.input.len(),
                        "transfer"
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(QzError::from(e)),
            }
        }
        Ok(())
    }

    /// Fill `buf` with decompressed bytes. `Ok(0)` is end of stream.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, QzError> {
        let span = self.span.clone();
        let _enter = span.enter();

        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        match self.state {
            StreamState::Closed => return Err(QzError::AlreadyClosed),
            StreamState::Active => {}
            StreamState::Idle => {
                if let Err(e) = self.start_session() {
                    return Err(self.fail(e));
                }
            }
        }
        let _call = trace_span!("read", len = buf.len()).entered();

        let mut produced = 0usize;
        while produced < buf.len() {
            if self.output_left > 0 {
                let clock = StageClock::start(Stage::Copy);
                let n = self.output_left.min(buf.len() - produced);
                let window = &self.output[self.output_offset..self.output_offset + n];
                buf[produced..produced + n].copy_from_slice(window);
                self.crc.update(window);
                self.perf.record(clock);
                self.output_offset += n;
                self.output_left -= n;
                produced += n;
                continue;
            }

            if self.input_offset == self.input_read && !self.stream_done {
                if let Err(e) = self.fill_input() {
                    return self.fail_after(produced, e);
                }
            }
            if self.upstream_total == 0 {
                return self.fail_after(produced, QzError::EmptyBuffer);
            }
            if self.input_offset == self.input_read {
                break;
            }

            let available = self.input_read - self.input_offset;
            let clock = StageClock::start(Stage::Engine);
            let result = {
                let _region = trace_span!("engine").entered();
                self.engine
                    .decompress(&self.input[self.input_offset..self.input_read], &mut self.output)
            };
            self.perf.record(clock);

            match result {
                Ok(step) => {
                    if step.consumed > available || step.produced > self.output.len() {
                        let err = QzError::EngineFault(format!(
                            "engine reported {}/{} bytes for {}/{} available",
                            step.consumed,
                            step.produced,
                            available,
                            self.output.len()
                        ));
                        return self.fail_after(produced, err);
                    }
                    if step.consumed == 0 && step.produced == 0 {
                        return self.fail_after(produced, QzError::CorruptInput("truncated stream".into()));
                    }
                    qz_trace!(
                        self.debug_level(),
                        DebugLevel::Med,
                        consumed = step.consumed,
                        produced = step.produced,
                        offset = self.input_offset,
                        buffered = self.input_read,
                        "read->engine"
                    );
                    self.perf.add_engine(step.consumed, step.produced);
                    self.input_offset += step.consumed;
                    self.output_offset = 0;
                    self.output_left = step.produced;
                }
                Err(QzError::InsufficientBuffer) => {
                    let clock = StageClock::start(Stage::Copy);
                    let remaining = buf.len() - produced;
                    let new_len = match self.growth.next_output_len(remaining, self.output.len()) {
                        Ok(n) => n,
                        Err(e) => return self.fail_after(produced, e),
                    };
                    qz_trace!(
                        self.debug_level(),
                        DebugLevel::Med,
                        from = self.output.len(),
                        to = new_len,
                        "expand output buffer"
                    );
                    self.output = vec![0u8; new_len];
                    self.perf.record(clock);
                }
                Err(e) => return self.fail_after(produced, e),
            }
        }
        Ok(produced)
    }

    /// Close the session. Idempotent: later calls return the first result.
    pub fn close(&mut self) -> Result<(), QzError> {
        match self.state {
            StreamState::Closed => {
                return self.close_result.clone().unwrap_or(Ok(()));
            }
            StreamState::Idle => {
                self.state = StreamState::Closed;
                self.close_result = Some(Ok(()));
                return Ok(());
            }
            StreamState::Active => {}
        }

        let span = self.span.clone();
        let _enter = span.enter();
        self.state = StreamState::Closed;

        let result = match self.err.clone() {
            Some(err) => {
                self.teardown();
                Err(err)
            }
            None => {
                self.session_open = false;
                self.engine.close().map_err(|e| self.fail(e))
            }
        };
        qz_trace!(self.debug_level(), DebugLevel::Low, ok = result.is_ok(), "reader closed");
        self.close_result = Some(result.clone());
        result
    }

    /// Tear down the current session, install a new source and start a fresh
    /// session. Returns the previous source.
    pub fn reset(&mut self, source: R) -> Result<R, QzError> {
        self.teardown();
        self.err = None;
        self.close_result = None;
        self.state = StreamState::Idle;
        self.perf = PerfCounters::default();
        self.crc.reset();

        if let Err(e) = self.start_session() {
            return Err(self.fail(e));
        }
        Ok(std::mem::replace(&mut self.source, source))
    }
}

impl<R: Read, E: Engine> ParameterTarget for Reader<R, E> {
    fn role(&self) -> TargetRole {
        TargetRole::Reader
    }

    fn session_started(&self) -> bool {
        self.state != StreamState::Idle
    }

    fn staged_params_mut(&mut self) -> &mut ParameterSet {
        &mut self.staged
    }
}

impl<R: Read, E: Engine> Read for Reader<R, E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_chunk(buf).map_err(io::Error::from)
    }
}
