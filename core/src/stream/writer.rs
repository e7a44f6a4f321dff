//! stream/writer.rs
//! Compressing `io::Write` adapter over a chunk engine.
//!
//! Design notes:
//! - The session starts lazily on the first write (or on `close`/`reset`),
//!   from the staged parameters merged with the configuration overrides.
//! - Input is staged per `InputBufferMode` so that the final chunk can be
//!   marked last before it reaches the engine.
//! - The engine is never handed bytes it already reported as consumed; an
//!   insufficient-buffer signal grows the output buffer and retries the same
//!   slice.
//! - The first terminal error is kept and returned by every later call until
//!   `reset`.

use std::io::{self, Write};

use tracing::{debug_span, trace_span, Span};

use crate::compression::registry;
use crate::engine::{Engine, SoftwareEngine};
use crate::params::{
    apply_options, DebugLevel, EnvOverrides, InputBufferMode, ParameterSet, ParameterTarget, QzOption,
    TargetRole,
};
use crate::qz_trace;
use crate::stream::buffer::GrowthPolicy;
use crate::stream::StreamState;
use crate::telemetry::{PerfCounters, Stage, StageClock};
use crate::types::QzError;
use crate::utils::RunningCrc;

pub struct Writer<W: Write, E: Engine = SoftwareEngine> {
    sink: W,
    engine: E,
    overrides: EnvOverrides,
    staged: ParameterSet,
    effective: ParameterSet,

    state: StreamState,
    session_open: bool,
    err: Option<QzError>,

    output: Vec<u8>,
    bounce: Vec<u8>,
    growth: GrowthPolicy,
    /// Set once the engine accepted input or a placeholder went out.
    wrote_output: bool,

    perf: PerfCounters,
    crc: RunningCrc,
    span: Span,
}

impl<W: Write> Writer<W, SoftwareEngine> {
    pub fn new(sink: W) -> Self {
        Self::with_engine(sink, SoftwareEngine::new())
    }
}

impl<W: Write, E: Engine> Writer<W, E> {
    pub fn with_engine(sink: W, engine: E) -> Self {
        let staged = ParameterSet::default();
        Self {
            sink,
            engine,
            overrides: EnvOverrides::none(),
            growth: GrowthPolicy::new(staged.buffer_growth, staged.max_buffer_len),
            effective: staged.clone(),
            staged,
            state: StreamState::Idle,
            session_open: false,
            err: None,
            output: Vec::new(),
            bounce: Vec::new(),
            wrote_output: false,
            perf: PerfCounters::default(),
            crc: RunningCrc::new(),
            span: Span::none(),
        }
    }

    /// Overrides merged into the parameters at every session start.
    pub fn with_overrides(mut self, overrides: EnvOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn apply(&mut self, options: &[QzOption]) -> Result<(), QzError> {
        apply_options(self, options)
    }

    /// Staged parameters while idle, effective parameters once started.
    pub fn params(&self) -> &ParameterSet {
        match self.state {
            StreamState::Idle => &self.staged,
            _ => &self.effective,
        }
    }

    pub fn perf(&self) -> PerfCounters {
        self.perf
    }

    /// CRC-32 of every byte the engine has consumed this session.
    pub fn crc32(&self) -> u32 {
        self.crc.value()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }

    fn debug_level(&self) -> DebugLevel {
        self.effective.debug_level
    }

    fn fail(&mut self, err: QzError) -> QzError {
        qz_trace!(self.debug_level(), DebugLevel::Low, error = %err, "writer error");
        self.err = Some(err.clone());
        err
    }

    fn start_session(&mut self) -> Result<(), QzError> {
        let effective = self.staged.resolve(&self.overrides);
        self.span = debug_span!(
            "qz_writer",
            algorithm = %effective.algorithm,
            level = effective.level,
            mode = ?effective.input_buffer_mode,
        );
        let _enter = self.span.clone().entered();

        self.engine.start_session(&effective)?;
        self.session_open = true;

        self.perf = PerfCounters::default();
        self.crc.reset();
        self.growth = GrowthPolicy::new(effective.buffer_growth, effective.max_buffer_len);

        self.output = vec![0u8; self.growth.initial_len(effective.output_buf_len)];
        self.bounce = Vec::with_capacity(effective.bounce_buffer_len);

        self.wrote_output = false;
        self.effective = effective;
        self.state = StreamState::Active;
        qz_trace!(self.debug_level(), DebugLevel::Low, output_len = self.output.len(), "writer session started");
        Ok(())
    }

    fn teardown(&mut self) {
        if self.session_open {
            let _ = self.engine.close();
            self.session_open = false;
        }
    }

    /// Sticky error first, then lifecycle checks; starts an idle session.
    fn ready(&mut self) -> Result<(), QzError> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        match self.state {
            StreamState::Closed => Err(QzError::AlreadyClosed),
            StreamState::Active => Ok(()),
            StreamState::Idle => self.start_session().map_err(|e| self.fail(e)),
        }
    }

    /// Compress and forward `buf`. Returns the number of bytes taken, which
    /// counts bytes held back for the final chunk.
    pub fn write_chunk(&mut self, buf: &[u8]) -> Result<usize, QzError> {
        let span = self.span.clone();
        let _enter = span.enter();
        self.ready()?;
        let _call = trace_span!("write", len = buf.len()).entered();

        self.flush_bounce()?;

        let mode = self.effective.input_buffer_mode;
        let bounce_len = self.effective.bounce_buffer_len;
        let mut input = buf;
        let mut held = 0;

        if mode != InputBufferMode::NoLast {
            if mode == InputBufferMode::Bounce || buf.len() <= bounce_len {
                let clock = StageClock::start(Stage::Copy);
                self.bounce.extend_from_slice(buf);
                self.perf.record(clock);
                qz_trace!(self.debug_level(), DebugLevel::Med, held = buf.len(), "write->bounce");
                return Ok(buf.len());
            }
            if mode == InputBufferMode::Reserve {
                let clock = StageClock::start(Stage::Copy);
                let (prefix, tail) = buf.split_at(buf.len() - bounce_len);
                self.bounce.extend_from_slice(tail);
                self.perf.record(clock);
                input = prefix;
                held = tail.len();
            }
        }

        let consumed = self.compress_write(input)?;
        Ok(consumed + held)
    }

    /// Submit held-back bytes. The buffer is reused afterwards.
    fn flush_bounce(&mut self) -> Result<(), QzError> {
        if self.bounce.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.bounce);
        let res = self.compress_write(&pending);
        self.bounce = pending;
        self.bounce.clear();
        res.map(|_| ())
    }

    /// Drive the engine over `input` until all of it is consumed.
    fn compress_write(&mut self, input: &[u8]) -> Result<usize, QzError> {
        let mut consumed = 0usize;

        while consumed < input.len() {
            if self.effective.input_buffer_mode == InputBufferMode::Last {
                self.engine.set_last(true);
            }
            let remaining = input.len() - consumed;

            let clock = StageClock::start(Stage::Engine);
            let result = {
                let _region = trace_span!("engine").entered();
                self.engine.compress(&input[consumed..], &mut self.output)
            };
            self.perf.record(clock);

            match result {
                Ok(step) => {
                    if step.consumed > remaining || step.produced > self.output.len() {
                        return Err(self.fail(QzError::EngineFault(format!(
                            "engine reported {}/{} bytes for {}/{} available",
                            step.consumed,
                            step.produced,
                            remaining,
                            self.output.len()
                        ))));
                    }
                    if step.consumed == 0 && step.produced == 0 {
                        return Err(self.fail(QzError::EngineFault("engine made no progress".into())));
                    }
                    qz_trace!(
                        self.debug_level(),
                        DebugLevel::Med,
                        remaining,
                        consumed = step.consumed,
                        produced = step.produced,
                        offset = consumed,
                        "write->engine"
                    );

                    self.perf.add_engine(step.consumed, step.produced);
                    self.crc.update(&input[consumed..consumed + step.consumed]);
                    consumed += step.consumed;
                    self.wrote_output = true;

                    if step.produced > 0 {
                        self.emit(step.produced)?;
                    }
                }
                Err(QzError::InsufficientBuffer) => {
                    let clock = StageClock::start(Stage::Copy);
                    let new_len = match self.growth.next_output_len(remaining, self.output.len()) {
                        Ok(n) => n,
                        Err(e) => return Err(self.fail(e)),
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
                Err(e) => return Err(self.fail(e)),
            }
        }
        Ok(consumed)
    }

    /// Forward the first `produced` bytes of the output buffer downstream.
    fn emit(&mut self, produced: usize) -> Result<(), QzError> {
        let _region = trace_span!("output").entered();
        let clock = StageClock::start(Stage::Write);
        let res = self.sink.write_all(&self.output[..produced]);
        self.perf.record(clock);
        qz_trace!(self.debug_level(), DebugLevel::Med, written = produced, ok = res.is_ok(), "write->output");
        res.map_err(|e| self.fail(sink_error(e)))
    }

    fn emit_placeholder(&mut self) -> Result<(), QzError> {
        let _region = trace_span!("empty").entered();
        let bytes = registry::empty_payload(&self.effective).map_err(QzError::from)?;
        let info = registry::resolve(self.effective.algorithm);
        qz_trace!(
            self.debug_level(),
            DebugLevel::Med,
            codec = info.name,
            synthetic = info.synthetic_placeholder,
            len = bytes.len(),
            "write->output placeholder"
        );
        let clock = StageClock::start(Stage::Write);
        let res = self.sink.write_all(&bytes);
        self.perf.record(clock);
        self.wrote_output = true;
        res.map_err(sink_error)
    }

    /// Finish the stream: mark the last chunk, flush held-back bytes, close
    /// the session. A second call fails with `AlreadyClosed`.
    pub fn close(&mut self) -> Result<(), QzError> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.state == StreamState::Closed {
            return Err(QzError::AlreadyClosed);
        }
        if let Some(err) = self.err.clone() {
            self.teardown();
            return Err(err);
        }
        if self.state == StreamState::Idle {
            if let Err(e) = self.start_session() {
                return Err(self.fail(e));
            }
        }
        let _call = trace_span!("close").entered();

        if !self.wrote_output && self.perf.bytes_in == 0 && self.bounce.is_empty() {
            if let Err(e) = self.emit_placeholder() {
                self.teardown();
                return Err(self.fail(e));
            }
        }

        self.state = StreamState::Closed;
        self.engine.set_last(true);
        if let Err(e) = self.flush_bounce() {
            self.teardown();
            return Err(e);
        }
        if let Err(e) = self.sink.flush() {
            self.teardown();
            return Err(self.fail(QzError::from(e)));
        }

        self.session_open = false;
        match self.engine.close() {
            Ok(()) => {
                qz_trace!(self.debug_level(), DebugLevel::Low, bytes_in = self.perf.bytes_in, "writer closed");
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Close the stream and hand back the sink.
    pub fn finish(mut self) -> Result<W, QzError> {
        self.close()?;
        Ok(self.sink)
    }

    /// Finish the current stream into the current sink, install a new sink
    /// and start a fresh session. Counters, buffers and any sticky error are
    /// cleared. A stream that already failed is torn down as is.
    ///
    /// Returns the previous sink; if the new session cannot start, the
    /// previous sink stays in place and the error is sticky.
    pub fn reset(&mut self, sink: W) -> Result<W, QzError> {
        if self.state == StreamState::Active && self.err.is_none() {
            if let Err(e) = self.close() {
                qz_trace!(self.debug_level(), DebugLevel::Low, error = %e, "previous stream left unfinished");
            }
        }
        self.teardown();
        self.err = None;
        self.state = StreamState::Idle;
        self.bounce.clear();
        self.perf = PerfCounters::default();
        self.crc.reset();

        if let Err(e) = self.start_session() {
            return Err(self.fail(e));
        }
        Ok(std::mem::replace(&mut self.sink, sink))
    }
}

/// A sink that stops accepting bytes is a short write.
fn sink_error(e: io::Error) -> QzError {
    match e.kind() {
        io::ErrorKind::WriteZero => QzError::ShortWrite,
        _ => QzError::from(e),
    }
}

impl<W: Write, E: Engine> ParameterTarget for Writer<W, E> {
    fn role(&self) -> TargetRole {
        TargetRole::Writer
    }

    fn session_started(&self) -> bool {
        self.state != StreamState::Idle
    }

    fn staged_params_mut(&mut self) -> &mut ParameterSet {
        &mut self.staged
    }
}

impl<W: Write, E: Engine> Write for Writer<W, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf).map_err(io::Error::from)
    }

    /// Flushes the sink only; held-back bytes stay held so that the final
    /// chunk can still be marked last at `close`.
    fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone().into());
        }
        self.sink.flush()
    }
}
