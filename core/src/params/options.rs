//! params/options.rs
//! Option applier: validated, staged mutations of a target's parameter set.
//!
//! Design notes:
//! - A target is anything implementing `ParameterTarget`; the applier never
//!   inspects concrete types. The target's role decides which options it takes.
//! - Options touch the staged `ParameterSet` only, never engine state.
//! - A batch stops at the first failure and earlier options stay applied.

use bitflags::bitflags;

use crate::constants::{MIN_BOUNCE_BUFFER_LENGTH, MIN_BUFFER_LENGTH};
use crate::params::set::{Explicit, ParameterSet};
use crate::params::types::{
    Algorithm, DebugLevel, DeflateFormat, Direction, HuffmanHdr, InputBufferMode, PollingMode,
};
use crate::types::{ParamError, QzError};

bitflags! {
    /// Option families a target accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// Algorithm, framing, direction, debug level, engine tuning.
        const COMMON         = 1 << 0;
        const LEVEL          = 1 << 1;
        const HUFFMAN        = 1 << 2;
        /// Input buffer mode and bounce buffer length.
        const INPUT_STAGING  = 1 << 3;
        /// Output buffer length, growth increment, growth ceiling.
        const OUTPUT_BUFFERS = 1 << 4;
        const INPUT_BUFFER   = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRole {
    Writer,
    Reader,
    /// Bare engine parameter holder.
    Session,
}

impl TargetRole {
    pub fn capabilities(self) -> Capabilities {
        match self {
            TargetRole::Writer => {
                Capabilities::COMMON
                    | Capabilities::LEVEL
                    | Capabilities::HUFFMAN
                    | Capabilities::INPUT_STAGING
                    | Capabilities::OUTPUT_BUFFERS
            }
            TargetRole::Reader => {
                Capabilities::COMMON | Capabilities::OUTPUT_BUFFERS | Capabilities::INPUT_BUFFER
            }
            TargetRole::Session => Capabilities::COMMON | Capabilities::LEVEL | Capabilities::HUFFMAN,
        }
    }
}

/// Something whose parameters can be staged before its session starts.
pub trait ParameterTarget {
    fn role(&self) -> TargetRole;
    fn session_started(&self) -> bool;
    fn staged_params_mut(&mut self) -> &mut ParameterSet;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QzOption {
    /// Must be positive; the engine checks the upper bound at session start.
    CompressionLevel(i32),
    Algorithm(Algorithm),
    DeflateFormat(DeflateFormat),
    Direction(Direction),
    InputBufferMode(InputBufferMode),
    PollingMode(PollingMode),
    HuffmanHdr(HuffmanHdr),
    DebugLevel(DebugLevel),
    OutputBufLength(usize),
    InputBufLength(usize),
    BufferGrowth(usize),
    BounceBufferLength(usize),
    MaxBufferLength(usize),
    SwBackup(bool),
    Sensitive(bool),
    MaxForks(u32),
    HwBufSize(u32),
    StreamBufSize(u32),
    SwSwitchThreshold(u32),
    ReqCountThreshold(u32),
    WaitCountThreshold(u32),
}

impl QzOption {
    pub fn required_capability(&self) -> Capabilities {
        match self {
            Self::CompressionLevel(_) => Capabilities::LEVEL,
            Self::HuffmanHdr(_) => Capabilities::HUFFMAN,
            Self::InputBufferMode(_) | Self::BounceBufferLength(_) => Capabilities::INPUT_STAGING,
            Self::OutputBufLength(_) | Self::BufferGrowth(_) | Self::MaxBufferLength(_) => {
                Capabilities::OUTPUT_BUFFERS
            }
            Self::InputBufLength(_) => Capabilities::INPUT_BUFFER,
            _ => Capabilities::COMMON,
        }
    }

    /// Check the value against its own domain, independent of any target.
    pub fn validate(&self) -> Result<(), ParamError> {
        match *self {
            Self::CompressionLevel(level) if level <= 0 => Err(ParamError::CompressionLevel),
            Self::OutputBufLength(n) if n < MIN_BUFFER_LENGTH => Err(ParamError::OutputBufLength),
            Self::InputBufLength(n) if n < MIN_BUFFER_LENGTH => Err(ParamError::InputBufLength),
            Self::BufferGrowth(n) if n < MIN_BUFFER_LENGTH => Err(ParamError::BufferGrowth),
            Self::BounceBufferLength(n) if n < MIN_BOUNCE_BUFFER_LENGTH => Err(ParamError::BounceBufferLength),
            Self::MaxBufferLength(n) if n < MIN_BUFFER_LENGTH => Err(ParamError::MaxBufferLength),
            _ => Ok(()),
        }
    }

    fn check_role(&self, role: TargetRole) -> Result<(), ParamError> {
        if !role.capabilities().contains(self.required_capability()) {
            return Err(ParamError::InvalidTarget);
        }
        match (*self, role) {
            (QzOption::Direction(Direction::Decompress), TargetRole::Writer)
            | (QzOption::Direction(Direction::Compress), TargetRole::Reader) => {
                Err(ParamError::IncompatibleDirection)
            }
            _ => Ok(()),
        }
    }

    fn stage(&self, p: &mut ParameterSet) {
        match *self {
            Self::CompressionLevel(level) => {
                p.level = level as u32;
                p.mark_explicit(Explicit::LEVEL);
            }
            Self::Algorithm(a) => {
                p.algorithm = a;
                p.mark_explicit(Explicit::ALGORITHM);
            }
            Self::DebugLevel(d) => {
                p.debug_level = d;
                p.mark_explicit(Explicit::DEBUG_LEVEL);
            }
            Self::DeflateFormat(f) => p.deflate_format = f,
            Self::Direction(d) => p.direction = d,
            Self::InputBufferMode(m) => p.input_buffer_mode = m,
            Self::PollingMode(m) => p.polling_mode = m,
            Self::HuffmanHdr(h) => p.huffman_hdr = h,
            Self::OutputBufLength(n) => p.output_buf_len = n,
            Self::InputBufLength(n) => p.input_buf_len = n,
            Self::BufferGrowth(n) => p.buffer_growth = n,
            Self::BounceBufferLength(n) => p.bounce_buffer_len = n,
            Self::MaxBufferLength(n) => p.max_buffer_len = Some(n),
            Self::SwBackup(b) => p.sw_backup = b,
            Self::Sensitive(b) => p.sensitive = b,
            Self::MaxForks(n) => p.max_forks = n,
            Self::HwBufSize(n) => p.hw_buf_size = n,
            Self::StreamBufSize(n) => p.stream_buf_size = n,
            Self::SwSwitchThreshold(n) => p.sw_switch_threshold = n,
            Self::ReqCountThreshold(n) => p.req_count_threshold = n,
            Self::WaitCountThreshold(n) => p.wait_count_threshold = n,
        }
    }
}

/// Apply `options` in order to `target`.
///
/// Fails with `ApplyAfterStart` once the target's session exists. Otherwise
/// stops at the first invalid option; options before it remain staged.
pub fn apply_options<T>(target: &mut T, options: &[QzOption]) -> Result<(), QzError>
where
    T: ParameterTarget + ?Sized,
{
    if target.session_started() {
        return Err(QzError::ApplyAfterStart);
    }
    let role = target.role();
    for opt in options {
        opt.validate()?;
        opt.check_role(role)?;
        opt.stage(target.staged_params_mut());
    }
    Ok(())
}

/// Stand-alone engine parameters, configured with the `Session` role and
/// handed to `Engine::start_session` by callers driving an engine directly.
#[derive(Debug, Clone, Default)]
pub struct SessionParams {
    params: ParameterSet,
    started: bool,
}

impl SessionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Freeze the parameters; later `apply` calls fail.
    pub fn freeze(&mut self) -> &ParameterSet {
        self.started = true;
        &self.params
    }

    pub fn apply(&mut self, options: &[QzOption]) -> Result<(), QzError> {
        apply_options(self, options)
    }
}

impl ParameterTarget for SessionParams {
    fn role(&self) -> TargetRole {
        TargetRole::Session
    }

    fn session_started(&self) -> bool {
        self.started
    }

    fn staged_params_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }
}
