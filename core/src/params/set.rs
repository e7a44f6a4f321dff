//! params/set.rs
//! The staged parameter set consumed by an engine at session start.
//!
//! Design notes:
//! - A stream stages one `ParameterSet` while idle. Options mutate it; the
//!   engine receives the *effective* set produced by `resolve`.
//! - Fields set through an option are recorded in `explicit` so that
//!   configuration overrides never replace a value the caller asked for.
//! - Zero in an engine-tuning field means "engine default".

use bitflags::bitflags;
use serde::Serialize;

use crate::constants::{
    DEFAULT_BOUNCE_BUFFER_LENGTH, DEFAULT_BUFFER_GROWTH, DEFAULT_BUFFER_LENGTH,
    DEFAULT_COMPRESSION_LEVEL, DEFAULT_HW_BUFFER_SIZE,
};
use crate::params::env::EnvOverrides;
use crate::params::types::{
    Algorithm, DebugLevel, DeflateFormat, Direction, HuffmanHdr, InputBufferMode, PollingMode,
};

bitflags! {
    /// Fields that overrides may not replace.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Explicit: u8 {
        const ALGORITHM   = 1 << 0;
        const LEVEL       = 1 << 1;
        const DEBUG_LEVEL = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSet {
    pub algorithm: Algorithm,
    pub level: u32,
    pub direction: Direction,
    pub deflate_format: DeflateFormat,

    pub output_buf_len: usize,
    pub input_buf_len: usize,
    pub buffer_growth: usize,
    pub bounce_buffer_len: usize,
    pub input_buffer_mode: InputBufferMode,
    /// Upper bound for input/output buffer growth; `None` is unbounded.
    pub max_buffer_len: Option<usize>,

    pub debug_level: DebugLevel,

    // Engine tuning, passed through untouched.
    pub huffman_hdr: HuffmanHdr,
    pub polling_mode: PollingMode,
    pub sw_backup: bool,
    pub sensitive: bool,
    pub max_forks: u32,
    pub hw_buf_size: u32,
    pub stream_buf_size: u32,
    pub sw_switch_threshold: u32,
    pub req_count_threshold: u32,
    pub wait_count_threshold: u32,

    /// Fields set through an option.
    #[serde(skip)]
    pub explicit: Explicit,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Deflate,
            level: DEFAULT_COMPRESSION_LEVEL,
            direction: Direction::Both,
            deflate_format: DeflateFormat::GzipExt,
            output_buf_len: DEFAULT_BUFFER_LENGTH,
            input_buf_len: DEFAULT_BUFFER_LENGTH,
            buffer_growth: DEFAULT_BUFFER_GROWTH,
            bounce_buffer_len: DEFAULT_BOUNCE_BUFFER_LENGTH,
            input_buffer_mode: InputBufferMode::Reserve,
            max_buffer_len: None,
            debug_level: DebugLevel::None,
            huffman_hdr: HuffmanHdr::Dynamic,
            polling_mode: PollingMode::Periodical,
            sw_backup: false,
            sensitive: false,
            max_forks: 0,
            hw_buf_size: 0,
            stream_buf_size: 0,
            sw_switch_threshold: 0,
            req_count_threshold: 0,
            wait_count_threshold: 0,
            explicit: Explicit::empty(),
        }
    }
}

impl ParameterSet {
    pub(crate) fn mark_explicit(&mut self, field: Explicit) {
        self.explicit |= field;
    }

    /// Effective parameters for a new session.
    ///
    /// Precedence per field: explicitly applied option, then override, then
    /// the compiled default already present in `self`.
    pub fn resolve(&self, overrides: &EnvOverrides) -> ParameterSet {
        let mut effective = self.clone();
        if !self.explicit.contains(Explicit::ALGORITHM) {
            if let Some(algorithm) = overrides.algorithm {
                effective.algorithm = algorithm;
            }
        }
        if !self.explicit.contains(Explicit::LEVEL) {
            if let Some(level) = overrides.level {
                effective.level = level;
            }
        }
        if !self.explicit.contains(Explicit::DEBUG_LEVEL) {
            if let Some(debug_level) = overrides.debug_level {
                effective.debug_level = debug_level;
            }
        }
        effective
    }

    /// Largest slice an engine should take per compress call.
    pub fn hw_chunk_len(&self) -> usize {
        match self.hw_buf_size {
            0 => DEFAULT_HW_BUFFER_SIZE,
            n => n as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_gzip_ext_level_one() {
        let p = ParameterSet::default();
        assert_eq!(p.algorithm, Algorithm::Deflate);
        assert_eq!(p.deflate_format, DeflateFormat::GzipExt);
        assert_eq!(p.level, 1);
        assert_eq!(p.input_buffer_mode, InputBufferMode::Reserve);
        assert_eq!(p.bounce_buffer_len, 512);
        assert_eq!(p.max_buffer_len, None);
        assert!(p.explicit.is_empty());
    }

    #[test]
    fn overrides_fill_only_unset_fields() {
        let overrides = EnvOverrides {
            algorithm: Some(Algorithm::Lz4),
            level: Some(5),
            debug_level: Some(DebugLevel::High),
        };

        let mut staged = ParameterSet::default();
        staged.level = 9;
        staged.mark_explicit(Explicit::LEVEL);

        let eff = staged.resolve(&overrides);
        assert_eq!(eff.algorithm, Algorithm::Lz4);
        assert_eq!(eff.level, 9);
        assert_eq!(eff.debug_level, DebugLevel::High);
    }

    #[test]
    fn hw_chunk_len_falls_back_to_default() {
        let mut p = ParameterSet::default();
        assert_eq!(p.hw_chunk_len(), DEFAULT_HW_BUFFER_SIZE);
        p.hw_buf_size = 4096;
        assert_eq!(p.hw_chunk_len(), 4096);
    }
}
