//! compression/types.rs
//! Member codec trait and codec-level errors.
use std::fmt;

use crate::params::{Algorithm, ParameterSet};
use crate::types::{ParamError, QzError};

#[derive(Debug)]
pub enum CodecError {
    LevelOutOfRange { codec: &'static str, level: u32, max: u32 },
    EncodeFailed { codec: &'static str, msg: String },
    DecodeFailed { codec: &'static str, msg: String },
    Truncated { codec: &'static str, have: usize },
    BadMagic { codec: &'static str },
    /// Decoded bytes disagree with the member's stored checksum or length.
    ChecksumMismatch { codec: &'static str },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CodecError::*;
        match self {
            LevelOutOfRange { codec, level, max } =>
                write!(f, "{} level {} out of range (max {})", codec, level, max),
            EncodeFailed { codec, msg } =>
                write!(f, "{} encode failed: {}", codec, msg),
            DecodeFailed { codec, msg } =>
                write!(f, "{} decode failed: {}", codec, msg),
            Truncated { codec, have } =>
                write!(f, "{} member truncated after {} bytes", codec, have),
            BadMagic { codec } =>
                write!(f, "{} magic mismatch", codec),
            ChecksumMismatch { codec } =>
                write!(f, "{} checksum mismatch", codec),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<CodecError> for QzError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::LevelOutOfRange { .. } => QzError::InvalidParameter(ParamError::CompressionLevel),
            CodecError::EncodeFailed { .. } => QzError::EngineFault(e.to_string()),
            CodecError::DecodeFailed { .. } | CodecError::Truncated { .. } | CodecError::BadMagic { .. } => {
                QzError::CorruptInput(e.to_string())
            }
            CodecError::ChecksumMismatch { .. } => QzError::IntegrityCheckFailed,
        }
    }
}

/// One entry of the algorithm dispatch table.
///
/// A member is a self-contained container unit (gzip member, LZ4 frame, zstd
/// frame); a stream is a concatenation of members.
pub trait Codec: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Highest accepted level, `None` when the codec ignores levels.
    fn max_level(&self) -> Option<u32>;

    /// Append one member encoding `input` to `out`.
    fn encode_member(&self, input: &[u8], params: &ParameterSet, out: &mut Vec<u8>) -> Result<(), CodecError>;

    /// Decode the member at the start of `input` into `out`.
    /// Returns the number of input bytes the member occupied.
    fn decode_member(&self, input: &[u8], params: &ParameterSet, out: &mut Vec<u8>) -> Result<usize, CodecError>;

    /// Bytes a writer emits when closed with nothing written.
    fn empty_payload(&self, params: &ParameterSet) -> Result<Vec<u8>, CodecError>;

    fn check_level(&self, level: u32) -> Result<(), CodecError> {
        match self.max_level() {
            Some(max) if level > max => Err(CodecError::LevelOutOfRange {
                codec: self.algorithm().name(),
                level,
                max,
            }),
            _ => Ok(()),
        }
    }
}
