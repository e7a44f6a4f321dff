//! types.rs
//! Unified error taxonomy for options, engine calls and stream lifecycle.
//!
//! Design notes:
//! - Every error is `Clone` so a stream can keep it as a sticky condition and
//!   hand the same value back on every later call.
//! - Engine status codes are mapped onto the taxonomy in one place
//!   (`QzError::from_status`), independent of the numeric values.
//! - `io::Error` crossings keep the kind and message, and a `QzError` travelling
//!   through `io::Write`/`io::Read` can be recovered with `QzError::from_io`.

use std::io;

use thiserror::Error;

/// Named option/parameter domain failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("invalid compression level")]
    CompressionLevel,
    #[error("invalid algorithm type")]
    Algorithm,
    #[error("invalid deflate format type")]
    DeflateFormat,
    #[error("invalid direction")]
    Direction,
    #[error("invalid input buffer mode")]
    InputBufferMode,
    #[error("invalid polling mode")]
    PollingMode,
    #[error("invalid huffman header type")]
    HuffmanHdr,
    #[error("invalid debug level")]
    DebugLevel,
    #[error("invalid size for output buffer length")]
    OutputBufLength,
    #[error("invalid size for input buffer length")]
    InputBufLength,
    #[error("invalid size for buffer growth")]
    BufferGrowth,
    #[error("invalid size for bounce buffer length")]
    BounceBufferLength,
    #[error("invalid size for maximum buffer length")]
    MaxBufferLength,
    #[error("direction not usable by this stream")]
    IncompatibleDirection,
    #[error("option applied to incorrect type")]
    InvalidTarget,
    #[error("engine rejected session parameters")]
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QzError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(ParamError),

    #[error("cannot apply options after reset or I/O")]
    ApplyAfterStart,

    /// Retryable: the output slice handed to the engine was too small.
    #[error("insufficient buffer")]
    InsufficientBuffer,

    #[error("input data was corrupted: {0}")]
    CorruptInput(String),

    #[error("operation timed out")]
    Timeout,

    #[error("integrity check failed")]
    IntegrityCheckFailed,

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("stream already closed")]
    AlreadyClosed,

    #[error("session not started")]
    NotYetStarted,

    #[error("empty buffer")]
    EmptyBuffer,

    #[error("buffer limit exceeded: requested {requested} bytes, limit {limit}")]
    BufferLimitExceeded { requested: usize, limit: usize },

    #[error("short write to output stream")]
    ShortWrite,

    /// Unspecified engine failure or an engine breaking its own contract.
    #[error("engine fault: {0}")]
    EngineFault(String),

    #[error("I/O error ({kind:?}): {message}")]
    Io { kind: io::ErrorKind, message: String },
}

impl QzError {
    /// Only `InsufficientBuffer` is recovered locally by the growth loops.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QzError::InsufficientBuffer)
    }

    /// Map an accelerator library status code onto the taxonomy.
    ///
    /// `Ok(())` for the success family (OK, duplicate init, forced software).
    /// Unknown codes are reported as an unspecified engine fault.
    pub fn from_status(code: i32) -> Result<(), QzError> {
        let err = match code {
            0 | 1 | 2 => return Ok(()),
            -1 => QzError::InvalidParameter(ParamError::Rejected),
            -2 => QzError::EngineFault("unspecified error".into()),
            -3 => QzError::InsufficientBuffer,
            -4 => QzError::CorruptInput("engine reported corrupted data".into()),
            -5 => QzError::Timeout,
            -100 => QzError::IntegrityCheckFailed,
            11 => QzError::EngineFault("using software: no hardware detected".into()),
            12 => QzError::EngineFault("using software: no memory driver detected".into()),
            13 => QzError::EngineFault("using software: could not attach to an instance".into()),
            14 => QzError::ResourceExhausted("using software: not enough pinned memory".into()),
            15 => QzError::ResourceExhausted(
                "using software: not enough pinned memory for dest buffer".into(),
            ),
            16 => QzError::UnsupportedFormat("using software: device does not support data format".into()),
            100 => QzError::NotYetStarted,
            -101 => QzError::EngineFault("no hardware detected".into()),
            -102 => QzError::EngineFault("no memory driver detected".into()),
            -103 => QzError::EngineFault("could not attach to an instance".into()),
            -104 => QzError::ResourceExhausted("not enough pinned memory".into()),
            -105 => QzError::UnsupportedFormat(
                "session may require software, but no software is available".into(),
            ),
            -116 => QzError::UnsupportedFormat("device does not support data format".into()),
            -117 => QzError::EngineFault("post process callback failed".into()),
            -118 => QzError::ResourceExhausted("insufficient memory allocated for metadata".into()),
            -119 => QzError::EngineFault("metadata block number out of range".into()),
            -200 => QzError::UnsupportedFormat("request not supported".into()),
            other => QzError::EngineFault(format!("unknown status {other}")),
        };
        Err(err)
    }

    /// Recover a `QzError` that was wrapped into an `io::Error` by the
    /// `io::Write`/`io::Read` impls; other I/O errors are converted.
    pub fn from_io(err: &io::Error) -> QzError {
        match err.get_ref().and_then(|inner| inner.downcast_ref::<QzError>()) {
            Some(qz) => qz.clone(),
            None => QzError::Io { kind: err.kind(), message: err.to_string() },
        }
    }
}

impl From<io::Error> for QzError {
    fn from(e: io::Error) -> Self {
        QzError::from_io(&e)
    }
}

impl From<ParamError> for QzError {
    fn from(e: ParamError) -> Self {
        QzError::InvalidParameter(e)
    }
}

impl From<QzError> for io::Error {
    fn from(e: QzError) -> Self {
        let kind = match &e {
            QzError::Io { kind, .. } => *kind,
            QzError::InvalidParameter(_) | QzError::ApplyAfterStart => io::ErrorKind::InvalidInput,
            QzError::CorruptInput(_) | QzError::IntegrityCheckFailed | QzError::EmptyBuffer => {
                io::ErrorKind::InvalidData
            }
            QzError::Timeout => io::ErrorKind::TimedOut,
            QzError::UnsupportedFormat(_) => io::ErrorKind::Unsupported,
            QzError::ResourceExhausted(_) | QzError::BufferLimitExceeded { .. } => io::ErrorKind::OutOfMemory,
            QzError::ShortWrite => io::ErrorKind::WriteZero,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_family_maps_to_ok() {
        for code in [0, 1, 2] {
            assert!(QzError::from_status(code).is_ok());
        }
    }

    #[test]
    fn buffer_status_is_the_only_retryable_one() {
        let err = QzError::from_status(-3).unwrap_err();
        assert!(err.is_retryable());
        assert!(!QzError::from_status(-4).unwrap_err().is_retryable());
    }

    #[test]
    fn unknown_status_is_engine_fault() {
        assert!(matches!(QzError::from_status(-9999), Err(QzError::EngineFault(_))));
    }

    #[test]
    fn qz_error_survives_io_round_trip() {
        let io_err: io::Error = QzError::AlreadyClosed.into();
        assert_eq!(QzError::from_io(&io_err), QzError::AlreadyClosed);

        let plain = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        assert!(matches!(QzError::from_io(&plain), QzError::Io { kind: io::ErrorKind::BrokenPipe, .. }));
    }
}
