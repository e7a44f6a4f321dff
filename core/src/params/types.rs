//! params/types.rs
//! Closed parameter domains, with numeric and name conversions.
use std::fmt;
use std::str::FromStr;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::ParamError;

/// Compression algorithm family.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum Algorithm {
    Deflate = 0,
    Lz4 = 1,
    Zstd = 2,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Deflate, Algorithm::Lz4, Algorithm::Zstd];

    pub fn from_raw(raw: u8) -> Result<Self, ParamError> {
        Self::try_from_primitive(raw).map_err(|_| ParamError::Algorithm)
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Deflate => "deflate",
            Algorithm::Lz4 => "lz4",
            Algorithm::Zstd => "zstd",
        }
    }
}

impl FromStr for Algorithm {
    type Err = ParamError;

    /// Accepts `deflate`, `gzip`, `lz4`, `zstd` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deflate" | "gzip" => Ok(Algorithm::Deflate),
            "lz4" => Ok(Algorithm::Lz4),
            "zstd" => Ok(Algorithm::Zstd),
            _ => Err(ParamError::Algorithm),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// DEFLATE container framing.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum DeflateFormat {
    /// Raw deflate prefixed with a 4-byte little-endian payload length.
    Deflate4B = 0,
    Gzip = 1,
    /// gzip with an extra header field carrying source and payload lengths.
    GzipExt = 2,
    Raw = 3,
}

impl DeflateFormat {
    pub fn from_raw(raw: u8) -> Result<Self, ParamError> {
        Self::try_from_primitive(raw).map_err(|_| ParamError::DeflateFormat)
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum Direction {
    Compress = 0,
    Decompress = 1,
    Both = 2,
}

impl Direction {
    pub fn from_raw(raw: u8) -> Result<Self, ParamError> {
        Self::try_from_primitive(raw).map_err(|_| ParamError::Direction)
    }

    pub fn allows_compress(self) -> bool {
        self != Direction::Decompress
    }

    pub fn allows_decompress(self) -> bool {
        self != Direction::Compress
    }
}

/// How the writer stages caller bytes before handing them to the engine.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum InputBufferMode {
    /// Hold back the tail of each large write so it can be marked last.
    Reserve = 0,
    /// Hold back every write until the next call or close.
    Bounce = 1,
    /// Mark every engine call as the final chunk.
    Last = 2,
    /// Never mark a chunk as final; no buffering.
    NoLast = 3,
}

impl InputBufferMode {
    pub fn from_raw(raw: u8) -> Result<Self, ParamError> {
        Self::try_from_primitive(raw).map_err(|_| ParamError::InputBufferMode)
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum PollingMode {
    Periodical = 0,
    Busy = 1,
}

impl PollingMode {
    pub fn from_raw(raw: u8) -> Result<Self, ParamError> {
        Self::try_from_primitive(raw).map_err(|_| ParamError::PollingMode)
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum HuffmanHdr {
    Dynamic = 0,
    Static = 1,
}

impl HuffmanHdr {
    pub fn from_raw(raw: u8) -> Result<Self, ParamError> {
        Self::try_from_primitive(raw).map_err(|_| ParamError::HuffmanHdr)
    }
}

/// Trace verbosity. Ordered: an event tagged `Med` is emitted at `Med`, `High`
/// and `Debug`.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, Serialize, Deserialize,
)]
pub enum DebugLevel {
    #[default]
    None = 0,
    Low = 1,
    Med = 2,
    High = 3,
    Debug = 4,
}

impl DebugLevel {
    pub fn from_raw(raw: u8) -> Result<Self, ParamError> {
        Self::try_from_primitive(raw).map_err(|_| ParamError::DebugLevel)
    }
}

impl FromStr for DebugLevel {
    type Err = ParamError;

    /// Numeric (`0`..`4`) or by name (`none`, `low`, `med`, `high`, `debug`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(raw) = s.parse::<u8>() {
            return Self::from_raw(raw);
        }
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(DebugLevel::None),
            "low" => Ok(DebugLevel::Low),
            "med" | "medium" => Ok(DebugLevel::Med),
            "high" => Ok(DebugLevel::High),
            "debug" => Ok(DebugLevel::Debug),
            _ => Err(ParamError::DebugLevel),
        }
    }
}
