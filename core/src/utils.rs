//! utils.rs
//! Checksum helpers shared by the codecs and the streams.

use std::fmt;

use crc32fast::Hasher;

/// CRC-32 (IEEE) of a complete buffer.
pub fn compute_crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Running CRC-32 over a stream of slices.
///
/// `crc32fast::Hasher::finalize` consumes the hasher, so the current value is
/// read from a clone.
#[derive(Clone, Default)]
pub struct RunningCrc {
    hasher: Hasher,
}

impl RunningCrc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    pub fn value(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    pub fn reset(&mut self) {
        self.hasher = Hasher::new();
    }
}

impl fmt::Debug for RunningCrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunningCrc({:#010x})", self.value())
    }
}
