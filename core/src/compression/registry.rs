//! compression/registry.rs
//! Dispatch table keyed by algorithm.

use crate::compression::codecs::{DeflateCodec, Lz4Codec, ZstdCodec};
use crate::compression::types::{Codec, CodecError};
use crate::params::{Algorithm, ParameterSet};

static DEFLATE: DeflateCodec = DeflateCodec;
static LZ4: Lz4Codec = Lz4Codec;
static ZSTD: ZstdCodec = ZstdCodec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecInfo {
    pub name: &'static str,
    pub max_level: Option<u32>,
    /// The empty-stream placeholder is container framing written by the
    /// adapter rather than a member produced by the codec library.
    pub synthetic_placeholder: bool,
}

pub fn resolve(algorithm: Algorithm) -> CodecInfo {
    let codec = codec_for(algorithm);
    CodecInfo {
        name: algorithm.name(),
        max_level: codec.max_level(),
        synthetic_placeholder: !matches!(algorithm, Algorithm::Zstd),
    }
}

pub fn codec_for(algorithm: Algorithm) -> &'static dyn Codec {
    match algorithm {
        Algorithm::Deflate => &DEFLATE,
        Algorithm::Lz4 => &LZ4,
        Algorithm::Zstd => &ZSTD,
    }
}

/// Placeholder bytes a writer emits when closed without payload.
pub fn empty_payload(params: &ParameterSet) -> Result<Vec<u8>, CodecError> {
    codec_for(params.algorithm).empty_payload(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_algorithm_has_an_entry() {
        for alg in Algorithm::ALL {
            assert_eq!(codec_for(alg).algorithm(), alg);
            let p = ParameterSet { algorithm: alg, ..ParameterSet::default() };
            assert!(!empty_payload(&p).unwrap().is_empty());
        }
    }

    #[test]
    fn info_reports_level_ranges() {
        assert_eq!(resolve(Algorithm::Deflate).max_level, Some(9));
        assert_eq!(resolve(Algorithm::Lz4).max_level, None);
        assert!(resolve(Algorithm::Lz4).synthetic_placeholder);
        assert!(!resolve(Algorithm::Zstd).synthetic_placeholder);
    }
}
