//! src/compression/codecs/zstd.rs
//!
//! Zstd frames, one frame per member.
//!
//! Design notes:
//! - Encoding uses the block API (`zstd::bulk::compress`), which emits a
//!   complete frame per call.
//! - The frame boundary is found with `find_frame_compressed_size` before the
//!   frame is decoded, so concatenated frames decode one at a time.
//! - zstd frames represent the empty payload natively; the placeholder is the
//!   library's own empty frame.

use crate::compression::types::{Codec, CodecError};
use crate::params::{Algorithm, ParameterSet};

const CODEC: &str = "zstd";
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

pub struct ZstdCodec;

fn frame_level(params: &ParameterSet) -> i32 {
    i32::try_from(params.level).unwrap_or(i32::MAX)
}

impl Codec for ZstdCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Zstd
    }

    fn max_level(&self) -> Option<u32> {
        Some(*zstd::compression_level_range().end() as u32)
    }

    fn encode_member(&self, input: &[u8], params: &ParameterSet, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let frame = zstd::bulk::compress(input, frame_level(params))
            .map_err(|e| CodecError::EncodeFailed { codec: CODEC, msg: e.to_string() })?;
        out.extend_from_slice(&frame);
        Ok(())
    }

    fn decode_member(&self, input: &[u8], _params: &ParameterSet, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        if input.len() < ZSTD_MAGIC.len() {
            return Err(CodecError::Truncated { codec: CODEC, have: input.len() });
        }
        if input[..4] != ZSTD_MAGIC {
            return Err(CodecError::BadMagic { codec: CODEC });
        }
        let len = zstd::zstd_safe::find_frame_compressed_size(input).map_err(|code| {
            CodecError::DecodeFailed { codec: CODEC, msg: zstd::zstd_safe::get_error_name(code).to_string() }
        })?;
        let frame = input
            .get(..len)
            .ok_or(CodecError::Truncated { codec: CODEC, have: input.len() })?;
        let decoded = zstd::stream::decode_all(frame)
            .map_err(|e| CodecError::DecodeFailed { codec: CODEC, msg: e.to_string() })?;
        out.extend_from_slice(&decoded);
        Ok(len)
    }

    fn empty_payload(&self, params: &ParameterSet) -> Result<Vec<u8>, CodecError> {
        zstd::bulk::compress(&[], frame_level(params))
            .map_err(|e| CodecError::EncodeFailed { codec: CODEC, msg: e.to_string() })
    }
}
