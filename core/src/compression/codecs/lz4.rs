//! codecs/lz4.rs
//! LZ4 frames via `lz4_flex::frame`, one frame per member.
use std::io::{Read, Write};

use lz4_flex::frame::{Error as FrameError, FrameDecoder, FrameEncoder, FrameInfo};

use crate::compression::types::{Codec, CodecError};
use crate::constants::lz4;
use crate::params::{Algorithm, ParameterSet};

const CODEC: &str = "lz4";

const FLG_DICT_ID: u8 = 0x01;
const FLG_CONTENT_CHECKSUM: u8 = 0x04;
const FLG_CONTENT_SIZE: u8 = 0x08;
const FLG_BLOCK_CHECKSUM: u8 = 0x10;
const BLOCK_UNCOMPRESSED: u32 = 0x8000_0000;

pub struct Lz4Codec;

fn decode_err(e: std::io::Error) -> CodecError {
    match e.get_ref().and_then(|inner| inner.downcast_ref::<FrameError>()) {
        Some(FrameError::HeaderChecksumError | FrameError::BlockChecksumError | FrameError::ContentChecksumError) => {
            CodecError::ChecksumMismatch { codec: CODEC }
        }
        _ => CodecError::DecodeFailed { codec: CODEC, msg: e.to_string() },
    }
}

/// Length of the frame at the start of `input`, walking the block headers.
///
/// The frame decoder itself runs on across concatenated frames, so the
/// boundary has to be found before decoding.
fn frame_len(input: &[u8]) -> Result<usize, CodecError> {
    let truncated = || CodecError::Truncated { codec: CODEC, have: input.len() };
    let word = |at: usize| -> Result<u32, CodecError> {
        input
            .get(at..at + 4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
            .ok_or_else(truncated)
    };

    if word(0)? != lz4::MAGIC {
        return Err(CodecError::BadMagic { codec: CODEC });
    }
    let flg = *input.get(4).ok_or_else(truncated)?;

    // magic, FLG, BD
    let mut pos = 6;
    if flg & FLG_CONTENT_SIZE != 0 {
        pos += 8;
    }
    if flg & FLG_DICT_ID != 0 {
        pos += 4;
    }
    pos += 1; // HC

    let block_checksum = if flg & FLG_BLOCK_CHECKSUM != 0 { 4 } else { 0 };
    loop {
        let raw = word(pos)?;
        pos += 4;
        if raw == 0 {
            break;
        }
        pos += (raw & !BLOCK_UNCOMPRESSED) as usize + block_checksum;
    }
    if flg & FLG_CONTENT_CHECKSUM != 0 {
        pos += 4;
    }
    if pos > input.len() {
        return Err(truncated());
    }
    Ok(pos)
}

impl Codec for Lz4Codec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Lz4
    }

    fn max_level(&self) -> Option<u32> {
        None
    }

    fn encode_member(&self, input: &[u8], _params: &ParameterSet, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let info = FrameInfo::new().content_checksum(true);
        let mut enc = FrameEncoder::with_frame_info(info, Vec::with_capacity(input.len() + 32));
        enc.write_all(input)
            .map_err(|e| CodecError::EncodeFailed { codec: CODEC, msg: e.to_string() })?;
        let frame = enc
            .finish()
            .map_err(|e| CodecError::EncodeFailed { codec: CODEC, msg: e.to_string() })?;
        out.extend_from_slice(&frame);
        Ok(())
    }

    fn decode_member(&self, input: &[u8], _params: &ParameterSet, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        let len = frame_len(input)?;
        FrameDecoder::new(&input[..len]).read_to_end(out).map_err(decode_err)?;
        Ok(len)
    }

    fn empty_payload(&self, _params: &ParameterSet) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(15);
        out.extend_from_slice(&lz4::MAGIC.to_le_bytes());
        out.extend_from_slice(&[lz4::FLG, lz4::BD, lz4::HC]);
        out.extend_from_slice(&lz4::END_MARK);
        out.extend_from_slice(&lz4::EMPTY_CONTENT_CHECKSUM);
        Ok(out)
    }
}
