//! codecs/deflate.rs
//! DEFLATE members in the four container framings.
//!
//! Design notes:
//! - gzip members are assembled here (header, optional extended subfield,
//!   raw deflate body, CRC-32 and ISIZE trailer); `flate2` supplies the raw
//!   deflate stream. Decoding goes through `flate2::bufread` so the number of
//!   input bytes a member occupied can be read back from the remaining slice.
//! - `Deflate4B` is a 4-byte little-endian body length followed by raw deflate.
//! - Placeholders for the empty stream carry a single final stored block.

use std::io::{Read, Write};

use flate2::bufread::GzDecoder;
use flate2::write::DeflateEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::compression::types::{Codec, CodecError};
use crate::constants::gzip;
use crate::params::{Algorithm, DeflateFormat, ParameterSet};
use crate::utils::compute_crc32;

const CODEC: &str = "deflate";
const INFLATE_RESERVE: usize = 32 * 1024;

pub struct DeflateCodec;

fn raw_deflate(input: &[u8], level: u32) -> Result<Vec<u8>, CodecError> {
    let mut enc = DeflateEncoder::new(Vec::with_capacity(input.len() / 2 + 64), Compression::new(level));
    enc.write_all(input)
        .map_err(|e| CodecError::EncodeFailed { codec: CODEC, msg: e.to_string() })?;
    enc.finish()
        .map_err(|e| CodecError::EncodeFailed { codec: CODEC, msg: e.to_string() })
}

fn len_u32(n: usize) -> Result<u32, CodecError> {
    u32::try_from(n).map_err(|_| CodecError::EncodeFailed {
        codec: CODEC,
        msg: format!("member length {} exceeds u32", n),
    })
}

/// gzip member header. With `ext` set, an extra field carries the source and
/// deflate body lengths.
fn gzip_header(out: &mut Vec<u8>, level: u32, ext: Option<(u32, u32)>) {
    let flags = if ext.is_some() { gzip::FLG_FEXTRA } else { 0 };
    out.extend_from_slice(&[gzip::ID1, gzip::ID2, gzip::CM_DEFLATE, flags, 0, 0, 0, 0]);
    out.push(level.min(u8::MAX as u32) as u8);
    out.push(gzip::OS_UNKNOWN);
    if let Some((src_len, body_len)) = ext {
        let xlen = 4 + gzip::EXT_SUBFIELD_LEN;
        out.extend_from_slice(&xlen.to_le_bytes());
        out.extend_from_slice(&gzip::EXT_SUBFIELD_ID);
        out.extend_from_slice(&gzip::EXT_SUBFIELD_LEN.to_le_bytes());
        out.extend_from_slice(&src_len.to_le_bytes());
        out.extend_from_slice(&body_len.to_le_bytes());
    }
}

fn framed(format: DeflateFormat, src: &[u8], body: &[u8], level: u32, out: &mut Vec<u8>) -> Result<(), CodecError> {
    match format {
        DeflateFormat::Raw => out.extend_from_slice(body),
        DeflateFormat::Deflate4B => {
            out.extend_from_slice(&len_u32(body.len())?.to_le_bytes());
            out.extend_from_slice(body);
        }
        DeflateFormat::Gzip | DeflateFormat::GzipExt => {
            let ext = match format {
                DeflateFormat::GzipExt => Some((len_u32(src.len())?, len_u32(body.len())?)),
                _ => None,
            };
            gzip_header(out, level, ext);
            out.extend_from_slice(body);
            out.extend_from_slice(&compute_crc32(src).to_le_bytes());
            // ISIZE is the source length modulo 2^32.
            out.extend_from_slice(&(src.len() as u32).to_le_bytes());
        }
    }
    Ok(())
}

/// `flate2` reports a CRC-32 or ISIZE trailer mismatch only through the
/// error text.
const GZIP_TRAILER_MISMATCH: &str = "matching checksum";

fn decode_err(e: std::io::Error) -> CodecError {
    let msg = e.to_string();
    if msg.contains(GZIP_TRAILER_MISMATCH) {
        return CodecError::ChecksumMismatch { codec: CODEC };
    }
    CodecError::DecodeFailed { codec: CODEC, msg }
}

/// Inflate the raw deflate stream at the start of `input` and return the bytes
/// it occupied. Input ending before the final block is `Truncated`.
fn inflate_raw(input: &[u8], out: &mut Vec<u8>) -> Result<usize, CodecError> {
    let mut inflater = Decompress::new(false);
    loop {
        if out.capacity() - out.len() < INFLATE_RESERVE {
            out.reserve(INFLATE_RESERVE.max(out.len()));
        }
        let before = (inflater.total_in(), out.len());
        let pos = inflater.total_in() as usize;
        let status = inflater
            .decompress_vec(&input[pos..], out, FlushDecompress::None)
            .map_err(|e| CodecError::DecodeFailed { codec: CODEC, msg: e.to_string() })?;
        match status {
            Status::StreamEnd => return Ok(inflater.total_in() as usize),
            Status::Ok | Status::BufError => {
                let stalled = (inflater.total_in(), out.len()) == before;
                if stalled && out.len() < out.capacity() {
                    return Err(CodecError::Truncated { codec: CODEC, have: input.len() });
                }
            }
        }
    }
}

impl Codec for DeflateCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Deflate
    }

    fn max_level(&self) -> Option<u32> {
        Some(9)
    }

    fn encode_member(&self, input: &[u8], params: &ParameterSet, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let body = raw_deflate(input, params.level)?;
        framed(params.deflate_format, input, &body, params.level, out)
    }

    fn decode_member(&self, input: &[u8], params: &ParameterSet, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        match params.deflate_format {
            DeflateFormat::Gzip | DeflateFormat::GzipExt => {
                if input.len() < gzip::HEADER_LEN {
                    return Err(CodecError::Truncated { codec: CODEC, have: input.len() });
                }
                if input[0] != gzip::ID1 || input[1] != gzip::ID2 {
                    return Err(CodecError::BadMagic { codec: CODEC });
                }
                let mut rest = input;
                GzDecoder::new(&mut rest).read_to_end(out).map_err(decode_err)?;
                Ok(input.len() - rest.len())
            }
            DeflateFormat::Raw => inflate_raw(input, out),
            DeflateFormat::Deflate4B => {
                let Some((prefix, tail)) = input.split_first_chunk::<4>() else {
                    return Err(CodecError::Truncated { codec: CODEC, have: input.len() });
                };
                let body_len = u32::from_le_bytes(*prefix) as usize;
                let body = tail
                    .get(..body_len)
                    .ok_or(CodecError::Truncated { codec: CODEC, have: input.len() })?;
                inflate_raw(body, out)?;
                Ok(4 + body_len)
            }
        }
    }

    fn empty_payload(&self, params: &ParameterSet) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(32);
        framed(params.deflate_format, &[], &gzip::EMPTY_STORED_BLOCK, params.level, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(format: DeflateFormat) -> ParameterSet {
        ParameterSet { deflate_format: format, level: 6, ..ParameterSet::default() }
    }

    #[test]
    fn gzip_ext_header_carries_lengths() {
        let p = params(DeflateFormat::GzipExt);
        let src = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let mut out = Vec::new();
        DeflateCodec.encode_member(src, &p, &mut out).unwrap();

        assert_eq!(&out[..4], &[0x1f, 0x8b, 0x08, gzip::FLG_FEXTRA]);
        assert_eq!(&out[12..14], b"QZ");
        let src_len = u32::from_le_bytes(out[16..20].try_into().unwrap());
        let body_len = u32::from_le_bytes(out[20..24].try_into().unwrap()) as usize;
        assert_eq!(src_len as usize, src.len());
        assert_eq!(out.len(), 24 + body_len + gzip::TRAILER_LEN);
    }

    #[test]
    fn members_decode_one_at_a_time() {
        for format in [DeflateFormat::Gzip, DeflateFormat::GzipExt, DeflateFormat::Raw, DeflateFormat::Deflate4B] {
            let p = params(format);
            let mut stream = Vec::new();
            DeflateCodec.encode_member(b"first member", &p, &mut stream).unwrap();
            let first_len = stream.len();
            DeflateCodec.encode_member(b"second", &p, &mut stream).unwrap();

            let mut out = Vec::new();
            let used = DeflateCodec.decode_member(&stream, &p, &mut out).unwrap();
            assert_eq!(used, first_len, "{:?}", format);
            assert_eq!(out, b"first member");

            out.clear();
            let used = DeflateCodec.decode_member(&stream[first_len..], &p, &mut out).unwrap();
            assert_eq!(used, stream.len() - first_len);
            assert_eq!(out, b"second");
        }
    }

    #[test]
    fn empty_gzip_placeholder_is_a_valid_member() {
        let p = params(DeflateFormat::Gzip);
        let bytes = DeflateCodec.empty_payload(&p).unwrap();
        assert_eq!(bytes.len(), gzip::HEADER_LEN + 5 + gzip::TRAILER_LEN);
        assert_eq!(bytes[8], 6);

        let mut out = Vec::new();
        let used = DeflateCodec.decode_member(&bytes, &p, &mut out).unwrap();
        assert_eq!(used, bytes.len());
        assert!(out.is_empty());
    }

    #[test]
    fn bad_magic_is_reported() {
        let p = params(DeflateFormat::Gzip);
        let mut bytes = Vec::new();
        DeflateCodec.encode_member(b"payload", &p, &mut bytes).unwrap();
        bytes[0] ^= 0xff;
        let err = DeflateCodec.decode_member(&bytes, &p, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CodecError::BadMagic { .. }));
    }

    #[test]
    fn gzip_trailer_mismatch_is_an_integrity_failure() {
        for format in [DeflateFormat::Gzip, DeflateFormat::GzipExt] {
            let p = params(format);
            let mut bytes = Vec::new();
            DeflateCodec.encode_member(b"checked payload", &p, &mut bytes).unwrap();
            let crc_at = bytes.len() - gzip::TRAILER_LEN;
            bytes[crc_at] ^= 0x01;

            let err = DeflateCodec.decode_member(&bytes, &p, &mut Vec::new()).unwrap_err();
            assert!(matches!(err, CodecError::ChecksumMismatch { .. }), "{:?}", format);
            assert_eq!(crate::types::QzError::from(err), crate::types::QzError::IntegrityCheckFailed);
        }
    }

    #[test]
    fn truncated_raw_body_is_not_silent() {
        for format in [DeflateFormat::Raw, DeflateFormat::Deflate4B] {
            let p = params(format);
            let mut bytes = Vec::new();
            DeflateCodec.encode_member(&[3u8; 4096], &p, &mut bytes).unwrap();
            if format == DeflateFormat::Deflate4B {
                let short = (bytes.len() - 4 - 3) as u32;
                bytes[..4].copy_from_slice(&short.to_le_bytes());
            }
            bytes.truncate(bytes.len() - 3);
            let err = DeflateCodec.decode_member(&bytes, &p, &mut Vec::new()).unwrap_err();
            assert!(matches!(err, CodecError::Truncated { .. }), "{:?}", format);
        }
    }
}
