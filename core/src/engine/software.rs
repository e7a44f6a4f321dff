//! engine/software.rs
//! In-process engine built on the member codecs.
//!
//! Design notes:
//! - Each compress call encodes at most `ParameterSet::hw_chunk_len` bytes as
//!   one self-contained member, the way a stateless offload request does.
//!   Streams are therefore decodable whether or not the last flag was ever set.
//! - Each decompress call decodes exactly one member.
//! - When the output slice is too small the encoded or decoded member is kept
//!   and handed out on the retry, which must present the same input.

use tracing::trace;

use crate::compression::{codec_for, Codec};
use crate::engine::{Engine, Step};
use crate::params::{Direction, ParameterSet};
use crate::types::{ParamError, QzError};

/// A member produced by a call that could not deliver it.
struct Pending {
    direction: Direction,
    input_len: usize,
    consumed: usize,
    bytes: Vec<u8>,
}

struct Session {
    params: ParameterSet,
    codec: &'static dyn Codec,
}

pub struct SoftwareEngine {
    session: Option<Session>,
    last: bool,
    pending: Option<Pending>,
    scratch: Vec<u8>,
}

impl Default for SoftwareEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareEngine {
    pub fn new() -> Self {
        Self { session: None, last: false, pending: None, scratch: Vec::new() }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the next member that drains its input ends the stream.
    pub fn last(&self) -> bool {
        self.last
    }

    /// Shared tail of compress/decompress: deliver `bytes` if they fit,
    /// otherwise park them and ask for a larger output slice.
    fn deliver(
        &mut self,
        direction: Direction,
        input_len: usize,
        consumed: usize,
        bytes: Vec<u8>,
        output: &mut [u8],
    ) -> Result<Step, QzError> {
        if bytes.len() > output.len() {
            trace!(need = bytes.len(), have = output.len(), "output slice too small");
            self.pending = Some(Pending { direction, input_len, consumed, bytes });
            return Err(QzError::InsufficientBuffer);
        }
        output[..bytes.len()].copy_from_slice(&bytes);
        let step = Step { consumed, produced: bytes.len() };
        self.scratch = bytes;
        Ok(step)
    }
}

fn take_pending(slot: &mut Option<Pending>, direction: Direction, input_len: usize) -> Option<Pending> {
    match slot.take() {
        Some(p) if p.direction == direction && p.input_len == input_len => Some(p),
        _ => None,
    }
}

impl Engine for SoftwareEngine {
    fn start_session(&mut self, params: &ParameterSet) -> Result<(), QzError> {
        let codec = codec_for(params.algorithm);
        codec.check_level(params.level)?;
        trace!(algorithm = %params.algorithm, level = params.level, "software session start");
        self.session = Some(Session { params: params.clone(), codec });
        self.last = false;
        self.pending = None;
        Ok(())
    }

    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError> {
        let session = self.session.as_ref().ok_or(QzError::NotYetStarted)?;
        if !session.params.direction.allows_compress() {
            return Err(QzError::InvalidParameter(ParamError::IncompatibleDirection));
        }
        if input.is_empty() {
            return Err(QzError::EmptyBuffer);
        }
        if let Some(p) = take_pending(&mut self.pending, Direction::Compress, input.len()) {
            return self.deliver(Direction::Compress, input.len(), p.consumed, p.bytes, output);
        }

        let take = input.len().min(session.params.hw_chunk_len());
        let codec = session.codec;
        let mut member = std::mem::take(&mut self.scratch);
        member.clear();
        codec.encode_member(&input[..take], &session.params, &mut member)?;
        let final_member = self.last && take == input.len();
        trace!(consumed = take, len = member.len(), final_member, "member encoded");
        self.deliver(Direction::Compress, input.len(), take, member, output)
    }

    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, QzError> {
        let session = self.session.as_ref().ok_or(QzError::NotYetStarted)?;
        if !session.params.direction.allows_decompress() {
            return Err(QzError::InvalidParameter(ParamError::IncompatibleDirection));
        }
        if input.is_empty() {
            return Err(QzError::EmptyBuffer);
        }
        if let Some(p) = take_pending(&mut self.pending, Direction::Decompress, input.len()) {
            return self.deliver(Direction::Decompress, input.len(), p.consumed, p.bytes, output);
        }

        let codec = session.codec;
        let mut decoded = std::mem::take(&mut self.scratch);
        decoded.clear();
        let consumed = codec.decode_member(input, &session.params, &mut decoded)?;
        self.deliver(Direction::Decompress, input.len(), consumed, decoded, output)
    }

    fn set_last(&mut self, last: bool) {
        self.last = last;
    }

    fn close(&mut self) -> Result<(), QzError> {
        if self.session.take().is_none() {
            return Err(QzError::NotYetStarted);
        }
        self.pending = None;
        self.last = false;
        Ok(())
    }
}
