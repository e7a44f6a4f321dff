//! compression/mod.rs
//! Algorithm dispatch table and member codecs.
//!
//! Notes:
//! - Every algorithm-specific behavior (member framing, empty-stream
//!   placeholder, level range) is reached through `registry::codec_for`.
//! - Members are self-contained: decoding one needs no state from the previous.

pub mod codecs;
pub mod registry;
pub mod types;

pub use registry::{codec_for, empty_payload, resolve, CodecInfo};
pub use types::{Codec, CodecError};
