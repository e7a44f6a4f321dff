//! compression/codecs/mod.rs
//! Member codecs used by the software engine and the placeholder table.

pub mod deflate;
pub mod lz4;
pub mod zstd;

pub use deflate::DeflateCodec;
pub use lz4::Lz4Codec;
pub use zstd::ZstdCodec;
