//! constants.rs
//! Defaults, lower bounds and container magic used across the crate.

/// Default compression level when nothing else is configured.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 1;

/// Smallest accepted input/output buffer length and growth increment (128 KiB).
pub const MIN_BUFFER_LENGTH: usize = 128 * 1024;
/// Default input/output buffer length (128 MiB).
pub const DEFAULT_BUFFER_LENGTH: usize = 128 * 1024 * 1024;
/// Default increment used when the engine asks for a larger output buffer (1 MiB).
pub const DEFAULT_BUFFER_GROWTH: usize = 1024 * 1024;

/// Default bounce buffer length (bytes held back so the last chunk can be marked).
pub const DEFAULT_BOUNCE_BUFFER_LENGTH: usize = 512;
/// Smallest accepted bounce buffer length.
pub const MIN_BOUNCE_BUFFER_LENGTH: usize = 512;

/// Largest slice the software engine consumes per compress call when
/// `hw_buf_size` is left at zero (64 KiB, the accelerator default).
pub const DEFAULT_HW_BUFFER_SIZE: usize = 64 * 1024;

/// Environment variable names read by `EnvOverrides::from_env`.
pub mod env_vars {
    pub const ALGORITHM: &str = "QZIO_ALGORITHM";
    pub const COMPRESSION_LEVEL: &str = "QZIO_COMPRESSION_LEVEL";
    pub const DEBUG_LEVEL: &str = "QZIO_DEBUG_LEVEL";
}

/// gzip member framing (RFC 1952).
pub mod gzip {
    pub const ID1: u8 = 0x1f;
    pub const ID2: u8 = 0x8b;
    pub const CM_DEFLATE: u8 = 0x08;
    pub const FLG_FEXTRA: u8 = 0x04;
    /// Unknown OS.
    pub const OS_UNKNOWN: u8 = 255;
    pub const HEADER_LEN: usize = 10;
    pub const TRAILER_LEN: usize = 8;

    /// Extended header subfield id written by `DeflateFormat::GzipExt`.
    pub const EXT_SUBFIELD_ID: [u8; 2] = *b"QZ";
    /// Subfield payload: source length + deflate payload length, both u32 LE.
    pub const EXT_SUBFIELD_LEN: u16 = 8;

    /// A final, empty stored deflate block.
    pub const EMPTY_STORED_BLOCK: [u8; 5] = [0x01, 0x00, 0x00, 0xff, 0xff];
}

/// LZ4 frame framing (lz4 frame format 1.6).
pub mod lz4 {
    pub const MAGIC: u32 = 0x184D_2204;
    /// Version 01, independent blocks, content checksum.
    pub const FLG: u8 = 0x64;
    /// 64 KiB maximum block size.
    pub const BD: u8 = 0x40;
    /// Header checksum for `FLG`/`BD` above.
    pub const HC: u8 = 0xa7;
    pub const END_MARK: [u8; 4] = [0x00; 4];
    /// xxh32 of the empty content, little endian.
    pub const EMPTY_CONTENT_CHECKSUM: [u8; 4] = [0x05, 0x5d, 0xcc, 0x02];
}
