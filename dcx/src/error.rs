//! Error types for DCX envelope parsing and decoding

use thiserror::Error;

/// Result type for DCX operations
pub type Result<T> = std::result::Result<T, Error>;

/// DCX error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The 16-byte envelope tag did not match
    #[error("Invalid envelope tag: {0:?}")]
    InvalidTag(Vec<u8>),

    /// A section magic did not match its expected constant
    #[error("Invalid {section} magic: {value:#010x}")]
    InvalidMagic { section: &'static str, value: u32 },

    /// Unknown envelope format version
    #[error("Unsupported envelope version: {0:#010x}")]
    UnsupportedVersion(u32),

    /// Envelope header size constant mismatch
    #[error("Invalid envelope header size: {0}")]
    InvalidHeaderSize(u32),

    /// Parameter block size constant mismatch
    #[error("Invalid parameter block size: {0}")]
    InvalidParameterBlockSize(u32),

    /// Unknown compression scheme discriminant
    #[error("Unsupported compression scheme: {0:#010x}")]
    UnsupportedScheme(u32),

    /// The reserved/flags constants do not match any recognized variant of
    /// the active scheme
    #[error(
        "Unrecognized {scheme:?} variant: reserved {reserved:08x?}, flags {flags:#010x}"
    )]
    UnrecognizedVariant {
        scheme: crate::CompressionScheme,
        reserved: [u32; 3],
        flags: u32,
    },

    /// Compression level outside 0-9
    #[error("Invalid compression level: {0}")]
    InvalidLevel(u8),

    /// Extra block declared a size smaller than its own fixed fields
    #[error("Invalid extra block size: {0}")]
    InvalidExtraSize(u32),

    /// A block-table field did not match its expected constant
    #[error("Invalid block table {field}: {value:#010x}")]
    InvalidTableField { field: &'static str, value: u32 },

    /// Block-table declared length differs from the extra blob length
    #[error("Block table length mismatch: declared {declared}, actual {actual}")]
    TableLengthMismatch { declared: u32, actual: usize },

    /// A block descriptor carried an invalid field value
    #[error("Invalid block descriptor {index}: {field} = {value:#010x}")]
    InvalidBlockDescriptor {
        index: u32,
        field: &'static str,
        value: u32,
    },

    /// Fewer bytes were available than a declared size required
    #[error("Truncated data: expected {expected} bytes, got {actual}")]
    TruncatedData { expected: u64, actual: u64 },

    /// Inflate failure inside a payload or block
    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    /// Decoded output length differs from a declared uncompressed size
    #[error("Decoded length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u64, actual: u64 },
}
