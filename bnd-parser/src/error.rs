//! Error types for binder container parsing

use thiserror::Error;

/// Result type for binder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Binder error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// BND3 signature prefix mismatch
    #[error("Invalid binder signature: {0:?}")]
    InvalidSignature([u8; 12]),

    /// BHD5 magic mismatch
    #[error("Invalid header magic: {0:#010x}")]
    InvalidMagic(u32),

    /// BND3 version marker matched neither known constant in either byte
    /// order
    #[error("Unknown format marker: {0:#010x}")]
    UnknownFormatMarker(u32),

    /// BHD5 version field matched 1 in neither byte order
    #[error("Unknown header version: {0:#010x}")]
    UnknownVersion(u32),

    /// A validated field held an unexpected value
    #[error("Unexpected {field} value: {value:#x}")]
    UnexpectedFieldValue { field: &'static str, value: u64 },

    /// A declared offset/length region does not fit the stream
    #[error("Region out of bounds: offset {offset} + {size} bytes exceeds stream length {length}")]
    OutOfBounds { offset: u64, size: u64, length: u64 },

    /// An entry carried a negative data offset
    #[error("Negative entry offset: {0}")]
    NegativeOffset(i64),

    /// A name string was not valid in the declared legacy encoding
    #[error("Malformed {encoding} string at offset {offset}")]
    MalformedString { encoding: &'static str, offset: u64 },

    /// DCX decode failure while resolving an entry
    #[error("DCX decode failed: {0}")]
    Dcx(#[from] dcx::Error),
}
