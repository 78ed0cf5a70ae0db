//! DCX compression envelope codec
//!
//! DCX is the compression wrapper used by the binder container formats.
//! An envelope carries its payload either as a single zlib stream or as a
//! table of independently-deflated fixed-size blocks (the "edge" scheme).
//! This crate parses the envelope and fully materializes the decoded
//! payload; it does not encode.

pub mod decompress;
pub mod error;
pub mod header;

pub use decompress::decompress;
pub use error::{Error, Result};
pub use header::{CompressionScheme, DcxHeader};

/// ASCII tag at the start of a DCX envelope, NUL-padded to 16 bytes.
pub const DCX_TAG: &[u8; 10] = b"BDF307D7R6";

/// Big-endian `DCX\0` marker following the tag.
pub const DCX_MAGIC: u32 = 0x44435800;

/// Returns `true` when `data` begins with a DCX envelope (tag plus marker).
pub fn is_dcx(data: &[u8]) -> bool {
    data.len() >= 20
        && data[..DCX_TAG.len()] == DCX_TAG[..]
        && data[DCX_TAG.len()..16].iter().all(|&b| b == 0)
        && data[16..20] == DCX_MAGIC.to_be_bytes()
}
