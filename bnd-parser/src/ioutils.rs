//! Shared binary reader utilities
//!
//! The binder formats declare their byte order inside the file, so integer
//! reads take a runtime [`ByteOrder`] value instead of a compile-time
//! endianness parameter. Filename strings are stored in a legacy codepage
//! and every decode takes an explicit [`Encoding`].

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;
use std::io::{Read, Seek, SeekFrom};

use crate::{Error, Result};

/// Runtime byte order for integer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Read a `u32` in this byte order.
    pub fn read_u32<R: Read>(self, f: &mut R) -> std::io::Result<u32> {
        match self {
            Self::Little => f.read_u32::<LittleEndian>(),
            Self::Big => f.read_u32::<BigEndian>(),
        }
    }

    /// Read an `i64` in this byte order.
    pub fn read_i64<R: Read>(self, f: &mut R) -> std::io::Result<i64> {
        match self {
            Self::Little => f.read_i64::<LittleEndian>(),
            Self::Big => f.read_i64::<BigEndian>(),
        }
    }
}

/// Resolve a byte-order-ambiguous marker field.
///
/// `raw` is the field as read little-endian. When `raw` itself is one of
/// the accepted values the file is little-endian; when its byte-swap is,
/// the file is big-endian. Returns the resolved value and byte order, or
/// `None` when neither orientation matches.
pub fn resolve_byte_order(raw: u32, accepted: &[u32]) -> Option<(u32, ByteOrder)> {
    if accepted.contains(&raw) {
        return Some((raw, ByteOrder::Little));
    }
    let swapped = raw.swap_bytes();
    if accepted.contains(&swapped) {
        return Some((swapped, ByteOrder::Big));
    }
    None
}

/// Total stream length, preserving the current position.
pub fn stream_len<S: Seek>(f: &mut S) -> std::io::Result<u64> {
    let position = f.stream_position()?;
    let length = f.seek(SeekFrom::End(0))?;
    if position != length {
        f.seek(SeekFrom::Start(position))?;
    }
    Ok(length)
}

/// Read a fixed-length byte field, such as an ASCII signature.
pub fn read_bytes<R: Read, const N: usize>(f: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    f.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a NUL-terminated string in the given legacy encoding.
pub fn read_cstring<R: Read>(f: &mut R, encoding: &'static Encoding) -> Result<String> {
    let mut bytes = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        f.read_exact(&mut byte)?;
        if byte[0] == 0 {
            break;
        }
        bytes.push(byte[0]);
    }

    let (decoded, had_errors) = encoding.decode_without_bom_handling(&bytes);
    if had_errors {
        return Err(Error::MalformedString {
            encoding: encoding.name(),
            offset: 0,
        });
    }
    Ok(decoded.into_owned())
}

/// Read a NUL-terminated string at an absolute position, restoring the
/// caller's position afterwards.
pub fn read_cstring_at<R: Read + Seek>(
    f: &mut R,
    offset: u64,
    encoding: &'static Encoding,
) -> Result<String> {
    let saved = f.stream_position()?;
    f.seek(SeekFrom::Start(offset))?;
    let result = read_cstring(f, encoding).map_err(|e| match e {
        Error::MalformedString { encoding, .. } => Error::MalformedString { encoding, offset },
        other => other,
    });
    f.seek(SeekFrom::Start(saved))?;
    result
}
