//! BND3 flat container index parsing
//!
//! A BND3 container is a linear table of fixed-size entry headers followed
//! by out-of-band NUL-terminated names and the entry data itself. The
//! header's version marker doubles as the byte-order probe: the same
//! constant appears byte-swapped in big-endian containers.

use encoding_rs::{Encoding, SHIFT_JIS};
use std::io::{Read, Seek};
use tracing::debug;

use crate::ioutils::{ByteOrder, read_bytes, read_cstring_at, resolve_byte_order, stream_len};
use crate::{Error, Result};

/// ASCII prefix of the 12-byte signature; trailing version characters are
/// ignored.
pub const BND3_SIGNATURE: &[u8; 4] = b"BND3";

/// Version-marker constants accepted in either byte order.
const FORMAT_MARKERS: [u32; 2] = [0x54, 0x74];

/// One entry of a BND3 container, in header-table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binder3Entry {
    /// Numeric entry identifier.
    pub id: u32,
    /// Name decoded from the container's out-of-band string region.
    pub name: String,
    /// Absolute data offset within the container stream.
    pub offset: u32,
    /// Authoritative data size.
    pub size: u32,
}

/// Fixed 20-byte entry header record.
#[derive(Debug, Clone, Copy)]
struct EntryHeader {
    id: u32,
    name_offset: u32,
    offset: u32,
    size: u32,
    /// Secondary size field, retained but never authoritative.
    #[allow(dead_code, reason = "opaque field, kept for completeness")]
    size2: u32,
}

impl EntryHeader {
    fn parse<R: Read>(f: &mut R, order: ByteOrder) -> Result<Self> {
        Ok(Self {
            id: order.read_u32(f)?,
            name_offset: order.read_u32(f)?,
            offset: order.read_u32(f)?,
            size: order.read_u32(f)?,
            size2: order.read_u32(f)?,
        })
    }
}

/// Parsed BND3 container index.
#[derive(Debug, Clone)]
pub struct Binder3File {
    /// Byte order resolved from the version marker.
    pub byte_order: ByteOrder,
    /// Declared base data offset, read but not used to re-derive entry
    /// offsets.
    pub data_offset: u32,
    /// Entries in header-table order.
    pub entries: Vec<Binder3Entry>,
}

impl Binder3File {
    /// Parse a BND3 index with Shift-JIS entry names, the codepage these
    /// containers ship with.
    pub fn parse<R: Read + Seek>(f: &mut R) -> Result<Self> {
        Self::parse_with_encoding(f, SHIFT_JIS)
    }

    /// Parse a BND3 index, decoding entry names in `encoding`.
    pub fn parse_with_encoding<R: Read + Seek>(
        f: &mut R,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let length = stream_len(f)?;

        let signature: [u8; 12] = read_bytes(f)?;
        if !signature.starts_with(BND3_SIGNATURE) {
            return Err(Error::InvalidSignature(signature));
        }

        let raw_marker = ByteOrder::Little.read_u32(f)?;
        let (marker, byte_order) = resolve_byte_order(raw_marker, &FORMAT_MARKERS)
            .ok_or(Error::UnknownFormatMarker(raw_marker))?;

        let entry_count = byte_order.read_u32(f)?;
        let data_offset = byte_order.read_u32(f)?;

        for field in ["reserved0", "reserved1"] {
            let value = byte_order.read_u32(f)?;
            if value != 0 {
                return Err(Error::UnexpectedFieldValue {
                    field,
                    value: u64::from(value),
                });
            }
        }

        debug!("BND3: marker {marker:#x}, {byte_order:?}, {entry_count} entries");

        let mut headers = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            headers.push(EntryHeader::parse(f, byte_order)?);
        }

        let mut entries = Vec::with_capacity(headers.len());
        for header in &headers {
            // A zero name offset is honored literally, not special-cased
            let name_offset = u64::from(header.name_offset);
            if name_offset >= length {
                return Err(Error::OutOfBounds {
                    offset: name_offset,
                    size: 1,
                    length,
                });
            }
            let name = read_cstring_at(f, name_offset, encoding)?;

            // Offsets and sizes come from the header, never from the name
            // read position
            entries.push(Binder3Entry {
                id: header.id,
                name,
                offset: header.offset,
                size: header.size,
            });
        }

        Ok(Self {
            byte_order,
            data_offset,
            entries,
        })
    }
}
