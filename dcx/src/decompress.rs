//! DCX payload decoding
//!
//! Decoding is a single forward pass: parse the envelope, dispatch on the
//! scheme, and materialize the payload. Every mismatch is fatal; a payload
//! is either decoded in full or not at all.

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::{Cursor, Read};
use tracing::{debug, trace};

use crate::{CompressionScheme, DcxHeader, Error, Result};

const ZLIB_RESERVED: [u32; 3] = [0, 0, 0];
const ZLIB_FLAGS: u32 = 0x00010100;

const EDGE_RESERVED: [u32; 3] = [0x00010000, 0, 0];
const EDGE_FLAGS: u32 = 0x00100100;

const EDGE_TABLE_MAGIC: u32 = 0x45676454; // 'EgdT'
const EDGE_TABLE_VERSION: u32 = 0x00010100;
const EDGE_TABLE_OFFSET: u32 = 36;
const EDGE_ALIGNMENT: u32 = 16;
const EDGE_BLOCK_SIZE: u32 = 0x00010000;
const EDGE_TABLE_TRAILER: u32 = 0x00100000;
const EDGE_DESCRIPTOR_SIZE: u32 = 16;

/// Decode a full DCX envelope from the reader's current position.
///
/// Returns the fully materialized payload. The decoded length always
/// equals the envelope's declared uncompressed size.
pub fn decompress<R: Read>(f: &mut R) -> Result<Vec<u8>> {
    let header = DcxHeader::parse(f)?;

    let decoded = match header.scheme {
        CompressionScheme::Zlib => decompress_zlib(f, &header)?,
        CompressionScheme::Edge => decompress_edge(f, &header)?,
    };

    if decoded.len() as u64 != u64::from(header.uncompressed_size) {
        return Err(Error::LengthMismatch {
            expected: u64::from(header.uncompressed_size),
            actual: decoded.len() as u64,
        });
    }

    debug!("DCX decoded {} bytes", decoded.len());
    Ok(decoded)
}

/// Zlib scheme: the payload is one zlib stream of `compressed_size` bytes.
fn decompress_zlib<R: Read>(f: &mut R, header: &DcxHeader) -> Result<Vec<u8>> {
    if header.reserved != ZLIB_RESERVED || header.flags != ZLIB_FLAGS {
        return Err(Error::UnrecognizedVariant {
            scheme: header.scheme,
            reserved: header.reserved,
            flags: header.flags,
        });
    }

    let mut compressed = Vec::with_capacity(header.compressed_size as usize);
    let read = f
        .take(u64::from(header.compressed_size))
        .read_to_end(&mut compressed)?;
    if read as u64 != u64::from(header.compressed_size) {
        return Err(Error::TruncatedData {
            expected: u64::from(header.compressed_size),
            actual: read as u64,
        });
    }

    trace!("inflating {} zlib bytes", compressed.len());

    let mut decoded = Vec::with_capacity(header.uncompressed_size as usize);
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut decoded)
        .map_err(|e| Error::DecompressionFailed(format!("zlib payload: {e}")))?;

    Ok(decoded)
}

/// One entry of the edge block table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockDescriptor {
    /// Offset recorded in the table. Blocks are laid out sequentially, so
    /// this is carried but not used for seeking.
    offset: u32,
    /// Stored size of the block, before alignment padding.
    size: u32,
    /// Whether the block holds a raw deflate stream or verbatim bytes.
    compressed: bool,
}

/// Edge scheme: the extra blob is a block table, the payload a sequence of
/// 16-byte-aligned chunks that are each independently deflated or stored.
fn decompress_edge<R: Read>(f: &mut R, header: &DcxHeader) -> Result<Vec<u8>> {
    if header.reserved != EDGE_RESERVED || header.flags != EDGE_FLAGS {
        return Err(Error::UnrecognizedVariant {
            scheme: header.scheme,
            reserved: header.reserved,
            flags: header.flags,
        });
    }

    let (final_block_size, blocks) = parse_edge_table(&header.extra)?;
    debug!(
        "edge table: {} blocks, final block {final_block_size} bytes",
        blocks.len()
    );

    let mut decoded = Vec::with_capacity(header.uncompressed_size as usize);
    for (index, block) in blocks.iter().enumerate() {
        let padded = align_up(block.size, EDGE_ALIGNMENT);
        let mut chunk = vec![0u8; padded as usize];
        f.read_exact(&mut chunk)?;

        let expected = if index + 1 < blocks.len() {
            EDGE_BLOCK_SIZE
        } else {
            final_block_size
        } as usize;

        trace!(
            "block {index}: {} bytes ({} padded), compressed {}, expect {expected}",
            block.size, padded, block.compressed
        );

        if block.compressed {
            let mut out = Vec::with_capacity(expected);
            DeflateDecoder::new(&chunk[..block.size as usize])
                .read_to_end(&mut out)
                .map_err(|e| Error::DecompressionFailed(format!("block {index}: {e}")))?;
            if out.len() != expected {
                return Err(Error::LengthMismatch {
                    expected: expected as u64,
                    actual: out.len() as u64,
                });
            }
            decoded.append(&mut out);
        } else {
            if chunk.len() < expected {
                return Err(Error::TruncatedData {
                    expected: expected as u64,
                    actual: chunk.len() as u64,
                });
            }
            decoded.extend_from_slice(&chunk[..expected]);
        }
    }

    Ok(decoded)
}

/// Parse the block table out of the extra blob. Returns the final block's
/// uncompressed size and the block descriptors in payload order.
fn parse_edge_table(extra: &[u8]) -> Result<(u32, Vec<BlockDescriptor>)> {
    let mut t = Cursor::new(extra);

    let magic = t.read_u32::<BigEndian>()?;
    if magic != EDGE_TABLE_MAGIC {
        return Err(Error::InvalidMagic {
            section: "block table",
            value: magic,
        });
    }

    let version = t.read_u32::<BigEndian>()?;
    let table_offset = t.read_u32::<BigEndian>()?;
    let alignment = t.read_u32::<BigEndian>()?;
    let block_size = t.read_u32::<BigEndian>()?;
    let final_block_size = t.read_u32::<BigEndian>()?;
    let declared_len = t.read_u32::<BigEndian>()?;
    let block_count = t.read_u32::<BigEndian>()?;
    let trailer = t.read_u32::<BigEndian>()?;

    if declared_len as usize != extra.len() {
        return Err(Error::TableLengthMismatch {
            declared: declared_len,
            actual: extra.len(),
        });
    }

    for (field, value, accepted) in [
        ("version", version, EDGE_TABLE_VERSION),
        ("offset", table_offset, EDGE_TABLE_OFFSET),
        ("alignment", alignment, EDGE_ALIGNMENT),
        ("block size", block_size, EDGE_BLOCK_SIZE),
        ("trailer", trailer, EDGE_TABLE_TRAILER),
    ] {
        if value != accepted {
            return Err(Error::InvalidTableField { field, value });
        }
    }

    let needed =
        u64::from(EDGE_TABLE_OFFSET) + u64::from(block_count) * u64::from(EDGE_DESCRIPTOR_SIZE);
    if needed > extra.len() as u64 {
        return Err(Error::TruncatedData {
            expected: needed,
            actual: extra.len() as u64,
        });
    }

    let mut blocks = Vec::with_capacity(block_count as usize);
    for index in 0..block_count {
        let reserved = t.read_u32::<BigEndian>()?;
        let offset = t.read_u32::<BigEndian>()?;
        let size = t.read_u32::<BigEndian>()?;
        let flags = t.read_u32::<BigEndian>()?;

        if reserved != 0 {
            return Err(Error::InvalidBlockDescriptor {
                index,
                field: "reserved",
                value: reserved,
            });
        }
        let compressed = match flags {
            0 => false,
            1 => true,
            _ => {
                return Err(Error::InvalidBlockDescriptor {
                    index,
                    field: "flags",
                    value: flags,
                });
            }
        };

        blocks.push(BlockDescriptor {
            offset,
            size,
            compressed,
        });
    }

    Ok((final_block_size, blocks))
}

/// Round `value` up to the next multiple of `alignment`.
fn align_up(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}
