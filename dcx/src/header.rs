//! DCX envelope header parsing
//!
//! An envelope is a linear sequence of sections: the tagged header, a size
//! block, a parameter block, and an extra block whose blob is consumed even
//! when the active scheme ignores it.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;
use tracing::debug;

use crate::{DCX_MAGIC, DCX_TAG, Error, Result};

const ENVELOPE_VERSION: u32 = 0x00010000;
const ENVELOPE_HEADER_SIZE: u32 = 24;

const SIZE_MAGIC: u32 = 0x44435300; // 'DCS\0'
const PARAM_MAGIC: u32 = 0x44435000; // 'DCP\0'
const EXTRA_MAGIC: u32 = 0x44434100; // 'DCA\0'

const PARAM_BLOCK_SIZE: u32 = 32;
const MAX_LEVEL: u8 = 9;

/// Payload compression scheme, identified by a fourcc in the parameter
/// block. Unknown discriminants are rejected during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
    /// Single zlib stream (`DFLT`)
    Zlib,
    /// Block table of raw deflate chunks (`EDGE`)
    Edge,
}

impl CompressionScheme {
    /// Fourcc for the zlib scheme (`DFLT`)
    pub const ZLIB_FOURCC: u32 = 0x44464C54;
    /// Fourcc for the edge scheme (`EDGE`)
    pub const EDGE_FOURCC: u32 = 0x45444745;

    /// Map a raw scheme fourcc to a known variant.
    pub fn from_fourcc(raw: u32) -> Option<Self> {
        match raw {
            Self::ZLIB_FOURCC => Some(Self::Zlib),
            Self::EDGE_FOURCC => Some(Self::Edge),
            _ => None,
        }
    }
}

/// Parsed DCX envelope header, up to but not including the payload bytes.
#[derive(Debug, Clone)]
pub struct DcxHeader {
    /// Declared size of the decoded payload.
    pub uncompressed_size: u32,

    /// Declared size of the encoded payload.
    pub compressed_size: u32,

    /// Active compression scheme.
    pub scheme: CompressionScheme,

    /// Compression level, 0-9. Informational for decoding.
    pub level: u8,

    /// Reserved fields from the envelope header, read but not validated.
    pub header_reserved: [u32; 3],

    /// Reserved fields from the parameter block. Validated per-scheme
    /// during decoding.
    pub reserved: [u32; 3],

    /// Flags word from the parameter block. Validated per-scheme during
    /// decoding.
    pub flags: u32,

    /// Extra block blob, excluding its tag and size fields. Carries the
    /// block table for the edge scheme; opaque for zlib.
    pub extra: Vec<u8>,
}

impl DcxHeader {
    /// Parse an envelope header at the reader's current position, leaving
    /// the reader at the first payload byte.
    pub fn parse<R: Read>(f: &mut R) -> Result<Self> {
        let mut tag = [0u8; 16];
        f.read_exact(&mut tag)?;
        let tag_text = &tag[..tag.iter().position(|&b| b == 0).unwrap_or(tag.len())];
        if tag_text != DCX_TAG.as_slice() {
            return Err(Error::InvalidTag(tag.to_vec()));
        }

        let magic = f.read_u32::<BigEndian>()?;
        if magic != DCX_MAGIC {
            return Err(Error::InvalidMagic {
                section: "envelope",
                value: magic,
            });
        }

        let version = f.read_u32::<BigEndian>()?;
        if version != ENVELOPE_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let header_size = f.read_u32::<BigEndian>()?;
        if header_size != ENVELOPE_HEADER_SIZE {
            return Err(Error::InvalidHeaderSize(header_size));
        }

        let mut header_reserved = [0u32; 3];
        for slot in &mut header_reserved {
            *slot = f.read_u32::<BigEndian>()?;
        }

        // Size block
        let size_magic = f.read_u32::<BigEndian>()?;
        if size_magic != SIZE_MAGIC {
            return Err(Error::InvalidMagic {
                section: "size block",
                value: size_magic,
            });
        }
        let uncompressed_size = f.read_u32::<BigEndian>()?;
        let compressed_size = f.read_u32::<BigEndian>()?;

        // Parameter block
        let param_magic = f.read_u32::<BigEndian>()?;
        if param_magic != PARAM_MAGIC {
            return Err(Error::InvalidMagic {
                section: "parameter block",
                value: param_magic,
            });
        }

        let raw_scheme = f.read_u32::<BigEndian>()?;
        let scheme =
            CompressionScheme::from_fourcc(raw_scheme).ok_or(Error::UnsupportedScheme(raw_scheme))?;

        let param_size = f.read_u32::<BigEndian>()?;
        if param_size != PARAM_BLOCK_SIZE {
            return Err(Error::InvalidParameterBlockSize(param_size));
        }

        let level = f.read_u8()?;
        if level > MAX_LEVEL {
            return Err(Error::InvalidLevel(level));
        }
        let mut padding = [0u8; 3];
        f.read_exact(&mut padding)?;

        let mut reserved = [0u32; 3];
        for slot in &mut reserved {
            *slot = f.read_u32::<BigEndian>()?;
        }
        let flags = f.read_u32::<BigEndian>()?;

        // Extra block; the blob is consumed even when the scheme ignores it
        let extra_magic = f.read_u32::<BigEndian>()?;
        if extra_magic != EXTRA_MAGIC {
            return Err(Error::InvalidMagic {
                section: "extra block",
                value: extra_magic,
            });
        }
        let extra_size = f.read_u32::<BigEndian>()?;
        if extra_size < 8 {
            return Err(Error::InvalidExtraSize(extra_size));
        }
        let mut extra = vec![0u8; (extra_size - 8) as usize];
        f.read_exact(&mut extra)?;

        debug!(
            "DCX envelope: scheme {scheme:?}, level {level}, \
             {compressed_size} -> {uncompressed_size} bytes, extra {} bytes",
            extra.len()
        );

        Ok(Self {
            uncompressed_size,
            compressed_size,
            scheme,
            level,
            header_reserved,
            reserved,
            flags,
            extra,
        })
    }
}
