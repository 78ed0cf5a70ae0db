//! BHD5 hash-bucket container index parsing
//!
//! A BHD5 header file indexes a sibling data file. Entries are grouped
//! into buckets by `name_hash % bucket_count`; the bucket table points at
//! contiguous runs of fixed 16-byte entry records. Parsing may start at a
//! non-zero stream position, and every declared offset is relative to that
//! base.

use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

use crate::ioutils::{ByteOrder, resolve_byte_order, stream_len};
use crate::{Error, Result};

/// Big-endian magic: `BHD5`.
pub const BHD5_MAGIC: u32 = 0x42484435;

const PLATFORM: u32 = 255;
const ENTRY_RECORD_SIZE: u64 = 16;

/// One entry of a BHD5 index, in bucket-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binder5Entry {
    /// Hash of the original file name.
    pub name_hash: u32,
    /// Data size in the sibling data file.
    pub size: u32,
    /// Data offset in the sibling data file. Never negative.
    pub offset: i64,
}

/// A contiguous run of entries sharing a bucket-table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketDescriptor {
    /// Index of the bucket's first entry in the flat entry list.
    pub start: usize,
    /// Number of entries in the bucket.
    pub count: usize,
}

/// Parsed BHD5 container index.
#[derive(Debug, Clone)]
pub struct Binder5File {
    byte_order: ByteOrder,
    buckets: Vec<BucketDescriptor>,
    entries: Vec<Binder5Entry>,
}

impl Binder5File {
    /// Parse a BHD5 index starting at the reader's current position.
    pub fn parse<R: Read + Seek>(f: &mut R) -> Result<Self> {
        let base = f.stream_position()?;
        let length = stream_len(f)?;

        let magic = ByteOrder::Big.read_u32(f)?;
        if magic != BHD5_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        // Version comes before we know the byte order; probe it, then
        // re-read the skipped platform field with the resolved order.
        f.seek(SeekFrom::Current(4))?;
        let raw_version = ByteOrder::Little.read_u32(f)?;
        let (_, byte_order) =
            resolve_byte_order(raw_version, &[1]).ok_or(Error::UnknownVersion(raw_version))?;

        f.seek(SeekFrom::Current(-8))?;
        let platform = byte_order.read_u32(f)?;
        if platform != PLATFORM {
            return Err(Error::UnexpectedFieldValue {
                field: "platform",
                value: u64::from(platform),
            });
        }
        f.seek(SeekFrom::Current(4))?;

        let header_size = byte_order.read_u32(f)?;
        if base + u64::from(header_size) > length {
            return Err(Error::OutOfBounds {
                offset: base,
                size: u64::from(header_size),
                length,
            });
        }

        let bucket_table_count = byte_order.read_u32(f)?;
        let bucket_table_offset = byte_order.read_u32(f)?;

        let table_size = u64::from(bucket_table_count) * 8;
        if base + u64::from(bucket_table_offset) + table_size > length {
            return Err(Error::OutOfBounds {
                offset: base + u64::from(bucket_table_offset),
                size: table_size,
                length,
            });
        }

        debug!("BHD5: {byte_order:?}, {bucket_table_count} buckets");

        // Bucket table records store the entry count before the offset
        f.seek(SeekFrom::Start(base + u64::from(bucket_table_offset)))?;
        let mut regions = Vec::with_capacity(bucket_table_count as usize);
        for _ in 0..bucket_table_count {
            let entry_count = byte_order.read_u32(f)?;
            let entry_offset = byte_order.read_u32(f)?;

            let region_size = u64::from(entry_count) * ENTRY_RECORD_SIZE;
            if base + u64::from(entry_offset) + region_size > length {
                return Err(Error::OutOfBounds {
                    offset: base + u64::from(entry_offset),
                    size: region_size,
                    length,
                });
            }

            regions.push((entry_offset, entry_count));
        }

        // Read buckets in table order; entries keep that order in the
        // flat list
        let mut buckets = Vec::with_capacity(regions.len());
        let mut entries = Vec::new();
        for &(entry_offset, entry_count) in &regions {
            f.seek(SeekFrom::Start(base + u64::from(entry_offset)))?;

            let start = entries.len();
            for _ in 0..entry_count {
                let name_hash = byte_order.read_u32(f)?;
                let size = byte_order.read_u32(f)?;
                let offset = byte_order.read_i64(f)?;

                if offset < 0 {
                    return Err(Error::NegativeOffset(offset));
                }

                entries.push(Binder5Entry {
                    name_hash,
                    size,
                    offset,
                });
            }
            buckets.push(BucketDescriptor {
                start,
                count: entry_count as usize,
            });
        }

        Ok(Self {
            byte_order,
            buckets,
            entries,
        })
    }

    /// Byte order resolved from the version field.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// All entries, preserving bucket-table order.
    pub fn entries(&self) -> &[Binder5Entry] {
        &self.entries
    }

    /// Bucket descriptors into [`entries`][Self::entries], in table order.
    pub fn buckets(&self) -> &[BucketDescriptor] {
        &self.buckets
    }

    /// Look up an entry by name hash.
    ///
    /// Selects `buckets[hash % bucket_count]` and scans it linearly, the
    /// same placement the index was built with. Returns `None` when the
    /// hash is absent, a legitimate terminal result for unknown names.
    pub fn lookup(&self, hash: u32) -> Option<&Binder5Entry> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = self.buckets[hash as usize % self.buckets.len()];
        self.entries[bucket.start..bucket.start + bucket.count]
            .iter()
            .find(|entry| entry.name_hash == hash)
    }
}
