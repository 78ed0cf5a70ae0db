//! Entry resolution against a data stream
//!
//! Maps index entries to byte ranges, with the whole range bounds-checked
//! before any seek. Entries may themselves be DCX envelopes; those are
//! decoded transparently. Writing the bytes anywhere is the caller's
//! concern, including directory creation and overwrite policy.

use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::trace;

use crate::ioutils::stream_len;
use crate::{Error, Result};

/// Read `size` bytes at `offset` from a data stream.
///
/// The full `offset + size` range is validated against the stream length
/// before seeking; a range that does not fit is fatal, never truncated.
pub fn read_entry_data<R: Read + Seek>(f: &mut R, offset: u64, size: u32) -> Result<Vec<u8>> {
    let length = stream_len(f)?;
    let size = u64::from(size);
    if offset.checked_add(size).is_none_or(|end| end > length) {
        return Err(Error::OutOfBounds {
            offset,
            size,
            length,
        });
    }

    f.seek(SeekFrom::Start(offset))?;
    let mut data = vec![0u8; size as usize];
    f.read_exact(&mut data)?;
    Ok(data)
}

/// Resolve one entry to its final bytes, decoding a DCX envelope when the
/// extracted range carries one.
pub fn read_entry<R: Read + Seek>(f: &mut R, offset: u64, size: u32) -> Result<Vec<u8>> {
    let data = read_entry_data(f, offset, size)?;
    if dcx::is_dcx(&data) {
        trace!("entry at {offset} is DCX-wrapped, decoding");
        return Ok(dcx::decompress(&mut Cursor::new(data))?);
    }
    Ok(data)
}
