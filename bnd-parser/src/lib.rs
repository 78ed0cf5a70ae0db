//! Binder container index parsers
//!
//! Parsers for the two binder container layouts: BND3, a flat
//! offset-indexed entry table with out-of-band names, and BHD5, a
//! hash-bucket index over a sibling data file. Entries may be wrapped in
//! DCX compression envelopes, decoded through the [`dcx`] crate.
//!
//! Parsing is strictly sequential and fatal-on-mismatch: a corrupted
//! container yields an error, never a best-effort subset of entries.

pub mod binder3;
pub mod binder5;
pub mod error;
pub mod extract;
pub mod ioutils;
pub mod namehash;

pub use binder3::{Binder3Entry, Binder3File};
pub use binder5::{Binder5Entry, Binder5File, BucketDescriptor};
pub use error::{Error, Result};
pub use extract::{read_entry, read_entry_data};
pub use ioutils::ByteOrder;
pub use namehash::{NameDictionary, hash_path};
