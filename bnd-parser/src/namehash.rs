//! Filename hashing and the hash-to-name dictionary
//!
//! BHD5 indexes store only a 32-bit hash of each original path. A name
//! dictionary built from a known path list recovers human-readable names
//! for output; it is cosmetic only and never required for extraction
//! correctness. Misses stay misses.

use std::collections::HashMap;
use std::io::BufRead;

use crate::Result;

/// Hash a file path the way the BHD5 index builder did.
///
/// Paths are lowercased and backslashes normalised to forward slashes
/// before hashing byte-wise with `h = h * 37 + b`, seed 0.
pub fn hash_path(path: &str) -> u32 {
    path.to_ascii_lowercase()
        .replace('\\', "/")
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(37).wrapping_add(u32::from(b)))
}

/// Hash-to-name dictionary over a known path list.
#[derive(Debug, Clone, Default)]
pub struct NameDictionary {
    names: HashMap<u32, String>,
}

impl NameDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from a newline-separated path list. Empty lines
    /// and `#` comment lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut dictionary = Self::new();
        for line in reader.lines() {
            let line = line?;
            let path = line.trim();
            if path.is_empty() || path.starts_with('#') {
                continue;
            }
            dictionary.insert(path);
        }
        Ok(dictionary)
    }

    /// Add one path to the dictionary.
    pub fn insert(&mut self, path: &str) {
        self.names.insert(hash_path(path), path.to_string());
    }

    /// Resolve a hash to its original name, if known.
    pub fn get(&self, hash: u32) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }

    /// Number of known names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the dictionary holds no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
