//! # Packed Index Format
//!
//! Binary bundle of every local facet list, so a deployment can ship one
//! file instead of a directory of JSON arrays.
//!
//! Format: Header (5 bytes) + postcard-serialized bundle.
//! - 4 bytes: Magic ("CFIX")
//! - 1 byte: Version
//!
//! The bundle carries a checksum over its entries, verified on load.
//! Size and header are validated before the payload is decoded.
//! File I/O happens in the app layer.

use crate::index::{FacetEntry, LocalFacetIndex};
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES, MAX_BUNDLE_SIZE};
use crate::registry::ListKey;
use crate::CofiantError;
use serde::{Deserialize, Serialize};

/// Header length in bytes.
const HEADER_LEN: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The header preceding every packed bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleHeader {
    /// Magic bytes.
    pub magic: [u8; 4],
    /// Format version.
    pub version: u8,
}

impl BundleHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    /// Reject foreign files and other versions.
    pub fn validate(&self) -> Result<(), CofiantError> {
        if &self.magic != MAGIC_BYTES {
            return Err(CofiantError::Serialization(
                "Not a packed facet index (bad magic bytes)".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(CofiantError::Serialization(format!(
                "Unsupported index version: {} (expected {FORMAT_VERSION})",
                self.version
            )));
        }
        Ok(())
    }

    /// Encode the header.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Decode the header from the start of a buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CofiantError> {
        let Some(head) = bytes.get(..HEADER_LEN) else {
            return Err(CofiantError::Serialization("Header too short".to_string()));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&head[0..4]);
        Ok(Self {
            magic,
            version: head[4],
        })
    }
}

impl Default for BundleHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PAYLOAD
// =============================================================================

// postcard is not self-describing, so the payload mirrors `FacetEntry`
// without its skip-if-none attributes.
#[derive(Debug, Serialize, Deserialize)]
struct PackedEntry {
    id: String,
    label_en: String,
    label_cy: String,
    desc_en: Option<String>,
    desc_cy: Option<String>,
}

impl From<&FacetEntry> for PackedEntry {
    fn from(entry: &FacetEntry) -> Self {
        Self {
            id: entry.id.clone(),
            label_en: entry.label_en.clone(),
            label_cy: entry.label_cy.clone(),
            desc_en: entry.desc_en.clone(),
            desc_cy: entry.desc_cy.clone(),
        }
    }
}

impl From<PackedEntry> for FacetEntry {
    fn from(packed: PackedEntry) -> Self {
        Self {
            id: packed.id,
            label_en: packed.label_en,
            label_cy: packed.label_cy,
            desc_en: packed.desc_en,
            desc_cy: packed.desc_cy,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PackedIndex {
    checksum: u64,
    lists: Vec<(ListKey, Vec<PackedEntry>)>,
}

// =============================================================================
// CHECKSUM
// =============================================================================

fn mix(hash: u64, bytes: &[u8]) -> u64 {
    let mut hash = hash;
    for byte in bytes {
        hash = hash.rotate_left(7) ^ u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    // Field separator, so ("ab", "c") and ("a", "bc") differ.
    hash.rotate_left(11) ^ 0xff
}

/// Deterministic checksum over every list and entry, in key order.
///
/// Detects accidental corruption only; it is not a cryptographic digest.
#[must_use]
pub fn index_checksum(index: &LocalFacetIndex) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for (key, entries) in index.lists() {
        hash = mix(hash, key.file_stem().as_bytes());
        for entry in entries {
            hash = mix(hash, entry.id.as_bytes());
            hash = mix(hash, entry.label_en.as_bytes());
            hash = mix(hash, entry.label_cy.as_bytes());
            hash = mix(hash, entry.desc_en.as_deref().unwrap_or_default().as_bytes());
            hash = mix(hash, entry.desc_cy.as_deref().unwrap_or_default().as_bytes());
        }
    }
    hash
}

/// BLAKE3 digest of a packed bundle, as 64 hex characters.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn bundle_digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Check a packed bundle against an expected BLAKE3 digest.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn verify_bundle_digest(bytes: &[u8], expected: &str) -> bool {
    bundle_digest(bytes).eq_ignore_ascii_case(expected.trim())
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Pack an index into bytes (header + payload).
pub fn index_to_bytes(index: &LocalFacetIndex) -> Result<Vec<u8>, CofiantError> {
    let packed = PackedIndex {
        checksum: index_checksum(index),
        lists: index
            .lists()
            .map(|(key, entries)| (key, entries.iter().map(PackedEntry::from).collect()))
            .collect(),
    };

    let payload =
        postcard::to_stdvec(&packed).map_err(|e| CofiantError::Serialization(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&BundleHeader::new().to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Unpack an index.
///
/// Size, header and checksum are all validated; any mismatch is a
/// `Serialization` error.
pub fn index_from_bytes(bytes: &[u8]) -> Result<LocalFacetIndex, CofiantError> {
    if bytes.len() > MAX_BUNDLE_SIZE {
        return Err(CofiantError::Serialization(format!(
            "Bundle size {} bytes exceeds maximum allowed {MAX_BUNDLE_SIZE} bytes",
            bytes.len()
        )));
    }

    let header = BundleHeader::from_bytes(bytes)?;
    header.validate()?;

    let packed: PackedIndex = postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| {
        CofiantError::Serialization(format!("Failed to decode facet index: {e}"))
    })?;

    let expected = packed.checksum;
    let index = packed
        .lists
        .into_iter()
        .fold(LocalFacetIndex::new(), |index, (key, entries)| {
            index.with_list(key, entries.into_iter().map(FacetEntry::from).collect())
        });

    let actual = index_checksum(&index);
    if actual != expected {
        return Err(CofiantError::Serialization(format!(
            "Index checksum mismatch: stored {expected:#018x}, computed {actual:#018x}"
        )));
    }
    Ok(index)
}

// =============================================================================
// TESTS
// =============================================================================
