//! Bloom filter over change hashes.
//!
//! A peer summarises the changes it added since the last shared heads as a
//! filter; the other side sends every change the filter does not contain.
//! False positives are possible, so a change may be held back for a round
//! until the peer's `need` list asks for it.

use serde::{Deserialize, Serialize};

use super::SyncError;
use crate::{
    constants::{BLOOM_BITS_PER_ENTRY, BLOOM_PROBES, MAX_BLOOM_BITS_PER_ENTRY, MAX_BLOOM_PROBES},
    types::ChangeHash,
};

/// A fixed-size bloom filter keyed by [`ChangeHash`].
///
/// Bit positions come from the first 12 bytes of the hash, read as three
/// little-endian `u32`s `x`, `y`, `z`: the probes are `x`, `x + y`,
/// `x + 2y + z`, ... modulo the bit count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBloom", into = "RawBloom")]
pub struct BloomFilter {
    num_entries: u32,
    bits_per_entry: u32,
    probes: u32,
    bits: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct RawBloom {
    num_entries: u32,
    bits_per_entry: u32,
    probes: u32,
    bits: Vec<u8>,
}

fn byte_len(num_entries: u32, bits_per_entry: u32) -> usize {
    (num_entries as usize * bits_per_entry as usize).div_ceil(8)
}

impl TryFrom<RawBloom> for BloomFilter {
    type Error = SyncError;

    fn try_from(raw: RawBloom) -> Result<Self, Self::Error> {
        if raw.probes > MAX_BLOOM_PROBES {
            return Err(SyncError::protocol(format!(
                "bloom filter has {} probes, at most {MAX_BLOOM_PROBES} allowed",
                raw.probes
            )));
        }
        if raw.bits_per_entry > MAX_BLOOM_BITS_PER_ENTRY {
            return Err(SyncError::protocol(format!(
                "bloom filter has {} bits per entry, at most {MAX_BLOOM_BITS_PER_ENTRY} allowed",
                raw.bits_per_entry
            )));
        }
        let expected = byte_len(raw.num_entries, raw.bits_per_entry);
        if raw.bits.len() != expected {
            return Err(SyncError::protocol(format!(
                "bloom filter has {} bytes, expected {expected}",
                raw.bits.len()
            )));
        }
        if raw.num_entries > 0 && (raw.probes == 0 || raw.bits.is_empty()) {
            return Err(SyncError::protocol("bloom filter without probes"));
        }
        Ok(Self {
            num_entries: raw.num_entries,
            bits_per_entry: raw.bits_per_entry,
            probes: raw.probes,
            bits: raw.bits,
        })
    }
}

impl From<BloomFilter> for RawBloom {
    fn from(bloom: BloomFilter) -> Self {
        Self {
            num_entries: bloom.num_entries,
            bits_per_entry: bloom.bits_per_entry,
            probes: bloom.probes,
            bits: bloom.bits,
        }
    }
}

impl BloomFilter {
    /// Build a filter sized for `hashes`.
    pub fn from_hashes<'a>(hashes: impl ExactSizeIterator<Item = &'a ChangeHash>) -> Self {
        let num_entries = hashes.len() as u32;
        let bits_per_entry = BLOOM_BITS_PER_ENTRY as u32;
        let mut filter = Self {
            num_entries,
            bits_per_entry,
            probes: BLOOM_PROBES as u32,
            bits: vec![0; byte_len(num_entries, bits_per_entry)],
        };
        for hash in hashes {
            filter.add(hash);
        }
        filter
    }

    /// Number of hashes the filter was built for.
    pub fn len(&self) -> usize {
        self.num_entries as usize
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    /// Whether `hash` may be in the filter. An empty filter contains
    /// nothing.
    pub fn contains(&self, hash: &ChangeHash) -> bool {
        if self.num_entries == 0 {
            return false;
        }
        self.probe_positions(hash).all(|bit| self.get_bit(bit))
    }

    fn add(&mut self, hash: &ChangeHash) {
        let positions: Vec<u64> = self.probe_positions(hash).collect();
        for bit in positions {
            self.set_bit(bit);
        }
    }

    fn probe_positions(&self, hash: &ChangeHash) -> impl Iterator<Item = u64> + use<> {
        let modulo = 8 * self.bits.len() as u64;
        let bytes = hash.as_bytes();
        let word = |i: usize| {
            u64::from(u32::from_le_bytes([
                bytes[i],
                bytes[i + 1],
                bytes[i + 2],
                bytes[i + 3],
            ]))
        };
        let mut x = word(0) % modulo;
        let mut y = word(4) % modulo;
        let z = word(8) % modulo;
        (0..self.probes).map(move |i| {
            if i > 0 {
                x = (x + y) % modulo;
                y = (y + z) % modulo;
            }
            x
        })
    }

    fn get_bit(&self, bit: u64) -> bool {
        self.bits[(bit / 8) as usize] & (1 << (bit % 8)) != 0
    }

    fn set_bit(&mut self, bit: u64) {
        self.bits[(bit / 8) as usize] |= 1 << (bit % 8);
    }
}
