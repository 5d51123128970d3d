//! Partition selection.
//!
//! Keyed records hash with murmur2 (the same function Kafka's default
//! partitioner uses) so a key always lands on the same partition. Unkeyed
//! records are spread round-robin.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
pub struct Partitioner {
    partitions: NonZeroU32,
    next: AtomicU32,
}

impl Partitioner {
    pub fn new(partitions: NonZeroU32) -> Self {
        Self {
            partitions,
            next: AtomicU32::new(0),
        }
    }

    pub fn partitions(&self) -> u32 {
        self.partitions.get()
    }

    /// Choose a partition for a record with the given key.
    pub fn partition_for(&self, key: Option<&str>) -> u32 {
        match key {
            Some(key) => keyed_partition(key.as_bytes(), self.partitions.get()),
            None => self.next.fetch_add(1, Ordering::Relaxed) % self.partitions.get(),
        }
    }
}

fn keyed_partition(key: &[u8], partitions: u32) -> u32 {
    (murmur2(key) & 0x7fff_ffff) % partitions
}

/// 32-bit murmur2 with Kafka's seed.
pub fn murmur2(data: &[u8]) -> u32 {
    const SEED: u32 = 0x9747_b28c;
    const M: u32 = 0x5bd1_e995;
    const R: u32 = 24;

    let mut h = SEED ^ data.len() as u32;

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);
        h = h.wrapping_mul(M);
        h ^= k;
    }

    let tail = chunks.remainder();
    if tail.len() >= 3 {
        h ^= u32::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        h ^= u32::from(tail[1]) << 8;
    }
    if !tail.is_empty() {
        h ^= u32::from(tail[0]);
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;
    h
}
