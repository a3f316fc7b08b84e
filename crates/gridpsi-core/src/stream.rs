// Copyright (c) 2026 Halcyon Interactive
// Gridpsi: Floor-Grid Private Set Intersection
// Licensed under the MIT License

use crate::types::SEED_LENGTH;

/// Derives `count` pseudo-random 32-byte values from `seed` by iterated
/// BLAKE3 hashing.
///
/// The chain starts at the seed and each output is the hash of its
/// predecessor; the seed itself is never part of the output. The stream is
/// fully deterministic, which lets a party regenerate its blinding scalars
/// from a single retained seed.
pub fn derive_random_values(count: usize, seed: &[u8; SEED_LENGTH]) -> Vec<[u8; SEED_LENGTH]> {
    let mut values = Vec::with_capacity(count);
    let mut current = *seed;
    for _ in 0..count {
        current = *blake3::hash(&current).as_bytes();
        values.push(current);
    }
    values
}
