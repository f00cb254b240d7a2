//! Deriving many well-separated seeds from one.

use sha2::{Digest, Sha256};

/// Derives a seed for every position (run number, key, ...) from a master seed.
///
/// Consecutive positions produce unrelated seeds, since each one is taken
/// from a hash of the master seed and the position.
///
/// # Examples
/// ```
/// # use evsim_run::PositionalSeed;
/// let seeds = PositionalSeed::with(1234);
///
/// assert_eq!(seeds.seed_for(0), PositionalSeed::with(1234).seed_for(0));
/// assert_ne!(seeds.seed_for(0), seeds.seed_for(1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionalSeed {
    seed: u64,
}

impl PositionalSeed {
    /// Creates a seed source from a master seed.
    pub const fn with(seed: u64) -> Self {
        Self { seed }
    }

    /// Returns the master seed.
    pub const fn master(&self) -> u64 {
        self.seed
    }

    /// Returns the seed for `position`.
    pub fn seed_for(&self, position: u64) -> u64 {
        let digest = Sha256::new()
            .chain_update(self.seed.to_be_bytes())
            .chain_update(position.to_be_bytes())
            .finalize();

        // fold the digest down to 64 bits
        digest.chunks_exact(8).fold(1125899906842597, |acc: u64, chunk| {
            let mut word = [0; 8];
            word.copy_from_slice(chunk);
            acc.wrapping_mul(31).wrapping_add(u64::from_be_bytes(word))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn positions_do_not_collide() {
        let seeds = PositionalSeed::with(0);
        let derived: HashSet<_> = (0..1000).map(|p| seeds.seed_for(p)).collect();
        assert_eq!(derived.len(), 1000);
    }

    #[test]
    fn master_seed_matters() {
        assert_ne!(
            PositionalSeed::with(1).seed_for(5),
            PositionalSeed::with(2).seed_for(5)
        );
        assert_eq!(PositionalSeed::with(9).master(), 9);
    }
}
