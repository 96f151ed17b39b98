//! Seeded random number generation for reproducible rounds.

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// The generator driving every stochastic decision in a round.
pub type SimRng = ChaCha12Rng;

/// Creates a generator from a fixed seed.
///
/// Every round re-creates its generator from the configured seed, so two runs
/// with the same configuration draw identical value streams.
pub fn create_rng(seed: u64) -> SimRng {
    ChaCha12Rng::seed_from_u64(seed)
}
