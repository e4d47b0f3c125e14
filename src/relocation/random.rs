use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Seed MATSim uses when nothing else is configured.
pub const DEFAULT_SEED: u64 = 4711;

/// Creates the single random number generator of a relocation run. Everything random in a run
/// draws from it in a fixed order, so a seed fully determines the output.
pub fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}
