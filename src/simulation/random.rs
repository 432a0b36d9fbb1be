use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Every agent draws from its own stream, so that the outcome for one agent does not depend on
/// how many numbers other agents have drawn before.
pub type AgentRng = SmallRng;

/// Creates a random number generator for a specific agent. The hash parameter should uniquely
/// identify the agent within a run, e.g. its position in the roster.
pub fn get_rnd<H: Hash>(base_seed: u64, hash: H) -> AgentRng {
    let mut hasher = DefaultHasher::new();
    hash.hash(&mut hasher);
    base_seed.hash(&mut hasher);
    let combined_seed = hasher.finish();

    SmallRng::seed_from_u64(combined_seed)
}
