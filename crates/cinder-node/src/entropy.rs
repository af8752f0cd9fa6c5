//! Seeded entropy for simulations and local fulfilment of randomness requests

use cinder_core::types::RandomValue;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Deterministic random-value source
pub struct SeededEntropy {
    rng: ChaCha20Rng,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Next 32-byte value, as a randomness provider would deliver it
    pub fn next_value(&mut self) -> RandomValue {
        let mut value = [0u8; 32];
        self.rng.fill_bytes(&mut value);
        value
    }

    pub fn rng(&mut self) -> &mut ChaCha20Rng {
        &mut self.rng
    }
}
