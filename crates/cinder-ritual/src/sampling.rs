//! Weighted sampling
//!
//! One random value from the provider feeds several independent draws. Each
//! draw hashes the value under its own derivation context and salt, so the
//! template draw and every per-bucket affix draw are uncorrelated.

use cinder_core::error::{CinderError, Result};
use cinder_core::types::RandomValue;

const TEMPLATE_CONTEXT: &str = "cinder-ritual 2026 template draw";
const AFFIX_CONTEXT: &str = "cinder-ritual 2026 affix draw";

/// Which draw a random value is being expanded for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Draw {
    Template,
    /// Affix draw for the bucket at this position in the template
    AffixBucket(usize),
}

/// Expand `random` into a 128-bit draw
pub fn expand(random: &RandomValue, draw: Draw) -> u128 {
    let (context, salt) = match draw {
        Draw::Template => (TEMPLATE_CONTEXT, 0u64),
        Draw::AffixBucket(position) => (AFFIX_CONTEXT, position as u64),
    };
    let mut material = [0u8; 40];
    material[..32].copy_from_slice(random);
    material[32..].copy_from_slice(&salt.to_le_bytes());
    let derived = blake3::derive_key(context, &material);

    let mut low = [0u8; 16];
    low.copy_from_slice(&derived[..16]);
    u128::from_le_bytes(low)
}

/// Index whose cumulative-weight range contains `target`
///
/// Entry `i` owns `[cum(i-1), cum(i))`; zero-weight entries own nothing.
pub fn select_weighted(weights: &[u64], target: u64) -> Option<usize> {
    let mut cumulative = 0u64;
    for (index, weight) in weights.iter().enumerate() {
        cumulative = cumulative.saturating_add(*weight);
        if target < cumulative {
            return Some(index);
        }
    }
    None
}

/// Draw an index from `weights` using `random`
pub fn draw_index(random: &RandomValue, draw: Draw, weights: &[u64]) -> Result<usize> {
    let sum = weights
        .iter()
        .try_fold(0u64, |acc, w| acc.checked_add(*w))
        .ok_or(CinderError::Overflow("weight sum"))?;
    if sum == 0 {
        return Err(CinderError::ZeroWeight);
    }
    let target = (expand(random, draw) % u128::from(sum)) as u64;
    select_weighted(weights, target).ok_or(CinderError::ZeroWeight)
}
