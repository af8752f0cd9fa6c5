//! Yield calculation
//!
//! Pure functions over an asset profile and a product definition. Rates use
//! the x1000 fixed-point scale of [`RATE_SCALE`]; accrual is floored to whole
//! pool tokens and saturates at the cap.

use crate::products::FarmingProduct;
use cinder_core::error::{CinderError, Result};
use cinder_core::types::{RATE_SCALE, SECONDS_PER_HOUR};
use serde::{Deserialize, Serialize};

/// Attributes of a staked asset relevant to farming
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetProfile {
    pub stats: [u64; 5],
    /// Provider-reported value of the product's required stat
    pub stat_value: u64,
    pub class: u8,
    pub rarity: u8,
    /// Cumulative level bonus
    pub level_bonus: u64,
}

/// Hourly accrual rate (x1000) and the cap it saturates at
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmingRate {
    pub hourly_rate: u64,
    pub cap: u64,
}

/// Seconds-times-rate needed for one whole token
const UNIT: u128 = SECONDS_PER_HOUR as u128 * RATE_SCALE as u128;

pub fn rarity_bonus(rarity: u8) -> u64 {
    match rarity {
        1 => 1,
        2 => 10,
        _ => 40,
    }
}

pub fn calculate_farming_bonus(asset: &AssetProfile, product: &FarmingProduct) -> Result<FarmingRate> {
    let stat_value = if product.required_stat.is_some() {
        asset.stat_value
    } else {
        0
    };

    let mut base = if stat_value != 0 {
        stat_value
            .checked_mul(product.stat_linked_rate)
            .ok_or(CinderError::Overflow("stat-linked rate"))?
    } else {
        product.base_hourly_rate
    };

    if product.bonus_from_level {
        let level_rate = asset
            .level_bonus
            .checked_mul(RATE_SCALE)
            .ok_or(CinderError::Overflow("level bonus"))?;
        base = base
            .checked_add(level_rate)
            .ok_or(CinderError::Overflow("hourly rate"))?;
    }

    let rb = rarity_bonus(asset.rarity);
    let mut multiplier = 10;
    if product.bonus_from_rarity {
        multiplier += rb;
    }
    if product.required_class == Some(asset.class) {
        multiplier += 5;
    }

    let hourly_rate = base
        .checked_mul(multiplier)
        .ok_or(CinderError::Overflow("hourly rate"))?
        / 10;

    let cap = if product.cap != 0 {
        product.cap
    } else {
        let stat_sum = asset
            .stats
            .iter()
            .try_fold(0u64, |acc, s| acc.checked_add(*s))
            .ok_or(CinderError::Overflow("stat sum"))?;
        let weighted = asset
            .level_bonus
            .checked_mul(10)
            .and_then(|lb| lb.checked_add(stat_sum))
            .ok_or(CinderError::Overflow("dynamic cap"))?;
        let cap = u128::from(weighted) * u128::from(10 + rb) / 100;
        u64::try_from(cap).map_err(|_| CinderError::Overflow("dynamic cap"))?
    };

    Ok(FarmingRate { hourly_rate, cap })
}

impl FarmingRate {
    /// Whole tokens accrued after `elapsed` seconds
    pub fn accrued(&self, elapsed: u64) -> u64 {
        let raw = u128::from(elapsed) * u128::from(self.hourly_rate) / UNIT;
        raw.min(u128::from(self.cap)) as u64
    }

    /// Seconds of staking after which at least `amount` tokens have accrued
    fn seconds_for(&self, amount: u64) -> u64 {
        let needed = u128::from(amount) * UNIT;
        let rate = u128::from(self.hourly_rate);
        let secs = needed.div_ceil(rate);
        u64::try_from(secs).unwrap_or(u64::MAX)
    }

    fn is_saturated(&self, elapsed: u64) -> bool {
        self.hourly_rate == 0 || self.accrued(elapsed) >= self.cap
    }

    /// Seconds remaining until the cap is reached; 0 once capped or when nothing accrues
    pub fn time_to_reach_cap(&self, elapsed: u64) -> u64 {
        if self.is_saturated(elapsed) {
            return 0;
        }
        self.seconds_for(self.cap).saturating_sub(elapsed)
    }

    /// Seconds remaining until the next whole token
    pub fn time_until_next_husk(&self, elapsed: u64) -> u64 {
        if self.is_saturated(elapsed) {
            return 0;
        }
        self.seconds_for(self.accrued(elapsed) + 1)
            .saturating_sub(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::types::StatSelector;
    use proptest::prelude::*;

    const HOUR: u64 = 3_600;

    fn flat(rate: u64, cap: u64) -> FarmingProduct {
        FarmingProduct {
            active: true,
            pool_id: 1,
            base_hourly_rate: rate,
            cap,
            ..Default::default()
        }
    }

    #[test]
    fn test_rarity_bonus_table() {
        assert_eq!(rarity_bonus(1), 1);
        assert_eq!(rarity_bonus(2), 10);
        assert_eq!(rarity_bonus(3), 40);
        assert_eq!(rarity_bonus(0), 40);
    }

    #[test]
    fn test_flat_rate_accrual() {
        let rate = calculate_farming_bonus(&AssetProfile::default(), &flat(1_000, 5)).unwrap();
        assert_eq!(rate, FarmingRate { hourly_rate: 1_000, cap: 5 });
        assert_eq!(rate.accrued(3 * HOUR), 3);
        assert_eq!(rate.accrued(10 * HOUR), 5);
        assert_eq!(rate.accrued(HOUR - 1), 0);
    }

    #[test]
    fn test_stat_linked_rate() {
        let asset = AssetProfile {
            stat_value: 7,
            ..Default::default()
        };
        let product = FarmingProduct {
            stat_linked_rate: 200,
            required_stat: Some(StatSelector::Tenacity),
            ..flat(1_000, 5)
        };
        let rate = calculate_farming_bonus(&asset, &product).unwrap();
        assert_eq!(rate.hourly_rate, 1_400);

        // a zero stat falls back to the base rate
        let weak = AssetProfile::default();
        assert_eq!(calculate_farming_bonus(&weak, &product).unwrap().hourly_rate, 1_000);

        // without a required stat the reported value is ignored
        assert_eq!(
            calculate_farming_bonus(&asset, &flat(1_000, 5)).unwrap().hourly_rate,
            1_000
        );
    }

    #[test]
    fn test_multipliers() {
        let asset = AssetProfile {
            class: 4,
            rarity: 2,
            level_bonus: 3,
            ..Default::default()
        };
        let product = FarmingProduct {
            required_class: Some(4),
            bonus_from_level: true,
            bonus_from_rarity: true,
            ..flat(1_000, 5)
        };
        // (1000 + 3000) * (10 + 10 + 5) / 10
        let rate = calculate_farming_bonus(&asset, &product).unwrap();
        assert_eq!(rate.hourly_rate, 10_000);

        let other_class = AssetProfile { class: 1, ..asset };
        assert_eq!(
            calculate_farming_bonus(&other_class, &product).unwrap().hourly_rate,
            8_000
        );
    }

    #[test]
    fn test_dynamic_cap() {
        let asset = AssetProfile {
            stats: [10, 20, 30, 40, 50],
            rarity: 2,
            level_bonus: 5,
            ..Default::default()
        };
        // (150 + 50) * (10 + 10) / 100
        let rate = calculate_farming_bonus(&asset, &flat(1_000, 0)).unwrap();
        assert_eq!(rate.cap, 40);
    }

    #[test]
    fn test_time_to_cap_and_next_token() {
        let rate = FarmingRate { hourly_rate: 1_000, cap: 5 };
        assert_eq!(rate.time_to_reach_cap(0), 5 * HOUR);
        assert_eq!(rate.time_to_reach_cap(2 * HOUR + 10), 3 * HOUR - 10);
        assert_eq!(rate.time_until_next_husk(HOUR + 100), HOUR - 100);
        assert_eq!(rate.time_to_reach_cap(5 * HOUR), 0);
        assert_eq!(rate.time_until_next_husk(6 * HOUR), 0);

        let idle = FarmingRate { hourly_rate: 0, cap: 5 };
        assert_eq!(idle.time_to_reach_cap(0), 0);
        assert_eq!(idle.time_until_next_husk(0), 0);
    }

    #[test]
    fn test_fractional_rate_rounds_up_wait() {
        // 1.5 tokens per hour: first token after 2400s
        let rate = FarmingRate { hourly_rate: 1_500, cap: 10 };
        assert_eq!(rate.time_until_next_husk(0), 2_400);
        assert_eq!(rate.accrued(2_399), 0);
        assert_eq!(rate.accrued(2_400), 1);
    }

    proptest! {
        #[test]
        fn prop_accrual_monotone_and_capped(
            hourly in 0u64..1_000_000,
            cap in 0u64..10_000,
            t1 in 0u64..10_000_000,
            dt in 0u64..10_000_000,
        ) {
            let rate = FarmingRate { hourly_rate: hourly, cap };
            let a = rate.accrued(t1);
            let b = rate.accrued(t1 + dt);
            prop_assert!(a <= b);
            prop_assert!(b <= cap);
        }

        #[test]
        fn prop_time_to_cap_reaches_cap(hourly in 1u64..1_000_000, cap in 1u64..1_000, t in 0u64..1_000_000) {
            let rate = FarmingRate { hourly_rate: hourly, cap };
            let wait = rate.time_to_reach_cap(t);
            prop_assert_eq!(rate.accrued(t + wait), cap);
        }
    }
}
