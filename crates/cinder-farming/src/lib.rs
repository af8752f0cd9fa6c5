//! # Cinder Farming
//!
//! Staked assets accrue pool tokens over time. The accrual rate and its cap
//! depend on the asset's stats, class, rarity and level, and on the farming
//! product it is staked under.
//!
//! ## Rate Formula
//!
//! ```text
//! base       = stat_value * stat_linked_rate      (product names a stat, value > 0)
//!            | base_hourly_rate                   (otherwise)
//! base      += level_bonus * 1000                 (bonus_from_level)
//! multiplier = 10 + rarity_bonus (bonus_from_rarity) + 5 (class match)
//! hourly     = base * multiplier / 10             (x1000 scale)
//! accrued    = min(cap, elapsed_secs * hourly / 3600 / 1000)
//! ```
//!
//! | Rarity | Bonus |
//! |--------|-------|
//! | 1 | +1 |
//! | 2 | +10 |
//! | 3+ | +40 |

pub mod leveling;
pub mod products;
pub mod staking;
pub mod yield_calc;

pub use leveling::{LevelConfig, LevelTier, Leveling};
pub use products::{FarmingProduct, ProductRegistry};
pub use staking::{StakeContext, StakeManager, StakeRecord};
pub use yield_calc::{AssetProfile, FarmingRate};
