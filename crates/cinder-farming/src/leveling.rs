//! Asset leveling
//!
//! Every asset starts at level 1. Tier `i` of the configuration describes the
//! step from level `i + 1` to level `i + 2`: its cost, the constraints the
//! owner must satisfy, and the yield bonus it unlocks.

use cinder_core::collaborators::{AssetLedger, ConstraintChecker};
use cinder_core::error::{CinderError, Result};
use cinder_core::events::{Event, EventLog};
use cinder_core::types::{Address, Constraint, CurrencyId, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// One level step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTier {
    /// Yield bonus unlocked by reaching this level
    pub bonus: u64,
    /// Amount of the cost currency burned on level-up
    pub cost: u64,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default = "default_cost_currency")]
    pub cost_currency: CurrencyId,
    #[serde(default = "default_tiers")]
    pub tiers: Vec<LevelTier>,
}

fn default_cost_currency() -> CurrencyId {
    1
}

fn default_tiers() -> Vec<LevelTier> {
    [(1, 100), (2, 250), (3, 500), (5, 1_000)]
        .into_iter()
        .map(|(bonus, cost)| LevelTier {
            bonus,
            cost,
            constraints: Vec::new(),
        })
        .collect()
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            cost_currency: default_cost_currency(),
            tiers: default_tiers(),
        }
    }
}

/// Per-asset levels
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Leveling {
    config: LevelConfig,
    levels: HashMap<TokenId, u32>,
}

impl Leveling {
    pub fn new(config: LevelConfig) -> Self {
        Self {
            config,
            levels: HashMap::new(),
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Highest reachable level
    pub fn max_level(&self) -> u32 {
        u32::try_from(self.config.tiers.len())
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1)
    }

    pub fn level_of(&self, token_id: TokenId) -> u32 {
        self.levels.get(&token_id).copied().unwrap_or(1)
    }

    /// Sum of the bonuses of every tier up to and including `level`
    pub fn cumulative_bonus(&self, level: u32) -> u64 {
        let steps = level.saturating_sub(1) as usize;
        self.config
            .tiers
            .iter()
            .take(steps)
            .map(|tier| tier.bonus)
            .sum()
    }

    /// Bonus currently earned by `token_id`
    pub fn bonus_of(&self, token_id: TokenId) -> u64 {
        self.cumulative_bonus(self.level_of(token_id))
    }

    /// Level up an asset held directly by `owner`
    pub fn level_up(
        &mut self,
        owner: Address,
        token_id: TokenId,
        ledger: &mut dyn AssetLedger,
        checker: &dyn ConstraintChecker,
        events: &mut EventLog,
    ) -> Result<u32> {
        if ledger.owner_of(token_id)? != owner {
            return Err(CinderError::NotOwner {
                caller: owner,
                token_id,
            });
        }
        self.level_up_verified(owner, token_id, ledger, checker, events)
    }

    /// Level up once ownership has been established by the caller
    pub(crate) fn level_up_verified(
        &mut self,
        owner: Address,
        token_id: TokenId,
        ledger: &mut dyn AssetLedger,
        checker: &dyn ConstraintChecker,
        events: &mut EventLog,
    ) -> Result<u32> {
        let level = self.level_of(token_id);
        if level >= self.max_level() {
            return Err(CinderError::LevelCapExceeded { token_id, level });
        }
        let tier = &self.config.tiers[(level - 1) as usize];

        checker.require_all(owner, &tier.constraints, &*ledger)?;
        if tier.cost > 0 {
            ledger.burn_fungible(owner, self.config.cost_currency, u128::from(tier.cost))?;
        }

        let new_level = level + 1;
        self.levels.insert(token_id, new_level);
        events.emit(Event::LeveledUp {
            token_id,
            level: new_level,
        });
        info!("Token {} leveled up to {}", token_id, new_level);
        Ok(new_level)
    }
}
