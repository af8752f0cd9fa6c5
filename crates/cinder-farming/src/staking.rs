//! # Staking
//!
//! Assets are moved into a custody address while staked. Each stake record
//! names the farming product the asset works under and when accrual started.
//!
//! ## Lifecycle
//!
//! ```text
//!   stake ──► Staked ──harvest──► Staked (record re-created, staked_at = now)
//!               │
//!               ├──change_product──► Staked (new product)
//!               ├──unstake────────► harvest, custody returned, record deleted
//!               └──force_unstake──► custody returned, nothing harvested
//! ```
//!
//! Pool tokens of wave-eligible pools are forwarded to the contribution sink
//! when harvested.

use crate::leveling::{LevelConfig, Leveling};
use crate::products::{FarmingProduct, ProductRegistry};
use crate::yield_calc::{calculate_farming_bonus, AssetProfile, FarmingRate};
use cinder_core::collaborators::{AssetLedger, AttributeProvider, ConstraintChecker, ContributionSink};
use cinder_core::error::{CinderError, Result};
use cinder_core::events::{Event, EventLog};
use cinder_core::types::{Address, PoolId, StatSelector, Timestamp, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Stake of one asset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub owner: Address,
    pub active: bool,
    pub product_id: u64,
    pub staked_at: Timestamp,
}

impl StakeRecord {
    fn new(owner: Address, product_id: u64, staked_at: Timestamp) -> Self {
        Self {
            owner,
            active: true,
            product_id,
            staked_at,
        }
    }

    /// Seconds since accrual started, never negative
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        u64::try_from(now.saturating_sub(self.staked_at)).unwrap_or(0)
    }
}

/// Collaborators a staking operation may touch
pub struct StakeContext<'a> {
    pub ledger: &'a mut dyn AssetLedger,
    pub attributes: &'a dyn AttributeProvider,
    pub checker: &'a dyn ConstraintChecker,
    pub sink: &'a mut dyn ContributionSink,
    pub events: &'a mut EventLog,
}

/// Stake manager
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StakeManager {
    stakes: BTreeMap<TokenId, StakeRecord>,
    products: ProductRegistry,
    leveling: Leveling,
    custody: Address,
    wave_eligible_pools: BTreeSet<PoolId>,
}

impl StakeManager {
    pub fn new(
        custody: Address,
        level_config: LevelConfig,
        wave_eligible_pools: impl IntoIterator<Item = PoolId>,
    ) -> Self {
        Self {
            stakes: BTreeMap::new(),
            products: ProductRegistry::new(),
            leveling: Leveling::new(level_config),
            custody,
            wave_eligible_pools: wave_eligible_pools.into_iter().collect(),
        }
    }

    pub fn custody(&self) -> Address {
        self.custody
    }

    pub fn products(&self) -> &ProductRegistry {
        &self.products
    }

    pub fn products_mut(&mut self) -> &mut ProductRegistry {
        &mut self.products
    }

    pub fn leveling(&self) -> &Leveling {
        &self.leveling
    }

    pub fn stake_of(&self, token_id: TokenId) -> Option<&StakeRecord> {
        self.stakes.get(&token_id)
    }

    /// Tokens staked by `owner`, in id order
    pub fn stakes_of(&self, owner: Address) -> Vec<TokenId> {
        self.stakes
            .iter()
            .filter(|(_, record)| record.owner == owner)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn staked_count(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_wave_eligible(&self, pool_id: PoolId) -> bool {
        self.wave_eligible_pools.contains(&pool_id)
    }

    fn owned_stake(&self, owner: Address, token_id: TokenId) -> Result<&StakeRecord> {
        let record = self
            .stakes
            .get(&token_id)
            .ok_or(CinderError::NotStaked(token_id))?;
        if record.owner != owner {
            return Err(CinderError::NotOwner {
                caller: owner,
                token_id,
            });
        }
        Ok(record)
    }

    /// Move `token_id` into custody and start accruing under `product_id`
    pub fn stake(
        &mut self,
        owner: Address,
        token_id: TokenId,
        product_id: u64,
        now: Timestamp,
        ledger: &mut dyn AssetLedger,
        events: &mut EventLog,
    ) -> Result<()> {
        if owner.is_zero() {
            return Err(CinderError::ZeroAddress);
        }
        self.products.get_active(product_id)?;
        if self.stakes.contains_key(&token_id) {
            return Err(CinderError::AlreadyStaked(token_id));
        }
        if ledger.owner_of(token_id)? != owner {
            return Err(CinderError::NotOwner {
                caller: owner,
                token_id,
            });
        }

        ledger.transfer_nft(owner, self.custody, token_id)?;
        self.stakes
            .insert(token_id, StakeRecord::new(owner, product_id, now));
        events.emit(Event::Staked {
            owner,
            token_id,
            product_id,
        });
        info!("Token {} staked by {} under product {}", token_id, owner, product_id);
        Ok(())
    }

    fn profile(
        &self,
        token_id: TokenId,
        product: &FarmingProduct,
        attributes: &dyn AttributeProvider,
    ) -> Result<AssetProfile> {
        let stats = attributes.stats(token_id)?;
        let selector = product.required_stat.unwrap_or(StatSelector::Might);
        let crs = attributes.class_rarity_and_stat(token_id, selector)?;
        Ok(AssetProfile {
            stats,
            stat_value: crs.stat_value,
            class: crs.class,
            rarity: crs.rarity,
            level_bonus: self.leveling.bonus_of(token_id),
        })
    }

    /// Current rate and cap of a staked token
    pub fn farming_rate(&self, token_id: TokenId, attributes: &dyn AttributeProvider) -> Result<FarmingRate> {
        let record = self
            .stakes
            .get(&token_id)
            .ok_or(CinderError::NotStaked(token_id))?;
        let product = self.products.get(record.product_id)?;
        let profile = self.profile(token_id, product, attributes)?;
        calculate_farming_bonus(&profile, product)
    }

    /// Whole pool tokens accrued by a staked token at `now`
    pub fn calculate_staking_rewards(
        &self,
        token_id: TokenId,
        now: Timestamp,
        attributes: &dyn AttributeProvider,
    ) -> Result<u64> {
        let rate = self.farming_rate(token_id, attributes)?;
        let elapsed = self.stakes[&token_id].elapsed(now);
        Ok(rate.accrued(elapsed))
    }

    pub fn compute_time_to_reach_cap(
        &self,
        token_id: TokenId,
        now: Timestamp,
        attributes: &dyn AttributeProvider,
    ) -> Result<u64> {
        let rate = self.farming_rate(token_id, attributes)?;
        Ok(rate.time_to_reach_cap(self.stakes[&token_id].elapsed(now)))
    }

    pub fn time_until_next_husk(
        &self,
        token_id: TokenId,
        now: Timestamp,
        attributes: &dyn AttributeProvider,
    ) -> Result<u64> {
        let rate = self.farming_rate(token_id, attributes)?;
        Ok(rate.time_until_next_husk(self.stakes[&token_id].elapsed(now)))
    }

    /// Mint accrued pool tokens and restart accrual
    ///
    /// A harvest that yields nothing leaves the record untouched so partial
    /// progress toward the next token is kept.
    pub fn harvest(
        &mut self,
        owner: Address,
        token_id: TokenId,
        now: Timestamp,
        ctx: &mut StakeContext<'_>,
    ) -> Result<u64> {
        let record = self.owned_stake(owner, token_id)?.clone();
        let amount = self.calculate_staking_rewards(token_id, now, ctx.attributes)?;
        if amount == 0 {
            debug!("Harvest of token {} yielded nothing", token_id);
            return Ok(0);
        }

        let pool_id = self.products.get(record.product_id)?.pool_id;
        ctx.ledger.mint_pool_token(owner, pool_id, amount)?;
        if self.is_wave_eligible(pool_id) {
            ctx.sink.add_contribution(owner, amount, now, ctx.events)?;
        }

        self.stakes
            .insert(token_id, StakeRecord::new(owner, record.product_id, now));
        ctx.events.emit(Event::Harvested {
            owner,
            token_id,
            amount,
        });
        info!("Token {} harvested {} of pool {}", token_id, amount, pool_id);
        Ok(amount)
    }

    /// Harvest, then return the token to its owner
    pub fn unstake(
        &mut self,
        owner: Address,
        token_id: TokenId,
        now: Timestamp,
        ctx: &mut StakeContext<'_>,
    ) -> Result<u64> {
        let amount = self.harvest(owner, token_id, now, ctx)?;
        self.stakes.remove(&token_id);
        ctx.ledger.transfer_nft(self.custody, owner, token_id)?;
        ctx.events.emit(Event::Unstaked {
            owner,
            token_id,
            forced: false,
        });
        info!("Token {} unstaked by {}", token_id, owner);
        Ok(amount)
    }

    /// Return a token to its owner without harvesting
    pub fn force_unstake(
        &mut self,
        token_id: TokenId,
        ledger: &mut dyn AssetLedger,
        events: &mut EventLog,
    ) -> Result<()> {
        let record = self
            .stakes
            .remove(&token_id)
            .ok_or(CinderError::NotStaked(token_id))?;
        ledger.transfer_nft(self.custody, record.owner, token_id)?;
        events.emit(Event::Unstaked {
            owner: record.owner,
            token_id,
            forced: true,
        });
        info!("Token {} force-unstaked back to {}", token_id, record.owner);
        Ok(())
    }

    /// Harvest under the current product, then restart under `product_id`
    pub fn change_product(
        &mut self,
        owner: Address,
        token_id: TokenId,
        product_id: u64,
        now: Timestamp,
        ctx: &mut StakeContext<'_>,
    ) -> Result<u64> {
        self.products.get_active(product_id)?;
        let amount = self.harvest(owner, token_id, now, ctx)?;
        self.stakes
            .insert(token_id, StakeRecord::new(owner, product_id, now));
        ctx.events.emit(Event::Staked {
            owner,
            token_id,
            product_id,
        });
        Ok(amount)
    }

    /// Level up a token, staked or not
    ///
    /// Staked tokens are harvested first so the new bonus only applies from now on.
    pub fn level_up(
        &mut self,
        owner: Address,
        token_id: TokenId,
        now: Timestamp,
        ctx: &mut StakeContext<'_>,
    ) -> Result<u32> {
        if !self.stakes.contains_key(&token_id) {
            return self
                .leveling
                .level_up(owner, token_id, ctx.ledger, ctx.checker, ctx.events);
        }

        self.owned_stake(owner, token_id)?;
        self.harvest(owner, token_id, now, ctx)?;
        let level = self.leveling.level_up_verified(
            owner,
            token_id,
            ctx.ledger,
            ctx.checker,
            ctx.events,
        )?;
        if let Some(record) = self.stakes.get(&token_id) {
            let restarted = StakeRecord::new(owner, record.product_id, now);
            self.stakes.insert(token_id, restarted);
        }
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::collaborators::BalanceConstraints;
    use cinder_core::memory::{AssetAttributes, MemoryLedger, StaticAttributes};
    use cinder_core::types::ClassRarityStat;

    const T0: Timestamp = 1_767_225_600;
    const HOUR: i64 = 3_600;

    #[derive(Default)]
    struct RecordingSink(Vec<(Address, u64)>);

    impl ContributionSink for RecordingSink {
        fn add_contribution(
            &mut self,
            player: Address,
            quantity: u64,
            _now: Timestamp,
            _events: &mut EventLog,
        ) -> Result<()> {
            self.0.push((player, quantity));
            Ok(())
        }
    }

    struct Fixture {
        manager: StakeManager,
        ledger: MemoryLedger,
        attributes: StaticAttributes,
        sink: RecordingSink,
        events: EventLog,
        product_id: u64,
    }

    impl Fixture {
        fn new() -> Self {
            let custody = Address::from_low_u64(0xC0FFEE);
            let mut manager = StakeManager::new(custody, LevelConfig::default(), [7]);
            let mut events = EventLog::new();
            let product_id = manager
                .products_mut()
                .register(
                    FarmingProduct {
                        pool_id: 7,
                        base_hourly_rate: 1_000,
                        cap: 5,
                        ..Default::default()
                    },
                    &mut events,
                )
                .unwrap();
            manager.products_mut().set_active(product_id, true).unwrap();

            let mut ledger = MemoryLedger::new();
            ledger.mint_nft(player(), 1).unwrap();
            let mut attributes = StaticAttributes::new();
            attributes.insert(
                1,
                AssetAttributes {
                    stats: [5, 5, 5, 5, 5],
                    class: 1,
                    rarity: 1,
                },
            );
            Self {
                manager,
                ledger,
                attributes,
                sink: RecordingSink::default(),
                events,
                product_id,
            }
        }

        fn ctx(&mut self) -> (&mut StakeManager, StakeContext<'_>) {
            (
                &mut self.manager,
                StakeContext {
                    ledger: &mut self.ledger,
                    attributes: &self.attributes,
                    checker: &BalanceConstraints,
                    sink: &mut self.sink,
                    events: &mut self.events,
                },
            )
        }

        fn stake(&mut self) {
            let product_id = self.product_id;
            self.manager
                .stake(player(), 1, product_id, T0, &mut self.ledger, &mut self.events)
                .unwrap();
        }
    }

    fn player() -> Address {
        Address::from_low_u64(42)
    }

    #[test]
    fn test_stake_moves_custody() {
        let mut fx = Fixture::new();
        fx.stake();
        assert_eq!(fx.ledger.owner_of(1).unwrap(), fx.manager.custody());
        assert_eq!(fx.manager.stakes_of(player()), vec![1]);

        let product_id = fx.product_id;
        let err = fx
            .manager
            .stake(player(), 1, product_id, T0, &mut fx.ledger, &mut fx.events)
            .unwrap_err();
        assert_eq!(err, CinderError::AlreadyStaked(1));
    }

    #[test]
    fn test_stake_requires_active_product_and_ownership() {
        let mut fx = Fixture::new();
        fx.manager.products_mut().set_active(fx.product_id, false).unwrap();
        let product_id = fx.product_id;
        assert!(matches!(
            fx.manager
                .stake(player(), 1, product_id, T0, &mut fx.ledger, &mut fx.events),
            Err(CinderError::ItemInactive { .. })
        ));

        fx.manager.products_mut().set_active(product_id, true).unwrap();
        assert!(matches!(
            fx.manager.stake(
                Address::from_low_u64(3),
                1,
                product_id,
                T0,
                &mut fx.ledger,
                &mut fx.events
            ),
            Err(CinderError::NotOwner { .. })
        ));
    }

    #[test]
    fn test_rewards_saturate_at_cap() {
        let mut fx = Fixture::new();
        fx.stake();
        let attrs = &fx.attributes;
        assert_eq!(fx.manager.calculate_staking_rewards(1, T0 + 3 * HOUR, attrs).unwrap(), 3);
        assert_eq!(fx.manager.calculate_staking_rewards(1, T0 + 10 * HOUR, attrs).unwrap(), 5);
        assert_eq!(fx.manager.compute_time_to_reach_cap(1, T0 + 3 * HOUR, attrs).unwrap(), 7_200);
        assert_eq!(fx.manager.time_until_next_husk(1, T0 + 10 * HOUR, attrs).unwrap(), 0);
        // clock skew never produces negative elapsed time
        assert_eq!(fx.manager.calculate_staking_rewards(1, T0 - HOUR, attrs).unwrap(), 0);
    }

    #[test]
    fn test_harvest_mints_and_feeds_sink() {
        let mut fx = Fixture::new();
        fx.stake();
        let (manager, mut ctx) = fx.ctx();
        let amount = manager.harvest(player(), 1, T0 + 2 * HOUR, &mut ctx).unwrap();
        assert_eq!(amount, 2);
        assert_eq!(manager.stake_of(1).unwrap().staked_at, T0 + 2 * HOUR);

        assert_eq!(fx.ledger.pool_balance_of(player(), 7), 2);
        assert_eq!(fx.sink.0, vec![(player(), 2)]);
    }

    #[test]
    fn test_empty_harvest_keeps_progress() {
        let mut fx = Fixture::new();
        fx.stake();
        let (manager, mut ctx) = fx.ctx();
        assert_eq!(manager.harvest(player(), 1, T0 + 1_800, &mut ctx).unwrap(), 0);
        assert_eq!(manager.stake_of(1).unwrap().staked_at, T0);
        assert!(fx.sink.0.is_empty());
    }

    #[test]
    fn test_harvest_rejects_other_owner() {
        let mut fx = Fixture::new();
        fx.stake();
        let (manager, mut ctx) = fx.ctx();
        let err = manager
            .harvest(Address::from_low_u64(5), 1, T0 + HOUR, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, CinderError::NotOwner { .. }));
        assert_eq!(
            manager.harvest(player(), 2, T0, &mut ctx).unwrap_err(),
            CinderError::NotStaked(2)
        );
    }

    #[test]
    fn test_unstake_returns_token() {
        let mut fx = Fixture::new();
        fx.stake();
        let (manager, mut ctx) = fx.ctx();
        assert_eq!(manager.unstake(player(), 1, T0 + 4 * HOUR, &mut ctx).unwrap(), 4);
        assert!(manager.stake_of(1).is_none());
        assert_eq!(fx.ledger.owner_of(1).unwrap(), player());
        assert_eq!(fx.ledger.pool_balance_of(player(), 7), 4);
    }

    #[test]
    fn test_force_unstake_skips_harvest() {
        let mut fx = Fixture::new();
        fx.stake();
        fx.manager
            .force_unstake(1, &mut fx.ledger, &mut fx.events)
            .unwrap();
        assert_eq!(fx.ledger.owner_of(1).unwrap(), player());
        assert_eq!(fx.ledger.pool_balance_of(player(), 7), 0);
        assert!(matches!(
            fx.events.events().last(),
            Some(Event::Unstaked { forced: true, .. })
        ));
    }

    #[test]
    fn test_change_product() {
        let mut fx = Fixture::new();
        fx.stake();
        let other = fx
            .manager
            .products_mut()
            .register(
                FarmingProduct {
                    active: true,
                    pool_id: 8,
                    base_hourly_rate: 2_000,
                    cap: 50,
                    ..Default::default()
                },
                &mut fx.events,
            )
            .unwrap();
        fx.manager.products_mut().set_active(other, true).unwrap();

        let (manager, mut ctx) = fx.ctx();
        manager.change_product(player(), 1, other, T0 + HOUR, &mut ctx).unwrap();
        let record = manager.stake_of(1).unwrap();
        assert_eq!(record.product_id, other);
        assert_eq!(record.staked_at, T0 + HOUR);
        assert_eq!(
            manager
                .calculate_staking_rewards(1, T0 + 2 * HOUR, ctx.attributes)
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_level_up_staked_token() {
        let mut fx = Fixture::new();
        fx.stake();
        fx.ledger.mint_fungible(player(), 1, 100).unwrap();
        let (manager, mut ctx) = fx.ctx();
        let level = manager.level_up(player(), 1, T0 + HOUR, &mut ctx).unwrap();
        assert_eq!(level, 2);
        assert_eq!(manager.leveling().level_of(1), 2);
        assert_eq!(fx.ledger.balance_of(player(), 1), 0);
        assert_eq!(fx.ledger.pool_balance_of(player(), 7), 1);
    }

    /// Reports a selected stat that is not one of the raw stats
    struct DerivedStat;

    impl AttributeProvider for DerivedStat {
        fn stats(&self, _: TokenId) -> Result<[u64; 5]> {
            Ok([0; 5])
        }

        fn class_rarity_and_stat(&self, _: TokenId, _: StatSelector) -> Result<ClassRarityStat> {
            Ok(ClassRarityStat {
                class: 1,
                rarity: 1,
                stat_value: 9,
            })
        }
    }

    #[test]
    fn test_stat_linked_rate_uses_provider_value() {
        let mut fx = Fixture::new();
        let product_id = fx
            .manager
            .products_mut()
            .register(
                FarmingProduct {
                    pool_id: 7,
                    stat_linked_rate: 1_000,
                    required_stat: Some(StatSelector::Might),
                    cap: 100,
                    ..Default::default()
                },
                &mut fx.events,
            )
            .unwrap();
        fx.manager.products_mut().set_active(product_id, true).unwrap();
        fx.manager
            .stake(player(), 1, product_id, T0, &mut fx.ledger, &mut fx.events)
            .unwrap();

        let rate = fx.manager.farming_rate(1, &DerivedStat).unwrap();
        assert_eq!(rate.hourly_rate, 9_000);
        assert_eq!(
            fx.manager
                .calculate_staking_rewards(1, T0 + HOUR, &DerivedStat)
                .unwrap(),
            9
        );
    }
}
