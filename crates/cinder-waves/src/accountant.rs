//! # Wave Accountant
//!
//! Batches player contributions into daily waves and splits each wave's
//! reward budget proportionally.
//!
//! ## Window
//!
//! ```text
//!   aged out      claimable (closed)          open
//!  ──────────┬──────────────────────────────┬───────
//!   ≤ c-7    │ c-6  c-5  c-4  c-3  c-2  c-1 │  c
//! ```
//!
//! Global entries that fall out of the retention window are dequeued and
//! their unclaimed remainder is carried into the next wave's budget.

use crate::queue::{QueuePayload, TimeWindowQueue};
use cinder_core::clock::WaveClock;
use cinder_core::collaborators::{AssetLedger, ContributionSink};
use cinder_core::error::{CinderError, Result};
use cinder_core::events::{Event, EventLog};
use cinder_core::types::{Address, CurrencyId, Timestamp, WaveId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Wave accounting parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Number of waves kept in the global queue, open wave included
    #[serde(default = "default_retention_waves")]
    pub retention_waves: u64,

    /// Budget of currency A assigned to every new wave
    #[serde(default = "default_daily_pool_a")]
    pub daily_pool_a: u64,

    /// Budget of currency B assigned to every new wave
    #[serde(default = "default_daily_pool_b")]
    pub daily_pool_b: u64,

    /// Ledger currency paid out as reward A
    #[serde(default = "default_currency_a")]
    pub currency_a: CurrencyId,

    /// Ledger currency paid out as reward B
    #[serde(default = "default_currency_b")]
    pub currency_b: CurrencyId,
}

fn default_retention_waves() -> u64 {
    7
}

fn default_daily_pool_a() -> u64 {
    10_000
}

fn default_daily_pool_b() -> u64 {
    1_000
}

fn default_currency_a() -> CurrencyId {
    1
}

fn default_currency_b() -> CurrencyId {
    2
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            retention_waves: default_retention_waves(),
            daily_pool_a: default_daily_pool_a(),
            daily_pool_b: default_daily_pool_b(),
            currency_a: default_currency_a(),
            currency_b: default_currency_b(),
        }
    }
}

/// Global per-wave totals and reward budget
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalWave {
    pub quantity: u64,
    pub pool_a: u128,
    pub pool_b: u128,
    pub unclaimed_a: u128,
    pub unclaimed_b: u128,
}

impl QueuePayload for GlobalWave {
    fn quantity(&self) -> u64 {
        self.quantity
    }

    fn add_quantity(&mut self, delta: u64) -> Result<()> {
        self.quantity = self
            .quantity
            .checked_add(delta)
            .ok_or(CinderError::Overflow("global wave quantity"))?;
        Ok(())
    }
}

/// A player's contribution to one wave and what has been paid for it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerWave {
    pub quantity: u64,
    pub claimed_a: u128,
    pub claimed_b: u128,
}

impl QueuePayload for PlayerWave {
    fn quantity(&self) -> u64 {
        self.quantity
    }

    fn add_quantity(&mut self, delta: u64) -> Result<()> {
        self.quantity = self
            .quantity
            .checked_add(delta)
            .ok_or(CinderError::Overflow("player wave quantity"))?;
        Ok(())
    }
}

/// Owns the wave clock, the global queue and every player queue
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WaveAccountant {
    config: WaveConfig,
    clock: WaveClock,
    global: TimeWindowQueue<GlobalWave>,
    players: HashMap<Address, TimeWindowQueue<PlayerWave>>,
    /// Unclaimed remainders of aged-out waves, waiting for the next wave entry
    carry_a: u128,
    carry_b: u128,
}

impl WaveAccountant {
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Initialize the global queue and seed wave #1 at the last midnight UTC
    pub fn initialize(&mut self, now: Timestamp) -> Result<WaveId> {
        self.global.initialize()?;
        self.clock = WaveClock::genesis(now)?;
        info!(
            wave_time = self.clock.wave_time(),
            "wave accounting initialized"
        );
        Ok(self.clock.wave_count())
    }

    pub fn is_initialized(&self) -> bool {
        self.global.is_initialized()
    }

    pub fn current_wave(&self) -> WaveId {
        self.clock.wave_count()
    }

    pub fn current_wave_time(&self) -> Timestamp {
        self.clock.wave_time()
    }

    pub fn global_queue(&self) -> &TimeWindowQueue<GlobalWave> {
        &self.global
    }

    pub fn player_queue(&self, player: &Address) -> Option<&TimeWindowQueue<PlayerWave>> {
        self.players.get(player)
    }

    /// Remainders waiting to be added to the next opened wave
    pub fn carried_over(&self) -> (u128, u128) {
        (self.carry_a, self.carry_b)
    }

    pub fn set_daily_pools(&mut self, pool_a: u64, pool_b: u64) {
        self.config.daily_pool_a = pool_a;
        self.config.daily_pool_b = pool_b;
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(CinderError::QueueUninitialized)
        }
    }

    /// Roll the wave counter forward if the current wave has expired, then
    /// age out global waves that left the window
    pub fn begin_new_wave(&mut self, now: Timestamp, events: &mut EventLog) -> Result<Option<WaveId>> {
        self.ensure_initialized()?;
        let Some(rollover) = self.clock.advance(now)? else {
            return Ok(None);
        };
        info!(
            new_wave_id = rollover.new_wave_id,
            elapsed_days = rollover.elapsed_days,
            "wave rollover"
        );
        events.emit(Event::WaveRollover {
            new_wave_id: rollover.new_wave_id,
            prev_wave_time: rollover.prev_wave_time,
            new_wave_time: rollover.new_wave_time,
        });
        self.age_out()?;
        Ok(Some(rollover.new_wave_id))
    }

    /// Oldest wave id that is still inside the retention window
    fn window_start(&self) -> WaveId {
        self.current_wave()
            .saturating_sub(self.config.retention_waves)
            + 1
    }

    /// Dequeue global waves below the window and carry their unclaimed remainder
    fn age_out(&mut self) -> Result<()> {
        let cutoff = self.window_start() - 1;
        for (wave_id, wave) in self.global.drop_through(cutoff)? {
            debug!(
                wave_id,
                unclaimed_a = %wave.unclaimed_a,
                unclaimed_b = %wave.unclaimed_b,
                "wave aged out"
            );
            self.carry_a = self
                .carry_a
                .checked_add(wave.unclaimed_a)
                .ok_or(CinderError::Overflow("carry a"))?;
            self.carry_b = self
                .carry_b
                .checked_add(wave.unclaimed_b)
                .ok_or(CinderError::Overflow("carry b"))?;
        }
        Ok(())
    }

    fn open_global_entry(&mut self, wave_id: WaveId, quantity: u64) -> Result<()> {
        let pool_a = u128::from(self.config.daily_pool_a)
            .checked_add(self.carry_a)
            .ok_or(CinderError::Overflow("wave pool a"))?;
        let pool_b = u128::from(self.config.daily_pool_b)
            .checked_add(self.carry_b)
            .ok_or(CinderError::Overflow("wave pool b"))?;
        self.global.enqueue(
            wave_id,
            GlobalWave {
                quantity,
                pool_a,
                pool_b,
                unclaimed_a: pool_a,
                unclaimed_b: pool_b,
            },
        )?;
        self.carry_a = 0;
        self.carry_b = 0;
        Ok(())
    }

    /// Record `quantity` for `player` in the active wave of both queues
    pub fn add_to_queue(
        &mut self,
        player: Address,
        quantity: u64,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<()> {
        if player.is_zero() {
            return Err(CinderError::ZeroAddress);
        }
        if quantity == 0 {
            return Err(CinderError::ZeroAmount);
        }
        self.ensure_initialized()?;
        self.begin_new_wave(now, events)?;

        let wave_id = self.current_wave();
        let global_has_wave = self
            .global
            .peek_back()
            .map(|entry| entry.key == wave_id)
            .unwrap_or(false);
        if global_has_wave {
            self.global.update_quantity(wave_id, quantity)?;
        } else {
            self.open_global_entry(wave_id, quantity)?;
        }

        let queue = self
            .players
            .entry(player)
            .or_insert_with(TimeWindowQueue::initialized);
        if queue.key_exists(wave_id) {
            queue.update_quantity(wave_id, quantity)?;
        } else {
            queue.enqueue(
                wave_id,
                PlayerWave {
                    quantity,
                    ..Default::default()
                },
            )?;
        }

        events.emit(Event::ContributionAdded {
            player,
            wave_id,
            quantity,
        });
        Ok(())
    }

    /// Full entitlement of `player` in `wave_id`: `pool * player_qty / global_qty`
    pub fn calculate_rewards_by_wave_id(&self, wave_id: WaveId, player: &Address) -> Result<(u128, u128)> {
        let (Some(global), Some(mine)) = (
            self.global.get(wave_id),
            self.players.get(player).and_then(|q| q.get(wave_id)),
        ) else {
            return Ok((0, 0));
        };
        if global.quantity == 0 {
            return Ok((0, 0));
        }
        let share = |pool: u128| -> Result<u128> {
            pool.checked_mul(mine.quantity as u128)
                .map(|scaled| scaled / global.quantity as u128)
                .ok_or(CinderError::Overflow("reward share"))
        };
        Ok((share(global.pool_a)?, share(global.pool_b)?))
    }

    /// Closed waves that can still be claimed, oldest first
    fn claimable_waves(&self) -> std::ops::RangeInclusive<WaveId> {
        let current = self.current_wave();
        self.window_start()..=current.saturating_sub(1)
    }

    /// Amounts `player` would receive from a claim right now (no rollover)
    pub fn pending_rewards(&self, player: &Address) -> Result<(u128, u128)> {
        let Some(queue) = self.players.get(player) else {
            return Ok((0, 0));
        };
        let mut total = (0u128, 0u128);
        for wave_id in self.claimable_waves() {
            let Some(mine) = queue.get(wave_id) else {
                continue;
            };
            let (a, b) = self.calculate_rewards_by_wave_id(wave_id, player)?;
            total.0 += a.saturating_sub(mine.claimed_a);
            total.1 += b.saturating_sub(mine.claimed_b);
        }
        Ok(total)
    }

    /// Pay out everything `player` is owed from closed waves in the window
    pub fn claim_rewards(
        &mut self,
        player: Address,
        now: Timestamp,
        ledger: &mut dyn AssetLedger,
        events: &mut EventLog,
    ) -> Result<(u128, u128)> {
        if player.is_zero() {
            return Err(CinderError::ZeroAddress);
        }
        self.ensure_initialized()?;
        self.begin_new_wave(now, events)?;

        let mut total_a: u128 = 0;
        let mut total_b: u128 = 0;
        for wave_id in self.claimable_waves() {
            let (entitled_a, entitled_b) = self.calculate_rewards_by_wave_id(wave_id, &player)?;
            let (Some(global), Some(mine)) = (
                self.global.get_mut(wave_id),
                self.players.get_mut(&player).and_then(|q| q.get_mut(wave_id)),
            ) else {
                continue;
            };

            let owed_a = entitled_a.saturating_sub(mine.claimed_a);
            let owed_b = entitled_b.saturating_sub(mine.claimed_b);
            if owed_a > global.unclaimed_a {
                return Err(CinderError::UnclaimedUnderflow {
                    wave_id,
                    owed: owed_a,
                    remaining: global.unclaimed_a,
                });
            }
            if owed_b > global.unclaimed_b {
                return Err(CinderError::UnclaimedUnderflow {
                    wave_id,
                    owed: owed_b,
                    remaining: global.unclaimed_b,
                });
            }
            global.unclaimed_a -= owed_a;
            global.unclaimed_b -= owed_b;
            mine.claimed_a += owed_a;
            mine.claimed_b += owed_b;
            total_a += owed_a;
            total_b += owed_b;
        }

        let cutoff = self.window_start() - 1;
        if let Some(queue) = self.players.get_mut(&player) {
            queue.drop_through(cutoff)?;
        }

        if total_a > 0 {
            ledger.mint_fungible(player, self.config.currency_a, total_a)?;
        }
        if total_b > 0 {
            ledger.mint_fungible(player, self.config.currency_b, total_b)?;
        }
        info!(
            player = %player,
            amount_a = %total_a,
            amount_b = %total_b,
            "rewards claimed"
        );
        events.emit(Event::RewardsClaimed {
            player,
            amount_a: total_a,
            amount_b: total_b,
        });
        Ok((total_a, total_b))
    }

    /// Share of all activity in the window, open wave included, as a whole percentage
    pub fn get_contribution_percentage(&self, player: &Address) -> u64 {
        let start = self.window_start();
        let current = self.current_wave();
        let mut player_total: u128 = 0;
        let mut global_total: u128 = 0;
        for wave_id in start..=current {
            global_total += self.global.quantity_of(wave_id) as u128;
            if let Some(queue) = self.players.get(player) {
                player_total += queue.quantity_of(wave_id) as u128;
            }
        }
        if global_total == 0 {
            return 0;
        }
        (100 * player_total / global_total) as u64
    }
}

impl ContributionSink for WaveAccountant {
    fn add_contribution(
        &mut self,
        player: Address,
        quantity: u64,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<()> {
        self.add_to_queue(player, quantity, now, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::types::{PoolId, TokenId, SECONDS_PER_DAY};
    use proptest::prelude::*;

    // 2026-01-01T00:00:00Z
    const T0: Timestamp = 1_767_225_600;

    #[derive(Default)]
    struct MintLog {
        minted: Vec<(Address, CurrencyId, u128)>,
    }

    impl AssetLedger for MintLog {
        fn mint_fungible(&mut self, to: Address, currency: CurrencyId, amount: u128) -> Result<()> {
            self.minted.push((to, currency, amount));
            Ok(())
        }
        fn burn_fungible(&mut self, _: Address, _: CurrencyId, _: u128) -> Result<()> {
            unimplemented!()
        }
        fn transfer_fungible(&mut self, _: Address, _: Address, _: CurrencyId, _: u128) -> Result<()> {
            unimplemented!()
        }
        fn mint_pool_token(&mut self, _: Address, _: PoolId, _: u64) -> Result<()> {
            unimplemented!()
        }
        fn burn_pool_token(&mut self, _: Address, _: PoolId, _: u64) -> Result<()> {
            unimplemented!()
        }
        fn transfer_nft(&mut self, _: Address, _: Address, _: TokenId) -> Result<()> {
            unimplemented!()
        }
        fn mint_nft(&mut self, _: Address, _: TokenId) -> Result<()> {
            unimplemented!()
        }
        fn burn_nft(&mut self, _: Address, _: TokenId) -> Result<()> {
            unimplemented!()
        }
        fn owner_of(&self, _: TokenId) -> Result<Address> {
            unimplemented!()
        }
        fn balance_of(&self, _: Address, _: CurrencyId) -> u128 {
            0
        }
        fn pool_balance_of(&self, _: Address, _: PoolId) -> u64 {
            0
        }
        fn nft_count(&self, _: Address) -> u64 {
            0
        }
    }

    fn accountant(pool_a: u64, pool_b: u64) -> WaveAccountant {
        let mut acc = WaveAccountant::new(WaveConfig {
            daily_pool_a: pool_a,
            daily_pool_b: pool_b,
            ..Default::default()
        });
        acc.initialize(T0 + 60).unwrap();
        acc
    }

    fn player(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn test_initialize_seeds_wave_one_at_midnight() {
        let acc = accountant(100, 0);
        assert_eq!(acc.current_wave(), 1);
        assert_eq!(acc.current_wave_time(), T0);
    }

    #[test]
    fn test_uninitialized_rejects_contributions() {
        let mut acc = WaveAccountant::new(WaveConfig::default());
        let mut events = EventLog::new();
        assert_eq!(
            acc.add_to_queue(player(1), 10, T0, &mut events),
            Err(CinderError::QueueUninitialized)
        );
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut acc = accountant(100, 0);
        let mut events = EventLog::new();
        assert_eq!(
            acc.add_to_queue(player(1), 0, T0, &mut events),
            Err(CinderError::ZeroAmount)
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_two_player_share_scenario() {
        let mut acc = accountant(100, 0);
        let mut events = EventLog::new();
        let a = player(1);
        let b = player(2);

        acc.add_to_queue(a, 10, T0 + 100, &mut events).unwrap();
        assert_eq!(acc.get_contribution_percentage(&a), 100);

        acc.add_to_queue(b, 10, T0 + 200, &mut events).unwrap();
        assert_eq!(acc.global_queue().quantity_of(1), 20);
        assert_eq!(acc.calculate_rewards_by_wave_id(1, &a).unwrap(), (50, 0));
        assert_eq!(acc.get_contribution_percentage(&a), 50);
        assert_eq!(acc.global_queue().len(), 1);
        assert_eq!(acc.player_queue(&a).unwrap().len(), 1);
    }

    #[test]
    fn test_same_wave_contributions_update_in_place() {
        let mut acc = accountant(100, 0);
        let mut events = EventLog::new();
        let a = player(1);
        acc.add_to_queue(a, 3, T0 + 1, &mut events).unwrap();
        acc.add_to_queue(a, 4, T0 + 2, &mut events).unwrap();
        let queue = acc.player_queue(&a).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.quantity_of(1), 7);
    }

    #[test]
    fn test_claim_excludes_open_wave() {
        let mut acc = accountant(100, 10);
        let mut ledger = MintLog::default();
        let mut events = EventLog::new();
        let a = player(1);

        acc.add_to_queue(a, 10, T0 + 1, &mut events).unwrap();
        let claimed = acc.claim_rewards(a, T0 + 2, &mut ledger, &mut events).unwrap();
        assert_eq!(claimed, (0, 0));
        assert!(ledger.minted.is_empty());

        let claimed = acc
            .claim_rewards(a, T0 + SECONDS_PER_DAY + 5, &mut ledger, &mut events)
            .unwrap();
        assert_eq!(claimed, (100, 10));
        assert_eq!(ledger.minted, vec![(a, 1, 100), (a, 2, 10)]);
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::WaveRollover { new_wave_id: 2, .. })));
    }

    #[test]
    fn test_repeat_claim_pays_nothing() {
        let mut acc = accountant(100, 0);
        let mut ledger = MintLog::default();
        let mut events = EventLog::new();
        let a = player(1);
        let b = player(2);
        acc.add_to_queue(a, 1, T0 + 1, &mut events).unwrap();
        acc.add_to_queue(b, 2, T0 + 1, &mut events).unwrap();

        let now = T0 + SECONDS_PER_DAY;
        assert_eq!(acc.claim_rewards(a, now, &mut ledger, &mut events).unwrap(), (33, 0));
        assert_eq!(acc.claim_rewards(a, now, &mut ledger, &mut events).unwrap(), (0, 0));
        assert_eq!(acc.claim_rewards(b, now, &mut ledger, &mut events).unwrap(), (66, 0));
        assert_eq!(acc.global_queue().get(1).unwrap().unclaimed_a, 1);
    }

    #[test]
    fn test_aged_out_remainder_carries_forward() {
        let mut acc = accountant(100, 0);
        let mut events = EventLog::new();
        let a = player(1);
        acc.add_to_queue(a, 5, T0 + 1, &mut events).unwrap();

        // Wave 8 opens: wave 1 falls out of the 7-wave window unclaimed.
        let now = T0 + 7 * SECONDS_PER_DAY + 10;
        acc.add_to_queue(a, 5, now, &mut events).unwrap();
        assert_eq!(acc.current_wave(), 8);
        assert!(!acc.global_queue().key_exists(1));
        let wave8 = acc.global_queue().get(8).unwrap();
        assert_eq!(wave8.pool_a, 200);
        assert_eq!(wave8.unclaimed_a, 200);
        assert_eq!(acc.carried_over(), (0, 0));
    }

    #[test]
    fn test_explicit_rollover_ages_out_before_contribution() {
        let mut acc = accountant(100, 0);
        let mut events = EventLog::new();
        let a = player(1);
        acc.add_to_queue(a, 5, T0 + 1, &mut events).unwrap();

        let now = T0 + 7 * SECONDS_PER_DAY + 10;
        assert_eq!(acc.begin_new_wave(now, &mut events).unwrap(), Some(8));
        assert!(!acc.global_queue().key_exists(1));
        assert_eq!(acc.carried_over(), (100, 0));

        acc.add_to_queue(a, 5, now, &mut events).unwrap();
        assert_eq!(acc.global_queue().iter().map(|e| e.key).collect::<Vec<_>>(), vec![8]);
        assert_eq!(acc.global_queue().get(8).unwrap().pool_a, 200);
        assert_eq!(acc.carried_over(), (0, 0));
    }

    #[test]
    fn test_explicit_rollover_keeps_last_wave_of_window() {
        let mut acc = accountant(100, 0);
        let mut ledger = MintLog::default();
        let mut events = EventLog::new();
        let a = player(1);
        acc.add_to_queue(a, 5, T0 + 1, &mut events).unwrap();

        // wave 7: wave 1 sits at current - 6 and is still claimable
        acc.begin_new_wave(T0 + 6 * SECONDS_PER_DAY, &mut events).unwrap();
        assert_eq!(acc.current_wave(), 7);
        assert!(acc.global_queue().key_exists(1));
        assert_eq!(acc.carried_over(), (0, 0));
        assert_eq!(acc.pending_rewards(&a).unwrap(), (100, 0));

        // wave 8: wave 1 sits at current - 7 and has aged out
        acc.begin_new_wave(T0 + 7 * SECONDS_PER_DAY, &mut events).unwrap();
        assert!(!acc.global_queue().key_exists(1));
        assert_eq!(acc.carried_over(), (100, 0));
        let claimed = acc
            .claim_rewards(a, T0 + 7 * SECONDS_PER_DAY + 1, &mut ledger, &mut events)
            .unwrap();
        assert_eq!(claimed, (0, 0));
        assert!(ledger.minted.is_empty());
    }

    #[test]
    fn test_player_queue_pruned_after_claim() {
        let mut acc = accountant(100, 0);
        let mut ledger = MintLog::default();
        let mut events = EventLog::new();
        let a = player(1);
        acc.add_to_queue(a, 5, T0 + 1, &mut events).unwrap();
        acc.add_to_queue(a, 5, T0 + 2 * SECONDS_PER_DAY, &mut events).unwrap();
        assert_eq!(acc.player_queue(&a).unwrap().len(), 2);

        let claimed = acc
            .claim_rewards(a, T0 + 8 * SECONDS_PER_DAY, &mut ledger, &mut events)
            .unwrap();
        // Wave 1 is out of the window, wave 3 is claimable.
        assert_eq!(claimed, (100, 0));
        let queue = acc.player_queue(&a).unwrap();
        assert!(!queue.key_exists(1));
        assert!(queue.key_exists(3));
    }

    #[test]
    fn test_pending_rewards_matches_claim() {
        let mut acc = accountant(90, 9);
        let mut ledger = MintLog::default();
        let mut events = EventLog::new();
        let a = player(1);
        acc.add_to_queue(a, 1, T0 + 1, &mut events).unwrap();
        acc.add_to_queue(player(2), 2, T0 + 1, &mut events).unwrap();
        acc.begin_new_wave(T0 + SECONDS_PER_DAY, &mut events).unwrap();

        let pending = acc.pending_rewards(&a).unwrap();
        let claimed = acc
            .claim_rewards(a, T0 + SECONDS_PER_DAY, &mut ledger, &mut events)
            .unwrap();
        assert_eq!(pending, claimed);
        assert_eq!(claimed, (30, 3));
    }

    #[test]
    fn test_contribution_percentage_without_activity() {
        let acc = accountant(100, 0);
        assert_eq!(acc.get_contribution_percentage(&player(1)), 0);
    }

    proptest! {
        #[test]
        fn prop_claims_never_over_distribute(
            quantities in proptest::collection::vec(1u64..10_000, 1..20),
            pool in 0u64..1_000_000_000,
        ) {
            let mut acc = accountant(pool, pool / 3);
            let mut ledger = MintLog::default();
            let mut events = EventLog::new();
            for (i, qty) in quantities.iter().enumerate() {
                acc.add_to_queue(player(i as u64 + 1), *qty, T0 + 1, &mut events).unwrap();
            }
            let global: u128 = quantities.iter().map(|q| *q as u128).sum();
            let now = T0 + SECONDS_PER_DAY;
            let mut paid_a = 0u128;
            let mut paid_b = 0u128;
            for i in 0..quantities.len() {
                let (a, b) = acc.claim_rewards(player(i as u64 + 1), now, &mut ledger, &mut events).unwrap();
                paid_a += a;
                paid_b += b;
            }
            let pool = u128::from(pool);
            prop_assert!(paid_a <= pool);
            prop_assert!(paid_b <= pool / 3);
            let exact = quantities.iter().all(|q| (pool * *q as u128) % global == 0);
            if exact {
                prop_assert_eq!(paid_a, pool);
            }
            let wave = acc.global_queue().get(1).unwrap();
            prop_assert_eq!(wave.unclaimed_a, pool - paid_a);
        }
    }
}
