//! # Cinder Node
//!
//! Transactional front door to the game core.
//!
//! ```text
//!   call ──► write lock ──► clone World ──► run op on draft ──┬─ Ok  ──► commit draft, append events to journal
//!                                                           └─ Err ──► drop draft and buffered events
//! ```
//!
//! The randomness callback (`fulfill_randomness`) is a separate entry point;
//! any other call may run between a ritual request and its fulfilment.

use crate::config::CinderConfig;
use crate::error::NodeResult;
use crate::world::World;
use cinder_core::collaborators::{AssetLedger, BalanceConstraints, ConstraintChecker};
use cinder_core::error::Result;
use cinder_core::events::{Event, EventLog};
use cinder_core::memory::AssetAttributes;
use cinder_core::types::{
    Address, Constraint, CurrencyId, RandomValue, RequestToken, Timestamp, TokenId, WaveId,
};
use cinder_farming::FarmingProduct;
use cinder_ritual::{Affix, Component, RitualTemplate};
use parking_lot::RwLock;
use tracing::{debug, error, info};

pub struct Node {
    config: CinderConfig,
    world: RwLock<World>,
    journal: RwLock<Vec<Event>>,
}

impl Node {
    pub fn new(config: CinderConfig) -> NodeResult<Self> {
        config.validate()?;
        let world = World::new(&config)?;
        info!("Cinder node created");
        Ok(Self {
            config,
            world: RwLock::new(world),
            journal: RwLock::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &CinderConfig {
        &self.config
    }

    /// Run `op` against a draft of the world and commit only on success
    ///
    /// The draft is a full clone of the world, ledger and player queues
    /// included, so each call costs time proportional to total state.
    fn transact<T>(
        &self,
        name: &'static str,
        op: impl FnOnce(&mut World, &mut EventLog) -> Result<T>,
    ) -> NodeResult<T> {
        let mut world = self.world.write();
        let mut draft = world.clone();
        let mut events = EventLog::new();

        match op(&mut draft, &mut events) {
            Ok(out) => {
                *world = draft;
                let count = events.len();
                self.journal.write().extend(events.drain());
                debug!(op = name, events = count, "committed");
                Ok(out)
            }
            Err(e) if e.is_fatal() => {
                error!(op = name, code = e.code(), "invariant violated: {}", e);
                Err(e.into())
            }
            Err(e) => {
                debug!(op = name, code = e.code(), "rejected: {}", e);
                Err(e.into())
            }
        }
    }

    /// Read-only view of the committed world
    pub fn read<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        f(&self.world.read())
    }

    /// Copy of the event journal
    pub fn events(&self) -> Vec<Event> {
        self.journal.read().clone()
    }

    /// Take the journal, leaving it empty
    pub fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.journal.write())
    }

    /// The journal as a JSON array
    pub fn events_json(&self) -> NodeResult<String> {
        Ok(serde_json::to_string_pretty(&*self.journal.read())?)
    }

    pub fn journal_len(&self) -> usize {
        self.journal.read().len()
    }

    // === Snapshots ===

    /// Serialize the committed world
    pub fn snapshot(&self) -> NodeResult<Vec<u8>> {
        Ok(bincode::serialize(&*self.world.read())?)
    }

    /// Rebuild a node from a snapshot; the journal starts empty
    pub fn restore(config: CinderConfig, bytes: &[u8]) -> NodeResult<Self> {
        config.validate()?;
        let world: World = bincode::deserialize(bytes)?;
        info!("Cinder node restored from {} byte snapshot", bytes.len());
        Ok(Self {
            config,
            world: RwLock::new(world),
            journal: RwLock::new(Vec::new()),
        })
    }

    // === Setup ===

    /// Mint a stakeable asset and record its attributes
    pub fn mint_asset(&self, owner: Address, token_id: TokenId, attributes: AssetAttributes) -> NodeResult<()> {
        self.transact("mint_asset", |w, _| {
            w.ledger.mint_nft(owner, token_id)?;
            w.attributes.insert(token_id, attributes);
            Ok(())
        })
    }

    pub fn mint_currency(&self, owner: Address, currency: CurrencyId, amount: u128) -> NodeResult<()> {
        self.transact("mint_currency", |w, _| w.ledger.mint_fungible(owner, currency, amount))
    }

    // === Waves ===

    pub fn initialize(&self, now: Timestamp) -> NodeResult<WaveId> {
        self.transact("initialize", |w, _| w.waves.initialize(now))
    }

    pub fn begin_new_wave(&self, now: Timestamp) -> NodeResult<Option<WaveId>> {
        self.transact("begin_new_wave", |w, events| w.waves.begin_new_wave(now, events))
    }

    pub fn add_to_queue(&self, player: Address, quantity: u64, now: Timestamp) -> NodeResult<()> {
        self.transact("add_to_queue", |w, events| {
            w.waves.add_to_queue(player, quantity, now, events)
        })
    }

    pub fn claim_rewards(&self, player: Address, now: Timestamp) -> NodeResult<(u128, u128)> {
        self.transact("claim_rewards", |w, events| {
            w.waves.claim_rewards(player, now, &mut w.ledger, events)
        })
    }

    pub fn set_daily_pools(&self, pool_a: u64, pool_b: u64) -> NodeResult<()> {
        self.transact("set_daily_pools", |w, _| {
            w.waves.set_daily_pools(pool_a, pool_b);
            Ok(())
        })
    }

    pub fn calculate_rewards_by_wave_id(&self, wave_id: WaveId, player: Address) -> NodeResult<(u128, u128)> {
        Ok(self.read(|w| w.waves.calculate_rewards_by_wave_id(wave_id, &player))?)
    }

    pub fn get_contribution_percentage(&self, player: Address) -> u64 {
        self.read(|w| w.waves.get_contribution_percentage(&player))
    }

    pub fn pending_rewards(&self, player: Address) -> NodeResult<(u128, u128)> {
        Ok(self.read(|w| w.waves.pending_rewards(&player))?)
    }

    // === Farming ===

    pub fn register_product(&self, product: FarmingProduct) -> NodeResult<u64> {
        self.transact("register_product", |w, events| {
            w.farming.products_mut().register(product, events)
        })
    }

    pub fn modify_product(&self, product_id: u64, product: FarmingProduct) -> NodeResult<()> {
        self.transact("modify_product", |w, _| {
            w.farming.products_mut().modify(product_id, product)
        })
    }

    pub fn set_product_active(&self, product_id: u64, active: bool) -> NodeResult<()> {
        self.transact("set_product_active", |w, _| {
            w.farming.products_mut().set_active(product_id, active)
        })
    }

    pub fn stake(&self, owner: Address, token_id: TokenId, product_id: u64, now: Timestamp) -> NodeResult<()> {
        self.transact("stake", |w, events| {
            w.farming
                .stake(owner, token_id, product_id, now, &mut w.ledger, events)
        })
    }

    pub fn harvest(&self, owner: Address, token_id: TokenId, now: Timestamp) -> NodeResult<u64> {
        self.transact("harvest", |w, events| {
            let (farming, mut ctx) = w.staking(events);
            farming.harvest(owner, token_id, now, &mut ctx)
        })
    }

    pub fn unstake(&self, owner: Address, token_id: TokenId, now: Timestamp) -> NodeResult<u64> {
        self.transact("unstake", |w, events| {
            let (farming, mut ctx) = w.staking(events);
            farming.unstake(owner, token_id, now, &mut ctx)
        })
    }

    pub fn force_unstake(&self, token_id: TokenId) -> NodeResult<()> {
        self.transact("force_unstake", |w, events| {
            w.farming.force_unstake(token_id, &mut w.ledger, events)
        })
    }

    pub fn change_product(
        &self,
        owner: Address,
        token_id: TokenId,
        product_id: u64,
        now: Timestamp,
    ) -> NodeResult<u64> {
        self.transact("change_product", |w, events| {
            let (farming, mut ctx) = w.staking(events);
            farming.change_product(owner, token_id, product_id, now, &mut ctx)
        })
    }

    pub fn level_up(&self, owner: Address, token_id: TokenId, now: Timestamp) -> NodeResult<u32> {
        self.transact("level_up", |w, events| {
            let (farming, mut ctx) = w.staking(events);
            farming.level_up(owner, token_id, now, &mut ctx)
        })
    }

    pub fn calculate_staking_rewards(&self, token_id: TokenId, now: Timestamp) -> NodeResult<u64> {
        Ok(self.read(|w| {
            w.farming
                .calculate_staking_rewards(token_id, now, &w.attributes)
        })?)
    }

    pub fn compute_time_to_reach_cap(&self, token_id: TokenId, now: Timestamp) -> NodeResult<u64> {
        Ok(self.read(|w| {
            w.farming
                .compute_time_to_reach_cap(token_id, now, &w.attributes)
        })?)
    }

    pub fn time_until_next_husk(&self, token_id: TokenId, now: Timestamp) -> NodeResult<u64> {
        Ok(self.read(|w| w.farming.time_until_next_husk(token_id, now, &w.attributes))?)
    }

    // === Rituals ===

    pub fn create_template(&self, template: RitualTemplate) -> NodeResult<u64> {
        self.transact("create_template", |w, events| {
            w.rituals.registry_mut().create_template(template, events)
        })
    }

    pub fn create_template_pool(&self, template_ids: Vec<u64>, weights: Vec<u64>) -> NodeResult<u64> {
        self.transact("create_template_pool", |w, events| {
            w.rituals
                .registry_mut()
                .create_template_pool(template_ids, weights, events)
        })
    }

    pub fn create_affix(&self, affix: Affix) -> NodeResult<u64> {
        self.transact("create_affix", |w, events| {
            w.rituals.registry_mut().create_affix(affix, events)
        })
    }

    pub fn create_affix_bucket(&self, affix_ids: Vec<u64>) -> NodeResult<u64> {
        self.transact("create_affix_bucket", |w, events| {
            w.rituals.registry_mut().create_affix_bucket(affix_ids, events)
        })
    }

    pub fn set_creation_config(&self, constraints: Vec<Constraint>, costs: Vec<Component>) -> NodeResult<()> {
        self.transact("set_creation_config", |w, _| {
            w.rituals.set_creation_config(constraints, costs)
        })
    }

    pub fn create_ritual(&self, player: Address, pool_id: u64, now: Timestamp) -> NodeResult<RequestToken> {
        self.transact("create_ritual", |w, events| {
            let (rituals, mut ctx) = w.ritual(events);
            rituals.create_ritual(player, pool_id, now, &mut ctx)
        })
    }

    /// Randomness provider callback
    pub fn fulfill_randomness(&self, request_token: RequestToken, random: RandomValue) -> NodeResult<TokenId> {
        self.transact("fulfill_randomness", |w, events| {
            w.rituals
                .fulfill_ritual_randomness(request_token, random, &mut w.ledger, events)
        })
    }

    pub fn cancel_expired_request(&self, request_token: RequestToken, now: Timestamp) -> NodeResult<()> {
        self.transact("cancel_expired_request", |w, events| {
            w.rituals
                .cancel_expired_request(request_token, now, &mut w.ledger, events)
        })
    }

    pub fn consume_ritual(&self, player: Address, ritual_id: TokenId, now: Timestamp) -> NodeResult<Option<u32>> {
        self.transact("consume_ritual", |w, events| {
            let (rituals, mut ctx) = w.ritual(events);
            rituals.consume_ritual(player, ritual_id, now, &mut ctx)
        })
    }

    /// Consume a batch; nothing is applied unless every ritual succeeds
    pub fn consume_rituals(
        &self,
        player: Address,
        ritual_ids: &[TokenId],
        max_batch: usize,
        now: Timestamp,
    ) -> NodeResult<Vec<Option<u32>>> {
        self.transact("consume_rituals", |w, events| {
            let (rituals, mut ctx) = w.ritual(events);
            rituals.consume_rituals(player, ritual_ids, max_batch, now, &mut ctx)
        })
    }

    pub fn transfer_ritual(&self, from: Address, to: Address, ritual_id: TokenId) -> NodeResult<()> {
        self.transact("transfer_ritual", |w, _| {
            w.rituals.transfer_ritual(from, to, ritual_id, &mut w.ledger)
        })
    }

    // === Queries ===

    pub fn balance_of(&self, owner: Address, currency: CurrencyId) -> u128 {
        self.read(|w| w.ledger.balance_of(owner, currency))
    }

    pub fn pool_balance_of(&self, owner: Address, pool_id: u64) -> u64 {
        self.read(|w| w.ledger.pool_balance_of(owner, pool_id))
    }

    pub fn owner_of(&self, token_id: TokenId) -> NodeResult<Address> {
        Ok(self.read(|w| w.ledger.owner_of(token_id))?)
    }

    /// Check a constraint against the committed ledger
    pub fn check_constraint(&self, user: Address, constraint: &Constraint) -> NodeResult<bool> {
        Ok(self.read(|w| BalanceConstraints.check(user, constraint, &w.ledger))?)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("journal_len", &self.journal_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: Timestamp = 1_767_225_600;

    fn node() -> Node {
        Node::new(CinderConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = CinderConfig::default();
        config.ritual.max_batch = 0;
        assert!(Node::new(config).is_err());
    }

    #[test]
    fn test_failed_call_leaves_no_trace() {
        let node = node();
        node.initialize(T0).unwrap();
        let before = node.snapshot().unwrap();

        // the burn fails after the mint inside the same call
        let err = node
            .transact("mint_then_fail", |w, _| {
                w.ledger.mint_fungible(Address::from_low_u64(1), 1, 10)?;
                w.ledger.burn_fungible(Address::from_low_u64(1), 1, 11)
            })
            .unwrap_err();
        assert!(err.as_core().is_some());
        assert_eq!(node.snapshot().unwrap(), before);
        assert_eq!(node.balance_of(Address::from_low_u64(1), 1), 0);
    }

    #[test]
    fn test_double_initialize_is_fatal() {
        let node = node();
        node.initialize(T0).unwrap();
        let err = node.initialize(T0).unwrap_err();
        assert!(!err.is_rejection());
        assert_eq!(node.read(|w| w.waves.current_wave()), 1);
    }

    proptest! {
        /// The journal holds exactly the events of the calls that succeeded
        #[test]
        fn test_journal_counts_only_committed_calls(quantities in prop::collection::vec(0u64..5, 1..30)) {
            let node = node();
            node.initialize(T0).unwrap();
            let player = Address::from_low_u64(9);
            let mut committed = 0usize;
            for quantity in &quantities {
                if node.add_to_queue(player, *quantity, T0 + 10).is_ok() {
                    committed += 1;
                }
            }
            prop_assert_eq!(committed, quantities.iter().filter(|q| **q > 0).count());
            prop_assert_eq!(node.journal_len(), committed);
        }
    }
}
