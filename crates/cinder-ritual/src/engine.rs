//! # Ritual Engine
//!
//! Two-phase ritual creation plus consumption and transfer of minted rituals.
//!
//! ```text
//!  create_ritual ──► Requested ──fulfill_ritual_randomness──► Resolved (ritual minted)
//!                        │
//!                        └──cancel_expired_request (after timeout)──► Cancelled (costs refunded)
//! ```
//!
//! A pending request is written once by `create_ritual` and deleted once by
//! either the callback or the cancellation.

use crate::affix::apply_affixes;
use crate::registry::{validate_components, RitualRegistry};
use crate::sampling::{draw_index, Draw};
use crate::types::{
    AssetType, Charges, Component, CreationConfig, PendingRitualRequest, Ritual,
};
use cinder_core::collaborators::{
    AssetLedger, ConstraintChecker, ContributionSink, RandomnessProvider,
};
use cinder_core::error::{CinderError, Result};
use cinder_core::events::{Event, EventLog};
use cinder_core::types::{Address, Constraint, PoolId, RandomValue, RequestToken, Timestamp, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Ritual engine parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualConfig {
    /// Hard upper bound on a consumption batch
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    /// Seconds after which a pending request may be cancelled
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: i64,

    /// Pools whose minted tokens count as wave contributions
    #[serde(default)]
    pub wave_eligible_pools: Vec<PoolId>,

    /// Id given to the first minted ritual
    #[serde(default = "default_first_ritual_id")]
    pub first_ritual_id: TokenId,
}

fn default_max_batch() -> usize {
    20
}

fn default_request_timeout_secs() -> i64 {
    3_600
}

fn default_first_ritual_id() -> TokenId {
    1_000_000_000
}

impl Default for RitualConfig {
    fn default() -> Self {
        Self {
            max_batch: default_max_batch(),
            request_timeout_secs: default_request_timeout_secs(),
            wave_eligible_pools: Vec::new(),
            first_ritual_id: default_first_ritual_id(),
        }
    }
}

/// Collaborators a ritual operation may touch
pub struct RitualContext<'a> {
    pub ledger: &'a mut dyn AssetLedger,
    pub checker: &'a dyn ConstraintChecker,
    pub randomness: &'a mut dyn RandomnessProvider,
    pub sink: &'a mut dyn ContributionSink,
    pub events: &'a mut EventLog,
}

fn burn_component(ledger: &mut dyn AssetLedger, owner: Address, component: &Component) -> Result<()> {
    match component.asset_type {
        AssetType::Fungible => ledger.burn_fungible(owner, component.asset_id, component.amount),
        AssetType::PoolToken => {
            ledger.burn_pool_token(owner, component.pool_id, component.pool_amount()?)
        }
    }
}

fn mint_component(ledger: &mut dyn AssetLedger, owner: Address, component: &Component) -> Result<()> {
    match component.asset_type {
        AssetType::Fungible => ledger.mint_fungible(owner, component.asset_id, component.amount),
        AssetType::PoolToken => {
            ledger.mint_pool_token(owner, component.pool_id, component.pool_amount()?)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RitualEngine {
    config: RitualConfig,
    registry: RitualRegistry,
    creation: CreationConfig,
    pending: BTreeMap<RequestToken, PendingRitualRequest>,
    rituals: BTreeMap<TokenId, Ritual>,
    wave_eligible_pools: BTreeSet<PoolId>,
    minted: u64,
}

impl Default for RitualEngine {
    fn default() -> Self {
        Self::new(RitualConfig::default())
    }
}

impl RitualEngine {
    pub fn new(config: RitualConfig) -> Self {
        let wave_eligible_pools = config.wave_eligible_pools.iter().copied().collect();
        Self {
            config,
            registry: RitualRegistry::new(),
            creation: CreationConfig::default(),
            pending: BTreeMap::new(),
            rituals: BTreeMap::new(),
            wave_eligible_pools,
            minted: 0,
        }
    }

    pub fn config(&self) -> &RitualConfig {
        &self.config
    }

    pub fn registry(&self) -> &RitualRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RitualRegistry {
        &mut self.registry
    }

    pub fn creation_config(&self) -> &CreationConfig {
        &self.creation
    }

    pub fn set_creation_config(&mut self, constraints: Vec<Constraint>, costs: Vec<Component>) -> Result<()> {
        validate_components(&costs)?;
        self.creation = CreationConfig { constraints, costs };
        Ok(())
    }

    pub fn pending_request(&self, token: RequestToken) -> Option<&PendingRitualRequest> {
        self.pending.get(&token)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn ritual(&self, ritual_id: TokenId) -> Result<&Ritual> {
        self.rituals
            .get(&ritual_id)
            .ok_or_else(|| CinderError::invalid_id("ritual", ritual_id))
    }

    pub fn ritual_count(&self) -> usize {
        self.rituals.len()
    }

    /// Charge creation costs and request randomness for a ritual from `pool_id`
    pub fn create_ritual(
        &mut self,
        player: Address,
        pool_id: u64,
        now: Timestamp,
        ctx: &mut RitualContext<'_>,
    ) -> Result<RequestToken> {
        if player.is_zero() {
            return Err(CinderError::ZeroAddress);
        }
        self.registry.pool(pool_id)?;
        ctx.checker
            .require_all(player, &self.creation.constraints, &*ctx.ledger)?;
        for cost in &self.creation.costs {
            burn_component(ctx.ledger, player, cost)?;
        }

        let request_token = ctx.randomness.request_randomness()?;
        if self.pending.contains_key(&request_token) {
            return Err(CinderError::Randomness(format!(
                "request token {request_token} issued twice"
            )));
        }
        self.pending.insert(
            request_token,
            PendingRitualRequest {
                request_token,
                requester: player,
                pool_id,
                requested_at: now,
                paid_costs: self.creation.costs.clone(),
            },
        );
        ctx.events.emit(Event::RitualCreationBegun {
            player,
            pool_id,
            request_token,
        });
        info!("Ritual requested by {} from pool {} (token {})", player, pool_id, request_token);
        Ok(request_token)
    }

    /// Resolve a pending request with its random value and mint the ritual
    pub fn fulfill_ritual_randomness(
        &mut self,
        request_token: RequestToken,
        random: RandomValue,
        ledger: &mut dyn AssetLedger,
        events: &mut EventLog,
    ) -> Result<TokenId> {
        let request = self
            .pending
            .remove(&request_token)
            .ok_or(CinderError::UnknownRequest(request_token))?;

        let pool = self.registry.pool(request.pool_id)?;
        let template_id = pool.template_ids[draw_index(&random, Draw::Template, &pool.weights)?];
        let mut resolved = self.registry.template(template_id)?.clone();

        let mut selected = Vec::with_capacity(resolved.affix_bucket_ids.len());
        for (position, bucket_id) in resolved.affix_bucket_ids.iter().enumerate() {
            let affix_ids = self.registry.bucket(*bucket_id)?;
            let weights = affix_ids
                .iter()
                .map(|id| self.registry.affix(*id).map(|a| a.weight))
                .collect::<Result<Vec<_>>>()?;
            let affix_id = affix_ids[draw_index(&random, Draw::AffixBucket(position), &weights)?];
            selected.push((affix_id, self.registry.affix(affix_id)?.clone()));
        }

        let warnings = apply_affixes(&mut resolved, selected.iter().map(|(id, a)| (*id, a)));
        if !warnings.is_empty() {
            let message = warnings.joined();
            warn!("Affix conflicts resolving request {}: {}", request_token, message);
            events.emit(Event::AffixApplicationWarning { message });
        }

        let minted_id = self
            .config
            .first_ritual_id
            .checked_add(self.minted)
            .ok_or(CinderError::Overflow("ritual id"))?;
        ledger.mint_nft(request.requester, minted_id)?;
        self.minted += 1;

        let applied_affix_ids: Vec<u64> = selected.iter().map(|(id, _)| *id).collect();
        self.rituals.insert(
            minted_id,
            Ritual {
                id: minted_id,
                template_id,
                charges_remaining: resolved.charges,
                resolved,
                applied_affix_ids: applied_affix_ids.clone(),
            },
        );
        events.emit(Event::RitualCreationFinished {
            request_token,
            template_id,
            minted_id,
            applied_affix_ids,
            player: request.requester,
        });
        info!(
            "Ritual {} minted for {} from template {}",
            minted_id, request.requester, template_id
        );
        Ok(minted_id)
    }

    /// Drop a request whose randomness never arrived and refund its costs
    pub fn cancel_expired_request(
        &mut self,
        request_token: RequestToken,
        now: Timestamp,
        ledger: &mut dyn AssetLedger,
        events: &mut EventLog,
    ) -> Result<()> {
        let request = self
            .pending
            .get(&request_token)
            .ok_or(CinderError::UnknownRequest(request_token))?;
        let cancellable_at = request
            .requested_at
            .saturating_add(self.config.request_timeout_secs);
        if now < cancellable_at {
            return Err(CinderError::RequestNotExpired {
                token: request_token,
                cancellable_at,
            });
        }

        let request = self
            .pending
            .remove(&request_token)
            .ok_or(CinderError::UnknownRequest(request_token))?;
        for cost in &request.paid_costs {
            mint_component(ledger, request.requester, cost)?;
        }
        events.emit(Event::RitualCreationCancelled {
            request_token,
            player: request.requester,
        });
        warn!("Ritual request {} expired and was refunded", request_token);
        Ok(())
    }

    /// Use one charge of a ritual; returns the charges left (`None` when unlimited)
    pub fn consume_ritual(
        &mut self,
        player: Address,
        ritual_id: TokenId,
        now: Timestamp,
        ctx: &mut RitualContext<'_>,
    ) -> Result<Option<u32>> {
        let ritual = self.ritual(ritual_id)?;
        if ctx.ledger.owner_of(ritual_id)? != player {
            return Err(CinderError::NotOwner {
                caller: player,
                token_id: ritual_id,
            });
        }
        if ritual.charges_remaining == Charges::Limited(0) {
            return Err(CinderError::NoChargesLeft(ritual_id));
        }
        let resolved = ritual.resolved.clone();

        ctx.checker
            .require_all(player, &resolved.constraints, &*ctx.ledger)?;
        for cost in &resolved.costs {
            burn_component(ctx.ledger, player, cost)?;
        }
        for product in &resolved.products {
            mint_component(ctx.ledger, player, product)?;
            if product.asset_type == AssetType::PoolToken
                && self.wave_eligible_pools.contains(&product.pool_id)
            {
                ctx.sink
                    .add_contribution(player, product.pool_amount()?, now, ctx.events)?;
            }
        }

        let charges_left = match self.rituals.get_mut(&ritual_id) {
            Some(ritual) => match ritual.charges_remaining {
                Charges::Unlimited => None,
                Charges::Limited(n) => {
                    let left = n - 1;
                    ritual.charges_remaining = Charges::Limited(left);
                    Some(left)
                }
            },
            None => return Err(CinderError::invalid_id("ritual", ritual_id)),
        };
        if charges_left == Some(0) {
            ctx.ledger.burn_nft(player, ritual_id)?;
            self.rituals.remove(&ritual_id);
            debug!("Ritual {} spent its last charge", ritual_id);
        }

        ctx.events.emit(Event::RitualConsumed {
            player,
            ritual_id,
            charges_left,
        });
        Ok(charges_left)
    }

    /// Consume several rituals in order
    ///
    /// Fails before touching anything when the batch is empty or larger than
    /// `max_batch` or the configured limit. A failure midway leaves earlier
    /// consumptions applied to the collaborators; callers wanting
    /// all-or-nothing run the batch against a draft state.
    pub fn consume_rituals(
        &mut self,
        player: Address,
        ritual_ids: &[TokenId],
        max_batch: usize,
        now: Timestamp,
        ctx: &mut RitualContext<'_>,
    ) -> Result<Vec<Option<u32>>> {
        let limit = max_batch.min(self.config.max_batch);
        if ritual_ids.is_empty() || ritual_ids.len() > limit {
            return Err(CinderError::BatchSizeOutOfBounds {
                size: ritual_ids.len(),
                max: limit,
            });
        }
        for ritual_id in ritual_ids {
            self.ritual(*ritual_id)?;
        }

        ritual_ids
            .iter()
            .map(|ritual_id| self.consume_ritual(player, *ritual_id, now, ctx))
            .collect()
    }

    /// Transfer a ritual that is not soulbound
    pub fn transfer_ritual(
        &mut self,
        from: Address,
        to: Address,
        ritual_id: TokenId,
        ledger: &mut dyn AssetLedger,
    ) -> Result<()> {
        if self.ritual(ritual_id)?.resolved.soulbound {
            return Err(CinderError::Soulbound(ritual_id));
        }
        ledger.transfer_nft(from, to, ritual_id)?;
        debug!("Ritual {} transferred from {} to {}", ritual_id, from, to);
        Ok(())
    }
}
