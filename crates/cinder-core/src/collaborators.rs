//! Collaborator traits
//!
//! The core never owns assets, attributes or entropy. It talks to them
//! through these traits; `cinder-node` ships in-memory implementations.

use crate::error::{CinderError, Result};
use crate::events::EventLog;
use crate::types::{
    Address, ClassRarityStat, Constraint, ConstraintKind, CurrencyId, PoolId, RequestToken, StatSelector,
    Timestamp, TokenId,
};

/// Custody and balances of every asset kind
pub trait AssetLedger {
    fn mint_fungible(&mut self, to: Address, currency: CurrencyId, amount: u128) -> Result<()>;

    fn burn_fungible(&mut self, from: Address, currency: CurrencyId, amount: u128) -> Result<()>;

    fn transfer_fungible(
        &mut self,
        from: Address,
        to: Address,
        currency: CurrencyId,
        amount: u128,
    ) -> Result<()>;

    fn mint_pool_token(&mut self, to: Address, pool: PoolId, amount: u64) -> Result<()>;

    fn burn_pool_token(&mut self, from: Address, pool: PoolId, amount: u64) -> Result<()>;

    fn transfer_nft(&mut self, from: Address, to: Address, token_id: TokenId) -> Result<()>;

    /// Mint a new non-fungible asset with a caller-chosen id
    fn mint_nft(&mut self, to: Address, token_id: TokenId) -> Result<()>;

    fn burn_nft(&mut self, from: Address, token_id: TokenId) -> Result<()>;

    fn owner_of(&self, token_id: TokenId) -> Result<Address>;

    fn balance_of(&self, owner: Address, currency: CurrencyId) -> u128;

    fn pool_balance_of(&self, owner: Address, pool: PoolId) -> u64;

    /// Number of non-fungible assets held by `owner`
    fn nft_count(&self, owner: Address) -> u64;
}

/// Source of per-asset stats, class and rarity
pub trait AttributeProvider {
    /// The five numeric stats, ordered as [`StatSelector::ALL`]
    fn stats(&self, token_id: TokenId) -> Result<[u64; 5]>;

    fn class_rarity_and_stat(
        &self,
        token_id: TokenId,
        stat: StatSelector,
    ) -> Result<ClassRarityStat>;
}

/// Asynchronous randomness; the value arrives later through the node's callback entry point
pub trait RandomnessProvider {
    fn request_randomness(&mut self) -> Result<RequestToken>;
}

/// Evaluates opaque constraints against user state
pub trait ConstraintChecker {
    fn check(&self, user: Address, constraint: &Constraint, ledger: &dyn AssetLedger) -> Result<bool>;

    /// Fail with `ConstraintFailed` on the first constraint that does not hold
    fn require_all(
        &self,
        user: Address,
        constraints: &[Constraint],
        ledger: &dyn AssetLedger,
    ) -> Result<()> {
        for constraint in constraints {
            if !self.check(user, constraint, ledger)? {
                return Err(CinderError::ConstraintFailed(constraint.to_string()));
            }
        }
        Ok(())
    }
}

/// Checker that evaluates every constraint kind against ledger balances
#[derive(Clone, Copy, Debug, Default)]
pub struct BalanceConstraints;

impl ConstraintChecker for BalanceConstraints {
    fn check(&self, user: Address, constraint: &Constraint, ledger: &dyn AssetLedger) -> Result<bool> {
        let actual = match constraint.kind {
            ConstraintKind::FungibleBalance { currency } => {
                let balance = ledger.balance_of(user, currency);
                u64::try_from(balance).unwrap_or(u64::MAX)
            }
            ConstraintKind::PoolBalance { pool } => ledger.pool_balance_of(user, pool),
            ConstraintKind::NftCount => ledger.nft_count(user),
        };
        Ok(constraint.comparison.holds(actual, constraint.value))
    }
}

/// Receiver of wave-eligible contributions
pub trait ContributionSink {
    fn add_contribution(
        &mut self,
        player: Address,
        quantity: u64,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<()>;
}

/// Sink that drops every contribution (for callers without a wave accountant)
#[derive(Clone, Copy, Debug, Default)]
pub struct NoContributions;

impl ContributionSink for NoContributions {
    fn add_contribution(
        &mut self,
        _player: Address,
        _quantity: u64,
        _now: Timestamp,
        _events: &mut EventLog,
    ) -> Result<()> {
        Ok(())
    }
}
