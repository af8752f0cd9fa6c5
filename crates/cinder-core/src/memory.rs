//! In-memory collaborators
//!
//! Process-local implementations of the collaborator traits. The node keeps
//! them inside its transactional world state; tests use them directly.

use crate::collaborators::{AssetLedger, AttributeProvider, RandomnessProvider};
use crate::error::{CinderError, Result};
use crate::types::{
    Address, ClassRarityStat, CurrencyId, PoolId, RequestToken, StatSelector, TokenId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Balances and NFT ownership held in maps
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    fungible: HashMap<(Address, CurrencyId), u128>,
    pools: HashMap<(Address, PoolId), u64>,
    nft_owners: BTreeMap<TokenId, Address>,
    nft_counts: HashMap<Address, u64>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total supply of a fungible currency across all holders
    pub fn total_supply(&self, currency: CurrencyId) -> u128 {
        self.fungible
            .iter()
            .filter(|((_, c), _)| *c == currency)
            .map(|(_, amount)| *amount)
            .sum()
    }

    /// Every NFT held by `owner`, in id order
    pub fn tokens_of(&self, owner: Address) -> Vec<TokenId> {
        self.nft_owners
            .iter()
            .filter(|(_, o)| **o == owner)
            .map(|(id, _)| *id)
            .collect()
    }

    fn set_nft_owner(&mut self, token_id: TokenId, owner: Option<Address>) {
        if let Some(previous) = self.nft_owners.remove(&token_id) {
            if let Some(count) = self.nft_counts.get_mut(&previous) {
                *count = count.saturating_sub(1);
            }
        }
        if let Some(owner) = owner {
            self.nft_owners.insert(token_id, owner);
            *self.nft_counts.entry(owner).or_insert(0) += 1;
        }
    }
}

impl AssetLedger for MemoryLedger {
    fn mint_fungible(&mut self, to: Address, currency: CurrencyId, amount: u128) -> Result<()> {
        if to.is_zero() {
            return Err(CinderError::ZeroAddress);
        }
        let balance = self.fungible.entry((to, currency)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(CinderError::Overflow("fungible balance"))?;
        Ok(())
    }

    fn burn_fungible(&mut self, from: Address, currency: CurrencyId, amount: u128) -> Result<()> {
        let balance = self.fungible.entry((from, currency)).or_insert(0);
        if *balance < amount {
            return Err(CinderError::Ledger(format!(
                "insufficient balance of currency {currency}: have {}, need {amount}",
                balance
            )));
        }
        *balance -= amount;
        Ok(())
    }

    fn transfer_fungible(
        &mut self,
        from: Address,
        to: Address,
        currency: CurrencyId,
        amount: u128,
    ) -> Result<()> {
        self.burn_fungible(from, currency, amount)?;
        self.mint_fungible(to, currency, amount)
    }

    fn mint_pool_token(&mut self, to: Address, pool: PoolId, amount: u64) -> Result<()> {
        if to.is_zero() {
            return Err(CinderError::ZeroAddress);
        }
        let balance = self.pools.entry((to, pool)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(CinderError::Overflow("pool balance"))?;
        Ok(())
    }

    fn burn_pool_token(&mut self, from: Address, pool: PoolId, amount: u64) -> Result<()> {
        let balance = self.pools.entry((from, pool)).or_insert(0);
        if *balance < amount {
            return Err(CinderError::Ledger(format!(
                "insufficient balance of pool {pool}: have {}, need {amount}",
                balance
            )));
        }
        *balance -= amount;
        Ok(())
    }

    fn transfer_nft(&mut self, from: Address, to: Address, token_id: TokenId) -> Result<()> {
        if to.is_zero() {
            return Err(CinderError::ZeroAddress);
        }
        if self.owner_of(token_id)? != from {
            return Err(CinderError::NotOwner {
                caller: from,
                token_id,
            });
        }
        self.set_nft_owner(token_id, Some(to));
        Ok(())
    }

    fn mint_nft(&mut self, to: Address, token_id: TokenId) -> Result<()> {
        if to.is_zero() {
            return Err(CinderError::ZeroAddress);
        }
        if self.nft_owners.contains_key(&token_id) {
            return Err(CinderError::Ledger(format!("token {token_id} already exists")));
        }
        self.set_nft_owner(token_id, Some(to));
        Ok(())
    }

    fn burn_nft(&mut self, from: Address, token_id: TokenId) -> Result<()> {
        if self.owner_of(token_id)? != from {
            return Err(CinderError::NotOwner {
                caller: from,
                token_id,
            });
        }
        self.set_nft_owner(token_id, None);
        Ok(())
    }

    fn owner_of(&self, token_id: TokenId) -> Result<Address> {
        self.nft_owners
            .get(&token_id)
            .copied()
            .ok_or_else(|| CinderError::Ledger(format!("unknown token {token_id}")))
    }

    fn balance_of(&self, owner: Address, currency: CurrencyId) -> u128 {
        self.fungible.get(&(owner, currency)).copied().unwrap_or(0)
    }

    fn pool_balance_of(&self, owner: Address, pool: PoolId) -> u64 {
        self.pools.get(&(owner, pool)).copied().unwrap_or(0)
    }

    fn nft_count(&self, owner: Address) -> u64 {
        self.nft_counts.get(&owner).copied().unwrap_or(0)
    }
}

/// Stats, class and rarity of one asset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAttributes {
    pub stats: [u64; 5],
    pub class: u8,
    pub rarity: u8,
}

/// Attribute provider backed by a table
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StaticAttributes {
    assets: HashMap<TokenId, AssetAttributes>,
}

impl StaticAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token_id: TokenId, attributes: AssetAttributes) {
        self.assets.insert(token_id, attributes);
    }

    fn lookup(&self, token_id: TokenId) -> Result<&AssetAttributes> {
        self.assets
            .get(&token_id)
            .ok_or_else(|| CinderError::Attributes(format!("no attributes for token {token_id}")))
    }
}

impl AttributeProvider for StaticAttributes {
    fn stats(&self, token_id: TokenId) -> Result<[u64; 5]> {
        Ok(self.lookup(token_id)?.stats)
    }

    fn class_rarity_and_stat(
        &self,
        token_id: TokenId,
        stat: StatSelector,
    ) -> Result<ClassRarityStat> {
        let attrs = self.lookup(token_id)?;
        Ok(ClassRarityStat {
            class: attrs.class,
            rarity: attrs.rarity,
            stat_value: attrs.stats[stat.index()],
        })
    }
}

/// Randomness provider that hands out increasing request tokens
///
/// Values are delivered out of band through the callback entry point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialRandomness {
    next_token: RequestToken,
}

impl SequentialRandomness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens issued so far
    pub fn issued(&self) -> u64 {
        self.next_token
    }
}

impl RandomnessProvider for SequentialRandomness {
    fn request_randomness(&mut self) -> Result<RequestToken> {
        self.next_token = self
            .next_token
            .checked_add(1)
            .ok_or(CinderError::Overflow("request token"))?;
        Ok(self.next_token)
    }
}
