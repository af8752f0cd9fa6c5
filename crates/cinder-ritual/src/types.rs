//! Ritual data model

use cinder_core::error::{CinderError, Result};
use cinder_core::types::{Address, Constraint, PoolId, RequestToken, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

/// Ledger asset class a component refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// `asset_id` is the currency id
    Fungible,
    /// `pool_id` names the pool
    PoolToken,
}

/// An amount of one asset, used for costs and products
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub asset_type: AssetType,
    #[serde(default)]
    pub pool_id: PoolId,
    #[serde(default)]
    pub asset_id: u64,
    pub amount: u128,
}

impl Component {
    pub fn fungible(currency: u64, amount: u128) -> Self {
        Self {
            asset_type: AssetType::Fungible,
            pool_id: 0,
            asset_id: currency,
            amount,
        }
    }

    pub fn pool_token(pool_id: PoolId, amount: u128) -> Self {
        Self {
            asset_type: AssetType::PoolToken,
            pool_id,
            asset_id: 0,
            amount,
        }
    }

    /// Identity used when affixes match components
    pub fn key(&self) -> (AssetType, PoolId, u64) {
        (self.asset_type, self.pool_id, self.asset_id)
    }

    pub fn same_asset(&self, other: &Component) -> bool {
        self.key() == other.key()
    }

    /// Amount as a pool-token quantity
    pub fn pool_amount(&self) -> Result<u64> {
        u64::try_from(self.amount).map_err(|_| CinderError::Overflow("pool token amount"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charges {
    Limited(u32),
    Unlimited,
}

impl Default for Charges {
    fn default() -> Self {
        Self::Limited(1)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualTemplate {
    pub rarity: u8,
    pub charges: Charges,
    #[serde(default)]
    pub soulbound: bool,
    #[serde(default)]
    pub affix_bucket_ids: Vec<u64>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    pub costs: Vec<Component>,
    pub products: Vec<Component>,
}

/// What an affix does to a template
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffixEffect {
    None,
    Cost(Component),
    Product(Component),
    Charges(Charges),
    Constraint(Constraint),
    Soulbound,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affix {
    pub effect: AffixEffect,
    pub is_positive: bool,
    pub weight: u64,
}

/// Weighted set of template ids
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePool {
    pub template_ids: Vec<u64>,
    pub weights: Vec<u64>,
    pub sum_weight: u64,
}

/// Ritual creation waiting for its random value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRitualRequest {
    pub request_token: RequestToken,
    pub requester: Address,
    pub pool_id: u64,
    pub requested_at: Timestamp,
    pub paid_costs: Vec<Component>,
}

/// A minted ritual
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ritual {
    pub id: TokenId,
    pub template_id: u64,
    /// Template after every selected affix was applied
    pub resolved: RitualTemplate,
    pub charges_remaining: Charges,
    pub applied_affix_ids: Vec<u64>,
}

/// Constraints and costs applied when any ritual creation starts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationConfig {
    pub constraints: Vec<Constraint>,
    pub costs: Vec<Component>,
}
