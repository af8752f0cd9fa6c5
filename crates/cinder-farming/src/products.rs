//! Farming product registry

use cinder_core::error::{CinderError, Result};
use cinder_core::events::{Event, EventLog};
use cinder_core::types::{PoolId, StatSelector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// What a staked asset farms and at which rate
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmingProduct {
    pub active: bool,
    /// Pool token minted on harvest
    pub pool_id: PoolId,
    /// Hourly rate, x1000
    pub base_hourly_rate: u64,
    /// Hourly rate per stat point, x1000
    pub stat_linked_rate: u64,
    /// Accrual cap; 0 derives the cap from the asset's stats
    pub cap: u64,
    #[serde(default)]
    pub source_uri: String,
    #[serde(default)]
    pub required_class: Option<u8>,
    #[serde(default)]
    pub required_stat: Option<StatSelector>,
    #[serde(default)]
    pub bonus_from_level: bool,
    #[serde(default)]
    pub bonus_from_rarity: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductRegistry {
    products: BTreeMap<u64, FarmingProduct>,
    next_id: u64,
}

impl ProductRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(product: &FarmingProduct) -> Result<()> {
        if product.pool_id == 0 {
            return Err(CinderError::InvalidInput("product pool id must be nonzero".into()));
        }
        if product.required_stat.is_none() && product.base_hourly_rate == 0 {
            return Err(CinderError::InvalidInput(
                "product needs a base rate or a linked stat".into(),
            ));
        }
        Ok(())
    }

    /// Register a product and return its id (ids start at 1)
    pub fn register(&mut self, product: FarmingProduct, events: &mut EventLog) -> Result<u64> {
        Self::validate(&product)?;
        let product_id = self.next_id + 1;
        self.next_id = product_id;
        events.emit(Event::ProductRegistered {
            product_id,
            pool_id: product.pool_id,
        });
        info!("Registered farming product {} (pool {})", product_id, product.pool_id);
        self.products.insert(product_id, product);
        Ok(product_id)
    }

    /// Replace an inactive product's definition; it stays inactive
    pub fn modify(&mut self, product_id: u64, mut product: FarmingProduct) -> Result<()> {
        let current = self.get(product_id)?;
        if current.active {
            return Err(CinderError::ItemActive {
                entity: "product",
                id: product_id,
            });
        }
        Self::validate(&product)?;
        product.active = false;
        self.products.insert(product_id, product);
        Ok(())
    }

    pub fn set_active(&mut self, product_id: u64, active: bool) -> Result<()> {
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or_else(|| CinderError::invalid_id("product", product_id))?;
        product.active = active;
        Ok(())
    }

    pub fn get(&self, product_id: u64) -> Result<&FarmingProduct> {
        self.products
            .get(&product_id)
            .ok_or_else(|| CinderError::invalid_id("product", product_id))
    }

    /// Like [`get`](Self::get), but also fails for inactive products
    pub fn get_active(&self, product_id: u64) -> Result<&FarmingProduct> {
        let product = self.get(product_id)?;
        if !product.active {
            return Err(CinderError::ItemInactive {
                entity: "product",
                id: product_id,
            });
        }
        Ok(product)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &FarmingProduct)> {
        self.products.iter().map(|(id, p)| (*id, p))
    }
}
