//! Template, pool, affix and bucket registry
//!
//! Append-only. Every creating call allocates exactly one id from its own
//! counter, starting at 1.

use crate::types::{Affix, AffixEffect, Charges, Component, RitualTemplate, TemplatePool};
use cinder_core::error::{CinderError, Result};
use cinder_core::events::{Event, EventLog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RitualRegistry {
    templates: BTreeMap<u64, RitualTemplate>,
    pools: BTreeMap<u64, TemplatePool>,
    affixes: BTreeMap<u64, Affix>,
    buckets: BTreeMap<u64, Vec<u64>>,
    template_count: u64,
    pool_count: u64,
    affix_count: u64,
    bucket_count: u64,
}

pub(crate) fn validate_components(components: &[Component]) -> Result<()> {
    if components.iter().any(|c| c.amount == 0) {
        return Err(CinderError::ZeroAmount);
    }
    Ok(())
}

fn sum_weights(weights: impl IntoIterator<Item = u64>) -> Result<u64> {
    let sum = weights
        .into_iter()
        .try_fold(0u64, |acc, w| acc.checked_add(w))
        .ok_or(CinderError::Overflow("weight sum"))?;
    if sum == 0 {
        return Err(CinderError::ZeroWeight);
    }
    Ok(sum)
}

impl RitualRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_template(&mut self, template: RitualTemplate, events: &mut EventLog) -> Result<u64> {
        if template.costs.is_empty() {
            return Err(CinderError::InvalidTemplate("template has no costs".into()));
        }
        if template.products.is_empty() {
            return Err(CinderError::InvalidTemplate("template has no products".into()));
        }
        if template.charges == Charges::Limited(0) {
            return Err(CinderError::InvalidTemplate("template has zero charges".into()));
        }
        validate_components(&template.costs)?;
        validate_components(&template.products)?;
        for bucket_id in &template.affix_bucket_ids {
            self.bucket(*bucket_id)?;
        }

        self.template_count += 1;
        let id = self.template_count;
        self.templates.insert(id, template);
        events.emit(Event::TemplateCreated { id });
        info!("Ritual template {} created", id);
        Ok(id)
    }

    pub fn create_template_pool(
        &mut self,
        template_ids: Vec<u64>,
        weights: Vec<u64>,
        events: &mut EventLog,
    ) -> Result<u64> {
        if template_ids.len() != weights.len() {
            return Err(CinderError::LengthMismatch {
                left: template_ids.len(),
                right: weights.len(),
            });
        }
        for template_id in &template_ids {
            self.template(*template_id)?;
        }
        let sum_weight = sum_weights(weights.iter().copied())?;

        self.pool_count += 1;
        let id = self.pool_count;
        self.pools.insert(
            id,
            TemplatePool {
                template_ids,
                weights,
                sum_weight,
            },
        );
        events.emit(Event::TemplatePoolCreated { id });
        info!("Template pool {} created (total weight {})", id, sum_weight);
        Ok(id)
    }

    pub fn create_affix(&mut self, affix: Affix, events: &mut EventLog) -> Result<u64> {
        match &affix.effect {
            AffixEffect::Cost(c) | AffixEffect::Product(c) => validate_components(std::slice::from_ref(c))?,
            AffixEffect::Charges(Charges::Limited(0)) => return Err(CinderError::ZeroAmount),
            _ => {}
        }

        self.affix_count += 1;
        let id = self.affix_count;
        self.affixes.insert(id, affix);
        events.emit(Event::AffixCreated { id });
        Ok(id)
    }

    pub fn create_affix_bucket(&mut self, affix_ids: Vec<u64>, events: &mut EventLog) -> Result<u64> {
        let mut weights = Vec::with_capacity(affix_ids.len());
        for affix_id in &affix_ids {
            weights.push(self.affix(*affix_id)?.weight);
        }
        sum_weights(weights)?;

        self.bucket_count += 1;
        let id = self.bucket_count;
        self.buckets.insert(id, affix_ids);
        events.emit(Event::AffixBucketCreated { id });
        Ok(id)
    }

    pub fn template(&self, id: u64) -> Result<&RitualTemplate> {
        self.templates
            .get(&id)
            .ok_or_else(|| CinderError::invalid_id("template", id))
    }

    pub fn pool(&self, id: u64) -> Result<&TemplatePool> {
        self.pools.get(&id).ok_or(CinderError::UnknownPool(id))
    }

    pub fn affix(&self, id: u64) -> Result<&Affix> {
        self.affixes
            .get(&id)
            .ok_or_else(|| CinderError::invalid_id("affix", id))
    }

    pub fn bucket(&self, id: u64) -> Result<&[u64]> {
        self.buckets
            .get(&id)
            .map(Vec::as_slice)
            .ok_or_else(|| CinderError::invalid_id("affix bucket", id))
    }

    pub fn template_count(&self) -> u64 {
        self.template_count
    }

    pub fn pool_count(&self) -> u64 {
        self.pool_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> RitualTemplate {
        RitualTemplate {
            rarity: 1,
            charges: Charges::Limited(2),
            costs: vec![Component::fungible(1, 10)],
            products: vec![Component::pool_token(4, 1)],
            ..Default::default()
        }
    }

    fn affix(weight: u64) -> Affix {
        Affix {
            effect: AffixEffect::None,
            is_positive: true,
            weight,
        }
    }

    #[test]
    fn test_ids_are_sequential_per_kind() {
        let mut registry = RitualRegistry::new();
        let mut events = EventLog::new();
        assert_eq!(registry.create_template(template(), &mut events).unwrap(), 1);
        assert_eq!(registry.create_template(template(), &mut events).unwrap(), 2);
        assert_eq!(registry.create_affix(affix(1), &mut events).unwrap(), 1);
        assert_eq!(registry.create_affix_bucket(vec![1], &mut events).unwrap(), 1);
        assert_eq!(
            registry
                .create_template_pool(vec![1, 2], vec![1, 3], &mut events)
                .unwrap(),
            1
        );
        assert_eq!(registry.pool(1).unwrap().sum_weight, 4);
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_failed_creation_does_not_consume_id() {
        let mut registry = RitualRegistry::new();
        let mut events = EventLog::new();
        let no_products = RitualTemplate {
            products: Vec::new(),
            ..template()
        };
        assert!(matches!(
            registry.create_template(no_products, &mut events),
            Err(CinderError::InvalidTemplate(_))
        ));
        assert_eq!(registry.create_template(template(), &mut events).unwrap(), 1);
    }

    #[test]
    fn test_template_validation() {
        let mut registry = RitualRegistry::new();
        let mut events = EventLog::new();
        let unknown_bucket = RitualTemplate {
            affix_bucket_ids: vec![9],
            ..template()
        };
        assert_eq!(
            registry.create_template(unknown_bucket, &mut events).unwrap_err(),
            CinderError::invalid_id("affix bucket", 9)
        );
        let free = RitualTemplate {
            costs: vec![Component::fungible(1, 0)],
            ..template()
        };
        assert_eq!(
            registry.create_template(free, &mut events).unwrap_err(),
            CinderError::ZeroAmount
        );
    }

    #[test]
    fn test_pool_validation() {
        let mut registry = RitualRegistry::new();
        let mut events = EventLog::new();
        registry.create_template(template(), &mut events).unwrap();
        assert_eq!(
            registry
                .create_template_pool(vec![1], vec![1, 2], &mut events)
                .unwrap_err(),
            CinderError::LengthMismatch { left: 1, right: 2 }
        );
        assert_eq!(
            registry
                .create_template_pool(vec![1], vec![0], &mut events)
                .unwrap_err(),
            CinderError::ZeroWeight
        );
        assert_eq!(
            registry
                .create_template_pool(vec![7], vec![1], &mut events)
                .unwrap_err(),
            CinderError::invalid_id("template", 7)
        );
        assert_eq!(registry.pool(1).unwrap_err(), CinderError::UnknownPool(1));
    }

    #[test]
    fn test_bucket_validation() {
        let mut registry = RitualRegistry::new();
        let mut events = EventLog::new();
        registry.create_affix(affix(0), &mut events).unwrap();
        assert_eq!(
            registry.create_affix_bucket(vec![1], &mut events).unwrap_err(),
            CinderError::ZeroWeight
        );
        assert_eq!(
            registry.create_affix_bucket(vec![], &mut events).unwrap_err(),
            CinderError::ZeroWeight
        );
        assert!(registry.create_affix_bucket(vec![2], &mut events).is_err());
    }
}
