//! # Cinder Ritual
//!
//! Weighted-random ritual crafting.
//!
//! A player asks for a ritual from a template pool and pays the creation
//! costs. When the randomness provider delivers a value, one template is
//! drawn from the pool, one affix is drawn from each of the template's affix
//! buckets, and the affixes are applied to a copy of the template before the
//! ritual is minted.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Templates, affixes, pools, pending requests, rituals |
//! | [`registry`] | Append-only storage with per-kind id counters |
//! | [`sampling`] | Domain-separated expansion and cumulative-weight selection |
//! | [`affix`] | Order-sensitive affix application with soft warnings |
//! | [`engine`] | Request/fulfil/cancel state machine, consumption, transfer |

pub mod affix;
pub mod engine;
pub mod registry;
pub mod sampling;
pub mod types;

pub use affix::{apply_affixes, AffixWarnings};
pub use engine::{RitualConfig, RitualContext, RitualEngine};
pub use registry::RitualRegistry;
pub use types::{
    Affix, AffixEffect, AssetType, Charges, Component, CreationConfig, PendingRitualRequest, Ritual,
    RitualTemplate, TemplatePool,
};
