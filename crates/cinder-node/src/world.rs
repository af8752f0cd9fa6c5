//! Committed game state
//!
//! Everything an operation can change lives in one [`World`], including the
//! in-memory ledger, so a draft clone captures the whole effect of a call.

use crate::config::CinderConfig;
use crate::error::NodeResult;
use cinder_core::collaborators::BalanceConstraints;
use cinder_core::events::EventLog;
use cinder_core::memory::{MemoryLedger, SequentialRandomness, StaticAttributes};
use cinder_farming::{StakeContext, StakeManager};
use cinder_ritual::{RitualContext, RitualEngine};
use cinder_waves::WaveAccountant;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub waves: WaveAccountant,
    pub farming: StakeManager,
    pub rituals: RitualEngine,
    pub ledger: MemoryLedger,
    pub attributes: StaticAttributes,
    pub randomness: SequentialRandomness,
}

impl World {
    pub fn new(config: &CinderConfig) -> NodeResult<Self> {
        Ok(Self {
            waves: WaveAccountant::new(config.waves.clone()),
            farming: StakeManager::new(
                config.farming.custody_address()?,
                config.farming.leveling.clone(),
                config.farming.wave_eligible_pools.iter().copied(),
            ),
            rituals: RitualEngine::new(config.ritual.clone()),
            ledger: MemoryLedger::new(),
            attributes: StaticAttributes::new(),
            randomness: SequentialRandomness::new(),
        })
    }

    /// Split borrows for a staking operation
    pub(crate) fn staking<'a>(
        &'a mut self,
        events: &'a mut EventLog,
    ) -> (&'a mut StakeManager, StakeContext<'a>) {
        let World {
            waves,
            farming,
            ledger,
            attributes,
            ..
        } = self;
        (
            farming,
            StakeContext {
                ledger,
                attributes,
                checker: &BalanceConstraints,
                sink: waves,
                events,
            },
        )
    }

    /// Split borrows for a ritual operation
    pub(crate) fn ritual<'a>(
        &'a mut self,
        events: &'a mut EventLog,
    ) -> (&'a mut RitualEngine, RitualContext<'a>) {
        let World {
            waves,
            rituals,
            ledger,
            randomness,
            ..
        } = self;
        (
            rituals,
            RitualContext {
                ledger,
                checker: &BalanceConstraints,
                randomness,
                sink: waves,
                events,
            },
        )
    }
}
