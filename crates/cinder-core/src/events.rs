//! Externally observable events
//!
//! Components never publish events directly. They push into an [`EventLog`]
//! owned by the current call; the node appends the log to its journal only
//! after the call commits, so a failed call leaves no events behind.

use crate::types::{Address, PoolId, RequestToken, Timestamp, TokenId, WaveId};
use serde::{Deserialize, Serialize};

/// Every event the core emits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    // === Waves ===
    WaveRollover {
        new_wave_id: WaveId,
        prev_wave_time: Timestamp,
        new_wave_time: Timestamp,
    },
    ContributionAdded {
        player: Address,
        wave_id: WaveId,
        quantity: u64,
    },
    RewardsClaimed {
        player: Address,
        amount_a: u128,
        amount_b: u128,
    },

    // === Rituals ===
    RitualCreationBegun {
        player: Address,
        pool_id: u64,
        request_token: RequestToken,
    },
    RitualCreationFinished {
        request_token: RequestToken,
        template_id: u64,
        minted_id: TokenId,
        applied_affix_ids: Vec<u64>,
        player: Address,
    },
    RitualCreationCancelled {
        request_token: RequestToken,
        player: Address,
    },
    AffixApplicationWarning {
        message: String,
    },
    RitualConsumed {
        player: Address,
        ritual_id: TokenId,
        charges_left: Option<u32>,
    },
    TemplateCreated {
        id: u64,
    },
    TemplatePoolCreated {
        id: u64,
    },
    AffixCreated {
        id: u64,
    },
    AffixBucketCreated {
        id: u64,
    },

    // === Farming ===
    ProductRegistered {
        product_id: u64,
        pool_id: PoolId,
    },
    Staked {
        owner: Address,
        token_id: TokenId,
        product_id: u64,
    },
    Harvested {
        owner: Address,
        token_id: TokenId,
        amount: u64,
    },
    Unstaked {
        owner: Address,
        token_id: TokenId,
        forced: bool,
    },
    LeveledUp {
        token_id: TokenId,
        level: u32,
    },
}

impl Event {
    /// Short event name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::WaveRollover { .. } => "wave_rollover",
            Self::ContributionAdded { .. } => "contribution_added",
            Self::RewardsClaimed { .. } => "rewards_claimed",
            Self::RitualCreationBegun { .. } => "ritual_creation_begun",
            Self::RitualCreationFinished { .. } => "ritual_creation_finished",
            Self::RitualCreationCancelled { .. } => "ritual_creation_cancelled",
            Self::AffixApplicationWarning { .. } => "affix_application_warning",
            Self::RitualConsumed { .. } => "ritual_consumed",
            Self::TemplateCreated { .. } => "template_created",
            Self::TemplatePoolCreated { .. } => "template_pool_created",
            Self::AffixCreated { .. } => "affix_created",
            Self::AffixBucketCreated { .. } => "affix_bucket_created",
            Self::ProductRegistered { .. } => "product_registered",
            Self::Staked { .. } => "staked",
            Self::Harvested { .. } => "harvested",
            Self::Unstaked { .. } => "unstaked",
            Self::LeveledUp { .. } => "leveled_up",
        }
    }
}

/// Events buffered during one call
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        tracing::debug!(event = event.name(), "event buffered");
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take the buffered events, leaving the log empty
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
