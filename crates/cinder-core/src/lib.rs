//! # Cinder Core
//!
//! Shared building blocks for the Cinder game-server core:
//! - `Address`, `TokenId`, `WaveId` and the other identifiers
//! - `CinderError` - the error taxonomy shared by every crate
//! - `Event` / `EventLog` - externally observable events, buffered per call
//! - `clock` - midnight-UTC wave boundary arithmetic
//! - `collaborators` - traits for the asset ledger, attribute provider,
//!   randomness provider, constraint checker and contribution sink
//! - `memory` - in-memory ledger, attribute table and request-token source
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────┐
//!                    │ cinder-core  │
//!                    └──────┬───────┘
//!         ┌─────────────────┼──────────────────┐
//!  ┌──────┴───────┐ ┌───────┴───────┐ ┌────────┴──────┐
//!  │ cinder-waves │ │cinder-farming │ │ cinder-ritual │
//!  └──────┬───────┘ └───────┬───────┘ └────────┬──────┘
//!         └─────────────────┼──────────────────┘
//!                    ┌──────┴───────┐
//!                    │ cinder-node  │
//!                    └──────────────┘
//! ```
//!
//! The ritual engine reaches the wave accountant only through
//! [`collaborators::ContributionSink`].

pub mod clock;
pub mod collaborators;
pub mod error;
pub mod events;
pub mod memory;
pub mod types;

pub use clock::*;
pub use collaborators::*;
pub use error::*;
pub use events::*;
pub use memory::{AssetAttributes, MemoryLedger, SequentialRandomness, StaticAttributes};
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collaborators::{
        AssetLedger, AttributeProvider, ConstraintChecker, ContributionSink, RandomnessProvider,
    };
    pub use crate::error::{CinderError, ErrorKind, Result};
    pub use crate::events::{Event, EventLog};
    pub use crate::types::*;
}
