//! # Cinder Node
//!
//! Wires the wave accountant, staking manager and ritual engine around one
//! in-memory ledger and exposes every operation as an atomic call.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | TOML + environment configuration |
//! | [`world`] | The complete committed state |
//! | [`node`] | Draft/commit transactions, event journal, snapshots |
//! | [`entropy`] | Seeded randomness source for simulations and tests |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod entropy;
pub mod error;
pub mod logging;
pub mod node;
pub mod world;

pub use config::{CinderConfig, FarmingConfig, LoggingConfig};
pub use entropy::SeededEntropy;
pub use error::{NodeError, NodeResult};
pub use node::Node;
pub use world::World;

pub use cinder_core::memory::{AssetAttributes, MemoryLedger, SequentialRandomness, StaticAttributes};
