//! # Cinder Waves
//!
//! Wave-based reward accounting.
//!
//! Player contributions are batched into daily waves (midnight UTC). Every
//! wave gets a fixed budget in two reward currencies; once the wave closes,
//! each contributor may claim `budget * player_qty / global_qty`.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`TimeWindowQueue`] | Monotonic-index FIFO keyed by wave id |
//! | [`WaveAccountant`] | Wave lifecycle, contributions, claims, age-out |

pub mod accountant;
pub mod queue;

pub use accountant::{GlobalWave, PlayerWave, WaveAccountant, WaveConfig};
pub use queue::{QueueEntry, QueuePayload, TimeWindowQueue};
