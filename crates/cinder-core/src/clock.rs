//! Wave clock - midnight-UTC boundary arithmetic
//!
//! Waves are UTC calendar days. A wave's timestamp is always the midnight
//! that opened it, and rollover only ever moves forward by whole days.

use crate::error::{CinderError, Result};
use crate::types::{Timestamp, WaveId, SECONDS_PER_DAY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most recent midnight UTC at or before `now`
pub fn midnight_utc(now: Timestamp) -> Result<Timestamp> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(now, 0)
        .ok_or_else(|| CinderError::InvalidInput(format!("timestamp {now} out of range")))?;
    let midnight = dt
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CinderError::InvalidInput(format!("no midnight for {now}")))?;
    Ok(midnight.and_utc().timestamp())
}

/// Current wave counter and the boundary it started on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveClock {
    wave_count: WaveId,
    wave_time: Timestamp,
}

/// Result of advancing the clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rollover {
    pub prev_wave_time: Timestamp,
    pub new_wave_time: Timestamp,
    pub new_wave_id: WaveId,
    pub elapsed_days: u64,
}

impl WaveClock {
    /// Seed wave #1 at the most recent boundary at or before `now`
    pub fn genesis(now: Timestamp) -> Result<Self> {
        Ok(Self {
            wave_count: 1,
            wave_time: midnight_utc(now)?,
        })
    }

    /// Clock that has not been seeded yet
    pub fn is_started(&self) -> bool {
        self.wave_count > 0
    }

    pub fn wave_count(&self) -> WaveId {
        self.wave_count
    }

    pub fn wave_time(&self) -> Timestamp {
        self.wave_time
    }

    /// A wave expires once a full day has passed since its boundary
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.is_started() && now.saturating_sub(self.wave_time) >= SECONDS_PER_DAY
    }

    /// Advance by whole days; `None` when the current wave is still open
    pub fn advance(&mut self, now: Timestamp) -> Result<Option<Rollover>> {
        if !self.is_expired(now) {
            return Ok(None);
        }
        let now_boundary = midnight_utc(now)?;
        let elapsed_days = ((now_boundary - self.wave_time) / SECONDS_PER_DAY) as u64;
        if elapsed_days == 0 {
            return Ok(None);
        }

        let prev_wave_time = self.wave_time;
        self.wave_count = self
            .wave_count
            .checked_add(elapsed_days)
            .ok_or(CinderError::Overflow("wave counter"))?;
        self.wave_time = now_boundary;

        Ok(Some(Rollover {
            prev_wave_time,
            new_wave_time: now_boundary,
            new_wave_id: self.wave_count,
            elapsed_days,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // 2026-01-01T00:00:00Z
    const JAN_1: Timestamp = 1_767_225_600;

    #[test]
    fn test_midnight_alignment() {
        assert_eq!(midnight_utc(JAN_1).unwrap(), JAN_1);
        assert_eq!(midnight_utc(JAN_1 + 13 * 3600 + 7).unwrap(), JAN_1);
        assert_eq!(midnight_utc(JAN_1 - 1).unwrap(), JAN_1 - SECONDS_PER_DAY);
    }

    #[test]
    fn test_genesis_seeds_wave_one() {
        let clock = WaveClock::genesis(JAN_1 + 5000).unwrap();
        assert_eq!(clock.wave_count(), 1);
        assert_eq!(clock.wave_time(), JAN_1);
        assert!(!clock.is_expired(JAN_1 + SECONDS_PER_DAY - 1));
        assert!(clock.is_expired(JAN_1 + SECONDS_PER_DAY));
    }

    #[test]
    fn test_advance_skips_idle_days() {
        let mut clock = WaveClock::genesis(JAN_1).unwrap();
        assert_eq!(clock.advance(JAN_1 + 100).unwrap(), None);

        let rollover = clock
            .advance(JAN_1 + 3 * SECONDS_PER_DAY + 42)
            .unwrap()
            .unwrap();
        assert_eq!(rollover.elapsed_days, 3);
        assert_eq!(rollover.new_wave_id, 4);
        assert_eq!(rollover.prev_wave_time, JAN_1);
        assert_eq!(clock.wave_time(), JAN_1 + 3 * SECONDS_PER_DAY);
    }

    #[test]
    fn test_unstarted_clock_never_expires() {
        let clock = WaveClock::default();
        assert!(!clock.is_started());
        assert!(!clock.is_expired(JAN_1));
    }

    #[test]
    fn test_extreme_timestamps_do_not_panic() {
        let mut clock = WaveClock::genesis(JAN_1).unwrap();
        assert!(!clock.is_expired(i64::MIN));
        assert_eq!(clock.advance(i64::MIN).unwrap(), None);
        assert!(clock.is_expired(i64::MAX));
        assert!(clock.advance(i64::MAX).is_err());
        assert_eq!(clock.wave_count(), 1);
    }

    proptest! {
        #[test]
        fn test_midnight_is_aligned_and_recent(now in 0i64..4_000_000_000) {
            let midnight = midnight_utc(now).unwrap();
            prop_assert_eq!(midnight % SECONDS_PER_DAY, 0);
            prop_assert!(midnight <= now);
            prop_assert!(now - midnight < SECONDS_PER_DAY);
        }

        #[test]
        fn test_wave_count_tracks_days(start in 0i64..2_000_000_000, days in 1i64..400) {
            let mut clock = WaveClock::genesis(start).unwrap();
            let genesis = clock.wave_time();
            let rollover = clock.advance(genesis + days * SECONDS_PER_DAY).unwrap().unwrap();
            prop_assert_eq!(rollover.new_wave_id, 1 + days as u64);
            prop_assert_eq!(clock.wave_time(), genesis + days * SECONDS_PER_DAY);
        }
    }
}
