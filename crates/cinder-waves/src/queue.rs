//! # Time-Window Queue
//!
//! Monotonic-index FIFO keyed by wave id.
//!
//! ```text
//!   first                          last
//!     │                              │
//!     ▼                              ▼
//!   ┌────┬────┬────┬────┬────┬────┬────┐
//!   │ w3 │ w4 │ w6 │ w7 │ w8 │ w9 │ w10│   ← enqueue at last + 1
//!   └────┴────┴────┴────┴────┴────┴────┘
//!     ↑ dequeue at first
//! ```
//!
//! Cursor states: uninitialized (`first = 0`) and initialized (`first = 1,
//! last = 0` when empty). Keys are strictly increasing, and only the newest
//! entry may have its quantity updated.

use cinder_core::error::{CinderError, Result};
use cinder_core::types::WaveId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Payload stored per wave
pub trait QueuePayload {
    fn quantity(&self) -> u64;

    fn add_quantity(&mut self, delta: u64) -> Result<()>;
}

/// One queued wave
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry<P> {
    pub index: u64,
    pub key: WaveId,
    pub payload: P,
}

/// FIFO of wave entries with explicit cursors
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindowQueue<P> {
    first: u64,
    last: u64,
    entries: VecDeque<QueueEntry<P>>,
}

impl<P> Default for TimeWindowQueue<P> {
    fn default() -> Self {
        Self {
            first: 0,
            last: 0,
            entries: VecDeque::new(),
        }
    }
}

impl<P: QueuePayload> TimeWindowQueue<P> {
    /// Create an uninitialized queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue that is ready for use
    pub fn initialized() -> Self {
        Self {
            first: 1,
            last: 0,
            entries: VecDeque::new(),
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        if self.is_initialized() {
            return Err(CinderError::QueueAlreadyInitialized);
        }
        self.first = 1;
        self.last = 0;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.first != 0
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(CinderError::QueueUninitialized)
        }
    }

    pub fn len(&self) -> u64 {
        if !self.is_initialized() {
            return 0;
        }
        (self.last + 1).saturating_sub(self.first)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cursor of the oldest active entry
    pub fn first_index(&self) -> u64 {
        self.first
    }

    /// Cursor of the newest active entry
    pub fn last_index(&self) -> u64 {
        self.last
    }

    /// Append at `last + 1`
    pub fn enqueue(&mut self, key: WaveId, payload: P) -> Result<u64> {
        self.ensure_initialized()?;
        if let Some(back) = self.entries.back() {
            if key <= back.key {
                return Err(CinderError::WaveKeyMismatch {
                    expected: Some(back.key + 1),
                    got: key,
                });
            }
        }
        let index = self.last + 1;
        self.entries.push_back(QueueEntry {
            index,
            key,
            payload,
        });
        self.last = index;
        Ok(index)
    }

    /// Remove the entry at `first`
    pub fn dequeue(&mut self) -> Result<(WaveId, P)> {
        self.ensure_initialized()?;
        let entry = self.entries.pop_front().ok_or(CinderError::QueueEmpty)?;
        debug_assert_eq!(entry.index, self.first);
        self.first += 1;
        Ok((entry.key, entry.payload))
    }

    pub fn peek_front(&self) -> Result<&QueueEntry<P>> {
        self.ensure_initialized()?;
        self.entries.front().ok_or(CinderError::QueueEmpty)
    }

    pub fn peek_back(&self) -> Result<&QueueEntry<P>> {
        self.ensure_initialized()?;
        self.entries.back().ok_or(CinderError::QueueEmpty)
    }

    /// Entry `offset` positions after `first`
    pub fn at(&self, offset: u64) -> Result<&QueueEntry<P>> {
        self.ensure_initialized()?;
        if self.is_empty() {
            return Err(CinderError::QueueEmpty);
        }
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.entries.get(i))
            .ok_or(CinderError::QueueIndexOutOfRange {
                offset,
                len: self.len(),
            })
    }

    fn position(&self, key: WaveId) -> Option<usize> {
        self.entries.binary_search_by_key(&key, |e| e.key).ok()
    }

    /// True when an entry for `key` is present in the active range
    pub fn key_exists(&self, key: WaveId) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: WaveId) -> Option<&P> {
        self.position(key).map(|i| &self.entries[i].payload)
    }

    pub(crate) fn get_mut(&mut self, key: WaveId) -> Option<&mut P> {
        self.position(key).map(|i| &mut self.entries[i].payload)
    }

    /// Quantity stored for `key`, zero when absent
    pub fn quantity_of(&self, key: WaveId) -> u64 {
        self.get(key).map(QueuePayload::quantity).unwrap_or(0)
    }

    /// Add `delta` to the newest entry; older waves are settled and immutable
    pub fn update_quantity(&mut self, key: WaveId, delta: u64) -> Result<()> {
        self.ensure_initialized()?;
        let back = self
            .entries
            .back_mut()
            .ok_or(CinderError::WaveKeyMismatch {
                expected: None,
                got: key,
            })?;
        if back.key != key {
            return Err(CinderError::WaveKeyMismatch {
                expected: Some(back.key),
                got: key,
            });
        }
        back.payload.add_quantity(delta)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry<P>> {
        self.entries.iter()
    }

    /// Dequeue every entry whose key is at or below `cutoff`
    pub fn drop_through(&mut self, cutoff: WaveId) -> Result<Vec<(WaveId, P)>> {
        let mut dropped = Vec::new();
        while let Some(front) = self.entries.front() {
            if front.key > cutoff {
                break;
            }
            dropped.push(self.dequeue()?);
        }
        Ok(dropped)
    }
}
