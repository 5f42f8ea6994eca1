//! Bounded conversation history.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of turns kept.
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// One side of an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

/// Fixed-capacity log of turns, oldest evicted first.
///
/// Holds at most `capacity` turns at all times, in insertion order. Appends
/// are serialized behind a mutex so one buffer can be shared across threads.
#[derive(Debug)]
pub struct SessionBuffer {
    capacity: usize,
    turns: Mutex<VecDeque<Turn>>,
}

impl SessionBuffer {
    /// A capacity of zero keeps nothing.
    pub fn new(capacity: usize) -> Self {
        SessionBuffer { capacity, turns: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    pub fn push(&self, turn: Turn) {
        if self.capacity == 0 {
            return;
        }
        let mut turns = self.lock();
        while turns.len() >= self.capacity {
            turns.pop_front();
        }
        turns.push_back(turn);
    }

    pub fn record(&self, role: Role, text: impl Into<String>, timestamp: NaiveDateTime) {
        self.push(Turn { role, text: text.into(), timestamp });
    }

    /// Copy of the retained turns, oldest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the deque half-updated.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Turn>> {
        self.turns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionBuffer {
    fn default() -> Self {
        SessionBuffer::new(DEFAULT_CAPACITY)
    }
}
