//! Per-account mutation locks.
//!
//! Each username maps to its own `tokio::sync::Mutex`, so mutations on
//! unrelated accounts never wait on each other. Operations touching two
//! accounts take both locks in lexicographic order, which rules out
//! lock-order deadlocks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Held for the duration of a mutation; releases every lock on drop.
pub struct AccountGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

/// Idle entries are swept once the table reaches this size.
const PRUNE_FLOOR: usize = 1024;

struct Table {
    locks: HashMap<String, Arc<AsyncMutex<()>>>,
    prune_at: usize,
}

pub struct LockTable {
    table: Mutex<Table>,
}

impl Default for LockTable {
    fn default() -> Self {
        Self {
            table: Mutex::new(Table {
                locks: HashMap::new(),
                prune_at: PRUNE_FLOOR,
            }),
        }
    }
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, username: &str) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
        // An entry nobody else holds a handle to is idle. Sweeping only when
        // the table doubles past its last live size keeps lookups amortized O(1).
        if table.locks.len() >= table.prune_at {
            table.locks.retain(|_, m| Arc::strong_count(m) > 1);
            table.prune_at = (table.locks.len() * 2).max(PRUNE_FLOOR);
        }
        Arc::clone(table.locks.entry(username.to_string()).or_default())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(|p| p.into_inner()).locks.len()
    }

    /// Lock a single account.
    pub async fn lock(&self, username: &str) -> AccountGuard {
        let guard = self.handle(username).lock_owned().await;
        AccountGuard {
            _guards: vec![guard],
        }
    }

    /// Lock two accounts in username order. Locks once if `a == b`.
    pub async fn lock_pair(&self, a: &str, b: &str) -> AccountGuard {
        if a == b {
            return self.lock(a).await;
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first = self.handle(first).lock_owned().await;
        let second = self.handle(second).lock_owned().await;
        AccountGuard {
            _guards: vec![first, second],
        }
    }
}
