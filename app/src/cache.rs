use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub struct Cache<T> {
    data: Arc<Mutex<HashMap<String, T>>>,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Cache {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T> Cache<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn get_connection(&self) -> MutexGuard<'_, HashMap<String, T>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes the entry when `stale` holds for it. The check and the removal
    /// happen under one lock.
    pub fn remove_if<F>(&self, id: &str, stale: F) -> bool
    where
        F: FnOnce(&T) -> bool,
    {
        let mut conn = self.get_connection();
        if conn.get(id).is_some_and(stale) {
            conn.remove(id);
            return true;
        }
        false
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.get_connection().len()
    }
}

impl<T: Clone> Cache<T> {
    pub fn get_or_insert<F>(&self, id: &str, with: F) -> T
    where
        F: FnOnce() -> T,
    {
        let mut conn = self.get_connection();
        conn.entry(id.to_owned()).or_insert_with(with).clone()
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One async mutex per tournament id. Every bracket mutation holds the
/// tournament's guard for the whole of its transaction, so reads that decide
/// round completion always see the writes of the previous mutation.
///
/// A lock lives only while someone holds or waits for it.
#[derive(Clone, Default)]
pub struct TournamentLocks {
    locks: Cache<Arc<AsyncMutex<()>>>,
}

impl TournamentLocks {
    pub fn new() -> Self {
        Self {
            locks: Cache::new(),
        }
    }

    pub async fn acquire(&self, tournament_id: &str) -> TournamentGuard {
        let lock = self.locks.get_or_insert(tournament_id, Default::default);
        TournamentGuard {
            guard: Some(lock.lock_owned().await),
            locks: self.locks.clone(),
            tournament_id: tournament_id.to_owned(),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.len()
    }
}

pub struct TournamentGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Cache<Arc<AsyncMutex<()>>>,
    tournament_id: String,
}

impl Drop for TournamentGuard {
    fn drop(&mut self) {
        // Release first so our own handle is not counted below.
        self.guard.take();
        // Waiters hold a clone of the Arc, so only the map's handle is left
        // when nobody else wants the lock.
        self.locks
            .remove_if(&self.tournament_id, |lock| Arc::strong_count(lock) == 1);
    }
}
