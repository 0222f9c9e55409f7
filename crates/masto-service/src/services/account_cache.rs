//! Request-scoped account cache
//!
//! Memoizes users (and their converted accounts) by native id for the life of
//! one request. Each key has its own gate, so concurrent lookups of the same
//! id trigger a single store call while different ids resolve in parallel.
//! Failed resolutions are not stored; the next caller retries.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use masto_core::traits::UserRepository;
use masto_core::{DomainError, NativeId, User};
use tokio::sync::Mutex;
use tracing::debug;

use crate::dto::Account;

/// Memo table with per-key single-flight resolution
pub struct KeyedMemo<V> {
    values: DashMap<NativeId, V>,
    gates: DashMap<NativeId, Arc<Mutex<()>>>,
}

impl<V: Clone> KeyedMemo<V> {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
            gates: DashMap::new(),
        }
    }

    /// Cached value for a key, if any
    pub fn get(&self, key: &NativeId) -> Option<V> {
        self.values.get(key).map(|entry| entry.value().clone())
    }

    /// Store a value without resolving it
    pub fn insert(&self, key: NativeId, value: V) {
        self.values.insert(key, value);
    }

    /// Return the cached value or run `resolve` once for this key
    ///
    /// Callers arriving while a resolution is in flight wait on the key's gate
    /// and then read the stored value.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &NativeId, resolve: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        // Clone the gate out so no map guard is held across the await.
        let gate = Arc::clone(&self.gates.entry(key.clone()).or_default());
        let _guard = gate.lock().await;

        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = resolve().await?;
        self.values.insert(key.clone(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Clone> Default for KeyedMemo<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Users and converted accounts resolved during one request
#[derive(Default)]
pub struct AccountCache {
    users: KeyedMemo<User>,
    accounts: KeyedMemo<Account>,
}

impl AccountCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a user, hitting the store at most once per id
    pub async fn get_cached(
        &self,
        id: &NativeId,
        repo: &dyn UserRepository,
    ) -> Result<User, DomainError> {
        self.users
            .get_or_try_insert_with(id, || async {
                debug!(user_id = %id, "Resolving user");
                repo.find_by_id(id)
                    .await?
                    .ok_or_else(|| DomainError::UserNotFound(id.clone()))
            })
            .await
    }

    /// Record a user loaded by another query (e.g. joined follow rows)
    pub fn prime(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Converted account, if already built during this request
    pub fn cached_account(&self, id: &NativeId) -> Option<Account> {
        self.accounts.get(id)
    }

    /// Return the converted account or build it once
    pub async fn account<F, Fut, E>(&self, id: &NativeId, build: F) -> Result<Account, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Account, E>>,
    {
        self.accounts.get_or_try_insert_with(id, build).await
    }

    /// Number of cached users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
