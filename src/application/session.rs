//! Per-visitor navigation state, bounded by an LRU.
//!
//! Each session owns an async mutex. A request holds it from load to store, so
//! two requests carrying the same cookie are applied one after the other.

use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard},
};

use lru::LruCache;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::navigation::NavigationState;

const SOURCE: &str = "folio::session";
pub const METRIC_SESSIONS_EVICTED: &str = "folio_sessions_evicted_total";

type SessionSlot = Arc<AsyncMutex<NavigationState>>;

/// Exclusive access to one visitor's state; writes through the guard persist.
pub type SessionGuard = OwnedMutexGuard<NavigationState>;

pub struct SessionStore {
    sessions: Mutex<LruCache<Uuid, SessionSlot>>,
}

impl SessionStore {
    /// A store holding at most `capacity` sessions; zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, LruCache<Uuid, SessionSlot>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    target: SOURCE,
                    op,
                    lock_kind = "mutex.lock",
                    result = "poisoned_recovered",
                    "Recovered from poisoned session lock"
                );
                poisoned.into_inner()
            }
        }
    }

    fn slot(&self, id: Uuid) -> SessionSlot {
        let mut sessions = self.lock("slot");
        if let Some(slot) = sessions.get(&id) {
            return Arc::clone(slot);
        }

        let slot: SessionSlot = Arc::new(AsyncMutex::new(NavigationState::default()));
        if let Some((evicted, _)) = sessions.push(id, Arc::clone(&slot)) {
            metrics::counter!(METRIC_SESSIONS_EVICTED).increment(1);
            debug!(target: SOURCE, session = %evicted, "evicted least recently used session");
        }
        slot
    }

    /// Wait for exclusive access to the state of `id`.
    ///
    /// Unknown and evicted sessions start from the initial state.
    pub async fn enter(&self, id: Uuid) -> SessionGuard {
        self.slot(id).lock_owned().await
    }

    /// Copy of the current state of `id`.
    pub async fn snapshot(&self, id: Uuid) -> NavigationState {
        self.enter(id).await.clone()
    }

    pub fn len(&self) -> usize {
        self.lock("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::navigation::{NavTarget, Page};

    #[tokio::test]
    async fn unknown_sessions_start_at_home() {
        let store = SessionStore::new(4);
        assert_eq!(
            store.snapshot(Uuid::new_v4()).await,
            NavigationState::default()
        );
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new(4);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.enter(a).await.page = NavTarget::Blog.page();

        assert_eq!(store.snapshot(a).await.page, NavTarget::Blog.page());
        assert_eq!(store.snapshot(b).await.page, Page::Home);
    }

    #[tokio::test]
    async fn least_recently_used_session_is_evicted() {
        let store = SessionStore::new(1);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.enter(a).await.page = NavTarget::Blog.page();
        store.enter(b).await.page = NavTarget::Blog.page();

        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot(a).await.page, Page::Home);
    }

    #[tokio::test]
    async fn a_second_request_waits_for_the_first() {
        let store = Arc::new(SessionStore::new(4));
        let id = Uuid::new_v4();

        let mut first = store.enter(id).await;
        let waiting = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.snapshot(id).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());
        first.page = NavTarget::Skills.page();
        drop(first);

        let seen = waiting.await.expect("snapshot task");
        assert_eq!(seen.page, NavTarget::Skills.page());
    }
}
