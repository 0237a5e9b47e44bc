//! In-memory session store
//!
//! Sessions live for the lifetime of the process. Each one sits behind its
//! own mutex so a turn can hold it across model round trips without blocking
//! other sessions; the map lock is only held for lookups and inserts.

use crate::order::Order;
use crate::state_machine::TurnState;
use crate::transcript::Message;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// One customer's conversation and order
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub transcript: Vec<Message>,
    pub order: Order,
    /// Set once the order is placed; no further chat is accepted
    pub finished: bool,
    pub phase: TurnState,
    pub created_at: Instant,
    pub last_active: Instant,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Instant::now();
        Self {
            id,
            transcript: Vec::new(),
            order: Order::new(),
            finished: false,
            phase: TurnState::Idle,
            created_at: now,
            last_active: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Process-wide map from session id to session
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a fresh session with a unique id
    pub async fn create(&self) -> (String, SessionHandle) {
        let mut sessions = self.sessions.write().await;
        loop {
            let id = Uuid::new_v4().to_string();
            if let Entry::Vacant(entry) = sessions.entry(id.clone()) {
                let handle = Arc::new(Mutex::new(Session::new(id.clone())));
                entry.insert(Arc::clone(&handle));
                return (id, handle);
            }
        }
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Whether `id` still maps to this exact handle
    pub async fn is_current(&self, id: &str, handle: &SessionHandle) -> bool {
        self.sessions
            .read()
            .await
            .get(id)
            .is_some_and(|stored| Arc::ptr_eq(stored, handle))
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `ttl`.
    ///
    /// Sessions with a turn in progress are locked and always kept.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.last_active.elapsed() <= ttl,
            Err(_) => true,
        });
        before - sessions.len()
    }

    /// Periodically evict idle sessions until the store is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, ttl: Duration, interval: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    let remaining = store.len().await;
                    tracing::info!(evicted, remaining, "Evicted idle sessions");
                }
            }
            tracing::debug!("Session sweeper stopped");
        })
    }
}
