// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory login sessions.
//!
//! A session maps an opaque bearer token to the [`IdentityContext`] taken at
//! login. The snapshot is never refreshed from the store; it lives until
//! logout or until it sits idle longer than the configured timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use casebook_core::IdentityContext;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct SessionEntry {
    identity: IdentityContext,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("active", &self.sessions.len())
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            idle_timeout,
        }
    }

    /// Start a session and return its bearer token.
    pub fn create(&self, identity: IdentityContext) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        debug!(user_id = %identity.user_id, "session created");
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                identity,
                last_seen: Instant::now(),
            },
        );
        token
    }

    /// Look up a live session and mark it as used. An idle session is
    /// dropped on the lookup that finds it expired.
    pub fn get(&self, token: &str) -> Option<IdentityContext> {
        let now = Instant::now();
        match self.sessions.get_mut(token) {
            Some(mut entry) if now.duration_since(entry.last_seen) <= self.idle_timeout => {
                entry.last_seen = now;
                return Some(entry.identity.clone());
            }
            Some(_) => {}
            None => return None,
        }
        self.sessions.remove(token);
        debug!("session expired");
        None
    }

    /// End a session. Returns whether it existed.
    pub fn remove(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every idle session and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        let now = Instant::now();
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_timeout);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Periodically purge idle sessions until `shutdown` fires.
    pub fn spawn_reaper(&self, every: Duration, shutdown: CancellationToken) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let purged = store.purge_expired();
                        if purged > 0 {
                            debug!(purged, "idle sessions purged");
                        }
                    }
                }
            }
        });
    }
}
