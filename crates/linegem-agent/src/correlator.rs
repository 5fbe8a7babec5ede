// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-request correlation between a vision prompt and its image.
//!
//! The [`Correlator`] holds at most one [`PendingRequest`] per correlation
//! key. Each entry owns a tokio timer task that removes it after its TTL.
//! Registration, consumption and expiry are each a single atomic operation
//! on one map shard, so for a given key whichever of `take` and expiry runs
//! first wins and the other is a no-op. Entries carry a generation number so
//! a superseded timer can never remove the request that replaced it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use linegem_core::LinegemError;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A text prompt waiting for a follow-up image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub user_id: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

/// Receives requests that expired before an image arrived.
#[async_trait]
pub trait ExpiryListener: Send + Sync + 'static {
    async fn on_expired(&self, request: PendingRequest);
}

struct Slot {
    request: PendingRequest,
    generation: u64,
    timer: JoinHandle<()>,
}

type Entries = DashMap<String, Slot>;

/// Per-user store of pending vision prompts with expiry.
///
/// Must be used from within a tokio runtime; registering spawns the entry's
/// expiry timer.
pub struct Correlator {
    entries: Arc<Entries>,
    listener: Option<Arc<dyn ExpiryListener>>,
    next_generation: AtomicU64,
}

impl Correlator {
    /// Creates a correlator that drops expired requests silently.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            listener: None,
            next_generation: AtomicU64::new(0),
        }
    }

    /// Creates a correlator that hands expired requests to `listener`.
    pub fn with_listener(listener: Arc<dyn ExpiryListener>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            listener: Some(listener),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Stores `prompt` for `user_id`, replacing and cancelling any request
    /// already pending for that user.
    ///
    /// Fails with [`LinegemError::InvalidInput`] when the prompt is blank.
    pub fn register(&self, user_id: &str, prompt: &str, ttl: Duration) -> Result<(), LinegemError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(LinegemError::InvalidInput(format!(
                "empty prompt for user {user_id}"
            )));
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let request = PendingRequest {
            user_id: user_id.to_string(),
            prompt: prompt.to_string(),
            created_at: Utc::now(),
            ttl,
        };

        // The shard lock is held until the new slot is in place, so the new
        // timer cannot observe the map before its own entry exists.
        let entry = self.entries.entry(user_id.to_string());
        let timer = self.spawn_expiry(user_id.to_string(), generation, ttl);
        let slot = Slot {
            request,
            generation,
            timer,
        };

        match entry {
            Entry::Occupied(mut occupied) => {
                let replaced = occupied.insert(slot);
                replaced.timer.abort();
                debug!(user_id, "replaced pending request");
            }
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
                debug!(user_id, ttl_secs = ttl.as_secs(), "registered pending request");
            }
        }
        Ok(())
    }

    /// Removes and returns the pending request for `user_id`, cancelling its
    /// expiry timer.
    pub fn take(&self, user_id: &str) -> Option<PendingRequest> {
        let (_, slot) = self.entries.remove(user_id)?;
        slot.timer.abort();
        debug!(user_id, "took pending request");
        Some(slot.request)
    }

    /// Returns whether a request is pending for `user_id`.
    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.contains_key(user_id)
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn spawn_expiry(&self, user_id: String, generation: u64, ttl: Duration) -> JoinHandle<()> {
        let entries: Weak<Entries> = Arc::downgrade(&self.entries);
        let listener = self.listener.clone();

        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;

            let Some(entries) = entries.upgrade() else {
                return;
            };
            let expired = entries.remove_if(&user_id, |_, slot| slot.generation == generation);
            drop(entries);

            if let Some((_, slot)) = expired {
                info!(user_id = %user_id, "pending request expired");
                if let Some(listener) = listener {
                    listener.on_expired(slot.request).await;
                }
            }
        })
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Correlator {
    fn drop(&mut self) {
        for slot in self.entries.iter() {
            slot.timer.abort();
        }
    }
}
