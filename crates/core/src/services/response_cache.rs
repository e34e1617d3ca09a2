use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::response::FeedResponse;

/// Single-slot, time-boxed cache of the last feed response.
///
/// Owned by the `FeedService` rather than living in a global. Concurrent
/// requests may overwrite each other (last writer wins); the TTL is checked on
/// every read.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    slot: Mutex<Option<(DateTime<Utc>, FeedResponse)>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<FeedResponse> {
        self.get_at(Utc::now())
    }

    /// The stored response if it was stored less than `ttl` before `now`.
    pub fn get_at(&self, now: DateTime<Utc>) -> Option<FeedResponse> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        let (stored_at, response) = slot.as_ref()?;
        let ttl = chrono::Duration::from_std(self.ttl).ok()?;
        if now.signed_duration_since(*stored_at) < ttl {
            Some(response.clone())
        } else {
            None
        }
    }

    pub fn put(&self, response: FeedResponse) {
        self.put_at(Utc::now(), response);
    }

    pub fn put_at(&self, now: DateTime<Utc>, response: FeedResponse) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some((now, response));
    }
}
