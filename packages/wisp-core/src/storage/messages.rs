//! Short-lived message board.
//!
//! Messages are kept in plaintext. They share the file store's lifecycle
//! rules minus encryption and single-use reads: an expired message is
//! invisible to every read even before the sweeper removes it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use zeroize::Zeroize;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::id::IdGenerator;

/// A posted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier
    pub id: String,
    /// Message body
    pub content: String,
    /// Caller-supplied sender label
    pub sender_id: String,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
    /// When the message stops being visible
    pub expires_at: DateTime<Utc>,
    /// Insertion order, breaks timestamp ties
    #[serde(skip)]
    seq: u64,
}

impl Message {
    /// Whether the TTL has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    fn scrub(&mut self) {
        self.content.zeroize();
        self.sender_id.zeroize();
    }
}

/// Concurrent RAM-only message store.
#[derive(Clone)]
pub struct MessageStore {
    /// Maps id → message
    messages: Arc<DashMap<String, Message>>,
    next_seq: Arc<AtomicU64>,
    ids: IdGenerator,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl MessageStore {
    /// Create a store driven by the system clock.
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store reading time from `clock`.
    pub fn with_clock(config: &StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
            ids: IdGenerator::new(config.message_id_length, config.max_id_attempts),
            ttl: config.message_ttl(),
            clock,
        }
    }

    /// Lifetime applied to new messages.
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Post a message under a fresh id.
    ///
    /// Content and sender are stored as given; rejecting blanks is the
    /// caller's job.
    pub fn send(&self, content: &str, sender_id: &str) -> Result<Message> {
        let timestamp = self.clock.now();
        let expires_at = timestamp
            .checked_add_signed(self.ttl)
            .ok_or(Error::ExpiryOutOfRange)?;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let build = |id: &str| Message {
            id: id.to_string(),
            content: content.to_string(),
            sender_id: sender_id.to_string(),
            timestamp,
            expires_at,
            seq,
        };

        let id = self
            .ids
            .generate_with(|candidate| match self.messages.entry(candidate.to_string()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(build(candidate));
                    true
                }
            })?;

        Ok(build(&id))
    }

    /// All live messages, oldest first.
    pub fn get_all(&self) -> Vec<Message> {
        let now = self.clock.now();
        let mut live: Vec<Message> = self
            .messages
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| entry.value().clone())
            .collect();
        live.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.seq.cmp(&b.seq)));
        live
    }

    /// A single live message.
    pub fn get(&self, id: &str) -> Option<Message> {
        let now = self.clock.now();
        self.messages
            .get(id)
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| entry.value().clone())
    }

    /// Remove a message. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> bool {
        match self.messages.remove(id) {
            Some((_, mut message)) => {
                message.scrub();
                true
            }
            None => false,
        }
    }

    /// Number of live (unexpired) messages.
    pub fn count(&self) -> usize {
        let now = self.clock.now();
        self.messages
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    /// Remove every message. Returns how many were cleared.
    pub fn clear_all(&self) -> usize {
        let mut cleared = 0;
        self.messages.retain(|_, message| {
            message.scrub();
            cleared += 1;
            false
        });
        cleared
    }

    /// Evict expired messages.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut evicted = 0;
        self.messages.retain(|_, message| {
            if message.is_expired(now) {
                message.scrub();
                evicted += 1;
                false
            } else {
                true
            }
        });
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn test_store() -> (MessageStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let store = MessageStore::with_clock(&StoreConfig::default(), clock.clone());
        (store, clock)
    }

    #[test]
    fn test_send_and_get() {
        let (store, clock) = test_store();

        let message = store.send("hello", "alice").unwrap();
        assert_eq!(message.id.len(), 8);
        assert_eq!(message.content, "hello");
        assert_eq!(message.sender_id, "alice");
        assert_eq!(message.timestamp, clock.now());
        assert_eq!(message.expires_at, clock.now() + chrono::Duration::minutes(60));

        assert_eq!(store.get(&message.id), Some(message.clone()));
        assert_eq!(store.get_all(), vec![message]);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_get_all_is_ordered() {
        let (store, clock) = test_store();

        let first = store.send("one", "alice").unwrap();
        clock.advance(chrono::Duration::seconds(1));
        let second = store.send("two", "bob").unwrap();
        // Same timestamp as `second`; insertion order decides
        let third = store.send("three", "carol").unwrap();

        let ids: Vec<String> = store.get_all().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[test]
    fn test_expired_messages_are_invisible() {
        let (store, clock) = test_store();
        let message = store.send("hello", "alice").unwrap();

        clock.advance(chrono::Duration::minutes(59));
        assert!(store.get(&message.id).is_some());

        clock.advance(chrono::Duration::minutes(2));
        assert!(store.get(&message.id).is_none());
        assert!(store.get_all().is_empty());
        assert_eq!(store.count(), 0);

        assert_eq!(store.sweep(), 1);
        assert_eq!(store.sweep(), 0);
    }

    #[test]
    fn test_sweep_keeps_live_messages() {
        let (store, clock) = test_store();
        store.send("old", "alice").unwrap();
        clock.advance(chrono::Duration::minutes(45));
        let fresh = store.send("fresh", "bob").unwrap();
        clock.advance(chrono::Duration::minutes(20));

        assert_eq!(store.sweep(), 1);
        assert_eq!(store.get_all(), vec![fresh]);
    }

    #[test]
    fn test_delete_and_clear() {
        let (store, _) = test_store();
        let a = store.send("a", "alice").unwrap();
        store.send("b", "bob").unwrap();
        store.send("c", "carol").unwrap();

        assert!(store.delete(&a.id));
        assert!(!store.delete(&a.id));
        assert!(store.get(&a.id).is_none());
        assert_eq!(store.count(), 2);

        assert_eq!(store.clear_all(), 2);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_store_does_not_validate() {
        let (store, _) = test_store();
        let message = store.send("", "").unwrap();
        assert_eq!(store.get(&message.id).unwrap().content, "");
    }

    #[test]
    fn test_serializes_camel_case() {
        let (store, _) = test_store();
        let message = store.send("hi", "alice").unwrap();
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["senderId"], "alice");
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("seq").is_none());
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let (store, clock) = test_store();
        clock.set(DateTime::<Utc>::MAX_UTC);

        let err = store.send("late", "alice").unwrap_err();
        assert_eq!(err, crate::error::Error::ExpiryOutOfRange);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let config = StoreConfig {
            message_ttl_secs: i64::MAX,
            ..StoreConfig::default()
        };
        let store = MessageStore::new(&config);
        let message = store.send("hi", "alice").unwrap();
        assert_eq!(
            message.expires_at - message.timestamp,
            chrono::Duration::seconds(crate::config::MAX_TTL_SECS)
        );
    }
}
