//! Full-replace snapshot streams for real-time clients.
//!
//! Publishers push a complete per-user collection after every mutation;
//! the hub deduplicates entities by id within one snapshot, suppresses
//! snapshots identical to the previous one, and fans the rest out over
//! a broadcast channel. Consumers therefore tolerate duplicate and
//! redundant delivery by construction.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::models::habit::Habit;

/// Snapshot channel capacity per user; slow consumers observe a lagged
/// stream and simply pick up the next full snapshot
const CHANNEL_CAPACITY: usize = 16;

/// Entities carried by a snapshot stream
pub trait Identified {
    fn entity_id(&self) -> Uuid;
}

impl Identified for Habit {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

struct UserChannel<T> {
    tx: broadcast::Sender<Vec<T>>,
    last: Option<Vec<T>>,
}

/// Per-user broadcast hub of full-collection snapshots
pub struct SnapshotHub<T> {
    channels: Mutex<HashMap<Uuid, UserChannel<T>>>,
}

impl<T> Default for SnapshotHub<T>
where
    T: Identified + Clone + PartialEq + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotHub<T>
where
    T: Identified + Clone + PartialEq + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Publish a fresh snapshot for a user. Entities sharing an id keep
    /// their first occurrence; a snapshot equal to the previous one is
    /// dropped entirely.
    pub fn publish(&self, user_id: Uuid, snapshot: Vec<T>) {
        let mut deduped: Vec<T> = Vec::with_capacity(snapshot.len());
        for entity in snapshot {
            if !deduped.iter().any(|e| e.entity_id() == entity.entity_id()) {
                deduped.push(entity);
            }
        }

        let mut channels = self.channels.lock().unwrap();
        let channel = channels.entry(user_id).or_insert_with(|| UserChannel {
            tx: broadcast::channel(CHANNEL_CAPACITY).0,
            last: None,
        });

        if channel.last.as_ref() == Some(&deduped) {
            return;
        }

        // A send error only means no subscriber is currently listening
        let _ = channel.tx.send(deduped.clone());
        channel.last = Some(deduped);
    }

    /// Subscribe to a user's snapshot stream
    pub fn subscribe(&self, user_id: Uuid) -> BroadcastStream<Vec<T>> {
        let mut channels = self.channels.lock().unwrap();
        let channel = channels.entry(user_id).or_insert_with(|| UserChannel {
            tx: broadcast::channel(CHANNEL_CAPACITY).0,
            last: None,
        });
        BroadcastStream::new(channel.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::habit::Frequency;
    use chrono::{NaiveDate, Utc};
    use tokio_stream::StreamExt;

    fn habit(id: Uuid) -> Habit {
        Habit {
            id,
            user_id: Uuid::new_v4(),
            title: "Run".to_string(),
            category: "Health".to_string(),
            frequency: Frequency::Daily,
            selected_days: Vec::new(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            completed_dates: Vec::new(),
            current_streak: 0,
            best_streak: 0,
            total_completions: 0,
            enable_reminder: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_snapshot() {
        let hub: SnapshotHub<Habit> = SnapshotHub::new();
        let user_id = Uuid::new_v4();
        let mut stream = hub.subscribe(user_id);

        let h = habit(Uuid::new_v4());
        hub.publish(user_id, vec![h.clone()]);

        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received, vec![h]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_deduplicated_within_snapshot() {
        let hub: SnapshotHub<Habit> = SnapshotHub::new();
        let user_id = Uuid::new_v4();
        let mut stream = hub.subscribe(user_id);

        let h = habit(Uuid::new_v4());
        hub.publish(user_id, vec![h.clone(), h.clone()]);

        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_identical_snapshot_suppressed() {
        let hub: SnapshotHub<Habit> = SnapshotHub::new();
        let user_id = Uuid::new_v4();
        let mut stream = hub.subscribe(user_id);

        let first = habit(Uuid::new_v4());
        hub.publish(user_id, vec![first.clone()]);
        hub.publish(user_id, vec![first.clone()]);
        let second = habit(Uuid::new_v4());
        hub.publish(user_id, vec![first.clone(), second]);

        // The repeated snapshot never reaches the stream
        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received.len(), 1);
        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received.len(), 2);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let hub: SnapshotHub<Habit> = SnapshotHub::new();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let mut stream_b = hub.subscribe(user_b);

        hub.publish(user_a, vec![habit(Uuid::new_v4())]);
        hub.publish(user_b, vec![]);

        let received = stream_b.next().await.unwrap().unwrap();
        assert!(received.is_empty());
    }
}
