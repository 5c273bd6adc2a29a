use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::stream::{self, BoxStream, StreamExt};
use reelfix_core::{Collection, RecordId, RecordRef, ShardId, StoredRecord};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::patch::{EpisodePatch, RecordPatch};
use crate::store::{RecordStore, UpdateAck};

type Key = (ShardId, Collection, RecordId);

/// In-process store. Counts every write it receives.
#[derive(Debug)]
pub struct MemoryStore {
    shards: u32,
    records: RwLock<BTreeMap<Key, StoredRecord>>,
    record_writes: AtomicU64,
    episode_writes: AtomicU64,
}

impl MemoryStore {
    pub fn new(shards: u32) -> Self {
        Self {
            shards,
            records: RwLock::new(BTreeMap::new()),
            record_writes: AtomicU64::new(0),
            episode_writes: AtomicU64::new(0),
        }
    }

    /// Build a store pre-populated with `records`.
    pub fn with_records(shards: u32, records: impl IntoIterator<Item = StoredRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| ((r.shard, r.media_type, r.id.clone()), r))
            .collect();
        Self {
            records: RwLock::new(map),
            ..Self::new(shards)
        }
    }

    /// Number of `update_record` calls received.
    pub fn record_writes(&self) -> u64 {
        self.record_writes.load(Ordering::SeqCst)
    }

    /// Number of `update_episode` calls received.
    pub fn episode_writes(&self) -> u64 {
        self.episode_writes.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<StoredRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

fn key(target: &RecordRef) -> Key {
    (target.shard, target.collection, target.id.clone())
}

impl RecordStore for MemoryStore {
    fn shard_count(&self) -> u32 {
        self.shards
    }

    async fn count(&self, shard: ShardId, collection: Collection) -> Result<u64, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .keys()
            .filter(|(s, c, _)| *s == shard && *c == collection)
            .count() as u64)
    }

    fn records(
        &self,
        shard: ShardId,
        collection: Collection,
    ) -> BoxStream<'_, Result<StoredRecord, StoreError>> {
        stream::once(async move {
            let records = self.records.read().await;
            records
                .iter()
                .filter(|((s, c, _), _)| *s == shard && *c == collection)
                .map(|(_, r)| Ok(r.clone()))
                .collect::<Vec<_>>()
        })
        .flat_map(stream::iter)
        .boxed()
    }

    async fn get_record(&self, target: &RecordRef) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.records.read().await.get(&key(target)).cloned())
    }

    async fn update_record(
        &self,
        target: &RecordRef,
        patch: &RecordPatch,
    ) -> Result<UpdateAck, StoreError> {
        self.record_writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&key(target)) else {
            return Ok(UpdateAck::default());
        };
        patch.apply(record);
        Ok(UpdateAck {
            matched: true,
            modified: !patch.is_empty(),
        })
    }

    async fn update_episode(
        &self,
        target: &RecordRef,
        season: u32,
        episode: u32,
        patch: &EpisodePatch,
    ) -> Result<UpdateAck, StoreError> {
        self.episode_writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.write().await;
        let Some(ep) = records
            .get_mut(&key(target))
            .and_then(|r| r.episode_mut(season, episode))
        else {
            return Ok(UpdateAck::default());
        };
        patch.apply(ep);
        Ok(UpdateAck {
            matched: true,
            modified: !patch.is_empty(),
        })
    }

    async fn insert_record(&self, record: StoredRecord) -> Result<(), StoreError> {
        let key = (record.shard, record.media_type, record.id.clone());
        self.records.write().await.insert(key, record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{Field, FieldValue};
    use reelfix_core::{Episode, MediaType, Season};

    fn show() -> StoredRecord {
        let mut r = StoredRecord::new("s1", ShardId(2), MediaType::Tv, "Dark");
        r.seasons = vec![Season {
            season_number: 1,
            episodes: vec![Episode::new(1), Episode::new(2)],
        }];
        r
    }

    #[tokio::test]
    async fn records_are_filtered_by_shard_and_collection() {
        let store = MemoryStore::with_records(
            2,
            [
                StoredRecord::new("m1", ShardId(1), MediaType::Movie, "Heat"),
                StoredRecord::new("m2", ShardId(2), MediaType::Movie, "Alien"),
                show(),
            ],
        );
        let movies: Vec<_> = store.records(ShardId(2), MediaType::Movie).collect().await;
        assert_eq!(movies.len(), 1);
        assert_eq!(store.count(ShardId(2), MediaType::Tv).await.unwrap(), 1);
        assert_eq!(store.count(ShardId(1), MediaType::Tv).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_missing_record_is_unmatched() {
        let store = MemoryStore::new(1);
        let target = StoredRecord::new("nope", ShardId(1), MediaType::Movie, "x").record_ref();
        let mut patch = RecordPatch::new();
        patch.set(Field::Poster, FieldValue::Text("p".into()));
        let ack = store.update_record(&target, &patch).await.unwrap();
        assert!(!ack.matched);
        assert_eq!(store.record_writes(), 1);
    }

    #[tokio::test]
    async fn episode_update_targets_one_episode() {
        let store = MemoryStore::with_records(2, [show()]);
        let target = show().record_ref();
        let patch = EpisodePatch {
            overview: Some("Jonas...".into()),
            ..EpisodePatch::default()
        };
        let ack = store.update_episode(&target, 1, 2, &patch).await.unwrap();
        assert!(ack.matched && ack.modified);

        let stored = store.get_record(&target).await.unwrap().unwrap();
        assert_eq!(stored.episode(1, 2).unwrap().overview, "Jonas...");
        assert_eq!(stored.episode(1, 1).unwrap().overview, "");

        let ack = store.update_episode(&target, 3, 1, &patch).await.unwrap();
        assert!(!ack.matched);
    }
}
