use std::future::Future;

use futures::stream::BoxStream;
use reelfix_core::{Collection, RecordRef, ShardId, StoredRecord};

use crate::error::StoreError;
use crate::patch::{EpisodePatch, RecordPatch};

/// Result of an update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateAck {
    /// The target document (and episode, for episode updates) exists
    pub matched: bool,
    /// At least one field was written
    pub modified: bool,
}

/// A sharded document store holding one movie and one tv collection per
/// shard. Shards are numbered `1..=shard_count()`.
pub trait RecordStore: Send + Sync + 'static {
    fn shard_count(&self) -> u32;

    fn count(
        &self,
        shard: ShardId,
        collection: Collection,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Stream every record in a collection.
    fn records(
        &self,
        shard: ShardId,
        collection: Collection,
    ) -> BoxStream<'_, Result<StoredRecord, StoreError>>;

    fn get_record(
        &self,
        target: &RecordRef,
    ) -> impl Future<Output = Result<Option<StoredRecord>, StoreError>> + Send;

    /// Apply all fields of `patch` in a single atomic write.
    fn update_record(
        &self,
        target: &RecordRef,
        patch: &RecordPatch,
    ) -> impl Future<Output = Result<UpdateAck, StoreError>> + Send;

    /// Apply `patch` to one episode inside a show document.
    fn update_episode(
        &self,
        target: &RecordRef,
        season: u32,
        episode: u32,
        patch: &EpisodePatch,
    ) -> impl Future<Output = Result<UpdateAck, StoreError>> + Send;

    /// Insert or replace a whole record.
    fn insert_record(
        &self,
        record: StoredRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
