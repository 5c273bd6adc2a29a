use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use futures::stream::{self, BoxStream, StreamExt};
use reelfix_core::{Collection, RecordRef, ShardId, StoredRecord};
use rusqlite::Connection;

use crate::error::StoreError;
use crate::operations;
use crate::patch::{EpisodePatch, RecordPatch};
use crate::queries::{self, StoreStats};
use crate::schema;
use crate::store::{RecordStore, UpdateAck};

const PAGE_SIZE: usize = 200;

/// Record store backed by a single SQLite file.
///
/// Calls are short and run under a mutex on the calling task.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    shards: u32,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// With `shards = None` the shard count is the highest shard present.
    pub fn open(path: &Path, shards: Option<u32>) -> Result<Self, StoreError> {
        let conn = schema::open_database(path)?;
        Self::from_connection(conn, shards)
    }

    pub fn open_memory(shards: u32) -> Result<Self, StoreError> {
        let conn = schema::open_memory()?;
        Self::from_connection(conn, Some(shards))
    }

    fn from_connection(conn: Connection, shards: Option<u32>) -> Result<Self, StoreError> {
        let shards = match shards {
            Some(n) => n,
            None => queries::max_shard(&conn)?,
        };
        Ok(Self {
            conn: Mutex::new(conn),
            shards,
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Bulk insert in a single transaction.
    pub fn import(&self, records: &[StoredRecord]) -> Result<usize, StoreError> {
        operations::import_records(&self.conn(), records)
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self.conn();
        let shards = self.shards.max(queries::max_shard(&conn)?);
        queries::store_stats(&conn, shards)
    }
}

struct Cursor {
    after: Option<String>,
    buffered: std::vec::IntoIter<StoredRecord>,
    done: bool,
}

impl RecordStore for SqliteStore {
    fn shard_count(&self) -> u32 {
        self.shards
    }

    async fn count(&self, shard: ShardId, collection: Collection) -> Result<u64, StoreError> {
        queries::count_records(&self.conn(), shard, collection)
    }

    fn records(
        &self,
        shard: ShardId,
        collection: Collection,
    ) -> BoxStream<'_, Result<StoredRecord, StoreError>> {
        let start = Cursor {
            after: None,
            buffered: Vec::new().into_iter(),
            done: false,
        };
        stream::unfold(start, move |mut cursor| async move {
            if let Some(record) = cursor.buffered.next() {
                return Some((Ok(record), cursor));
            }
            if cursor.done {
                return None;
            }
            let page = queries::records_page(
                &self.conn(),
                shard,
                collection,
                cursor.after.as_deref(),
                PAGE_SIZE,
            );
            match page {
                Ok(page) => {
                    cursor.done = page.len() < PAGE_SIZE;
                    cursor.after = page.last().map(|r| r.id.0.clone());
                    cursor.buffered = page.into_iter();
                    let record = cursor.buffered.next()?;
                    Some((Ok(record), cursor))
                }
                Err(e) => {
                    cursor.done = true;
                    Some((Err(e), cursor))
                }
            }
        })
        .boxed()
    }

    async fn get_record(&self, target: &RecordRef) -> Result<Option<StoredRecord>, StoreError> {
        operations::load_record(&self.conn(), target)
    }

    async fn update_record(
        &self,
        target: &RecordRef,
        patch: &RecordPatch,
    ) -> Result<UpdateAck, StoreError> {
        operations::update_record(&self.conn(), target, patch)
    }

    async fn update_episode(
        &self,
        target: &RecordRef,
        season: u32,
        episode: u32,
        patch: &EpisodePatch,
    ) -> Result<UpdateAck, StoreError> {
        operations::update_episode(&self.conn(), target, season, episode, patch)
    }

    async fn insert_record(&self, record: StoredRecord) -> Result<(), StoreError> {
        operations::upsert_record(&self.conn(), &record)
    }
}
