//! Read-only queries: counts, paging and per-shard statistics.

use reelfix_core::{Collection, MediaType, ShardId, StoredRecord};
use rusqlite::{Connection, params};

use crate::error::StoreError;

/// Record counts for one shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShardStats {
    pub shard: u32,
    pub movies: u64,
    pub shows: u64,
    /// Shows with at least one episode missing overview, air date or still
    pub incomplete_shows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub shards: Vec<ShardStats>,
}

impl StoreStats {
    pub fn total(&self) -> u64 {
        self.shards.iter().map(|s| s.movies + s.shows).sum()
    }
}

pub fn count_records(conn: &Connection, shard: ShardId, collection: Collection) -> Result<u64, StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM records WHERE shard = ?1 AND collection = ?2",
        params![shard.0, collection.short_name()],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

/// Up to `limit` records with ids greater than `after`, ordered by id.
pub fn records_page(
    conn: &Connection,
    shard: ShardId,
    collection: Collection,
    after: Option<&str>,
    limit: usize,
) -> Result<Vec<StoredRecord>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT doc FROM records
         WHERE shard = ?1 AND collection = ?2 AND (?3 IS NULL OR id > ?3)
         ORDER BY id
         LIMIT ?4",
    )?;
    let docs = stmt.query_map(
        params![shard.0, collection.short_name(), after, limit as i64],
        |row| row.get::<_, String>(0),
    )?;

    let mut records = Vec::new();
    for doc in docs {
        records.push(serde_json::from_str(&doc?)?);
    }
    Ok(records)
}

/// Highest shard number present, or 0 for an empty store.
pub fn max_shard(conn: &Connection) -> Result<u32, StoreError> {
    let max: i64 = conn.query_row("SELECT COALESCE(MAX(shard), 0) FROM records", [], |row| {
        row.get(0)
    })?;
    Ok(max.max(0) as u32)
}

/// Per-shard counts for shards `1..=shards`.
pub fn store_stats(conn: &Connection, shards: u32) -> Result<StoreStats, StoreError> {
    let mut stats = StoreStats::default();
    for n in 1..=shards {
        let shard = ShardId(n);
        let mut incomplete_shows = 0;
        let mut after: Option<String> = None;
        loop {
            let page = records_page(conn, shard, MediaType::Tv, after.as_deref(), 500)?;
            let Some(last) = page.last() else { break };
            after = Some(last.id.0.clone());
            incomplete_shows += page.iter().filter(|r| r.incomplete_episodes() > 0).count() as u64;
        }
        stats.shards.push(ShardStats {
            shard: n,
            movies: count_records(conn, shard, MediaType::Movie)?,
            shows: count_records(conn, shard, MediaType::Tv)?,
            incomplete_shows,
        });
    }
    Ok(stats)
}
