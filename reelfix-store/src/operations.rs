//! Document reads and writes against the `records` table.

use reelfix_core::{RecordRef, StoredRecord};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StoreError;
use crate::patch::{EpisodePatch, RecordPatch};
use crate::store::UpdateAck;

/// Insert or replace a whole record document.
pub fn upsert_record(conn: &Connection, record: &StoredRecord) -> Result<(), StoreError> {
    let doc = serde_json::to_string(record)?;
    conn.execute(
        "INSERT INTO records (id, shard, collection, doc, updated_at)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))
         ON CONFLICT(shard, collection, id) DO UPDATE SET
             doc = excluded.doc,
             updated_at = excluded.updated_at",
        params![
            record.id.0,
            record.shard.0,
            record.media_type.short_name(),
            doc
        ],
    )?;
    Ok(())
}

/// Insert many records in one transaction. Returns the number written.
pub fn import_records(conn: &Connection, records: &[StoredRecord]) -> Result<usize, StoreError> {
    let tx = conn.unchecked_transaction()?;
    for record in records {
        upsert_record(&tx, record)?;
    }
    tx.commit()?;
    Ok(records.len())
}

pub fn load_record(conn: &Connection, target: &RecordRef) -> Result<Option<StoredRecord>, StoreError> {
    let doc: Option<String> = conn
        .query_row(
            "SELECT doc FROM records WHERE shard = ?1 AND collection = ?2 AND id = ?3",
            params![target.shard.0, target.collection.short_name(), target.id.0],
            |row| row.get(0),
        )
        .optional()?;
    doc.map(|d| serde_json::from_str(&d))
        .transpose()
        .map_err(StoreError::from)
}

/// Read, patch and write back one document inside a transaction.
pub fn update_record(
    conn: &Connection,
    target: &RecordRef,
    patch: &RecordPatch,
) -> Result<UpdateAck, StoreError> {
    modify(conn, target, |record| {
        patch.apply(record);
        Some(!patch.is_empty())
    })
}

/// Patch one episode of a show document inside a transaction.
pub fn update_episode(
    conn: &Connection,
    target: &RecordRef,
    season: u32,
    episode: u32,
    patch: &EpisodePatch,
) -> Result<UpdateAck, StoreError> {
    modify(conn, target, |record| {
        let ep = record.episode_mut(season, episode)?;
        patch.apply(ep);
        Some(!patch.is_empty())
    })
}

/// Apply `change` to the stored document.
///
/// `change` returns `None` when its target inside the document is missing,
/// otherwise whether it altered anything. Unchanged documents are not
/// rewritten.
fn modify(
    conn: &Connection,
    target: &RecordRef,
    change: impl FnOnce(&mut StoredRecord) -> Option<bool>,
) -> Result<UpdateAck, StoreError> {
    let tx = conn.unchecked_transaction()?;
    let Some(mut record) = load_record(&tx, target)? else {
        return Ok(UpdateAck::default());
    };
    let Some(modified) = change(&mut record) else {
        return Ok(UpdateAck::default());
    };
    if modified {
        let doc = serde_json::to_string(&record)?;
        tx.execute(
            "UPDATE records SET doc = ?1, updated_at = datetime('now')
             WHERE shard = ?2 AND collection = ?3 AND id = ?4",
            params![doc, target.shard.0, target.collection.short_name(), target.id.0],
        )?;
    }
    tx.commit()?;
    Ok(UpdateAck {
        matched: true,
        modified,
    })
}
