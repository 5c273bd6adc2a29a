use futures::StreamExt;
use reelfix_core::{Episode, MediaType, Season, ShardId, StoredRecord};
use reelfix_store::*;

fn movie(id: &str, shard: u32, title: &str) -> StoredRecord {
    StoredRecord::new(id, ShardId(shard), MediaType::Movie, title)
}

fn show(id: &str, shard: u32, title: &str, episodes: u32) -> StoredRecord {
    let mut r = StoredRecord::new(id, ShardId(shard), MediaType::Tv, title);
    r.seasons = vec![Season {
        season_number: 1,
        episodes: (1..=episodes).map(Episode::new).collect(),
    }];
    r
}

#[tokio::test]
async fn insert_and_read_back() {
    let store = SqliteStore::open_memory(1).unwrap();
    let mut record = movie("m1", 1, "Inception");
    record.year = Some(2010);
    record.cast = vec!["Leonardo DiCaprio".into()];
    store.insert_record(record.clone()).await.unwrap();

    let loaded = store.get_record(&record.record_ref()).await.unwrap().unwrap();
    assert_eq!(loaded, record);
    assert_eq!(store.count(ShardId(1), MediaType::Movie).await.unwrap(), 1);
    assert_eq!(store.count(ShardId(1), MediaType::Tv).await.unwrap(), 0);
}

#[tokio::test]
async fn patch_writes_all_fields_at_once() {
    let store = SqliteStore::open_memory(1).unwrap();
    let mut record = movie("m1", 1, "Inception");
    record.description = "Existing".into();
    store.insert_record(record.clone()).await.unwrap();

    let mut patch = RecordPatch::new();
    patch.set(Field::ImdbId, FieldValue::Text("tt1375666".into()));
    patch.set(Field::Rating, FieldValue::Number(8.8));
    patch.set(Field::Genres, FieldValue::List(vec!["Action".into()]));
    let ack = store.update_record(&record.record_ref(), &patch).await.unwrap();
    assert_eq!(ack, UpdateAck { matched: true, modified: true });

    let loaded = store.get_record(&record.record_ref()).await.unwrap().unwrap();
    assert_eq!(loaded.imdb_id.as_deref(), Some("tt1375666"));
    assert_eq!(loaded.rating, 8.8);
    assert_eq!(loaded.genres, vec!["Action"]);
    assert_eq!(loaded.description, "Existing");
}

#[tokio::test]
async fn update_of_missing_record_is_unmatched() {
    let store = SqliteStore::open_memory(1).unwrap();
    let mut patch = RecordPatch::new();
    patch.set(Field::Poster, FieldValue::Text("p".into()));
    let ack = store
        .update_record(&movie("ghost", 1, "Ghost").record_ref(), &patch)
        .await
        .unwrap();
    assert!(!ack.matched);
}

#[tokio::test]
async fn episode_update_round_trip() {
    let store = SqliteStore::open_memory(1).unwrap();
    let record = show("s1", 1, "Dark", 3);
    store.insert_record(record.clone()).await.unwrap();

    let patch = EpisodePatch {
        overview: Some("A boy goes missing.".into()),
        released_at: Some("2017-12-01T05:00:00.000Z".into()),
        backdrop: None,
    };
    let ack = store
        .update_episode(&record.record_ref(), 1, 2, &patch)
        .await
        .unwrap();
    assert!(ack.matched && ack.modified);

    let loaded = store.get_record(&record.record_ref()).await.unwrap().unwrap();
    let ep = loaded.episode(1, 2).unwrap();
    assert_eq!(ep.overview, "A boy goes missing.");
    assert_eq!(ep.released_at, "2017-12-01T05:00:00.000Z");
    assert_eq!(ep.episode_backdrop, "");
    assert_eq!(loaded.episode(1, 1).unwrap().overview, "");

    let ack = store
        .update_episode(&record.record_ref(), 2, 1, &patch)
        .await
        .unwrap();
    assert!(!ack.matched);
}

#[tokio::test]
async fn records_stream_pages_through_collection() {
    let store = SqliteStore::open_memory(2).unwrap();
    let records: Vec<_> = (0..450)
        .map(|i| movie(&format!("m{i:04}"), 1, &format!("Movie {i}")))
        .chain([movie("other", 2, "Elsewhere"), show("s1", 1, "Show", 1)])
        .collect();
    assert_eq!(store.import(&records).unwrap(), 452);

    let streamed: Vec<_> = store
        .records(ShardId(1), MediaType::Movie)
        .map(|r| r.unwrap().id.0)
        .collect()
        .await;
    assert_eq!(streamed.len(), 450);
    assert_eq!(streamed.first().map(String::as_str), Some("m0000"));
    assert_eq!(streamed.last().map(String::as_str), Some("m0449"));
}

#[tokio::test]
async fn shard_count_is_discovered_from_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");
    {
        let store = SqliteStore::open(&path, Some(1)).unwrap();
        store
            .import(&[movie("a", 1, "A"), movie("b", 3, "B"), show("c", 3, "C", 2)])
            .unwrap();
    }
    let store = SqliteStore::open(&path, None).unwrap();
    assert_eq!(store.shard_count(), 3);

    let stats = store.stats().unwrap();
    assert_eq!(stats.shards.len(), 3);
    assert_eq!(stats.shards[2].movies, 1);
    assert_eq!(stats.shards[2].shows, 1);
    assert_eq!(stats.shards[2].incomplete_shows, 1);
    assert_eq!(stats.total(), 3);
}
