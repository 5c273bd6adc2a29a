use super::*;
use reelfix_core::{MediaType, ShardId};

fn stored() -> StoredRecord {
    StoredRecord::new("r1", ShardId(1), MediaType::Movie, "Inception")
}

fn imdb_candidate() -> CanonicalRecord {
    CanonicalRecord {
        imdb_id: Some("tt1375666".into()),
        title: "Inception".into(),
        rating: 8.8,
        description: "A thief who steals corporate secrets...".into(),
        poster: "https://images.metahub.space/poster/small/tt1375666/img".into(),
        backdrop: "https://images.metahub.space/background/medium/tt1375666/img".into(),
        logo: "https://images.metahub.space/logo/medium/tt1375666/img".into(),
        cast: vec!["Leonardo DiCaprio".into()],
        genres: vec!["Action".into(), "Sci-Fi".into()],
        runtime: "2h 28m".into(),
        media_type: Some(MediaType::Movie),
        ..CanonicalRecord::default()
    }
}

#[test]
fn empty_record_takes_every_candidate_field() {
    let patch = reconcile(&stored(), &[imdb_candidate()]);
    assert_eq!(patch.get(Field::ImdbId), Some(&FieldValue::Text("tt1375666".into())));
    assert_eq!(patch.get(Field::Rating), Some(&FieldValue::Number(8.8)));
    assert_eq!(patch.get(Field::TmdbId), None);
    assert_eq!(patch.len(), 9);
}

#[test]
fn existing_values_are_never_overwritten() {
    let mut record = stored();
    record.description = "Curated synopsis".into();
    record.rating = 9.1;
    record.cast = vec!["Someone".into()];

    let patch = reconcile(&record, &[imdb_candidate()]);
    assert!(patch.get(Field::Description).is_none());
    assert!(patch.get(Field::Rating).is_none());
    assert!(patch.get(Field::Cast).is_none());
    assert!(patch.get(Field::Poster).is_some());
}

#[test]
fn whitespace_counts_as_empty() {
    let mut record = stored();
    record.description = "   ".into();
    let patch = reconcile(&record, &[imdb_candidate()]);
    assert!(patch.get(Field::Description).is_some());
}

#[test]
fn first_non_empty_candidate_wins_per_field() {
    let primary = CanonicalRecord {
        description: String::new(),
        poster: "primary-poster".into(),
        ..CanonicalRecord::default()
    };
    let secondary = CanonicalRecord {
        tmdb_id: Some(27205),
        description: "secondary synopsis".into(),
        poster: "secondary-poster".into(),
        ..CanonicalRecord::default()
    };
    let patch = reconcile(&stored(), &[primary, secondary]);
    assert_eq!(patch.get(Field::Poster), Some(&FieldValue::Text("primary-poster".into())));
    assert_eq!(
        patch.get(Field::Description),
        Some(&FieldValue::Text("secondary synopsis".into()))
    );
    assert_eq!(patch.get(Field::TmdbId), Some(&FieldValue::Id(27205)));
}

#[test]
fn applying_patch_makes_next_merge_empty() {
    let mut record = stored();
    let candidates = [imdb_candidate()];
    let patch = reconcile(&record, &candidates);
    assert!(!patch.is_empty());
    patch.apply(&mut record);
    assert!(reconcile(&record, &candidates).is_empty());
}

#[test]
fn no_candidates_means_no_patch() {
    assert!(reconcile(&stored(), &[]).is_empty());
}

#[test]
fn blank_list_entries_are_dropped() {
    let candidate = CanonicalRecord {
        cast: vec![" ".into(), String::new()],
        genres: vec!["Drama".into(), "".into()],
        ..CanonicalRecord::default()
    };
    let patch = reconcile(&stored(), &[candidate]);
    assert!(patch.get(Field::Cast).is_none());
    assert_eq!(patch.get(Field::Genres), Some(&FieldValue::List(vec!["Drama".into()])));
}

#[test]
fn episode_fill_only() {
    let mut ep = Episode::new(2);
    ep.overview = "Kept".into();
    let candidate = EpisodeRecord {
        season_number: 1,
        episode_number: 2,
        episode_title: "The Kingsroad".into(),
        episode_overview: "Replaced?".into(),
        episode_backdrop: "https://image.tmdb.org/t/p/original/x.jpg".into(),
        episode_released_at: String::new(),
    };
    let patch = reconcile_episode(&ep, &[candidate]);
    assert_eq!(patch.overview, None);
    assert_eq!(patch.released_at, None);
    assert_eq!(patch.backdrop.as_deref(), Some("https://image.tmdb.org/t/p/original/x.jpg"));
}

#[test]
fn episode_fields_come_from_first_non_empty_candidate() {
    let ep = Episode::new(1);
    let primary = EpisodeRecord {
        season_number: 1,
        episode_number: 1,
        episode_overview: "Lord Stark...".into(),
        ..EpisodeRecord::default()
    };
    let secondary = EpisodeRecord {
        season_number: 1,
        episode_number: 1,
        episode_overview: "Ned Stark...".into(),
        episode_backdrop: "https://image.tmdb.org/t/p/original/s.jpg".into(),
        episode_released_at: "2011-04-17T05:00:00.000Z".into(),
        ..EpisodeRecord::default()
    };
    let patch = reconcile_episode(&ep, &[primary, secondary]);
    assert_eq!(patch.overview.as_deref(), Some("Lord Stark..."));
    assert_eq!(patch.backdrop.as_deref(), Some("https://image.tmdb.org/t/p/original/s.jpg"));
    assert_eq!(patch.released_at.as_deref(), Some("2011-04-17T05:00:00.000Z"));
    assert!(reconcile_episode(&ep, &[]).is_empty());
}
