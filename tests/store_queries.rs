//! End-to-end tests for the catalog store: join shapes, filter and sort
//! routing, pagination windows, search semantics and fan-out degradation,
//! all against a real on-disk SQLite database.

use chrono::NaiveDate;
use producer_catalog::catalog_store::{
    Album, Artist, Credit, EntityKind, EntityMetadata, ListQuery, Producer, SortState,
    SqliteCatalogStore, StoreError, Track, TrackFilters, TrackTableQuery,
};
use tempfile::TempDir;

fn ts(year: i32, month: u32, day: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp()
}

fn producer(id: &str, name: &str) -> Producer {
    Producer {
        id: id.to_string(),
        name: name.to_string(),
        handle: None,
        contact_email: None,
        metadata: None,
    }
}

fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        followers_total: None,
        popularity: None,
        metadata: None,
    }
}

fn album(id: &str, name: &str, release_date: i64, artist_id: &str) -> Album {
    Album {
        id: id.to_string(),
        name: name.to_string(),
        release_date,
        artist_id: artist_id.to_string(),
    }
}

fn track(id: &str, name: &str, album_id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        album_id: album_id.to_string(),
    }
}

fn credit(id: &str, track_id: &str, producer_id: &str) -> Credit {
    Credit {
        id: id.to_string(),
        track_id: track_id.to_string(),
        producer_id: producer_id.to_string(),
    }
}

/// A small catalog with boundary-testing release dates:
/// - "Anti" lands exactly on 2020-01-01 (inclusive start of year 2020)
/// - "Loud" lands exactly on 2021-01-01 (excluded from year 2020)
fn seed_store() -> (TempDir, SqliteCatalogStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteCatalogStore::new(dir.path().join("catalog.db"), 2).unwrap();

    let mut forty = producer("pr-40", "40");
    forty.handle = Some("@fortywrites".to_string());
    forty.metadata = Some(EntityMetadata {
        image_url: Some("https://img.example/40.jpg".to_string()),
        genres: vec!["hip hop".to_string()],
        extra: Default::default(),
    });
    store.insert_producer(&forty).unwrap();
    store.insert_producer(&producer("pr-metro", "Metro Boomin")).unwrap();
    store.insert_producer(&producer("pr-pct", "100% Beats")).unwrap();

    store.insert_artist(&artist("ar-drake", "Drake")).unwrap();
    store.insert_artist(&artist("ar-rih", "Rihanna")).unwrap();

    store
        .insert_album(&album("al-views", "Views", ts(2020, 5, 1), "ar-drake"))
        .unwrap();
    store
        .insert_album(&album("al-clb", "Certified Lover Boy", ts(2021, 9, 3), "ar-drake"))
        .unwrap();
    store
        .insert_album(&album("al-anti", "Anti", ts(2020, 1, 1), "ar-rih"))
        .unwrap();
    store
        .insert_album(&album("al-loud", "Loud", ts(2021, 1, 1), "ar-rih"))
        .unwrap();

    store.insert_track(&track("tr-dance", "One Dance", "al-views")).unwrap();
    store.insert_track(&track("tr-hype", "Hype", "al-views")).unwrap();
    store.insert_track(&track("tr-sexy", "Way 2 Sexy", "al-clb")).unwrap();
    store.insert_track(&track("tr-work", "Work", "al-anti")).unwrap();
    store.insert_track(&track("tr-sm", "S&M", "al-loud")).unwrap();
    // No credits attached; exercises the dangling-chain drop in aggregation.
    store.insert_track(&track("tr-silent", "Interlude", "al-views")).unwrap();

    store.insert_credit(&credit("cr-1", "tr-dance", "pr-40")).unwrap();
    store.insert_credit(&credit("cr-2", "tr-hype", "pr-40")).unwrap();
    store.insert_credit(&credit("cr-3", "tr-sexy", "pr-metro")).unwrap();
    store.insert_credit(&credit("cr-4", "tr-work", "pr-40")).unwrap();
    store.insert_credit(&credit("cr-5", "tr-sm", "pr-metro")).unwrap();
    store.insert_credit(&credit("cr-6", "tr-dance", "pr-metro")).unwrap();

    (dir, store)
}

// =============================================================================
// Point lookups
// =============================================================================

#[test]
fn fetch_one_returns_not_found_for_zero_rows() {
    let (_dir, store) = seed_store();
    assert_eq!(
        store.fetch_one(EntityKind::Producer, "pr-missing"),
        Err(StoreError::NotFound)
    );
}

#[test]
fn point_lookup_round_trips_metadata() {
    let (_dir, store) = seed_store();
    let forty = store.get_producer("pr-40").unwrap().unwrap();
    assert_eq!(forty.name, "40");
    assert_eq!(forty.handle.as_deref(), Some("@fortywrites"));
    let metadata = forty.metadata.unwrap();
    assert_eq!(metadata.image_url.as_deref(), Some("https://img.example/40.jpg"));
    assert_eq!(metadata.genres, vec!["hip hop"]);
}

#[test]
fn track_resolves_its_owning_album() {
    let (_dir, store) = seed_store();
    let track = store.get_track("tr-work").unwrap().unwrap();
    assert_eq!(track.album_id, "al-anti");

    let album = store.get_album("al-anti").unwrap().unwrap();
    assert_eq!(album.artist_id, "ar-rih");
}

#[test]
fn resolved_producer_derives_credit_count() {
    let (_dir, store) = seed_store();
    let resolved = store.get_resolved_producer("pr-40").unwrap().unwrap();
    assert_eq!(resolved.track_count, 3);
    let resolved = store.get_resolved_producer("pr-pct").unwrap().unwrap();
    assert_eq!(resolved.track_count, 0);
}

// =============================================================================
// Generic lists
// =============================================================================

#[test]
fn fetch_list_applies_the_page_window() {
    let (_dir, store) = seed_store();

    let page_one = store
        .fetch_list(EntityKind::Producer, &ListQuery::page(1, 2))
        .unwrap();
    assert_eq!(page_one.len(), 2);

    let page_two = store
        .fetch_list(EntityKind::Producer, &ListQuery::page(2, 2))
        .unwrap();
    assert_eq!(page_two.len(), 1);

    // Past the end of the data is an empty page, not an error.
    let page_four = store
        .fetch_list(EntityKind::Producer, &ListQuery::page(4, 2))
        .unwrap();
    assert!(page_four.is_empty());
}

#[test]
fn fetch_list_filters_and_orders_albums() {
    let (_dir, store) = seed_store();

    let query = ListQuery::page(1, 10)
        .with_filter("artist_id", Some("ar-drake".to_string()))
        .with_order(SortState::descending("release_date"));
    let albums = store.fetch_list(EntityKind::Album, &query).unwrap();

    let ids: Vec<&str> = albums.iter().map(|a| a["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["al-clb", "al-views"]);
}

#[test]
fn fetch_list_tracks_by_album() {
    let (_dir, store) = seed_store();

    let query = ListQuery::page(1, 10).with_filter("album_id", Some("al-views".to_string()));
    let tracks = store.fetch_list(EntityKind::Track, &query).unwrap();
    assert_eq!(tracks.len(), 3);
}

#[test]
fn fetch_list_rejects_non_whitelisted_filters() {
    let (_dir, store) = seed_store();

    let query = ListQuery::page(1, 10).with_filter("name", Some("40".to_string()));
    match store.fetch_list(EntityKind::Producer, &query) {
        Err(StoreError::QueryFailed(message)) => assert!(message.contains("name")),
        other => panic!("expected QueryFailed, got {:?}", other),
    }
}

// =============================================================================
// Producer track table
// =============================================================================

fn track_query(filters: TrackFilters, sort: Option<SortState>) -> TrackTableQuery {
    TrackTableQuery {
        page: 1,
        page_size: 25,
        sort,
        filters,
    }
}

#[test]
fn producer_tracks_default_to_release_date_descending() {
    let (_dir, store) = seed_store();

    let credits = store
        .producer_track_credits("pr-40", &track_query(TrackFilters::default(), None))
        .unwrap();
    let albums: Vec<&str> = credits.iter().map(|c| c.album.id.as_str()).collect();
    // Views (2020-05) twice, then Anti (2020-01).
    assert_eq!(albums, vec!["al-views", "al-views", "al-anti"]);
    assert_eq!(credits[0].artist.name, "Drake");
}

#[test]
fn year_filter_is_a_half_open_range() {
    let (_dir, store) = seed_store();

    // Metro's credits span Views (2020-05-01), CLB (2021-09-03) and
    // Loud (exactly 2021-01-01).
    let year_2020 = store
        .producer_track_credits(
            "pr-metro",
            &track_query(
                TrackFilters {
                    year: Some(2020),
                    ..TrackFilters::default()
                },
                None,
            ),
        )
        .unwrap();
    assert_eq!(year_2020.len(), 1);
    assert_eq!(year_2020[0].album.id, "al-views");

    let year_2021 = store
        .producer_track_credits(
            "pr-metro",
            &track_query(
                TrackFilters {
                    year: Some(2021),
                    ..TrackFilters::default()
                },
                None,
            ),
        )
        .unwrap();
    let mut albums: Vec<&str> = year_2021.iter().map(|c| c.album.id.as_str()).collect();
    albums.sort();
    assert_eq!(albums, vec!["al-clb", "al-loud"]);

    // Jan 1st of 2020 is included in 2020 (inclusive start).
    let forty_2020 = store
        .producer_track_credits(
            "pr-40",
            &track_query(
                TrackFilters {
                    year: Some(2020),
                    ..TrackFilters::default()
                },
                None,
            ),
        )
        .unwrap();
    assert_eq!(forty_2020.len(), 3);
}

#[test]
fn filters_combine_with_and_semantics() {
    let (_dir, store) = seed_store();

    let credits = store
        .producer_track_credits(
            "pr-metro",
            &track_query(
                TrackFilters {
                    year: Some(2021),
                    artist_id: Some("ar-rih".to_string()),
                    album_id: None,
                },
                None,
            ),
        )
        .unwrap();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].album.id, "al-loud");
    assert_eq!(credits[0].track.name, "S&M");
}

#[test]
fn album_filter_narrows_to_one_album() {
    let (_dir, store) = seed_store();

    let credits = store
        .producer_track_credits(
            "pr-40",
            &track_query(
                TrackFilters {
                    album_id: Some("al-views".to_string()),
                    ..TrackFilters::default()
                },
                None,
            ),
        )
        .unwrap();
    assert_eq!(credits.len(), 2);
}

#[test]
fn nested_sort_paths_route_to_joined_tables() {
    let (_dir, store) = seed_store();

    let ascending = store
        .producer_track_credits(
            "pr-metro",
            &track_query(
                TrackFilters::default(),
                Some(SortState {
                    column: "album.release_date".to_string(),
                    ascending: true,
                }),
            ),
        )
        .unwrap();
    let albums: Vec<&str> = ascending.iter().map(|c| c.album.id.as_str()).collect();
    assert_eq!(albums, vec!["al-views", "al-loud", "al-clb"]);

    let by_track_name = store
        .producer_track_credits(
            "pr-metro",
            &track_query(
                TrackFilters::default(),
                Some(SortState {
                    column: "track.name".to_string(),
                    ascending: true,
                }),
            ),
        )
        .unwrap();
    let names: Vec<&str> = by_track_name.iter().map(|c| c.track.name.as_str()).collect();
    assert_eq!(names, vec!["One Dance", "S&M", "Way 2 Sexy"]);
}

#[test]
fn unknown_sort_column_falls_back_to_default_order() {
    let (_dir, store) = seed_store();

    let credits = store
        .producer_track_credits(
            "pr-40",
            &track_query(
                TrackFilters::default(),
                Some(SortState::descending("drop tables")),
            ),
        )
        .unwrap();
    assert_eq!(credits.len(), 3);
    assert_eq!(credits[0].album.id, "al-views");
}

#[test]
fn track_table_pagination_windows() {
    let (_dir, store) = seed_store();

    let query = TrackTableQuery {
        page: 2,
        page_size: 2,
        sort: None,
        filters: TrackFilters::default(),
    };
    let page_two = store.producer_track_credits("pr-40", &query).unwrap();
    assert_eq!(page_two.len(), 1);

    let query = TrackTableQuery {
        page: 5,
        page_size: 2,
        sort: None,
        filters: TrackFilters::default(),
    };
    let empty = store.producer_track_credits("pr-40", &query).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn missing_producer_is_not_found() {
    let (_dir, store) = seed_store();
    assert_eq!(
        store.producer_track_credits("pr-missing", &TrackTableQuery::default()),
        Err(StoreError::NotFound)
    );
}

// =============================================================================
// Artist connections
// =============================================================================

#[test]
fn artist_producers_fold_counts_and_sort_descending() {
    let (_dir, store) = seed_store();

    let connected = store.artist_producers("ar-drake", 1, 10).unwrap();
    let tallies: Vec<(&str, usize)> = connected
        .iter()
        .map(|c| (c.entity.id.as_str(), c.track_count))
        .collect();
    // Both producers contribute two credits across Drake's albums; the tie
    // keeps first-seen order (cr-1 for 40 precedes cr-6 for Metro on the
    // same track). The uncredited interlude track is dropped, not counted.
    assert_eq!(tallies, vec![("pr-40", 2), ("pr-metro", 2)]);
}

#[test]
fn artist_producers_paginate_at_the_album_level() {
    let (_dir, store) = seed_store();

    // Page 1 of one album per page: the newest album (CLB) only.
    let newest = store.artist_producers("ar-drake", 1, 1).unwrap();
    let tallies: Vec<(&str, usize)> = newest
        .iter()
        .map(|c| (c.entity.id.as_str(), c.track_count))
        .collect();
    assert_eq!(tallies, vec![("pr-metro", 1)]);

    // Page 2 is Views: 40 twice, Metro once.
    let older = store.artist_producers("ar-drake", 2, 1).unwrap();
    let tallies: Vec<(&str, usize)> = older
        .iter()
        .map(|c| (c.entity.id.as_str(), c.track_count))
        .collect();
    assert_eq!(tallies, vec![("pr-40", 2), ("pr-metro", 1)]);

    // Past the discography: empty, not an error.
    assert!(store.artist_producers("ar-drake", 5, 1).unwrap().is_empty());
}

#[test]
fn missing_artist_is_not_found() {
    let (_dir, store) = seed_store();
    assert_eq!(
        store.artist_producers("ar-missing", 1, 10),
        Err(StoreError::NotFound)
    );
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn search_is_case_insensitive_substring() {
    let (_dir, store) = seed_store();

    let hits = store.search_by_name("DRA", EntityKind::Artist, 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Drake");
    assert_eq!(hits[0]["kind"], "artist");
}

#[test]
fn search_respects_the_limit() {
    let (_dir, store) = seed_store();
    // Four seeded track names contain an "e"; the limit caps the page.
    let hits = store.search_by_name("e", EntityKind::Track, 2).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn blank_search_short_circuits_to_empty() {
    let (_dir, store) = seed_store();
    assert!(store.search_by_name("", EntityKind::Artist, 10).unwrap().is_empty());
    assert!(store.search_by_name("   ", EntityKind::Artist, 10).unwrap().is_empty());
}

#[test]
fn like_wildcards_match_literally() {
    let (_dir, store) = seed_store();

    // "0%" must match "100% Beats" as a literal substring and nothing else,
    // not act as a wildcard that swallows every producer.
    let hits = store.search_by_name("0%", EntityKind::Producer, 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "100% Beats");
}

#[tokio::test]
async fn search_across_fans_out_per_kind() {
    let (_dir, store) = seed_store();

    let kinds = [
        EntityKind::Producer,
        EntityKind::Artist,
        EntityKind::Album,
        EntityKind::Track,
    ];
    let results = store.search_across("an", &kinds, 10).await;

    assert_eq!(results.len(), kinds.len());
    // "an" hits Rihanna, Anti and One Dance but no producer; the producer
    // entry is present and empty rather than missing.
    assert!(results[&EntityKind::Producer].is_empty());
    assert_eq!(results[&EntityKind::Artist].len(), 1);
    assert!(!results[&EntityKind::Album].is_empty());
    assert!(!results[&EntityKind::Track].is_empty());
}

// =============================================================================
// Stats
// =============================================================================

#[tokio::test]
async fn database_stats_count_concurrently() {
    let (_dir, store) = seed_store();
    let stats = store.database_stats().await;
    assert_eq!(stats.producers, 3);
    assert_eq!(stats.artists, 2);
    assert_eq!(stats.tracks, 6);
}

// =============================================================================
// Reopen
// =============================================================================

#[test]
fn catalog_survives_reopen_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    {
        let store = SqliteCatalogStore::new(&path, 1).unwrap();
        store.insert_artist(&artist("ar-1", "Kaytranada")).unwrap();
    }
    let store = SqliteCatalogStore::new(&path, 1).unwrap();
    assert_eq!(store.get_artist("ar-1").unwrap().unwrap().name, "Kaytranada");
}
