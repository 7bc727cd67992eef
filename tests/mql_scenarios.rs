//! End-to-end MQL scenarios against the in-memory store

use muzak::query::{Command, MatchMode};
use muzak::{
    EngineConfig, MemoryStorage, PropertyValue, QueryError, QueryExecutor, Record, RecordId, Tag,
};
use proptest::prelude::*;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn track(path: &str, title: &str, artist: &str, album: &str) -> Record {
    Record::new(
        path,
        Tag::new()
            .with("title", title)
            .with("artist", artist)
            .with("album", album),
    )
}

fn library() -> Arc<MemoryStorage> {
    init_tracing();
    Arc::new(
        vec![
            track("abc.mp3", "Old Title", "Unknown Artist", "Unknown"),
            track("muse/01.flac", "Uprising", "Muse", "The Resistance"),
            track("muse/02.flac", "Resistance", "Muse", "The Resistance"),
            track("radiohead/01.flac", "Airbag", "Radiohead", "OK Computer"),
            track("xyz.ogg", "Demo", "Unknown Artist", "Unknown"),
        ]
        .into_iter()
        .collect(),
    )
}

#[test]
fn test_select_with_limit() {
    let executor = QueryExecutor::new(library());
    let result = executor
        .execute("select (title,artist) where {artist=Muse} limit 1")
        .unwrap();

    let entries: Vec<_> = result.entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].tag,
        Tag::new().with("title", "Uprising").with("artist", "Muse")
    );
}

#[test]
fn test_show_labels() {
    let executor = QueryExecutor::new(library());
    let result = executor.execute("show labels").unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.property_value(),
        Some(&PropertyValue::from(vec!["album", "artist", "title"]))
    );
}

#[test]
fn test_delete_then_select() {
    let storage = library();
    let executor = QueryExecutor::new(storage.clone());

    let deleted = executor
        .execute("delete (title) where {album=Unknown}")
        .unwrap();
    assert_eq!(deleted.changed_count(), 2);
    assert_eq!(storage.len().unwrap(), 3);

    let after = executor
        .execute("select (title) where {album=Unknown}")
        .unwrap();
    assert!(after.is_empty());
}

#[test]
fn test_update_by_path() {
    let storage = library();
    let executor = QueryExecutor::new(storage.clone());

    let result = executor
        .execute("update (title=New Title) where {path=abc.mp3}")
        .unwrap();
    assert_eq!(result.changed_count(), 1);

    let tag = storage.get(&RecordId::from("abc.mp3")).unwrap().unwrap();
    assert_eq!(tag.get("title"), Some("New Title"));
    assert_eq!(tag.get("artist"), Some("Unknown Artist"));
}

#[test]
fn test_unterminated_parenthesis() {
    let executor = QueryExecutor::new(library());
    let err = executor
        .execute("select (title where {artist=Muse}")
        .unwrap_err();

    let err = err.as_query_error().unwrap();
    assert_eq!(err.kind(), "UnterminatedGrouping");
    assert_eq!(err.position(), Some(7));
}

#[test]
fn test_select_without_where() {
    let executor = QueryExecutor::new(library());
    let result = executor.execute("select [title,album]").unwrap();

    assert_eq!(result.len(), 5);
    for entry in result.entries() {
        let labels: Vec<&str> = entry.tag.labels().collect();
        assert_eq!(labels, vec!["album", "title"]);
    }
}

#[test]
fn test_eager_versus_strict() {
    init_tracing();
    let storage = Arc::new(MemoryStorage::from_records(vec![Record::new(
        "pop.mp3",
        Tag::new().with("genre", "Pop"),
    )]));
    let executor = QueryExecutor::new(storage);

    let eager = executor
        .execute("select () where {genre=Rock,genre=Pop}")
        .unwrap();
    assert_eq!(eager.len(), 1);

    let strict = executor.execute("select () where &{genre=Rock}").unwrap();
    assert!(strict.is_empty());
}

#[test]
fn test_null_sentinel_matches_missing_labels() {
    let storage = library();
    storage
        .insert(Record::new(
            "tagged.mp3",
            Tag::new().with("title", "Tagged").with("isrc", "USRC17607839"),
        ))
        .unwrap();
    storage
        .insert(Record::new("blank.mp3", Tag::new().with_null("isrc")))
        .unwrap();
    let executor = QueryExecutor::new(storage);

    let result = executor.execute("select () where {isrc=\\Null}").unwrap();
    let ids: Vec<&str> = result.entries().map(|e| e.id.as_str()).collect();

    assert_eq!(ids.len(), 6);
    assert!(!ids.contains(&"tagged.mp3"));
    assert!(ids.contains(&"blank.mp3"));
}

#[test]
fn test_two_matching_labels_yield_one_entry() {
    init_tracing();
    let storage = Arc::new(MemoryStorage::from_records(vec![Record::new(
        "uprising.mp3",
        Tag::new()
            .with("title", "Uprising")
            .with("artist", "Muse")
            .with("genre", "Rock"),
    )]));
    let executor = QueryExecutor::new(storage);

    let result = executor
        .execute("select (title) where {artist=Muse,genre=Rock}")
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.stats.records_matched, 1);
}

#[test]
fn test_limit_skips_non_matches() {
    init_tracing();
    let storage = Arc::new(MemoryStorage::from_records(vec![
        Record::new("1.mp3", Tag::new().with("genre", "Rock")),
        Record::new("2.mp3", Tag::new().with("genre", "Jazz")),
        Record::new("3.mp3", Tag::new().with("genre", "Rock")),
        Record::new("4.mp3", Tag::new().with("genre", "Jazz")),
        Record::new("5.mp3", Tag::new().with("genre", "Rock")),
    ]));
    let executor = QueryExecutor::new(storage);

    let result = executor
        .execute("select () where {genre=Rock} limit 2")
        .unwrap();
    let ids: Vec<&str> = result.entries().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1.mp3", "3.mp3"]);
}

#[test]
fn test_multi_query_buffer() {
    let storage = library();
    let executor = QueryExecutor::new(storage.clone());

    let results = executor
        .execute_all(
            "update (album=\\Null) where {artist=Unknown Artist};\n\
             select (album) where {album=\\Null};\n\
             show count;",
        )
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].changed_count(), 2);
    assert_eq!(results[1].len(), 2);
    assert_eq!(results[2].property_value(), Some(&PropertyValue::Integer(5)));
}

#[test]
fn test_rendering() {
    let executor = QueryExecutor::new(library());
    let result = executor
        .execute("select (title) where {artist=Radiohead}")
        .unwrap();

    assert_eq!(
        result.to_json().unwrap(),
        serde_json::json!([{"id": "radiohead/01.flac", "tag": {"title": "Airbag"}}])
    );

    let table = result.to_table();
    assert!(table.contains("radiohead/01.flac"));
    assert!(table.contains("Airbag"));
}

#[test]
fn test_parse_descriptor() {
    let query = muzak::parse("delete (title) where &{album=Unknown} limit 3").unwrap();
    assert_eq!(query.command, Command::Delete);
    assert_eq!(query.match_mode(), MatchMode::Strict);
    assert_eq!(query.limit, 3);

    let err = muzak::parse("select (title) limit ten").unwrap_err();
    assert!(matches!(err, QueryError::UnexpectedNodeType { .. }));
}

#[test]
fn test_interactive_config() {
    let executor = QueryExecutor::with_config(library(), EngineConfig::for_interactive(3));
    assert_eq!(executor.execute("select ()").unwrap().len(), 3);
}

proptest! {
    #[test]
    fn test_lexer_is_total(input in r"[a-zA-Z0-9 _./~\-\\,=&*(){}\[\];]{0,48}") {
        // Either a node sequence or a typed error; never a panic
        let _ = muzak::query::tokenize(&input);
        let _ = muzak::parse_all(&input);
    }

    #[test]
    fn test_select_is_idempotent(
        artist in "(Muse|Radiohead|Unknown Artist|Nobody)",
        limit in 0usize..4,
    ) {
        let executor = QueryExecutor::new(library());
        let text = format!("select (title) where {{artist={}}} limit {}", artist, limit);

        let first = executor.execute(&text).unwrap();
        let second = executor.execute(&text).unwrap();
        prop_assert_eq!(first, second);
    }
}
