use serde_json::json;
use std::sync::Arc;
use tradecalc_core::{
    KeyValueStore, LogLevel, LogStore, MemoryDiagnosticSink, MemoryKeyValueStore, Namespacer,
    StorageOperation, DEFAULT_MAX_LOG_ENTRIES,
};

type Store = Arc<MemoryKeyValueStore>;

fn open(store: &Store) -> LogStore<Store> {
    let ns = Arc::new(Namespacer::new(Arc::clone(store), "trading_calculator_"));
    LogStore::open(ns, DEFAULT_MAX_LOG_ENTRIES)
}

#[test]
fn keeps_most_recent_hundred_of_hundred_fifty_in_order() {
    let store = Store::default();
    let journal = open(&store);

    for i in 0..150 {
        journal.info(format!("entry {i}"));
    }

    let logs = journal.logs();
    assert_eq!(logs.len(), 100);
    assert_eq!(logs.first().unwrap().message, "entry 50");
    assert_eq!(logs.last().unwrap().message, "entry 149");
    assert!(logs
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));

    let reopened = open(&store);
    assert_eq!(reopened.logs(), logs);
}

#[test]
fn every_append_is_written_through() {
    let store = Store::default();
    let journal = open(&store);

    journal.log(LogLevel::Error, "save failed", Some(json!({"total": 15})));

    let raw = store.get_item("trading_calculator_logs").unwrap().unwrap();
    let persisted: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted[0]["level"], "error");
    assert_eq!(persisted[0]["message"], "save failed");
    assert_eq!(persisted[0]["context"], json!({"total": 15}));
    assert!(persisted[0]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn logs_returns_a_detached_copy() {
    let store = Store::default();
    let journal = open(&store);
    journal.warn("one");

    let mut snapshot = journal.logs();
    snapshot.clear();

    assert_eq!(journal.len(), 1);
}

#[test]
fn clear_empties_memory_and_storage() {
    let store = Store::default();
    let journal = open(&store);
    journal.info("a");
    journal.info("b");

    journal.clear();

    assert!(journal.is_empty());
    assert_eq!(store.get_item("trading_calculator_logs").unwrap(), None);
    assert!(open(&store).is_empty());
}

#[test]
fn non_array_payload_loads_as_empty() {
    let sink = Arc::new(MemoryDiagnosticSink::new());
    let store = Store::default();
    store
        .set_item("trading_calculator_logs", r#"{"level":"info"}"#)
        .unwrap();
    let ns = Namespacer::with_sink(Arc::clone(&store), "trading_calculator_", sink.clone());

    let journal = LogStore::open(Arc::new(ns), 100);

    assert!(journal.is_empty());
    assert_eq!(sink.diagnostics()[0].operation, StorageOperation::Decode);
}

#[test]
fn unparsable_payload_loads_as_empty() {
    let store = Store::default();
    store.set_item("trading_calculator_logs", "not json").unwrap();

    assert!(open(&store).is_empty());
}

#[test]
fn load_restores_timestamps_and_skips_broken_elements() {
    let sink = Arc::new(MemoryDiagnosticSink::new());
    let store = Store::default();
    store
        .set_item(
            "trading_calculator_logs",
            r#"[
                {"timestamp":"2024-01-02T03:04:05.678Z","level":"warn","message":"kept"},
                {"level":"info"},
                {"level":"error","message":"no timestamp","context":[1,2]}
            ]"#,
        )
        .unwrap();
    let ns = Namespacer::with_sink(Arc::clone(&store), "trading_calculator_", sink.clone());
    let before = chrono::Utc::now();

    let logs = LogStore::open(Arc::new(ns), 100).logs();

    assert_eq!(logs.len(), 2);
    assert_eq!(
        logs[0].timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "2024-01-02T03:04:05.678Z"
    );
    assert_eq!(logs[0].level, LogLevel::Warn);
    assert_eq!(logs[1].message, "no timestamp");
    assert!(logs[1].timestamp >= before);
    assert_eq!(logs[1].context, Some(json!([1, 2])));
    assert_eq!(sink.diagnostics().len(), 1);
}

#[test]
fn oversized_persisted_journal_is_trimmed_on_open() {
    let store = Store::default();
    {
        let ns = Arc::new(Namespacer::new(Arc::clone(&store), "trading_calculator_"));
        let journal = LogStore::open(ns, 10);
        for i in 0..10 {
            journal.info(i.to_string());
        }
    }

    let ns = Arc::new(Namespacer::new(Arc::clone(&store), "trading_calculator_"));
    let journal = LogStore::open(ns, 4);
    let messages = journal
        .logs()
        .into_iter()
        .map(|entry| entry.message)
        .collect::<Vec<_>>();
    assert_eq!(messages, vec!["6", "7", "8", "9"]);
}

#[test]
fn null_context_survives_reopen() {
    let store = Store::default();
    let journal = open(&store);
    journal.log(LogLevel::Info, "with null", Some(serde_json::Value::Null));
    journal.info("without context");

    let before = journal.logs();
    let after = open(&store).logs();

    assert_eq!(after, before);
    assert_eq!(after[0].context, Some(serde_json::Value::Null));
    assert_eq!(after[1].context, None);
}
