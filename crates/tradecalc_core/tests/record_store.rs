use serde_json::json;
use std::sync::Arc;
use tradecalc_core::{
    InputData, KeyValueStore, MemoryDiagnosticSink, MemoryKeyValueStore, Namespacer,
    NamespacedRecordRepository, RecordRepository, SqliteKeyValueStore, StoredData, RECORDS_KEY,
};

fn repo_over(
    store: Arc<MemoryKeyValueStore>,
) -> NamespacedRecordRepository<Arc<MemoryKeyValueStore>> {
    NamespacedRecordRepository::new(Arc::new(Namespacer::new(store, "trading_calculator_")))
}

#[test]
fn load_on_empty_storage_returns_empty_list() {
    let repo = repo_over(Arc::new(MemoryKeyValueStore::new()));
    assert_eq!(repo.load(), Vec::<StoredData>::new());
}

#[test]
fn load_treats_empty_text_as_empty_list() {
    let store = Arc::new(MemoryKeyValueStore::new());
    store.set_item("trading_calculator_storage", "").unwrap();
    let repo = repo_over(store);

    assert!(repo.load().is_empty());
}

#[test]
fn save_assigns_sequential_counters_and_persists_pascal_case_array() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let repo = repo_over(Arc::clone(&store));

    let first = repo.save(&InputData::new(10.0, 2.0, 20.0));
    let second = repo.save(&InputData::new(3.0, 4.0, 12.0));
    assert_eq!(first.counter, 1);
    assert_eq!(second.counter, 2);
    assert_eq!(repo.load(), vec![first, second]);

    let raw = store
        .get_item(&format!("trading_calculator_{RECORDS_KEY}"))
        .unwrap()
        .unwrap();
    let persisted: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        persisted,
        json!([
            {"Price": 10.0, "Quantity": 2.0, "Total": 20.0, "Counter": 1},
            {"Price": 3.0, "Quantity": 4.0, "Total": 12.0, "Counter": 2}
        ])
    );
}

#[test]
fn counter_continues_from_last_persisted_record() {
    let store = Arc::new(MemoryKeyValueStore::new());
    store
        .set_item(
            "trading_calculator_storage",
            r#"[{"Price":1,"Quantity":1,"Total":1,"Counter":7},{"Price":2,"Quantity":1,"Total":2,"Counter":3}]"#,
        )
        .unwrap();
    let repo = repo_over(store);

    assert_eq!(repo.save(&InputData::new(2.0, 2.0, 4.0)).counter, 4);
}

#[test]
fn save_does_not_validate_odd_totals() {
    let repo = repo_over(Arc::new(MemoryKeyValueStore::new()));
    let stored = repo.save(&InputData::new(5.0, 3.0, 15.0));
    assert_eq!(stored.counter, 1);
    assert_eq!(stored.total, 15.0);
}

#[test]
fn corrupt_payload_loads_empty_and_is_reported() {
    let sink = Arc::new(MemoryDiagnosticSink::new());
    let store = Arc::new(MemoryKeyValueStore::new());
    store
        .set_item("trading_calculator_storage", "{\"oops\":true}")
        .unwrap();
    let ns = Namespacer::with_sink(Arc::clone(&store), "trading_calculator_", sink.clone());
    let repo = NamespacedRecordRepository::new(Arc::new(ns));

    assert!(repo.load().is_empty());
    assert_eq!(sink.diagnostics().len(), 1);

    assert_eq!(repo.save(&InputData::new(1.0, 2.0, 2.0)).counter, 1);
}

#[test]
fn records_round_trip_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.sqlite3");
    let inputs = [
        InputData::new(10.0, 2.0, 20.0),
        InputData::new(0.5, 4.0, 2.0),
        InputData::new(1.5, 3.0, 4.5),
    ];

    let saved = {
        let store = SqliteKeyValueStore::open(&path).unwrap();
        let repo = NamespacedRecordRepository::new(Arc::new(Namespacer::new(store, "tc_")));
        inputs.iter().map(|input| repo.save(input)).collect::<Vec<_>>()
    };

    let store = SqliteKeyValueStore::open(&path).unwrap();
    let repo = NamespacedRecordRepository::new(Arc::new(Namespacer::new(store, "tc_")));
    assert_eq!(repo.load(), saved);
    assert_eq!(
        saved.iter().map(|s| s.counter).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn concurrent_saves_through_one_repository_get_unique_counters() {
    let repo = Arc::new(repo_over(Arc::new(MemoryKeyValueStore::new())));

    let handles = (0..8)
        .map(|_| {
            let repo = Arc::clone(&repo);
            std::thread::spawn(move || {
                (0..5)
                    .map(|_| repo.save(&InputData::new(1.0, 2.0, 2.0)).counter)
                    .collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();

    let mut counters = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();
    counters.sort_unstable();

    assert_eq!(counters, (1..=40).collect::<Vec<u64>>());
    assert_eq!(repo.load().len(), 40);
}

#[test]
fn non_finite_record_does_not_hide_earlier_history() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let repo = repo_over(Arc::clone(&store));
    for total in [2.0, 4.0, 6.0] {
        repo.save(&InputData::new(total / 2.0, 2.0, total));
    }

    let odd_one = repo.save(&InputData::new(f64::NAN, 2.0, 20.0));
    assert_eq!(odd_one.counter, 4);

    let raw = store
        .get_item("trading_calculator_storage")
        .unwrap()
        .unwrap();
    assert!(raw.contains(r#""Price":null"#));

    let loaded = repo.load();
    assert_eq!(
        loaded.iter().map(|s| s.counter).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert!(loaded[3].price.is_nan());
    assert_eq!(loaded[0], StoredData::from_input(&InputData::new(1.0, 2.0, 2.0), 1));

    assert_eq!(repo.save(&InputData::new(1.0, 2.0, 2.0)).counter, 5);
    assert_eq!(repo.load().len(), 5);
}
