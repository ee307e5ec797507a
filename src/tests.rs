use std::fs;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::domain::entities::notification::Variant;
use crate::infra::export::csv::CsvExporter;
use crate::infra::import::csv::CsvProvider;
use crate::infra::import::memory::MemoryProvider;
use crate::infra::notify::recording::RecordingNotifier;
use crate::usecase::ports::exporter::{Column, ExportFormat};
use crate::usecase::ports::provider::ProviderError;
use crate::usecase::services::edit_service::{EditError, EditService};
use crate::usecase::services::export_service::{default_export_file_name, ExportService};
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::query_service::QueryService;
use crate::*;

const USERS_CSV: &str = "\
id,name,email,city,status,balance
1,Raj Sharma,raj@example.com,Mumbai,Active,1200
2,Priya Patel,priya@example.com,Delhi,Suspicious,50
3,Amit Kumar,amit@example.com,Bangalore,Blacklisted,0
4,Neha Gupta,neha@example.com,Delhi,Active,780
5,Arjun Rao,arjun@example.com,Chennai,Active,3400
";

fn users() -> Vec<Record> {
    let reader = csv::Reader::from_reader(USERS_CSV.as_bytes());
    let numeric = ["balance".to_string()].into_iter().collect();
    crate::infra::import::csv::read_csv_records(reader, "id", &numeric)
        .expect("fixture should parse")
}

fn ids(records: &[&Record]) -> Vec<String> {
    records.iter().map(|record| record.id.0.clone()).collect()
}

#[test]
fn csv_provider_feeds_the_engine() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let csv_path = temp_dir.path().join("users.csv");
    fs::write(&csv_path, USERS_CSV).expect("should write csv fixture");

    let notifier = Arc::new(RecordingNotifier::new());
    let provider = CsvProvider::new(&csv_path, "id").with_numeric_fields(["balance"]);
    let import = ImportService::new(Arc::new(provider), notifier.clone());
    let mut state = TableState::new(Vec::new(), 10);

    let loaded = import.refresh(&mut state).expect("refresh should succeed");
    assert_eq!(loaded, 5);

    state.set_filter("status", "Active");
    state.set_sort(Some(SortSpec::descending("balance")));
    let query = QueryService::new(QueryEngine::new(["name", "email"]));
    let result = query.view(&state).expect("view should succeed");

    assert_eq!(ids(&result.visible), vec!["5", "1", "4"]);
    assert_eq!(result.total_records, 5);

    let notifications = notifier.take();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].variant, Variant::Success);
    assert_eq!(notifications[0].message, "5 records loaded");
}

#[test]
fn refresh_keeps_current_query() {
    let notifier = Arc::new(RecordingNotifier::new());
    let import = ImportService::new(Arc::new(MemoryProvider::new(users())), notifier);
    let engine = QueryEngine::new(["name"]);
    let mut state = TableState::new(Vec::new(), 2);
    state.set_search("a");

    import.refresh(&mut state).expect("refresh should succeed");

    assert_eq!(state.params().search_term, "a");
    assert_eq!(state.view(&engine).expect("view should succeed").total_matched, 5);
}

#[test]
fn load_alone_reports_the_record_count() {
    let notifier = Arc::new(RecordingNotifier::new());
    let import = ImportService::new(Arc::new(MemoryProvider::new(users())), notifier.clone());

    let records = import.load().expect("load should succeed");

    assert_eq!(records.len(), 5);
    let notifications = notifier.take();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Data refreshed");
    assert_eq!(notifications[0].message, "5 records loaded");
}

#[test]
fn duplicate_ids_are_rejected_on_load() {
    let mut records = users();
    records.push(Record::new(3).with("name", "Copy"));
    let notifier = Arc::new(RecordingNotifier::new());
    let import = ImportService::new(Arc::new(MemoryProvider::new(records)), notifier.clone());

    let err = import.load().expect_err("duplicate ids should fail");

    assert_eq!(err, ProviderError::DuplicateId(RecordId::from(3)));
    let notifications = notifier.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].variant, Variant::Error);
}

#[test]
fn export_covers_every_match_not_just_the_page() {
    let notifier = Arc::new(RecordingNotifier::new());
    let mut state = TableState::new(users(), 2);
    state.set_filter("city", "Delhi");
    state.set_page(2);
    let engine = QueryEngine::new(["name"]);
    assert!(
        state.view(&engine).expect("view should succeed").visible.is_empty(),
        "page 2 of the Delhi filter is empty"
    );

    let service = ExportService::new(engine, notifier.clone());
    let columns = [Column::new("name", "Name"), Column::new("status", "Status")];
    let mut out = Vec::new();
    let count = service
        .export(&state, &CsvExporter, &columns, &mut out)
        .expect("export should succeed");

    assert_eq!(count, 2);
    let text = String::from_utf8(out).expect("csv should be utf-8");
    assert_eq!(
        text,
        "Name,Status\nPriya Patel,Suspicious\nNeha Gupta,Active\n"
    );
    let notifications = notifier.take();
    assert_eq!(notifications[0].message, "2 records exported as CSV");
}

#[test]
fn failed_export_notifies_an_error() {
    let notifier = Arc::new(RecordingNotifier::new());
    let state = TableState::new(users(), 5);
    let service = ExportService::new(QueryEngine::default(), notifier.clone());
    let mut out = Vec::new();

    let result = service.export(&state, &CsvExporter, &[], &mut out);

    assert!(result.is_err());
    assert!(out.is_empty());
    assert_eq!(notifier.take()[0].variant, Variant::Error);
}

#[test]
fn approve_updates_the_record_in_place() {
    let notifier = Arc::new(RecordingNotifier::new());
    let edits = EditService::new(notifier.clone());
    let engine = QueryEngine::default();
    let mut state = TableState::new(users(), 10);
    state.set_filter("status", "Active");
    assert_eq!(state.view(&engine).expect("view should succeed").total_matched, 3);

    edits
        .set_field(&mut state, &RecordId::from(2), "status", "Active")
        .expect("approve should succeed");

    let result = state.view(&engine).expect("view should succeed");
    assert_eq!(ids(&result.visible), vec!["1", "2", "4", "5"]);
    assert_eq!(notifier.take()[0].title, "Record updated");
}

#[test]
fn dropdown_text_filters_a_numeric_column() {
    let engine = QueryEngine::default();
    let mut state = TableState::new(users(), 10);

    state.set_filter("balance", "50");
    let result = state.view(&engine).expect("view should succeed");

    assert_eq!(result.total_matched, 1);
    assert_eq!(ids(&result.visible), vec!["2"]);
}

#[test]
fn id_field_cannot_be_edited() {
    let notifier = Arc::new(RecordingNotifier::new());
    let edits = EditService::new(notifier.clone()).with_id_field("id");
    let mut state = TableState::new(users(), 10);

    let result = edits.set_field(&mut state, &RecordId::from(2), "id", "1");

    assert_eq!(result, Err(EditError::ReadOnlyField("id".to_string())));
    let priya = state.find(&RecordId::from(2)).expect("record 2 should remain");
    assert_eq!(priya.get("id"), Some(&Value::from("2")));
    assert_eq!(notifier.take()[0].variant, Variant::Error);
}

#[test]
fn add_rejects_existing_ids_and_delete_rejects_unknown_ids() {
    let notifier = Arc::new(RecordingNotifier::new());
    let edits = EditService::new(notifier.clone());
    let mut state = TableState::new(users(), 10);

    let duplicate = edits.add(&mut state, Record::new(1).with("name", "Other Raj"));
    let missing = edits.delete(&mut state, &RecordId::from(99));

    assert_eq!(duplicate, Err(EditError::DuplicateId(RecordId::from(1))));
    assert_eq!(missing, Err(EditError::NotFound(RecordId::from(99))));
    assert_eq!(state.records().len(), 5);
    assert!(notifier
        .take()
        .iter()
        .all(|notification| notification.variant == Variant::Error));
}

#[test]
fn add_then_delete_round_trips_the_collection() {
    let notifier = Arc::new(RecordingNotifier::new());
    let edits = EditService::new(notifier.clone());
    let mut state = TableState::new(users(), 10);

    edits
        .add(&mut state, Record::new(6).with("name", "Kavya Iyer"))
        .expect("add should succeed");
    assert_eq!(state.records().len(), 6);

    let removed = edits
        .delete(&mut state, &RecordId::from(6))
        .expect("delete should succeed");

    assert_eq!(removed.get("name"), Some(&Value::from("Kavya Iyer")));
    assert_eq!(state.records().len(), 5);
    assert_eq!(notifier.take().len(), 2);
}

#[test]
fn summary_counts_ignore_the_current_filters() {
    let mut state = TableState::new(users(), 10);
    state.set_filter("city", "Delhi");
    let query = QueryService::new(QueryEngine::default());

    let counts = query.summary(&state, "status");

    assert_eq!(counts.get("Active"), Some(&3));
    assert_eq!(counts.get("Blacklisted"), Some(&1));
}

#[test]
fn config_file_drives_provider_and_engine() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    fs::write(temp_dir.path().join("users.csv"), USERS_CSV).expect("should write csv fixture");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
        [[tables]]
        name = "users"
        source = "users.csv"
        searchable_fields = ["name", "city"]
        numeric_fields = ["balance"]
        page_size = 2
        empty_pages = "zero"
        "#,
    )
    .expect("should write config fixture");

    let config = AppConfig::load(&config_path).expect("config should load");
    let table = config.table("users").expect("users table should exist");
    let records = table
        .provider()
        .expect("provider should build")
        .load()
        .expect("records should load");
    let mut state = TableState::new(records, table.page_size);
    let engine = table.engine();

    state.set_search("delhi");
    let delhi = state.view(&engine).expect("view should succeed");
    assert_eq!(ids(&delhi.visible), vec!["2", "4"]);
    assert_eq!(delhi.total_pages, 1);

    state.set_search("nowhere");
    let none = state.view(&engine).expect("view should succeed");
    assert_eq!(none.total_pages, 0);

    let columns = table.export_columns(state.records());
    assert_eq!(columns.len(), 6);
}

#[test]
fn export_file_name_has_table_and_date() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");

    assert_eq!(
        default_export_file_name("transactions", ExportFormat::Json, date),
        "transactions_20240309.json"
    );
}
