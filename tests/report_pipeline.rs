use pixel_analytics::catalog::{Catalog, DATE, EVENT_COUNT, EVENT_NAME, EVENT_VALUE};
use pixel_analytics::query::{QuerySpec, SpecificationError};
use pixel_analytics::report::{self, ReportError};
use pixel_analytics::store::{Event, EventStore, MemoryEventStore, StoreError, Value};

fn daily_event_rows() -> Vec<Vec<Value>> {
    vec![
        vec!["2023-01-01".into(), "page_view".into(), 5_i64.into()],
        vec!["2023-01-01".into(), "purchase".into(), 2_i64.into()],
        vec!["2023-01-02".into(), "page_view".into(), 3_i64.into()],
    ]
}

#[test_log::test(tokio::test)]
async fn empty_specification_never_reaches_store() {
    let store = MemoryEventStore::with_rows(daily_event_rows());

    let result = report::table(QuerySpec::new().limit(10), &store).await;

    assert!(matches!(
        result,
        Err(ReportError::Specification(SpecificationError::Empty))
    ));
    assert!(store.statements().is_empty());
    assert_eq!(store.released_streams(), 0);
}

#[test_log::test(tokio::test)]
async fn rejected_statement_fails_table_without_a_stream() {
    let store = MemoryEventStore::with_rows(daily_event_rows()).failing_execute();
    let spec = QuerySpec::new().dimensions([&DATE]).measures([&EVENT_COUNT]);

    let result = report::table(spec, &store).await;

    assert!(matches!(result, Err(ReportError::Store(StoreError::Query(_)))));
    assert_eq!(store.statements().len(), 1);
    assert_eq!(store.released_streams(), 0);
}

#[test_log::test(tokio::test)]
async fn rejected_statement_fails_chart_without_a_stream() {
    let store = MemoryEventStore::with_rows(daily_event_rows()).failing_execute();
    let spec = QuerySpec::new()
        .dimensions([&DATE, &EVENT_NAME])
        .measures([&EVENT_COUNT]);

    let result = report::line_chart(spec, &store).await;

    assert!(matches!(result, Err(ReportError::Store(StoreError::Query(_)))));
    assert_eq!(store.statements().len(), 1);
    assert_eq!(store.released_streams(), 0);
}

#[test_log::test(tokio::test)]
async fn keys_from_configuration_drive_a_report() {
    let catalog = Catalog::standard();
    let spec = QuerySpec::new()
        .dimensions(catalog.dimensions_from_keys("date,event_name").unwrap())
        .measures(catalog.measures_from_keys("event_count").unwrap())
        .limit(100);
    let store = MemoryEventStore::with_rows(daily_event_rows());

    let table = report::table(spec, &store).await.unwrap();

    assert_eq!(
        store.statements(),
        vec!["SELECT TO_CHAR(timestamp, 'YYYY-MM-DD'), name, COUNT(*) FROM events GROUP BY 1, 2 LIMIT 100"]
    );
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[1].dimension_values, vec!["2023-01-01", "purchase"]);
    assert_eq!(table.rows[1].measure_values, vec![2.0]);
}

#[test_log::test(tokio::test)]
async fn same_rows_pivot_into_chart_series() {
    let store = MemoryEventStore::with_rows(daily_event_rows());
    let spec = QuerySpec::new()
        .dimensions([&DATE, &EVENT_NAME])
        .measures([&EVENT_COUNT]);

    let datasets = report::line_chart(spec, &store).await.unwrap();

    let json = serde_json::to_value(&datasets).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"label": "page_view", "data": [{"x": "2023-01-01", "y": 5.0}, {"x": "2023-01-02", "y": 3.0}]},
            {"label": "purchase", "data": [{"x": "2023-01-01", "y": 2.0}]}
        ])
    );
    assert_eq!(store.released_streams(), 1);
}

#[test_log::test(tokio::test)]
async fn table_serializes_headers_by_label() {
    let store = MemoryEventStore::with_rows([vec![Value::from(12_i64), Value::from(99.5)]]);
    let spec = QuerySpec::new().measures([&EVENT_COUNT, &EVENT_VALUE]);

    let table = report::table(spec, &store).await.unwrap();

    assert_eq!(
        serde_json::to_value(&table).unwrap(),
        serde_json::json!({
            "dimension_headers": [],
            "measure_headers": [
                {"key": "event_count", "label": "Event Count"},
                {"key": "event_value", "label": "Event Value"}
            ],
            "rows": [{"dimension_values": [], "measure_values": [12.0, 99.5]}]
        })
    );
}

#[test_log::test(tokio::test)]
async fn ingested_events_are_recorded() {
    let store = MemoryEventStore::new();
    let event: Event = serde_json::from_str(
        r#"{"account_id": "GA4CT-1", "client_id": "GA4CT.CID.1.1", "session_id": "GA4CT.SID.1.1",
            "event_name": "page_view", "event_value": 0, "timestamp": "2024-06-20T16:13:20Z",
            "page_location": "https://www.example.com/"}"#,
    )
    .unwrap();

    assert_eq!(store.insert(&event).await.unwrap(), 1);
    assert_eq!(store.insert(&event).await.unwrap(), 2);
    assert_eq!(store.events().len(), 2);
}
