use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use transport_directory::client::{ClientError, RowCollectionClient};
use transport_directory::domain::entities::row::{placeholder_dataset, CellValue, Row};
use transport_directory::http::{build_router, AppState, RouterOptions};
use transport_directory::infra::memory::MemoryStore;
use transport_directory::infra::sqlite::repo::SqliteStore;
use transport_directory::session::{EditSession, SaveStatus};
use transport_directory::usecase::ports::repo::RecordStore;
use transport_directory::usecase::services::collection_service::{CollectionService, SeedPolicy};

async fn spawn_server(store: Arc<dyn RecordStore>, seed: SeedPolicy) -> SocketAddr {
    spawn_server_with(store, seed, RouterOptions::default()).await
}

async fn spawn_server_with(
    store: Arc<dyn RecordStore>,
    seed: SeedPolicy,
    options: RouterOptions,
) -> SocketAddr {
    let collection = Arc::new(CollectionService::new(store, seed));
    let router = build_router(AppState::new(collection), &options);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind ephemeral port");
    let addr = listener.local_addr().expect("listener should have address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("server should run");
    });
    addr
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

fn directory_rows(count: usize) -> Value {
    Value::Array(
        (1..=count)
            .map(|n| json!({ "LOCATION": format!("Depot {n:02}"), "N": n }))
            .collect(),
    )
}

#[tokio::test]
async fn get_seeds_placeholder_when_store_is_empty() {
    let store = Arc::new(MemoryStore::new());
    let addr = spawn_server(store.clone(), SeedPolicy::Placeholder).await;

    let response = reqwest::get(url(addr, "/api/excel"))
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.expect("body should be json");

    assert_eq!(
        body,
        json!([{ "LOCATION": "Sample Location", "PHONE": "123-456-7890", "CONTACT": "John Doe" }])
    );
    assert_eq!(
        store.get().expect("get should succeed"),
        Some(placeholder_dataset())
    );
}

#[tokio::test]
async fn get_returns_empty_array_without_seed() {
    let addr = spawn_server(Arc::new(MemoryStore::new()), SeedPolicy::Empty).await;

    let body: Value = reqwest::get(url(addr, "/api/excel"))
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("body should be json");

    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn put_accepts_wrapped_and_bare_arrays() {
    let addr = spawn_server(Arc::new(MemoryStore::new()), SeedPolicy::Empty).await;
    let client = reqwest::Client::new();

    let response = client
        .put(url(addr, "/api/excel"))
        .json(&json!({ "data": [{ "LOCATION": "Perth", "DEPOTS": 2 }] }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.expect("body should be json");
    assert_eq!(body, json!({ "success": true, "message": "Data saved" }));

    let response = client
        .put(url(addr, "/api/excel"))
        .header("content-type", "application/json")
        .body(r#"[{"PHONE":"1","LOCATION":"Sydney"},7]"#)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let stored = reqwest::get(url(addr, "/api/excel"))
        .await
        .expect("request should succeed")
        .text()
        .await
        .expect("body should be text");
    assert_eq!(stored, r#"[{"PHONE":"1","LOCATION":"Sydney"},{}]"#);
}

#[tokio::test]
async fn put_rejects_non_arrays_and_keeps_data() {
    let original = vec![Row::from_iter([("LOCATION", "Perth")])];
    let store = Arc::new(MemoryStore::with_rows(original.clone()));
    let addr = spawn_server(store.clone(), SeedPolicy::Empty).await;
    let client = reqwest::Client::new();

    let response = client
        .put(url(addr, "/api/excel"))
        .json(&json!({ "foo": 1 }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("body should be json");
    assert_eq!(
        body,
        json!({ "success": false, "message": "Invalid data format" })
    );

    let response = client
        .put(url(addr, "/api/excel"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    assert_eq!(store.get().expect("get should succeed"), Some(original));
}

#[tokio::test]
async fn storage_failures_are_server_errors() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    // Schema never initialised, so every read and write fails.
    let store = Arc::new(SqliteStore::new(
        temp_dir.path().join("app.sqlite"),
        "transport-data",
    ));
    let addr = spawn_server(store, SeedPolicy::Placeholder).await;

    let response = reqwest::get(url(addr, "/api/excel"))
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("body should be json");
    assert_eq!(body["success"], json!(false));

    let response = reqwest::Client::new()
        .put(url(addr, "/api/excel"))
        .json(&json!([]))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("body should be json");
    assert_eq!(body, json!({ "success": false, "message": "Failed to save" }));
}

#[tokio::test]
async fn health_reports_ok_with_timestamp() {
    let addr = spawn_server(Arc::new(MemoryStore::new()), SeedPolicy::Empty).await;

    let body: Value = reqwest::get(url(addr, "/api/health"))
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("body should be json");

    assert_eq!(body["status"], json!("ok"));
    let time = body["time"].as_str().expect("time should be a string");
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok(), "bad time: {time}");
}

#[tokio::test]
async fn resource_name_is_configurable() {
    let options = RouterOptions {
        resource: "depots".to_string(),
        ..RouterOptions::default()
    };
    let addr = spawn_server_with(Arc::new(MemoryStore::new()), SeedPolicy::Empty, options).await;

    let ok = reqwest::get(url(addr, "/api/depots"))
        .await
        .expect("request should succeed");
    assert_eq!(ok.status(), reqwest::StatusCode::OK);

    let missing = reqwest::get(url(addr, "/api/excel"))
        .await
        .expect("request should succeed");
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_bodies_are_refused() {
    let options = RouterOptions {
        max_body_bytes: 64,
        ..RouterOptions::default()
    };
    let store = Arc::new(MemoryStore::new());
    let addr = spawn_server_with(store.clone(), SeedPolicy::Empty, options).await;

    let response = reqwest::Client::new()
        .put(url(addr, "/api/excel"))
        .json(&directory_rows(20))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.get().expect("get should succeed"), None);
}

#[tokio::test]
async fn view_endpoint_pages_filters_and_clamps() {
    let store = Arc::new(MemoryStore::new());
    let addr = spawn_server(store, SeedPolicy::Empty).await;
    let client = reqwest::Client::new();
    client
        .put(url(addr, "/api/excel"))
        .json(&directory_rows(25))
        .send()
        .await
        .expect("request should succeed");

    let body: Value = client
        .get(url(addr, "/api/excel/view?page=3&page_size=10"))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("body should be json");
    assert_eq!(body["match_count"], json!(25));
    assert_eq!(body["page_count"], json!(3));
    assert_eq!(body["rows"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["columns"], json!(["LOCATION", "N"]));

    let body: Value = client
        .get(url(addr, "/api/excel/view?page=99&sort=N&dir=desc"))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("body should be json");
    assert_eq!(body["page"], json!(3));
    assert_eq!(body["rows"][0]["N"], json!(5));

    let body: Value = client
        .get(url(addr, "/api/excel/view?search=depot%2007"))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("body should be json");
    assert_eq!(body["match_count"], json!(1));
    assert_eq!(body["rows"][0]["LOCATION"], json!("Depot 07"));
}

#[tokio::test]
async fn view_endpoint_rejects_unknown_toggles() {
    let addr = spawn_server(Arc::new(MemoryStore::new()), SeedPolicy::Empty).await;

    let response = reqwest::get(url(addr, "/api/excel/view?filters=urgent,hazmat"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("body should be json");
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn client_and_session_round_trip_through_server() {
    let store = Arc::new(MemoryStore::with_rows(vec![
        Row::from_iter([("LOCATION", "Perth"), ("PHONE", "1")]),
        Row::from_iter([("LOCATION", "Darwin"), ("PHONE", "2")]),
    ]));
    let addr = spawn_server(store.clone(), SeedPolicy::Empty).await;
    let client = RowCollectionClient::new(&format!("http://{addr}"), "excel");

    let mut session = EditSession::new();
    session.load(client.fetch_all().await.expect("fetch should succeed"));
    let id = session
        .open_edit_matching("LOCATION", "darwin")
        .expect("row should be found");
    session.set_field("PHONE", "99");
    let commit = session.commit_draft().expect("commit should be produced");

    let status = session.save(&client, &commit).await;

    assert_eq!(status, SaveStatus::Saved);
    let stored = store
        .get()
        .expect("get should succeed")
        .expect("rows should be stored");
    assert_eq!(stored[1].value("PHONE"), &CellValue::text("99"));
    assert_eq!(session.row(id).map(|row| row.value("PHONE").clone()), Some(CellValue::text("99")));
}

#[tokio::test]
async fn client_reports_server_rejections() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let store = Arc::new(SqliteStore::new(
        temp_dir.path().join("app.sqlite"),
        "transport-data",
    ));
    let addr = spawn_server(store, SeedPolicy::Empty).await;
    let client = RowCollectionClient::new(&format!("http://{addr}"), "excel");

    let err = client
        .replace_all(&placeholder_dataset())
        .await
        .expect_err("save should fail");
    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "Failed to save");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let mut session = EditSession::new();
    session.open_add();
    session.set_field("LOCATION", "Broome");
    let commit = session.commit_draft().expect("commit should be produced");
    assert_eq!(
        session.save(&client, &commit).await.message(),
        "Save failed. Changes may not persist."
    );
}
