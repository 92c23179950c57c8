//! Task cache synchronization tests against a mock backend.
//!
//! Covers wholesale load, non-optimistic create, and the optimistic
//! completion toggle with snapshot rollback.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use doit_core::api::{ApiClient, ApiConfig, Category, Task, TaskDraft};
use doit_core::tasks::TaskStore;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn task_json(id: &str, title: &str, completed: bool, category: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "completed": completed,
        "category": category,
        "time": "2025-03-01T09:00:00Z",
    })
}

fn draft(title: &str, category: Category) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        category,
        time: "2025-03-01T09:00:00Z".parse().unwrap(),
    }
}

/// Store whose cache was loaded from the given list response.
async fn seeded_store(server: &MockServer, tasks: serde_json::Value) -> TaskStore {
    Mock::given(method("GET"))
        .and(path("/api/tasks/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tasks))
        .mount(server)
        .await;

    let api = ApiClient::new(ApiConfig {
        base_url: server.uri(),
    })
    .unwrap();
    let store = TaskStore::new(api);
    store.load_all().await.unwrap();
    store
}

/// Test: a reload replaces the cache wholesale, no merge.
#[tokio::test]
async fn test_load_replaces_cache_wholesale() {
    let server = MockServer::start().await;
    let store = seeded_store(
        &server,
        json!([
            task_json("t1", "Buy milk", false, "Personal"),
            task_json("t2", "Send invoice", true, "Freelance"),
        ]),
    )
    .await;
    assert_eq!(store.tasks().len(), 2);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([task_json("t3", "Plan sprint", false, "Work")])),
        )
        .mount(&server)
        .await;

    store.load_all().await.unwrap();

    let tasks = store.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "t3");
}

/// Test: a failed load leaves the existing cache untouched (stale reads
/// stay consistent).
#[tokio::test]
async fn test_load_failure_leaves_cache_stale() {
    let server = MockServer::start().await;
    let store = seeded_store(&server, json!([task_json("t1", "Buy milk", false, "Personal")])).await;
    let before = store.tasks();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/user"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(store.load_all().await.is_err());
    assert_eq!(store.tasks(), before);
}

/// Test: a successful create appends exactly the server's canonical record,
/// with the backend-assigned id.
#[tokio::test]
async fn test_create_appends_server_record() {
    let server = MockServer::start().await;
    let store = seeded_store(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_partial_json(json!({
            "title": "Buy milk",
            "completed": false,
            "category": "Personal",
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(task_json("t1", "Buy milk", false, "Personal")),
        )
        .mount(&server)
        .await;

    let created = store.create(draft("Buy milk", Category::Personal)).await.unwrap();

    assert_eq!(created.id, "t1");
    let tasks = store.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0], created);
}

/// Test: a failed create leaves the cache deep-equal to its pre-call state.
#[tokio::test]
async fn test_create_failure_leaves_cache_unchanged() {
    let server = MockServer::start().await;
    let store = seeded_store(&server, json!([task_json("t1", "Buy milk", false, "Personal")])).await;
    let before = store.tasks();

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "storage offline" })),
        )
        .mount(&server)
        .await;

    let result = store.create(draft("Walk the dog", Category::Personal)).await;

    assert!(result.is_err());
    assert_eq!(store.tasks(), before);
}

/// Test: a draft with a whitespace-only title is rejected locally; the
/// backend never sees a request.
#[tokio::test]
async fn test_empty_title_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    let store = seeded_store(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let result = store.create(draft("   ", Category::Work)).await;

    assert!(result.unwrap_err().to_string().contains("empty"));
    assert!(store.tasks().is_empty());
    server.verify().await;
}

/// Test: the optimistic value is visible immediately, before the request
/// settles, and stands once it succeeds.
#[tokio::test]
async fn test_optimistic_value_visible_before_settle() {
    let server = MockServer::start().await;
    let store = seeded_store(&server, json!([task_json("t1", "Buy milk", false, "Personal")])).await;

    Mock::given(method("PATCH"))
        .and(path("/api/tasks/t1"))
        .and(body_partial_json(json!({ "completed": true })))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let settle = store.set_completion("t1", true);

    // The request is still in flight; the cache already shows the new value.
    assert!(store.tasks()[0].completed);

    settle.await.unwrap().unwrap();
    assert!(store.tasks()[0].completed);
}

/// Test: a failed request restores the snapshot taken before the optimistic
/// write, including the toggled field.
#[tokio::test]
async fn test_failed_update_restores_snapshot() {
    let server = MockServer::start().await;
    let store = seeded_store(&server, json!([task_json("t1", "Buy milk", false, "Personal")])).await;
    let before = store.tasks();

    Mock::given(method("PATCH"))
        .and(path("/api/tasks/t1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let settle = store.set_completion("t1", true);
    assert!(store.tasks()[0].completed);

    assert!(settle.await.unwrap().is_err());
    assert_eq!(store.tasks(), before);
    assert!(!store.tasks()[0].completed);
}

/// Test: an id absent from the cache changes nothing locally but the
/// request is still issued.
#[tokio::test]
async fn test_unknown_id_still_sends_request() {
    let server = MockServer::start().await;
    let store = seeded_store(&server, json!([task_json("t1", "Buy milk", false, "Personal")])).await;
    let before = store.tasks();

    Mock::given(method("PATCH"))
        .and(path("/api/tasks/ghost"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let settle = store.set_completion("ghost", true);
    assert_eq!(store.tasks(), before);

    settle.await.unwrap().unwrap();
    server.verify().await;
}

/// Boundary case, not a guarantee: when two toggles overlap, a failing
/// first call rolls back to a snapshot that predates the second call's
/// write, discarding it: last snapshot wins.
#[tokio::test]
async fn test_rollback_discards_overlapping_mutations() {
    let server = MockServer::start().await;
    let store = seeded_store(
        &server,
        json!([
            task_json("t1", "Buy milk", false, "Personal"),
            task_json("t2", "Send invoice", false, "Freelance"),
        ]),
    )
    .await;

    // t1's update fails slowly; t2's succeeds immediately.
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/t1"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/t2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let first = store.set_completion("t1", true);
    let second = store.set_completion("t2", true);

    // Both optimistic writes are visible while the requests are in flight.
    let tasks = store.tasks();
    assert!(tasks[0].completed);
    assert!(tasks[1].completed);

    second.await.unwrap().unwrap();
    assert!(first.await.unwrap().is_err());

    // t1's rollback restored the pre-t1 snapshot, wiping t2's confirmed
    // toggle along with it.
    let tasks = store.tasks();
    assert!(!tasks[0].completed);
    assert!(!tasks[1].completed);
}

/// Test: subscribers see the optimistic write and the rollback as separate
/// cache changes.
#[tokio::test]
async fn test_subscribers_observe_cache_changes() {
    let server = MockServer::start().await;
    let store = seeded_store(&server, json!([task_json("t1", "Buy milk", false, "Personal")])).await;

    let seen: Arc<Mutex<Vec<Vec<Task>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |tasks| sink.lock().unwrap().push(tasks.clone()));

    Mock::given(method("PATCH"))
        .and(path("/api/tasks/t1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let settle = store.set_completion("t1", true);
    assert!(settle.await.unwrap().is_err());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0][0].completed, "first notification is the optimistic write");
    assert!(!seen[1][0].completed, "second notification is the rollback");
}
