use super::*;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode as HttpStatus},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};
use std::{
    collections::HashMap,
    sync::{Arc, Once},
};
use tokio::{net::TcpListener, sync::Mutex};

static BYPASS_PROXY: Once = Once::new();

/// Local test servers must not be routed through a proxy from the environment.
fn bypass_proxy_for_loopback() {
    BYPASS_PROXY.call_once(|| std::env::set_var("NO_PROXY", "127.0.0.1,localhost"));
}

#[derive(Clone, Default)]
struct ServerState {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

async fn list_children(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let page = query.get("_page").cloned().unwrap_or_default();
    state.queries.lock().await.push(query);
    let mut headers = HeaderMap::new();
    match page.as_str() {
        "1" => {
            headers.insert("x-total-count", HeaderValue::from_static("7"));
            (
                headers,
                r#"[{"id":1,"name":"Mila","birthDate":"2019-03-01","kindergardenId":2},
                    {"id":"b2","name":"Theo","birthDate":"2020-07-21"}]"#,
            )
        }
        "2" => (headers, ""),
        _ => {
            headers.insert("x-total-count", HeaderValue::from_static("many"));
            (headers, "[]")
        }
    }
}

async fn delete_child_route(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HttpStatus {
    if id == "missing" {
        return HttpStatus::NOT_FOUND;
    }
    state.deleted.lock().await.push(id);
    HttpStatus::OK
}

async fn spawn_children_server() -> Result<(String, ServerState)> {
    bypass_proxy_for_loopback();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/childs", get(list_children))
        .route("/api/childs/:id", delete(delete_child_route))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), state))
}

fn page_size(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).expect("non-zero")
}

#[test]
fn collection_url_joins_base_and_resource() {
    bypass_proxy_for_loopback();
    let backend = HttpChildrenBackend::new("http://localhost:5000/api", "/childs/", page_size(5))
        .expect("backend");
    assert_eq!(
        backend.collection_url().as_str(),
        "http://localhost:5000/api/childs"
    );
    assert!(HttpChildrenBackend::new("not a url", "childs", page_size(5)).is_err());
}

#[tokio::test]
async fn fetch_page_reads_body_and_total_count_header() {
    let (server_url, state) = spawn_children_server().await.expect("spawn server");
    let backend = HttpChildrenBackend::new(&server_url, "childs", page_size(5)).expect("backend");

    let page = backend.fetch_page(1).await.expect("fetch");
    assert_eq!(page.total_count, 7);
    assert_eq!(page.children.len(), 2);
    assert_eq!(page.children[0].id.to_string(), "1");
    assert_eq!(page.children[1].birth_date, "2020-07-21");

    let queries = state.queries.lock().await;
    assert_eq!(queries[0].get("_page").map(String::as_str), Some("1"));
    assert_eq!(queries[0].get("_limit").map(String::as_str), Some("5"));
}

#[tokio::test]
async fn empty_body_and_missing_header_mean_empty_page() {
    let (server_url, _state) = spawn_children_server().await.expect("spawn server");
    let backend = HttpChildrenBackend::new(&server_url, "childs", page_size(5)).expect("backend");

    let page = backend.fetch_page(2).await.expect("fetch");
    assert_eq!(page, ChildrenPage::default());
}

#[tokio::test]
async fn malformed_total_count_is_an_error() {
    let (server_url, _state) = spawn_children_server().await.expect("spawn server");
    let backend = HttpChildrenBackend::new(&server_url, "childs", page_size(5)).expect("backend");

    let err = backend.fetch_page(3).await.expect_err("must fail");
    assert!(err.to_string().contains("X-Total-Count"), "unexpected error: {err}");
}

#[tokio::test]
async fn delete_child_targets_the_child_resource() {
    let (server_url, state) = spawn_children_server().await.expect("spawn server");
    let backend = HttpChildrenBackend::new(&server_url, "childs", page_size(5)).expect("backend");

    backend
        .delete_child(&ChildId::new("b2"), 1)
        .await
        .expect("delete");
    assert_eq!(*state.deleted.lock().await, vec!["b2".to_string()]);

    backend
        .delete_child(&ChildId::new("missing"), 1)
        .await
        .expect_err("404 must fail");
}

#[tokio::test]
async fn missing_backend_always_fails() {
    let backend = MissingChildrenBackend;
    assert!(backend.fetch_page(1).await.is_err());
    assert!(backend.delete_child(&ChildId::new("1"), 1).await.is_err());
}
