//! RestStore against a local fake of the REST database
//!
//! The fake is an axum app that serves `{path}.json` from a MemoryStore and
//! refuses anything under `private/` without an `auth` parameter.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};
use skillswap_store::{
    AuthToken, MemoryStore, RemoteStore, RemoteStoreExt, RestConfig, RestStore, StoreError,
    StorePath,
};
use std::collections::HashMap;
use std::time::Duration;

async fn handle(
    State(db): State<MemoryStore>,
    method: Method,
    Path(raw): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let Some(trimmed) = raw.strip_suffix(".json") else {
        return (StatusCode::NOT_FOUND, "expected .json").into_response();
    };
    let Ok(path) = StorePath::parse(trimmed) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid path"}))).into_response();
    };
    if path.segments().first().map(String::as_str) == Some("private")
        && !query.contains_key("auth")
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Permission denied"})),
        )
            .into_response();
    }

    let payload: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        }
    };

    let reply = match method {
        Method::GET => db.get(&path).await.map(|v| v.unwrap_or(Value::Null)),
        Method::PUT => db.set(&path, payload.clone()).await.map(|_| payload),
        Method::PATCH => match payload {
            Value::Object(fields) => db
                .update(&path, fields.clone())
                .await
                .map(|_| Value::Object(fields)),
            _ => return StatusCode::BAD_REQUEST.into_response(),
        },
        Method::DELETE => db.remove(&path).await.map(|_| Value::Null),
        Method::POST => db.push(&path, payload).await.map(|name| json!({"name": name})),
        _ => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
    };

    match reply {
        Ok(value) => Json(value).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn start_fake(db: MemoryStore) -> String {
    let app = Router::new().route("/{*path}", any(handle)).with_state(db);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn p(s: &str) -> StorePath {
    StorePath::parse(s).unwrap()
}

async fn client(db: &MemoryStore) -> (RestStore, AuthToken) {
    let url = start_fake(db.clone()).await;
    let token = AuthToken::new();
    let config = RestConfig {
        database_url: url,
        poll_interval_ms: 20,
    };
    (RestStore::new(&config, token.clone()).unwrap(), token)
}

#[tokio::test]
async fn test_set_then_get() {
    let db = MemoryStore::new();
    let (store, _) = client(&db).await;

    store
        .set(&p("users/u1"), json!({"name": "Ada", "skillsToTeach": ["math"]}))
        .await
        .unwrap();

    assert_eq!(
        store.get(&p("users/u1/name")).await.unwrap(),
        Some(json!("Ada"))
    );
    assert_eq!(db.read(&p("users/u1/skillsToTeach")), Some(json!(["math"])));
}

#[tokio::test]
async fn test_missing_is_none() {
    let db = MemoryStore::new();
    let (store, _) = client(&db).await;

    assert_eq!(store.get(&p("ratings/nobody")).await.unwrap(), None);
    assert!(!store.exists(&p("favorites/u1/t1")).await.unwrap());
}

#[tokio::test]
async fn test_update_remove_and_push() {
    let db = MemoryStore::with_data(json!({"users": {"u1": {"name": "Ada", "bio": "old"}}}));
    let (store, _) = client(&db).await;

    let mut fields = serde_json::Map::new();
    fields.insert("bio".to_string(), json!("new"));
    store.update(&p("users/u1"), fields).await.unwrap();
    assert_eq!(db.read(&p("users/u1")), Some(json!({"name": "Ada", "bio": "new"})));

    let key = store
        .push(&p("notifications/u1"), json!({"from": "u2"}))
        .await
        .unwrap();
    assert_eq!(
        db.read(&p("notifications/u1")).unwrap()[&key],
        json!({"from": "u2"})
    );

    store.remove(&p("users/u1")).await.unwrap();
    assert_eq!(db.read(&p("users")), None);
}

#[tokio::test]
async fn test_permission_denied_without_token() {
    let db = MemoryStore::new();
    let (store, token) = client(&db).await;

    let err = store.get(&p("private/secret")).await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)), "{:?}", err);

    token.replace(Some("id-token".to_string()));
    assert_eq!(store.get(&p("private/secret")).await.unwrap(), None);
}

#[tokio::test]
async fn test_polling_subscription_sees_changes() {
    let db = MemoryStore::new();
    let (store, _) = client(&db).await;

    let mut sub = store.subscribe(&p("favorites/u1"));
    let first = tokio::time::timeout(Duration::from_secs(5), sub.next())
        .await
        .unwrap()
        .unwrap();
    assert!(!first.exists());

    db.set(&p("favorites/u1/t1"), json!("t1")).await.unwrap();
    let changed = tokio::time::timeout(Duration::from_secs(5), sub.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(changed.value(), Some(&json!({"t1": "t1"})));
}
