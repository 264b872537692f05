//! HTTP contract tests for the catalog server, run against the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use http_body_util::BodyExt;
use hub_catalog_core::memory::MemoryCatalogStore;
use hub_catalog_core::service::CatalogServiceImpl;
use hub_catalog_core::types::{BundleId, CategoryId, OrganisationId};
use hub_catalog_server::middleware::jwt::JwtConfig;
use hub_catalog_server::router::build_router;
use hyper::{Request, StatusCode};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Test JWT helpers ───────────────────────────────────────────

const TEST_JWT_SECRET: &[u8] = b"test-secret-for-http-tests";

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    roles: Vec<String>,
}

fn make_jwt(sub: &str, roles: &[&str]) -> String {
    let claims = TestClaims {
        sub: sub.into(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET),
    )
    .expect("failed to encode test JWT")
}

fn author_jwt() -> String {
    make_jwt("author", &["eh-author"])
}

// ── Test app builder ───────────────────────────────────────────

fn seeded_store() -> Arc<MemoryCatalogStore> {
    let store = Arc::new(MemoryCatalogStore::new());
    store.add_organisation(OrganisationId(1));
    store.add_organisation(OrganisationId(2));
    store.add_category(CategoryId(1), "Solution Template");
    store.add_category(CategoryId(2), "Component Collection");
    store.add_bundle(BundleId(10));
    store
}

fn build_app(store: Arc<MemoryCatalogStore>) -> axum::Router {
    let service = Arc::new(CatalogServiceImpl::new(store.clone(), store));
    build_router(service, JwtConfig::from_secret(TEST_JWT_SECRET))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn group_body(name: &str, status: &str, categories: &[&str]) -> Value {
    json!({
        "name": name,
        "description": format!("{name} description"),
        "descriptionImage": "data:image/png;base64,",
        "documentationUrl": "https://docs.example.com",
        "status": status,
        "organisationId": "1",
        "categories": categories,
        "children": []
    })
}

async fn create(app: &axum::Router, name: &str, status: &str, categories: &[&str]) -> Value {
    let (status_code, body) = send(
        app,
        post(
            "/api/bundlegroups/",
            Some(&author_jwt()),
            &group_body(name, status, categories),
        ),
    )
    .await;
    assert_eq!(status_code, StatusCode::CREATED, "{body}");
    body
}

// ── Tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
    let app = build_app(seeded_store());
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_then_get_returns_the_same_group() {
    let app = build_app(seeded_store());
    let created = create(&app, "Payments", "PUBLISHED", &["1", "2"]).await;
    let id = created["bundleGroupId"].as_str().unwrap().to_string();
    assert_eq!(created["categories"], json!(["1", "2"]));
    assert_eq!(created["organisationId"], "1");

    let (status, fetched) = send(&app, get(&format!("/api/bundlegroups/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_unknown_and_malformed_ids() {
    let app = build_app(seeded_store());
    let (status, body) = send(&app, get("/api/bundlegroups/424242")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("424242"));

    let (status, _) = send(&app, get("/api/bundlegroups/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_changes_fields_and_keeps_id() {
    let app = build_app(seeded_store());
    let created = create(&app, "Old", "NOT_PUBLISHED", &["1"]).await;
    let id = created["bundleGroupId"].as_str().unwrap();

    let mut body = group_body("New", "PUBLISH_REQ", &["2"]);
    body["children"] = json!(["10"]);
    let (status, updated) = send(
        &app,
        post(&format!("/api/bundlegroups/{id}"), Some(&author_jwt()), &body),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["bundleGroupId"], id);
    assert_eq!(updated["name"], "New");
    assert_eq!(updated["status"], "PUBLISH_REQ");
    assert_eq!(updated["categories"], json!(["2"]));
    assert_eq!(updated["children"], json!(["10"]));
}

#[tokio::test]
async fn update_of_missing_group_is_404_and_creates_nothing() {
    let store = seeded_store();
    let app = build_app(store.clone());
    let (status, _) = send(
        &app,
        post(
            "/api/bundlegroups/999999",
            Some(&author_jwt()),
            &group_body("Ghost", "PUBLISHED", &["1"]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.is_empty());
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let app = build_app(seeded_store());
    let (status, body) = send(
        &app,
        post(
            "/api/bundlegroups/",
            Some(&author_jwt()),
            &group_body("Bad", "LIVE", &[]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("LIVE"));
}

#[tokio::test]
async fn writes_need_a_token_with_a_hub_role() {
    let store = seeded_store();
    let app = build_app(store.clone());
    let body = group_body("Payments", "PUBLISHED", &["1"]);

    let (status, _) = send(&app, post("/api/bundlegroups/", None, &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let viewer = make_jwt("viewer", &["offline_access"]);
    let (status, _) = send(&app, post("/api/bundlegroups/", Some(&viewer), &body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, post("/api/bundlegroups/", Some("not-a-jwt"), &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = encode(
        &Header::default(),
        &TestClaims {
            sub: "mallory".into(),
            roles: vec!["eh-admin".into()],
        },
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();
    let (status, _) = send(&app, post("/api/bundlegroups/", Some(&forged), &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(store.is_empty());

    let admin = make_jwt("admin", &["eh-admin"]);
    let (status, _) = send(&app, post("/api/bundlegroups/", Some(&admin), &body)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn create_with_unknown_category_is_500_and_writes_nothing() {
    let store = seeded_store();
    let app = build_app(store.clone());

    let (status, body) = send(
        &app,
        post(
            "/api/bundlegroups/",
            Some(&author_jwt()),
            &group_body("Ghost", "PUBLISHED", &["999"]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal storage error");
    assert!(store.is_empty());

    let (_, listed) = send(&app, get("/api/bundlegroups/")).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn update_with_unknown_child_is_500_and_keeps_the_row() {
    let app = build_app(seeded_store());
    let created = create(&app, "Payments", "NOT_PUBLISHED", &["1"]).await;
    let id = created["bundleGroupId"].as_str().unwrap();

    let mut body = group_body("Renamed", "PUBLISHED", &["2"]);
    body["children"] = json!(["10", "404"]);
    let (status, error) = send(
        &app,
        post(&format!("/api/bundlegroups/{id}"), Some(&author_jwt()), &body),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["error"], "internal storage error");

    let (_, fetched) = send(&app, get(&format!("/api/bundlegroups/{id}"))).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn roles_are_checked_before_the_body_is_read() {
    let app = build_app(seeded_store());
    let garbage = |token: Option<&str>| {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/bundlegroups/")
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from("{not json")).unwrap()
    };

    let (status, _) = send(&app, garbage(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let viewer = make_jwt("viewer", &[]);
    let (status, _) = send(&app, garbage(Some(&viewer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, garbage(Some(&author_jwt()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_filters_by_organisation() {
    let app = build_app(seeded_store());
    create(&app, "Mine", "PUBLISHED", &["1"]).await;
    let mut other = group_body("Theirs", "PUBLISHED", &["1"]);
    other["organisationId"] = json!("2");
    send(&app, post("/api/bundlegroups/", Some(&author_jwt()), &other)).await;

    let (status, all) = send(&app, get("/api/bundlegroups/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, mine) = send(&app, get("/api/bundlegroups/?organisationId=1")).await;
    let names: Vec<_> = mine
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Mine"]);
}

#[tokio::test]
async fn filtered_listing_pages_published_groups() {
    let app = build_app(seeded_store());
    for i in 0..15 {
        create(&app, &format!("group-{i:02}"), "PUBLISHED", &["1"]).await;
    }
    create(&app, "retired", "DELETED", &["1"]).await;

    let (status, page) = send(
        &app,
        get("/api/bundlegroups/filtered?pageNum=1&pageSize=10&statuses=PUBLISHED"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["payload"].as_array().unwrap().len(), 10);
    assert_eq!(page["metadata"]["page"], 1);
    assert_eq!(page["metadata"]["pageSize"], 10);
    assert_eq!(page["metadata"]["totalItems"], 15);
    assert_eq!(page["metadata"]["lastPage"], 2);

    let (_, second) = send(
        &app,
        get("/api/bundlegroups/filtered?pageNum=2&pageSize=10&statuses=PUBLISHED"),
    )
    .await;
    assert_eq!(second["payload"].as_array().unwrap().len(), 5);
    assert_eq!(second["payload"][0]["name"], "group-10");

    // No statuses key means every status.
    let (_, all) = send(&app, get("/api/bundlegroups/filtered?pageNum=1&pageSize=50")).await;
    assert_eq!(all["metadata"]["totalItems"], 16);
}

#[tokio::test]
async fn filtered_listing_with_explicit_empty_categories_is_empty() {
    let app = build_app(seeded_store());
    create(&app, "Payments", "PUBLISHED", &["1"]).await;

    let (status, page) = send(
        &app,
        get("/api/bundlegroups/filtered?pageNum=1&pageSize=10&categoryIds="),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["metadata"]["totalItems"], 0);
    assert_eq!(page["metadata"]["lastPage"], 0);
    assert!(page["payload"].as_array().unwrap().is_empty());

    let (_, by_category) = send(
        &app,
        get("/api/bundlegroups/filtered?pageNum=1&pageSize=10&categoryIds=2,1"),
    )
    .await;
    assert_eq!(by_category["metadata"]["totalItems"], 1);
}

#[tokio::test]
async fn filtered_listing_rejects_bad_paging() {
    let app = build_app(seeded_store());
    for uri in [
        "/api/bundlegroups/filtered?pageNum=1&pageSize=0",
        "/api/bundlegroups/filtered?pageNum=1",
        "/api/bundlegroups/filtered?pageNum=x&pageSize=10",
        "/api/bundlegroups/filtered?pageNum=1&pageSize=10&statuses=LIVE",
        "/api/bundlegroups/filtered?pageNum=1&pageSize=10&organisationId=acme",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn categories_are_listed() {
    let app = build_app(seeded_store());
    let (status, body) = send(&app, get("/api/categories/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "categoryId": "1", "name": "Solution Template", "description": "" },
            { "categoryId": "2", "name": "Component Collection", "description": "" }
        ])
    );
}
