// REST and slash-command routes against a wiremocked Breezeway API.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use breezly_api::{BreezewayClient, Credentials};
use breezly_server::{AppState, router, slack};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AppState) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/public/auth/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "refresh_token": "ref",
        })))
        .mount(&server)
        .await;

    let client = BreezewayClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        Credentials::new("id", SecretString::from("secret".to_owned())),
    );
    (server, AppState::new(Arc::new(client)))
}

async fn mount_properties(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": 1, "name": "Needle Lodge", "reference_property_id": "S-1", "status": "active" },
                { "id": 2, "name": "Harbor House", "reference_property_id": "S-2", "status": "active" },
                { "id": 3, "name": "Casa Azul", "status": "active" }
            ]
        })))
        .mount(server)
        .await;
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ── REST ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let (_server, state) = setup().await;
    let (status, body) = send(state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "service": "breezly" }));
}

#[tokio::test]
async fn test_list_properties_paginates() {
    let (server, state) = setup().await;
    mount_properties(&server).await;

    let (status, body) = send(state, get("/api/properties?offset=1&limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Harbor House");
}

#[tokio::test]
async fn test_search_properties() {
    let (server, state) = setup().await;
    mount_properties(&server).await;

    let (status, body) = send(state, get("/api/properties/search?q=NEEDLE")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["type"], "property");
    assert_eq!(body["results"][0]["title"], "Needle Lodge");
}

#[tokio::test]
async fn test_search_requires_query() {
    let (_server, state) = setup().await;
    let (status, body) = send(state, get("/api/properties/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("'q'"));
}

#[tokio::test]
async fn test_property_by_internal_id() {
    let (server, state) = setup().await;
    mount_properties(&server).await;

    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "name": "Harbor House",
            "wifi_name": "Harbor"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(state, get("/api/properties/internal/S-2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wifi_name"], "Harbor");
}

#[tokio::test]
async fn test_unknown_internal_id_is_404() {
    let (server, state) = setup().await;
    mount_properties(&server).await;

    let (status, body) = send(state, get("/api/properties/internal/S-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No property found with Internal ID: S-404");
}

#[tokio::test]
async fn test_upstream_404_maps_to_404() {
    let (server, state) = setup().await;

    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (status, body) = send(state, get("/api/properties/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "API request failed (HTTP 404): Not Found");
}

#[tokio::test]
async fn test_upstream_failure_maps_to_502() {
    let (server, state) = setup().await;

    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/task/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, _body) = send(state, get("/api/tasks")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_tasks_pass_query_through() {
    let (server, state) = setup().await;

    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/task/"))
        .and(query_param("property_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 70, "title": "Inspect", "property_id": 7 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(state, get("/api/tasks?property_id=7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

// ── Tools ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tool_list_names_every_tool() {
    let (_server, state) = setup().await;
    let (status, body) = send(state, get("/api/tools")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"search"));
    assert!(names.contains(&"update_property"));
}

#[tokio::test]
async fn test_search_tool_text() {
    let (server, state) = setup().await;
    mount_properties(&server).await;

    let (status, body) = send(
        state,
        post_json("/api/tools/search", &json!({ "query": "casa", "types": ["properties"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["text"],
        "Found 1 result(s) for \"casa\":\n\n1. [PROPERTY] Casa Azul\n   ID: 3\n   Address: N/A | Status: active"
    );
}

#[tokio::test]
async fn test_fetch_tool_unknown_kind_is_reported() {
    let (_server, state) = setup().await;
    let (status, body) = send(
        state,
        post_json("/api/tools/fetch", &json!({ "type": "guest", "id": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Error executing tool \"fetch\": Unknown entity type: guest"
    );
}

#[tokio::test]
async fn test_unknown_tool_is_404() {
    let (_server, state) = setup().await;
    let (status, _) = send(state, post_json("/api/tools/delete_everything", &json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_property_tool_merges_notes() {
    let (server, state) = setup().await;

    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "name": "Casa",
            "notes": { "about": "Keep", "trash_info": "Tuesday" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/public/inventory/v1/property/5"))
        .and(wiremock::matchers::body_json(json!({
            "notes": { "about": "Keep", "trash_info": "Thursday" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(
        state,
        post_json(
            "/api/tools/update_property",
            &json!({ "id": "5", "updates": { "notes": { "trash_info": "Thursday" } } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["text"]
            .as_str()
            .unwrap()
            .starts_with("Successfully updated property 5 (Casa)")
    );
}

// ── Slash command ───────────────────────────────────────────────────

fn slash(body: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/slack/commands")
        .header("content-type", "application/x-www-form-urlencoded");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

#[tokio::test]
async fn test_slash_usage_is_ephemeral() {
    let (_server, state) = setup().await;
    let (status, body) = send(state, slash("command=%2Fbreezeway&text=", &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response_type"], "ephemeral");
    assert!(body["text"].as_str().unwrap().starts_with("Usage:"));
}

#[tokio::test]
async fn test_slash_wifi_posts_in_channel() {
    let (server, state) = setup().await;
    mount_properties(&server).await;

    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "Needle Lodge",
            "notes": { "wifi_network": "LodgeNet", "wifi password": "pine-cone" }
        })))
        .mount(&server)
        .await;

    let (_, body) = send(state, slash("text=wifi+needle", &[])).await;
    assert_eq!(body["response_type"], "in_channel");
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("WiFi Info for Needle Lodge:"));
    assert!(text.contains("*Network:* LodgeNet"));
    assert!(text.contains("*Password:* pine-cone"));
}

#[tokio::test]
async fn test_slash_wifi_skips_hits_without_id() {
    let (server, state) = setup().await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "name": "Needle Shack" },
                { "id": 7, "name": "Needle Lodge" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "name": "Needle Lodge",
            "wifi_name": "LodgeNet"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_, body) = send(state, slash("text=wifi+needle", &[])).await;
    assert_eq!(body["response_type"], "in_channel");
    assert!(body["text"].as_str().unwrap().starts_with("WiFi Info for Needle Lodge:"));
}

#[tokio::test]
async fn test_slash_list_caps_entries() {
    let (server, state) = setup().await;

    let many: Vec<Value> = (1..=12)
        .map(|i| json!({ "id": i, "name": format!("Unit {i}") }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/public/inventory/v1/property"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": many })))
        .mount(&server)
        .await;

    let (_, body) = send(state, slash("text=list", &[])).await;
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("Total properties: 12 (showing first 10):"));
    assert!(text.contains("10. *Unit 10*"));
    assert!(!text.contains("Unit 11"));
}

#[tokio::test]
async fn test_slash_signature_required_when_configured() {
    let (_server, state) = setup().await;
    let secret = SecretString::from("signing-secret".to_owned());
    let state = state.with_slack_signing_secret(Some(secret.clone()));

    let ts = unix_now().to_string();
    let signed_for_list = slack::sign(&secret, &ts, b"text=list").unwrap();
    let signed_for_empty = slack::sign(&secret, &ts, b"text=").unwrap();

    let (status, _) = send(
        state.clone(),
        slash(
            "text=wifi",
            &[("x-slack-request-timestamp", ts.as_str()), ("x-slack-signature", signed_for_list.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(state.clone(), slash("text=", &[])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        state,
        slash(
            "text=",
            &[("x-slack-request-timestamp", ts.as_str()), ("x-slack-signature", signed_for_empty.as_str())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response_type"], "ephemeral");
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
