//! In-process fake of the storefront content API, shared by the test suites.
//!
//! Speaks both endpoint dialects, records every request it sees and can be
//! told to fail or stall specific routes. A stalled route answers with the
//! state as it was when the request arrived.

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::Mutex};

use crate::transport::{ApiClient, Credentials};

const SECTIONS: [&str; 7] = [
    "hero",
    "collections",
    "quality",
    "furniture-details",
    "stories-section",
    "testimonials-section",
    "newsletter",
];
const RESOURCES: [&str; 5] = ["stories", "testimonials", "gallery", "faq", "partners"];

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Debug, Clone)]
struct Failure {
    status: StatusCode,
    body: Value,
}

#[derive(Default)]
struct FakeState {
    sections: HashMap<String, Value>,
    resources: HashMap<String, Vec<Value>>,
    navbar: Vec<Value>,
    footer_sections: Vec<Value>,
    footer_links: Vec<Value>,
    social_links: Vec<Value>,
    next_id: i64,
    failures: HashMap<(Method, String), Failure>,
    stalls: HashMap<(Method, String), Duration>,
    requests: Vec<Recorded>,
    uploads: u32,
    bare_acks: bool,
}

impl FakeState {
    fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeSite {
    pub base_url: String,
    state: Shared,
}

impl FakeSite {
    pub async fn spawn() -> Self {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base_url: format!("http://{addr}/api/"),
            state,
        }
    }

    pub fn client(&self) -> ApiClient {
        self.client_with(Credentials::default())
    }

    pub fn client_with(&self, credentials: Credentials) -> ApiClient {
        ApiClient::new(&self.base_url, credentials, Duration::from_secs(5)).expect("client")
    }

    /// The next record created gets `id + 1`.
    pub async fn set_last_id(&self, id: i64) {
        self.state.lock().await.next_id = id;
    }

    pub async fn seed_section(&self, name: &str, body: Value) {
        self.state
            .lock()
            .await
            .sections
            .insert(name.to_string(), body);
    }

    pub async fn seed(&self, collection: &str, items: Vec<Value>) {
        self.state
            .lock()
            .await
            .resources
            .insert(collection.to_string(), items);
    }

    /// Flat navbar rows; children carry `parent_id`.
    pub async fn seed_navbar(&self, items: Vec<Value>) {
        self.state.lock().await.navbar = items;
    }

    pub async fn seed_footer(&self, sections: Vec<Value>, links: Vec<Value>, social: Vec<Value>) {
        let mut state = self.state.lock().await;
        state.footer_sections = sections;
        state.footer_links = links;
        state.social_links = social;
    }

    pub async fn fail(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.state
            .lock()
            .await
            .failures
            .insert((method, path.to_string()), Failure { status, body });
    }

    pub async fn heal(&self, method: Method, path: &str) {
        self.state
            .lock()
            .await
            .failures
            .remove(&(method, path.to_string()));
    }

    pub async fn stall(&self, method: Method, path: &str, delay: Duration) {
        self.state
            .lock()
            .await
            .stalls
            .insert((method, path.to_string()), delay);
    }

    /// Save acknowledgements stop echoing the record.
    pub async fn bare_acks(&self) {
        self.state.lock().await.bare_acks = true;
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.state.lock().await.requests.clone()
    }

    pub async fn count(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub async fn mutations(&self) -> usize {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|request| request.method != Method::GET)
            .count()
    }
}

/// A base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api/")
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches("/api/").to_string();
    let is_multipart = headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));
    let parsed = if body.is_empty() || is_multipart {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };

    let (response, stall) = {
        let mut guard = state.lock().await;
        guard.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            headers: headers.clone(),
            body: parsed.clone(),
        });
        let key = (method.clone(), path.clone());
        if let Some(failure) = guard.failures.get(&key) {
            return (failure.status, Json(failure.body.clone())).into_response();
        }
        let stall = guard.stalls.remove(&key);
        (route(&mut guard, &method, &path, parsed, &body), stall)
    };
    if let Some(delay) = stall {
        tokio::time::sleep(delay).await;
    }
    response
}

fn route(
    state: &mut FakeState,
    method: &Method,
    path: &str,
    body: Value,
    raw: &[u8],
) -> Response {
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["website", "upload-image"]) => {
            if !String::from_utf8_lossy(raw).contains("name=\"image\"") {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "No image file provided"})),
                )
                    .into_response();
            }
            state.uploads += 1;
            let url = format!("http://cdn.test/media/website/upload-{}.jpg", state.uploads);
            (StatusCode::CREATED, Json(json!({"image_url": url}))).into_response()
        }
        ("GET", ["website", name]) if SECTIONS.contains(name) => {
            let body = state.sections.get(*name).cloned().unwrap_or(json!({}));
            Json(body).into_response()
        }
        ("PUT", ["website", name]) if SECTIONS.contains(name) => {
            let mut stored = state
                .sections
                .get(*name)
                .cloned()
                .unwrap_or_else(|| json!({"id": 1}));
            merge(&mut stored, body);
            stored["updated_at"] = json!("2024-05-01T10:00:00Z");
            state.sections.insert(name.to_string(), stored.clone());
            Json(stored).into_response()
        }
        ("GET", ["website", name]) if RESOURCES.contains(name) => {
            Json(Value::Array(state.resources.get(*name).cloned().unwrap_or_default()))
                .into_response()
        }
        ("POST", ["website", name]) if RESOURCES.contains(name) => {
            let id = state.assign_id();
            let mut record = body;
            record["id"] = json!(id);
            state
                .resources
                .entry(name.to_string())
                .or_default()
                .push(record.clone());
            (StatusCode::CREATED, Json(record)).into_response()
        }
        ("PUT", ["website", name, id]) if RESOURCES.contains(name) => {
            let id: i64 = id.parse().unwrap_or_default();
            let items = state.resources.entry(name.to_string()).or_default();
            match items.iter_mut().find(|item| item["id"] == json!(id)) {
                Some(item) => {
                    merge(item, body);
                    Json(item.clone()).into_response()
                }
                None => not_found(),
            }
        }
        ("DELETE", ["website", name, id]) if RESOURCES.contains(name) => {
            let id: i64 = id.parse().unwrap_or_default();
            let items = state.resources.entry(name.to_string()).or_default();
            let before = items.len();
            items.retain(|item| item["id"] != json!(id));
            if items.len() == before {
                not_found()
            } else {
                StatusCode::NO_CONTENT.into_response()
            }
        }
        ("GET", ["website", "navbar", "get"]) => {
            Json(json!({"success": true, "navbar_items": navbar_tree(&state.navbar)}))
                .into_response()
        }
        ("POST", ["website", "navbar", "save"]) => {
            let id = upsert(&mut state.navbar, &mut state.next_id, body);
            ack("navbar_item", id, state.bare_acks)
        }
        ("POST", ["website", "navbar", "delete"]) => {
            let id = body["id"].clone();
            state
                .navbar
                .retain(|item| item["id"] != id && item["parent_id"] != id);
            Json(json!({"success": true, "message": "Navbar item deleted"})).into_response()
        }
        ("GET", ["website", "footer", "get"]) => Json(footer_listing(state)).into_response(),
        ("POST", ["website", "footer", "section", "save"]) => {
            let id = upsert(&mut state.footer_sections, &mut state.next_id, body);
            ack("footer_section", id, state.bare_acks)
        }
        ("POST", ["website", "footer", "section", "delete"]) => {
            let id = body["id"].clone();
            state.footer_sections.retain(|section| section["id"] != id);
            state.footer_links.retain(|link| link["section_id"] != id);
            Json(json!({"success": true})).into_response()
        }
        ("POST", ["website", "footer", "link", "save"]) => {
            let id = upsert(&mut state.footer_links, &mut state.next_id, body);
            ack("footer_link", id, state.bare_acks)
        }
        ("POST", ["website", "footer", "link", "delete"]) => {
            let id = body["id"].clone();
            state.footer_links.retain(|link| link["id"] != id);
            Json(json!({"success": true})).into_response()
        }
        ("POST", ["website", "footer", "social", "save"]) => {
            let id = upsert(&mut state.social_links, &mut state.next_id, body);
            ack("social_link", id, state.bare_acks)
        }
        ("POST", ["website", "footer", "social", "delete"]) => {
            let id = body["id"].clone();
            state.social_links.retain(|link| link["id"] != id);
            Json(json!({"success": true})).into_response()
        }
        _ => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

fn ack(key: &str, id: i64, bare: bool) -> Response {
    let mut body = Map::new();
    body.insert("success".to_string(), json!(true));
    if !bare {
        body.insert(key.to_string(), json!({"id": id}));
    }
    Json(Value::Object(body)).into_response()
}

fn merge(target: &mut Value, patch: Value) {
    if let (Some(target), Value::Object(patch)) = (target.as_object_mut(), patch) {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
}

/// Command-style save: updates when the body names an existing id.
fn upsert(rows: &mut Vec<Value>, next_id: &mut i64, body: Value) -> i64 {
    if let Some(id) = body.get("id").and_then(Value::as_i64) {
        if let Some(row) = rows.iter_mut().find(|row| row["id"] == json!(id)) {
            merge(row, body);
            return id;
        }
    }
    *next_id += 1;
    let mut row = body;
    row["id"] = json!(*next_id);
    rows.push(row);
    *next_id
}

fn navbar_tree(rows: &[Value]) -> Vec<Value> {
    rows.iter()
        .filter(|row| row["parent_id"].is_null())
        .map(|parent| {
            let mut node = parent.clone();
            if let Some(node) = node.as_object_mut() {
                node.remove("parent_id");
            }
            node["submenu"] = Value::Array(
                rows.iter()
                    .filter(|row| row["parent_id"] == parent["id"])
                    .cloned()
                    .collect(),
            );
            node
        })
        .collect()
}

fn footer_listing(state: &FakeState) -> Value {
    let sections: Vec<Value> = state
        .footer_sections
        .iter()
        .map(|section| {
            let mut node = section.clone();
            node["links"] = Value::Array(
                state
                    .footer_links
                    .iter()
                    .filter(|link| link["section_id"] == section["id"])
                    .cloned()
                    .collect(),
            );
            node
        })
        .collect();
    json!({
        "success": true,
        "footer_sections": sections,
        "social_links": state.social_links,
    })
}
