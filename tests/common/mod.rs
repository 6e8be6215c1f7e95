//! In-process mock of the SDA REST API.
//!
//! Serves canned JSON per endpoint, records every request (path, query and
//! Authorization header) and creates a fresh task record per POST.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use oursky_sda::{SdaClient, SdaConfig};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub type Shared = Arc<Mutex<MockState>>;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

#[derive(Debug)]
pub struct MockState {
    pub targets: Value,
    pub target: Value,
    pub potentials: Value,
    pub osr_pages: VecDeque<Value>,
    pub nodes: HashMap<String, Value>,
    pub tdms: Value,
    /// When set, every endpoint answers with this status
    pub fail_status: Option<u16>,
    /// When set, every endpoint answers 200 with a non-JSON body
    pub malformed: bool,

    pub requests: Vec<RecordedRequest>,
    pub created_tasks: Vec<Value>,
    pub search_instructions: Vec<Value>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            targets: json!({ "targets": [] }),
            target: json!({}),
            potentials: json!([]),
            osr_pages: VecDeque::new(),
            nodes: HashMap::new(),
            tdms: json!([]),
            fail_status: None,
            malformed: false,
            requests: Vec::new(),
            created_tasks: Vec::new(),
            search_instructions: Vec::new(),
        }
    }
}

impl MockState {
    pub fn paths(&self) -> Vec<String> {
        self.requests.iter().map(|r| r.path.clone()).collect()
    }
}

fn record(
    state: &mut MockState,
    path: &str,
    headers: &HeaderMap,
    query: HashMap<String, String>,
) -> Option<Response> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.push(RecordedRequest {
        path: path.to_string(),
        query,
        authorization,
    });

    if let Some(code) = state.fail_status {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Some((status, format!("mock failure {}", code)).into_response());
    }
    if state.malformed {
        return Some((StatusCode::OK, "<html>not json</html>").into_response());
    }
    None
}

async fn list_targets(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = shared.lock().unwrap();
    if let Some(resp) = record(&mut state, "/v1/satellite-targets", &headers, query) {
        return resp;
    }
    Json(state.targets.clone()).into_response()
}

async fn get_target(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = shared.lock().unwrap();
    if let Some(resp) = record(&mut state, "/v1/satellite-target", &headers, query) {
        return resp;
    }
    Json(state.target.clone()).into_response()
}

async fn list_potentials(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = shared.lock().unwrap();
    if let Some(resp) = record(&mut state, "/v1/satellite-target-potentials", &headers, query) {
        return resp;
    }
    Json(state.potentials.clone()).into_response()
}

async fn create_organization_target(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = shared.lock().unwrap();
    if let Some(resp) = record(&mut state, "/v1/organization-target", &headers, HashMap::new()) {
        return resp;
    }
    let task = json!({
        "id": format!("task-{}", state.created_tasks.len() + 1),
        "satelliteTargetId": body["satelliteTargetId"],
        "createdAt": "2030-01-01T00:00:00Z",
        "status": "PENDING",
    });
    state.created_tasks.push(task.clone());
    Json(task).into_response()
}

async fn list_sequence_results(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = shared.lock().unwrap();
    if let Some(resp) = record(
        &mut state,
        "/v1/observation-sequence-results",
        &headers,
        query,
    ) {
        return resp;
    }
    let page = state.osr_pages.pop_front().unwrap_or_else(|| json!([]));
    Json(page).into_response()
}

async fn get_node_properties(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let node_id = query.get("nodeId").cloned().unwrap_or_default();
    let mut state = shared.lock().unwrap();
    if let Some(resp) = record(&mut state, "/v1/node-properties", &headers, query) {
        return resp;
    }
    match state.nodes.get(&node_id) {
        Some(node) => Json(node.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, format!("unknown node {}", node_id)).into_response(),
    }
}

async fn list_tdms(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = shared.lock().unwrap();
    if let Some(resp) = record(&mut state, "/v1/tdms", &headers, query) {
        return resp;
    }
    Json(state.tdms.clone()).into_response()
}

async fn create_search_instruction(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = shared.lock().unwrap();
    if let Some(resp) = record(&mut state, "/v1/search-instruction", &headers, HashMap::new()) {
        return resp;
    }
    state.search_instructions.push(body);
    Json(json!({ "id": format!("search-{}", state.search_instructions.len()) })).into_response()
}

/// Start the mock on an ephemeral port and return its base URL
pub async fn spawn(state: MockState) -> (String, Shared) {
    let shared: Shared = Arc::new(Mutex::new(state));
    let app = Router::new()
        .route("/v1/satellite-targets", get(list_targets))
        .route("/v1/satellite-target", get(get_target))
        .route("/v1/satellite-target-potentials", get(list_potentials))
        .route("/v1/organization-target", post(create_organization_target))
        .route(
            "/v1/observation-sequence-results",
            get(list_sequence_results),
        )
        .route("/v1/node-properties", get(get_node_properties))
        .route("/v1/tdms", get(list_tdms))
        .route("/v1/search-instruction", post(create_search_instruction))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), shared)
}

pub fn client_for(base_url: &str, token: &str) -> SdaClient {
    let config = SdaConfig::new(token).unwrap().with_base_url(base_url);
    SdaClient::new(&config).unwrap()
}

pub fn osr(created_at: &str, node_ids: &[&str]) -> Value {
    let image_sets: Vec<Value> = node_ids
        .iter()
        .map(|n| json!({ "id": format!("img-{}", n), "nodeId": n }))
        .collect();
    json!({
        "id": format!("osr-{}", created_at),
        "targetId": "iss-1",
        "createdAt": created_at,
        "imageSets": image_sets,
    })
}
