//! In-process mock of the Attendify backend
//!
//! Records every request it receives and answers with a canned status and
//! body per `METHOD /path`, defaulting to `200 {"ok": true}`.

#![allow(dead_code)]

use attendify::auth::{RecordingNavigator, SessionStore};
use attendify::ApiClient;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub const API_PREFIX: &str = "/api";

/// One request as the backend saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<HashMap<String, (u16, Value)>>>,
}

impl MockBackend {
    /// Answer `method path` (path without the /api prefix) with `status` and `body`
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.responses
            .lock()
            .insert(format!("{} {}", method, path), (status, body));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("backend received no request")
    }

    /// Bind on an ephemeral port and return the base URL
    pub async fn start(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        format!("http://{}{}", addr, API_PREFIX)
    }
}

async fn handle(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();

    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };

    backend.requests.lock().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let canned = backend
        .responses
        .lock()
        .get(&format!("{} {}", method, path))
        .cloned();

    let (status, body) = canned.unwrap_or((200, json!({ "ok": true })));
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

/// A client wired to a fresh mock backend, an in-memory session and a recording navigator
pub struct Harness {
    pub backend: MockBackend,
    pub client: ApiClient,
    pub session: SessionStore,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub async fn start() -> Self {
        let backend = MockBackend::default();
        let base = backend.start().await;
        let session = SessionStore::in_memory();
        let navigator = Arc::new(RecordingNavigator::new());
        let client = ApiClient::new(&base, session.clone(), navigator.clone())
            .expect("client for mock backend");

        Self {
            backend,
            client,
            session,
            navigator,
        }
    }

    /// Store a session holding `token`
    pub fn sign_in(&self, token: &str) {
        self.session
            .set_session(
                attendify::auth::Identity::with_role(attendify::auth::Role::InstituteAdmin)
                    .email("admin@institute.in"),
                token,
            )
            .expect("store session");
    }
}
