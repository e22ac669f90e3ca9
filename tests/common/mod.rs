#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};

use crm_admin::{client::ResourceClient, config::ClientConfig, models::query::PaginationStyle};

/// Uma requisição recebida pelo backend falso.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Shared {
    requests: Mutex<Vec<Recorded>>,
    responses: Mutex<HashMap<(Method, String), (u16, String)>>,
}

/// Backend falso em `127.0.0.1:0`: grava tudo o que recebe e responde
/// o que foi programado para `(método, caminho)`; o resto é 404.
pub struct StubBackend {
    pub base_url: String,
    shared: Arc<Shared>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let app = Router::new().fallback(record_and_reply).with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}"), shared }
    }

    /// Programa a resposta (corpo JSON) de uma rota.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond_raw(method, path, status, body.to_string());
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.shared
            .responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body.into()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn client(&self) -> ResourceClient {
        ResourceClient::new(ClientConfig::new(&self.base_url))
    }

    pub fn client_with_style(&self, style: PaginationStyle) -> ResourceClient {
        let mut config = ClientConfig::new(&self.base_url);
        config.pagination_style = style;
        ResourceClient::new(config)
    }
}

async fn record_and_reply(State(shared): State<Arc<Shared>>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    let body = (!body.is_empty()).then(|| serde_json::from_slice(&body).unwrap_or(Value::Null));

    shared.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body,
    });

    let reply = shared.responses.lock().unwrap().get(&(method, path.clone())).cloned();
    let (status, body) = reply.unwrap_or_else(|| {
        (404, json!({ "success": false, "message": format!("No route for {path}") }).to_string())
    });

    let status = StatusCode::from_u16(status).unwrap();
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

/// Envelope de sucesso no formato do backend.
pub fn ok(data: Value) -> Value {
    json!({
        "success": true,
        "message": "OK",
        "data": data,
        "statusCode": 200,
        "timestamp": "2026-01-01T00:00:00Z"
    })
}

/// Endereço onde ninguém escuta.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
