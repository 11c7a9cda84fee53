#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use lionwell::services::health_plan_client::{BackendError, HealthPlanBackend, HealthPlanRequest};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

/// In-memory plan service that replays canned replies and records requests.
/// With a gate, every call blocks until the test calls `release`.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    requests: Mutex<Vec<HealthPlanRequest>>,
    queries: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    pub fn gated(replies: Vec<Result<String, BackendError>>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(replies)
        }
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn requests(&self) -> Vec<HealthPlanRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    async fn next_reply(&self) -> Result<String, BackendError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("default reply".to_string()))
    }
}

#[async_trait]
impl HealthPlanBackend for ScriptedBackend {
    async fn generate_health_plan(&self, request: &HealthPlanRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_reply().await
    }

    async fn query(&self, question: &str) -> Result<String, BackendError> {
        self.queries.lock().unwrap().push(question.to_string());
        self.next_reply().await
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn shared(backend: ScriptedBackend) -> Arc<ScriptedBackend> {
    Arc::new(backend)
}
