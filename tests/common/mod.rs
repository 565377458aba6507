#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use review_lens::models::{AnalysisRequest, Exchange};
use review_lens::tools::{AnalysisBackend, AnalyzeError};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn ok(body: Value) -> Exchange {
    Exchange {
        status: 200,
        status_text: "OK".to_string(),
        body: body.to_string(),
    }
}

pub fn classified_body() -> Value {
    serde_json::json!({
        "sentiment_counts": { "positive": 2, "neutral": 1, "negative": 0 },
        "reviews": [
            { "review": "Love it", "sentiment": 2, "probabilities": [0.01, 0.04, 0.95] },
            { "review": "It is fine", "sentiment": 1, "probabilities": [0.2, 0.5, 0.3] }
        ]
    })
}

/// Replies with the same exchange every time and records each request.
pub struct FixedBackend {
    reply: Exchange,
    pub sent: Mutex<Vec<AnalysisRequest>>,
}

impl FixedBackend {
    pub fn new(reply: Exchange) -> Self {
        Self {
            reply,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<AnalysisRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for FixedBackend {
    async fn send(&self, request: &AnalysisRequest) -> Result<Exchange, AnalyzeError> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}

/// Holds each request open until the test releases it through the matching
/// sender, so completion order can be chosen independently of issue order.
pub struct GatedBackend {
    gates: Mutex<VecDeque<oneshot::Receiver<Exchange>>>,
    pub sent: Mutex<Vec<AnalysisRequest>>,
}

impl GatedBackend {
    pub fn new(count: usize) -> (Self, Vec<oneshot::Sender<Exchange>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..count).map(|_| oneshot::channel()).unzip();
        let backend = Self {
            gates: Mutex::new(receivers),
            sent: Mutex::new(Vec::new()),
        };
        (backend, senders)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl AnalysisBackend for GatedBackend {
    async fn send(&self, request: &AnalysisRequest) -> Result<Exchange, AnalyzeError> {
        self.sent.lock().unwrap().push(request.clone());
        let gate = self
            .gates
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AnalyzeError::Network("no gate left".to_string()))?;
        gate.await.map_err(|e| AnalyzeError::Network(e.to_string()))
    }
}
