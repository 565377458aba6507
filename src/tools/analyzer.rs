use crate::models::{AnalysisRequest, AnalysisResponse, Exchange};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

pub const ANALYZE_PATH: &str = "/analyze";

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeError {
    /// The form was submitted without a product URL.
    MissingUrl,
    /// Non-success status with no error payload in the body.
    Transport { status: u16, status_text: String },
    /// The backend reported a failure in its JSON body.
    Backend {
        error: String,
        message: Option<String>,
    },
    /// The body did not decode into any known result shape.
    Shape(String),
    /// The request never produced a response.
    Network(String),
    /// The result decoded but its markup could not be produced.
    Render(String),
}

impl std::fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzeError::MissingUrl => write!(f, "Product URL is required"),
            // Matches the browser script, which rethrows as `Error: <status text>`.
            AnalyzeError::Transport { status_text, .. } => write!(f, "Error: {}", status_text),
            AnalyzeError::Backend {
                error,
                message: Some(message),
            } => write!(f, "{} ({})", error, message),
            AnalyzeError::Backend { error, .. } => write!(f, "{}", error),
            AnalyzeError::Shape(msg) => write!(f, "Unexpected response: {}", msg),
            AnalyzeError::Network(msg) => write!(f, "Request failed: {}", msg),
            AnalyzeError::Render(msg) => write!(f, "Could not render results: {}", msg),
        }
    }
}

impl std::error::Error for AnalyzeError {}

/// The remote side of one submission: sends the request and hands back the
/// raw reply.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn send(&self, request: &AnalysisRequest) -> Result<Exchange, AnalyzeError>;
}

/// Sends the request and classifies the reply in one step.
pub async fn analyze(
    backend: &dyn AnalysisBackend,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse, AnalyzeError> {
    let exchange = backend.send(request).await?;
    classify(exchange)
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(ANALYZE_PATH))
            .map_err(|e| anyhow::anyhow!("Invalid backend URL {}: {}", base_url, e))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint))]
    async fn send(&self, request: &AnalysisRequest) -> Result<Exchange, AnalyzeError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| AnalyzeError::Network(e.to_string()))?;

        let status = response.status();
        let status_text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());

        let body = response
            .text()
            .await
            .map_err(|e| AnalyzeError::Network(e.to_string()))?;

        debug!("Backend replied {} with {} bytes", status, body.len());

        Ok(Exchange {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

/// Turns a raw reply into a result or one of the error kinds. An error
/// payload wins over the status code; a bad status without one is a
/// transport error.
pub fn classify(exchange: Exchange) -> Result<AnalysisResponse, AnalyzeError> {
    let parsed = serde_json::from_str::<Value>(&exchange.body);

    if let Ok(Value::Object(map)) = &parsed {
        if let Some(err) = error_payload(map, exchange.is_success()) {
            return Err(err);
        }
    }

    if !exchange.is_success() {
        return Err(AnalyzeError::Transport {
            status: exchange.status,
            status_text: exchange.status_text,
        });
    }

    let value = parsed.map_err(|e| AnalyzeError::Shape(e.to_string()))?;
    AnalysisResponse::from_value(value).map_err(|e| AnalyzeError::Shape(e.to_string()))
}

fn error_payload(map: &Map<String, Value>, success: bool) -> Option<AnalyzeError> {
    let message = map.get("message").filter(|v| is_truthy(v)).map(as_text);

    match map.get("error").filter(|v| is_truthy(v)) {
        Some(error) => Some(AnalyzeError::Backend {
            error: as_text(error),
            message,
        }),
        None if !success => message.map(|message| AnalyzeError::Backend {
            error: message,
            message: None,
        }),
        None => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
