mod common;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use common::{classified_body, spawn_backend};
use review_lens::models::ReviewForm;
use review_lens::submission::{SubmissionHandler, SubmissionOutcome};
use review_lens::tools::HttpBackend;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Recorded = Arc<Mutex<Vec<Value>>>;

fn form(url: &str, num_pages: Option<&str>) -> ReviewForm {
    ReviewForm {
        url: url.to_string(),
        num_pages: num_pages.map(str::to_string),
    }
}

async fn handler_for(app: Router) -> SubmissionHandler {
    let base = spawn_backend(app).await;
    SubmissionHandler::new(Arc::new(HttpBackend::new(&base).unwrap()))
}

fn markup(outcome: SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::Rendered { markup, .. } => markup,
        other => panic!("expected rendered outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn posts_once_with_submitted_fields() {
    let recorded: Recorded = Arc::default();
    let app = Router::new()
        .route(
            "/analyze",
            post(|State(recorded): State<Recorded>, Json(body): Json<Value>| async move {
                recorded.lock().unwrap().push(body);
                Json(classified_body())
            }),
        )
        .with_state(recorded.clone());

    let handler = handler_for(app).await;
    let html = markup(
        handler
            .submit(form("https://shop.example/p/42", Some("3")))
            .await,
    );

    let bodies = recorded.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({ "url": "https://shop.example/p/42", "num_pages": "3" })
    );
    assert!(html.contains("<p>Positive: 2</p>"));
    assert!(html.contains("Love it (Positive) - Probabilities: 0.01, 0.04, 0.95"));
    assert_eq!(handler.panel().content().await, html);
}

#[tokio::test]
async fn minimal_form_sends_url_only() {
    let recorded: Recorded = Arc::default();
    let app = Router::new()
        .route(
            "/analyze",
            post(|State(recorded): State<Recorded>, Json(body): Json<Value>| async move {
                recorded.lock().unwrap().push(body);
                Json(classified_body())
            }),
        )
        .with_state(recorded.clone());

    let handler = handler_for(app).await;
    handler.submit(form("https://shop.example/p/1", None)).await;

    assert_eq!(
        recorded.lock().unwrap().clone(),
        vec![json!({ "url": "https://shop.example/p/1" })]
    );
}

#[tokio::test]
async fn backend_error_is_shown_verbatim() {
    let app = Router::new().route(
        "/analyze",
        post(|| async { (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad url" }))) }),
    );

    let handler = handler_for(app).await;
    let html = markup(handler.submit(form("nope", Some("1"))).await);

    assert_eq!(html, "<p>Error: bad url</p>");
}

#[tokio::test]
async fn unparseable_failure_shows_status_text() {
    let app = Router::new().route(
        "/analyze",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "<html>upstream down</html>") }),
    );

    let handler = handler_for(app).await;
    let html = markup(handler.submit(form("https://shop.example/p/1", None)).await);

    assert_eq!(html, "<p>An error occurred: Error: Service Unavailable</p>");
}

#[tokio::test]
async fn missing_result_fields_render_generic_error() {
    let app = Router::new().route(
        "/analyze",
        post(|| async { Json(json!({ "sentiment_counts": { "positive": 1 } })) }),
    );

    let handler = handler_for(app).await;
    let html = markup(handler.submit(form("https://shop.example/p/1", None)).await);

    assert!(html.starts_with("<p>An error occurred: Unexpected response:"));
}

#[tokio::test]
async fn refused_connection_renders_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(&format!("http://{}", addr)).unwrap();
    let handler = SubmissionHandler::new(Arc::new(backend));
    let html = markup(handler.submit(form("https://shop.example/p/1", None)).await);

    assert!(html.starts_with("<p>An error occurred: Request failed:"));
}

#[tokio::test]
async fn rated_reply_renders_percentages() {
    let app = Router::new().route(
        "/analyze",
        post(|| async {
            Json(json!({
                "sentiment_summary": {
                    "average_rating": 3.5, "average_confidence": 0.873,
                    "very_positive": 1, "positive": 0, "neutral": 1,
                    "negative": 0, "very_negative": 0
                },
                "analyzed_reviews": [
                    { "review_text": "Decent", "predicted_rating": 3, "confidence": 0.5,
                      "probabilities": [0.1, 0.1, 0.5, 0.2, 0.1] }
                ],
                "total_reviews": 3,
                "processed_reviews": 2
            }))
        }),
    );

    let handler = handler_for(app).await;
    let html = markup(handler.submit(form("https://shop.example/p/1", Some("1"))).await);

    assert!(html.contains("<p>Average Confidence: 87.3%</p>"));
    assert!(html.contains(
        "<li>Decent (★★★☆☆ Neutral) - Confidence: 50.0% - Probabilities: 0.10, 0.10, 0.50, 0.20, 0.10</li>"
    ));
}
