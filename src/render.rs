//! Markup for the results container.
//!
//! Every function here is pure: the same input always yields byte-identical
//! markup, and nothing touches a live page. Templates live under
//! `templates/` and escape interpolated text.

use crate::models::{
    AnalysisResponse, ClassifiedReport, KeywordReport, RatedReport, Sentiment, SentimentCounts,
};
use crate::tools::AnalyzeError;
use askama::Template;
use tracing::{error, warn};

pub const LOADING_MARKUP: &str = "<p>Analyzing reviews... This may take a moment.</p>";

pub const SENTIMENT_LABELS: [&str; 3] = ["Negative", "Neutral", "Positive"];

/// Rating buckets 1..=5.
pub const RATING_LABELS: [&str; 5] = [
    "Very Negative",
    "Negative",
    "Neutral",
    "Positive",
    "Very Positive",
];

const UNKNOWN_LABEL: &str = "Unknown";

// ============================================================
// TEMPLATES
// ============================================================

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    session_id: &'a str,
    loading: &'a str,
}

#[derive(Template)]
#[template(path = "results/classified.html")]
struct ClassifiedTemplate {
    counts: SentimentCounts,
    reviews: Vec<ReviewView>,
}

#[derive(Template)]
#[template(path = "results/rated.html")]
struct RatedTemplate {
    average_rating: String,
    average_confidence: String,
    processed: u64,
    total: u64,
    buckets: Vec<BucketView>,
    reviews: Vec<ReviewView>,
}

#[derive(Template)]
#[template(path = "results/keyword.html")]
struct KeywordTemplate {
    counts: SentimentCounts,
    keywords: Vec<KeywordView>,
    reviews: Vec<ReviewView>,
}

#[derive(Template)]
#[template(source = "<p>Error: {{ message }}</p>", ext = "html")]
struct BackendErrorTemplate {
    message: String,
}

#[derive(Template)]
#[template(source = "<p>An error occurred: {{ message }}</p>", ext = "html")]
struct FailureTemplate {
    message: String,
}

/// View model for one review line.
struct ReviewView {
    text: String,
    label: String,
    detail: String,
}

struct BucketView {
    label: String,
    count: u64,
}

struct KeywordView {
    term: String,
    count: u64,
}

// ============================================================
// RENDERING
// ============================================================

pub fn render_response(response: &AnalysisResponse) -> askama::Result<String> {
    match response {
        AnalysisResponse::Classified(report) => classified_view(report).render(),
        AnalysisResponse::Rated(report) => rated_view(report).render(),
        AnalysisResponse::Keyword(report) => keyword_view(report).render(),
    }
}

pub fn render_error(err: &AnalyzeError) -> String {
    let message = err.to_string();
    // Transport errors already carry an `Error: ` prefix, so the display reads
    // `An error occurred: Error: <status text>`, same as the browser script.
    let rendered = match err {
        AnalyzeError::Backend { .. } => BackendErrorTemplate { message }.render(),
        _ => FailureTemplate { message }.render(),
    };

    rendered.unwrap_or_else(|e| {
        error!("Error template failed: {}", e);
        "<p>An error occurred.</p>".to_string()
    })
}

/// The form page served for one page session. Element ids are the fixed
/// contract points `review-form`, `url`, `num_pages` and `results`.
pub fn render_page(session_id: &str) -> askama::Result<String> {
    PageTemplate {
        session_id,
        loading: LOADING_MARKUP,
    }
    .render()
}

pub fn sentiment_label(sentiment: &Sentiment) -> String {
    match sentiment {
        Sentiment::Index(index) => usize::try_from(*index)
            .ok()
            .and_then(|i| SENTIMENT_LABELS.get(i).copied())
            .map(|label| label.to_string())
            .unwrap_or_else(|| {
                warn!("Sentiment index {} outside the label set", index);
                UNKNOWN_LABEL.to_string()
            }),
        Sentiment::Named(name) => name.clone(),
    }
}

/// Star label for a 1..=5 rating, e.g. `★★★★☆ Positive`.
pub fn rating_label(rating: i64) -> String {
    match rating {
        1..=5 => {
            let filled = rating as usize;
            format!(
                "{}{} {}",
                "★".repeat(filled),
                "☆".repeat(5 - filled),
                RATING_LABELS[filled - 1]
            )
        }
        _ => {
            warn!("Rating {} outside the 1-5 scale", rating);
            UNKNOWN_LABEL.to_string()
        }
    }
}

/// `0.873` -> `87.3%`
pub fn format_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

pub fn format_probabilities(probabilities: &[f64]) -> String {
    probabilities
        .iter()
        .map(|p| format!("{:.2}", p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn probability_detail(probabilities: Option<&Vec<f64>>) -> String {
    probabilities
        .map(|p| format!(" - Probabilities: {}", format_probabilities(p)))
        .unwrap_or_default()
}

fn classified_view(report: &ClassifiedReport) -> ClassifiedTemplate {
    ClassifiedTemplate {
        counts: report.sentiment_counts,
        reviews: report
            .reviews
            .iter()
            .map(|r| ReviewView {
                text: r.review.clone(),
                label: sentiment_label(&r.sentiment),
                detail: probability_detail(r.probabilities.as_ref()),
            })
            .collect(),
    }
}

fn rated_view(report: &RatedReport) -> RatedTemplate {
    let summary = &report.sentiment_summary;
    let buckets = [
        (5, summary.very_positive),
        (4, summary.positive),
        (3, summary.neutral),
        (2, summary.negative),
        (1, summary.very_negative),
    ];

    RatedTemplate {
        average_rating: format!("{:.2}", summary.average_rating),
        average_confidence: format_percent(summary.average_confidence),
        processed: report.processed_reviews,
        total: report.total_reviews,
        buckets: buckets
            .into_iter()
            .map(|(rating, count)| BucketView {
                label: rating_label(rating),
                count,
            })
            .collect(),
        reviews: report
            .analyzed_reviews
            .iter()
            .map(|r| ReviewView {
                text: r.review_text.clone(),
                label: rating_label(r.predicted_rating),
                detail: format!(
                    " - Confidence: {}{}",
                    format_percent(r.confidence),
                    probability_detail(r.probabilities.as_ref())
                ),
            })
            .collect(),
    }
}

fn keyword_view(report: &KeywordReport) -> KeywordTemplate {
    KeywordTemplate {
        counts: report.sentiments,
        keywords: report
            .keywords
            .iter()
            .map(|(term, count)| KeywordView {
                term: term.clone(),
                count: *count,
            })
            .collect(),
        reviews: report
            .reviews
            .iter()
            .map(|r| ReviewView {
                text: r.review.clone(),
                label: sentiment_label(&r.sentiment),
                detail: String::new(),
            })
            .collect(),
    }
}
