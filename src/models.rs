use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw field values read from the review form at submit time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub num_pages: Option<String>,
}

/// Body of `POST /analyze`. `num_pages` is passed through uninterpreted and
/// omitted entirely for the minimal `{ "url" }` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_pages: Option<String>,
}

impl From<ReviewForm> for AnalysisRequest {
    fn from(form: ReviewForm) -> Self {
        Self {
            url: form.url,
            num_pages: form.num_pages,
        }
    }
}

/// A successful reply from the analysis backend, keyed by which top-level
/// fields the payload carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResponse {
    Classified(ClassifiedReport),
    Rated(RatedReport),
    Keyword(KeywordReport),
}

impl AnalysisResponse {
    /// Decodes a backend payload that is already known not to carry an error.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let has = |key: &str| value.get(key).is_some();
        let (rated, keyword, classified) = (
            has("sentiment_summary"),
            has("sentiments"),
            has("sentiment_counts"),
        );

        if rated {
            serde_json::from_value(value).map(AnalysisResponse::Rated)
        } else if keyword {
            serde_json::from_value(value).map(AnalysisResponse::Keyword)
        } else if classified {
            serde_json::from_value(value).map(AnalysisResponse::Classified)
        } else {
            Err(serde::de::Error::custom(
                "response carries none of `sentiment_counts`, `sentiment_summary` or `sentiments`",
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

/// Sentiment as sent by the backend: an index into
/// `["Negative", "Neutral", "Positive"]` or an already named bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sentiment {
    Index(i64),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReport {
    pub sentiment_counts: SentimentCounts,
    pub reviews: Vec<ClassifiedReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReview {
    pub review: String,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub probabilities: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedReport {
    pub sentiment_summary: RatingSummary,
    pub analyzed_reviews: Vec<RatedReview>,
    pub total_reviews: u64,
    pub processed_reviews: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub average_confidence: f64,
    pub very_positive: u64,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub very_negative: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedReview {
    pub review_text: String,
    pub predicted_rating: i64,
    pub confidence: f64,
    #[serde(default)]
    pub probabilities: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub sentiments: SentimentCounts,
    pub keywords: Vec<(String, u64)>,
    pub reviews: Vec<KeywordReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReview {
    pub review: String,
    pub sentiment: Sentiment,
}

/// Raw reply to one `POST /analyze`, before classification.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl Exchange {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
