use crate::models::{AnalysisRequest, ReviewForm};
use crate::panel::ResultsPanel;
use crate::render::{render_error, render_response};
use crate::tools::{analyze, AnalysisBackend, AnalyzeError};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The markup was written to the panel.
    Rendered { generation: u64, markup: String },
    /// A newer submission was issued while this one was in flight.
    Superseded { generation: u64 },
}

/// Handles review-form submissions for one results panel.
pub struct SubmissionHandler {
    backend: Arc<dyn AnalysisBackend>,
    panel: ResultsPanel,
}

impl SubmissionHandler {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            panel: ResultsPanel::new(),
        }
    }

    pub fn panel(&self) -> &ResultsPanel {
        &self.panel
    }

    #[instrument(skip(self, form), fields(submission = %Uuid::new_v4(), url = %form.url))]
    pub async fn submit(&self, form: ReviewForm) -> SubmissionOutcome {
        // Field values are captured here, before anything is awaited.
        let request = AnalysisRequest::from(form);
        let generation = self.panel.begin().await;

        let markup = match self.run(&request).await {
            Ok(markup) => markup,
            Err(e) => {
                error!("Analysis failed for generation {}: {}", generation, e);
                render_error(&e)
            }
        };

        if self.panel.commit(generation, markup.clone()).await {
            info!("Rendered generation {}", generation);
            SubmissionOutcome::Rendered { generation, markup }
        } else {
            info!("Discarding stale result for generation {}", generation);
            SubmissionOutcome::Superseded { generation }
        }
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<String, AnalyzeError> {
        if request.url.trim().is_empty() {
            return Err(AnalyzeError::MissingUrl);
        }

        let response = analyze(self.backend.as_ref(), request).await?;
        render_response(&response).map_err(|e| AnalyzeError::Render(e.to_string()))
    }
}
