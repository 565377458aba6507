use crate::render::LOADING_MARKUP;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// The results container of one page session. Content is replaced whole on
/// every render; only the most recently issued generation may write.
#[derive(Debug)]
pub struct ResultsPanel {
    state: RwLock<PanelState>,
}

#[derive(Debug)]
struct PanelState {
    issued: u64,
    rendered: u64,
    content: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    pub issued_generation: u64,
    pub rendered_generation: u64,
    pub loading: bool,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for ResultsPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(PanelState {
                issued: 0,
                rendered: 0,
                content: String::new(),
                updated_at: Utc::now(),
            }),
        }
    }

    /// Issues the next generation and shows the loading indicator.
    pub async fn begin(&self) -> u64 {
        let mut state = self.state.write().await;
        state.issued += 1;
        state.content = LOADING_MARKUP.to_string();
        state.updated_at = Utc::now();
        state.issued
    }

    /// Writes `markup` if `generation` is still the latest issued one.
    pub async fn commit(&self, generation: u64, markup: String) -> bool {
        let mut state = self.state.write().await;
        if generation != state.issued {
            return false;
        }
        state.rendered = generation;
        state.content = markup;
        state.updated_at = Utc::now();
        true
    }

    pub async fn content(&self) -> String {
        self.state.read().await.content.clone()
    }

    pub async fn snapshot(&self) -> PanelSnapshot {
        let state = self.state.read().await;
        PanelSnapshot {
            issued_generation: state.issued,
            rendered_generation: state.rendered,
            loading: state.issued != state.rendered,
            content: state.content.clone(),
            updated_at: state.updated_at,
        }
    }
}
