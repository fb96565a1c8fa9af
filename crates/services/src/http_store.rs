use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use progress_core::model::{
    AssignmentId, CompletionCounts, GameCompletionStatus, GameId, StudentId,
};

use crate::error::ProgressStoreError;
use crate::store::ProgressStore;

#[derive(Clone, Debug)]
pub struct HttpStoreConfig {
    pub base_url: String,
}

impl HttpStoreConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("PROGRESS_STORE_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self { base_url })
    }
}

/// Progress store backed by an HTTP service.
///
/// The endpoint is the platform's assignment-progress API; the fetch is a
/// plain GET, so retries are safe.
#[derive(Clone)]
pub struct HttpProgressStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpProgressStore {
    #[must_use]
    pub fn new(config: HttpStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        HttpStoreConfig::from_env().map(Self::new)
    }
}

#[async_trait]
impl ProgressStore for HttpProgressStore {
    async fn fetch_completion(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
        game_id: &GameId,
    ) -> Result<GameCompletionStatus, ProgressStoreError> {
        let url = format!(
            "{}/assignments/{}/students/{}/games/{}/completion",
            self.config.base_url.trim_end_matches('/'),
            assignment_id,
            student_id,
            game_id,
        );

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProgressStoreError::HttpStatus(response.status()));
        }

        let body: CompletionPayload = response.json().await?;
        Ok(GameCompletionStatus::from_store(
            CompletionCounts::new(body.unique_correct_items, body.items_required),
            body.assignment_progress,
            body.is_assignment_complete,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionPayload {
    unique_correct_items: u32,
    items_required: u32,
    assignment_progress: u8,
    is_assignment_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_camel_case_field_names() {
        let payload: CompletionPayload = serde_json::from_str(
            r#"{
                "uniqueCorrectItems": 4,
                "itemsRequired": 10,
                "assignmentProgress": 27,
                "isAssignmentComplete": false
            }"#,
        )
        .unwrap();
        assert_eq!(payload.unique_correct_items, 4);
        assert_eq!(payload.items_required, 10);
        assert_eq!(payload.assignment_progress, 27);
        assert!(!payload.is_assignment_complete);
    }

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let store = HttpProgressStore::new(HttpStoreConfig {
            base_url: "https://example.test/api/".to_string(),
        });
        assert_eq!(
            store.config.base_url.trim_end_matches('/'),
            "https://example.test/api"
        );
    }
}
