//! Mirror of the user's accumulated eligible matches.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::EligibleHistoryItem;
use super::shape;
use crate::ports::ScoringService;

/// Fetches the eligible-match history from the scoring service and keeps a
/// read-only copy. A refresh never fails the caller: anything that goes
/// wrong resolves to an empty list.
pub struct EligibilitySync {
    scoring: Arc<dyn ScoringService>,
    history: RwLock<Vec<EligibleHistoryItem>>,
}

impl EligibilitySync {
    pub fn new(scoring: Arc<dyn ScoringService>) -> Self {
        Self {
            scoring,
            history: RwLock::new(Vec::new()),
        }
    }

    /// Fetch and normalize the history for `user_email`, replacing the mirror.
    pub async fn refresh(&self, user_email: &str) -> Vec<EligibleHistoryItem> {
        let items = match self.scoring.eligible(user_email).await {
            Ok(body) => shape::eligible_history(&body),
            Err(err) => {
                log::warn!("eligible history unavailable for {user_email}: {err}");
                Vec::new()
            }
        };

        log::debug!("eligible history for {user_email}: {} item(s)", items.len());
        *self.history.write().await = items.clone();
        items
    }

    /// Current mirrored history, most recent fetch only.
    pub async fn history(&self) -> Vec<EligibleHistoryItem> {
        self.history.read().await.clone()
    }

    pub async fn clear(&self) {
        self.history.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisRequest;
    use crate::ports::{ScoringError, ScoringResult};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    struct Canned(Mutex<Vec<ScoringResult<Value>>>);

    #[async_trait]
    impl ScoringService for Canned {
        async fn analyze(&self, _request: &AnalysisRequest) -> ScoringResult<Value> {
            unreachable!("refresh never analyzes")
        }

        async fn eligible(&self, _email: &str) -> ScoringResult<Value> {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn sync_with(responses: Vec<ScoringResult<Value>>) -> EligibilitySync {
        EligibilitySync::new(Arc::new(Canned(Mutex::new(responses))))
    }

    #[tokio::test]
    async fn test_refresh_accepts_every_known_shape() {
        let item = json!({"id": 1, "resume_name": "a.pdf", "match_score": 70});
        let sync = sync_with(vec![
            Ok(json!({"results": [item.clone()]})),
            Ok(json!({"eligible_resumes": [item.clone()]})),
            Ok(json!([item])),
            Ok(Value::Null),
        ]);

        assert_eq!(sync.refresh("hr@example.com").await.len(), 1);
        assert_eq!(sync.refresh("hr@example.com").await.len(), 1);
        assert_eq!(sync.refresh("hr@example.com").await.len(), 1);
        assert!(sync.refresh("hr@example.com").await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_replaces_mirror() {
        let sync = sync_with(vec![
            Ok(json!([{"id": 1, "resume_name": "a.pdf"}, {"id": 2, "resume_name": "b.pdf"}])),
            Ok(json!([{"id": 3, "resume_name": "c.pdf"}])),
        ]);

        sync.refresh("hr@example.com").await;
        assert_eq!(sync.history().await.len(), 2);

        sync.refresh("hr@example.com").await;
        let history = sync.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].resume_name, "c.pdf");
    }

    #[tokio::test]
    async fn test_network_failure_resolves_empty() {
        let sync = sync_with(vec![
            Ok(json!([{"id": 1, "resume_name": "a.pdf"}])),
            Err(ScoringError::Unavailable("connection refused".into())),
        ]);

        sync.refresh("hr@example.com").await;
        let items = sync.refresh("hr@example.com").await;
        assert!(items.is_empty());
        assert!(sync.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let sync = sync_with(vec![Ok(json!([{"id": 1, "resume_name": "a.pdf"}]))]);
        sync.refresh("hr@example.com").await;
        sync.clear().await;
        assert!(sync.history().await.is_empty());
    }
}
