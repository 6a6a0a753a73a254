//! Result-publication decorator.
//!
//! Wraps a [`SessionService`] and, after a successful completion, fires a
//! detached publish of the result with its own bounded timeout. The publish
//! outcome never changes what the caller sees; a shutdown may drop an
//! in-flight publish.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{DomainError, Question, Session, SessionResult, UserAnswer};
use crate::ports::SessionEventPublisher;

use super::SessionService;

const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Decorator bridging synchronous completion to the asynchronous bus.
pub struct PublishingSessionService {
    inner: Arc<dyn SessionService>,
    publisher: Arc<dyn SessionEventPublisher>,
    publish_timeout: Duration,
}

impl PublishingSessionService {
    pub fn new(
        inner: Arc<dyn SessionService>,
        publisher: Arc<dyn SessionEventPublisher>,
    ) -> Self {
        Self {
            inner,
            publisher,
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }
}

#[async_trait]
impl SessionService for PublishingSessionService {
    async fn show_topics(&self) -> Result<Vec<String>, DomainError> {
        self.inner.show_topics().await
    }

    async fn create_session(
        &self,
        user_id: &str,
        topics: &[String],
    ) -> Result<(String, HashMap<String, Question>), DomainError> {
        self.inner.create_session(user_id, topics).await
    }

    async fn complete_session(
        &self,
        session_id: &str,
        answers: Vec<UserAnswer>,
    ) -> Result<SessionResult, DomainError> {
        let result = self.inner.complete_session(session_id, answers).await?;

        let publisher = Arc::clone(&self.publisher);
        let publish_timeout = self.publish_timeout;
        let event = result.clone();
        let session_id = session_id.to_string();

        // Detached: the request context may already be gone when this runs.
        tokio::spawn(async move {
            let publish = publisher.session_finished(&event);
            match tokio::time::timeout(publish_timeout, publish).await {
                Ok(Ok(())) => {
                    info!(session_id, "session finished event published");
                }
                Ok(Err(e)) => {
                    warn!(session_id, error = %e, "failed to send session finished event");
                }
                Err(_) => {
                    warn!(session_id, "session finished event publish timed out");
                }
            }
        });

        Ok(result)
    }

    async fn get_all_completed_user_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Session>, DomainError> {
        self.inner.get_all_completed_user_sessions(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    struct RecordingPublisher {
        published: Mutex<Vec<SessionResult>>,
        notify: Notify,
        fail: bool,
    }

    impl RecordingPublisher {
        fn new(fail: bool) -> Self {
            Self {
                published: Mutex::new(Vec::new()),
                notify: Notify::new(),
                fail,
            }
        }
    }

    #[async_trait]
    impl SessionEventPublisher for RecordingPublisher {
        async fn session_finished(&self, result: &SessionResult) -> Result<(), DomainError> {
            self.notify.notify_one();
            if self.fail {
                return Err(DomainError::internal("publish failure"));
            }
            self.published.lock().unwrap().push(result.clone());
            Ok(())
        }
    }

    struct StaticService {
        result: Option<SessionResult>,
    }

    #[async_trait]
    impl SessionService for StaticService {
        async fn show_topics(&self) -> Result<Vec<String>, DomainError> {
            Ok(vec!["Go".to_string()])
        }

        async fn create_session(
            &self,
            _user_id: &str,
            _topics: &[String],
        ) -> Result<(String, HashMap<String, Question>), DomainError> {
            Ok(("session-1".to_string(), HashMap::new()))
        }

        async fn complete_session(
            &self,
            _session_id: &str,
            _answers: Vec<UserAnswer>,
        ) -> Result<SessionResult, DomainError> {
            self.result
                .clone()
                .ok_or_else(|| DomainError::not_found("session not found"))
        }

        async fn get_all_completed_user_sessions(
            &self,
            _user_id: &str,
        ) -> Result<Vec<Session>, DomainError> {
            Ok(vec![])
        }
    }

    fn sample_result() -> SessionResult {
        SessionResult {
            user_id: "u1".to_string(),
            topics: vec!["Go".to_string()],
            questions: HashMap::from([(
                "q1".to_string(),
                vec!["Language".to_string(), "Game".to_string()],
            )]),
            user_answers: HashMap::from([("q1".to_string(), vec!["Language".to_string()])]),
            is_expired: false,
            is_success: true,
            grade: "100.00 percents".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_completion_publishes_the_result() {
        let publisher = Arc::new(RecordingPublisher::new(false));
        let service = PublishingSessionService::new(
            Arc::new(StaticService {
                result: Some(sample_result()),
            }),
            publisher.clone(),
        );

        let result = service.complete_session("session-1", vec![]).await.unwrap();
        assert!(result.is_success);

        publisher.notify.notified().await;
        // Let the detached task finish recording.
        tokio::task::yield_now().await;
        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0], sample_result());
    }

    #[tokio::test]
    async fn publish_failure_does_not_change_the_outcome() {
        let publisher = Arc::new(RecordingPublisher::new(true));
        let service = PublishingSessionService::new(
            Arc::new(StaticService {
                result: Some(sample_result()),
            }),
            publisher.clone(),
        );

        let result = service.complete_session("session-1", vec![]).await.unwrap();
        assert_eq!(result.grade, "100.00 percents");

        publisher.notify.notified().await;
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_completion_publishes_nothing() {
        let publisher = Arc::new(RecordingPublisher::new(false));
        let service = PublishingSessionService::new(
            Arc::new(StaticService { result: None }),
            publisher.clone(),
        );

        let err = service
            .complete_session("session-1", vec![])
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        tokio::task::yield_now().await;
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pass_through_methods_delegate() {
        let publisher = Arc::new(RecordingPublisher::new(false));
        let service = PublishingSessionService::new(
            Arc::new(StaticService {
                result: Some(sample_result()),
            }),
            publisher.clone(),
        );

        assert_eq!(service.show_topics().await.unwrap(), ["Go".to_string()]);
        let (session_id, questions) = service
            .create_session("u1", &["Go".to_string()])
            .await
            .unwrap();
        assert_eq!(session_id, "session-1");
        assert!(questions.is_empty());
        assert!(service
            .get_all_completed_user_sessions("u1")
            .await
            .unwrap()
            .is_empty());
    }
}
