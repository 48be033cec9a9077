//! Credential session manager.
//!
//! Holds the single process-wide session slot. A successful login replaces
//! whatever session was there; a failed login leaves it untouched. There is
//! one slot for the whole process, so a second account logging in replaces
//! the first.

use std::sync::Arc;

use garmin_connect_client::{Credentials, GarminClient, GarminSession};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::AuthError;

pub struct SessionManager {
    client: Arc<dyn GarminClient>,
    current: RwLock<Option<Arc<GarminSession>>>,
}

impl SessionManager {
    pub fn new(client: Arc<dyn GarminClient>) -> Self {
        Self {
            client,
            current: RwLock::new(None),
        }
    }

    /// Log in with the given credentials and make the result the active session.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Arc<GarminSession>, AuthError> {
        let credentials = Credentials::new(email, password);
        match self.client.login(&credentials).await {
            Ok(session) => {
                let session = Arc::new(session);
                *self.current.write().await = Some(session.clone());
                info!(
                    display_name = session.display_name().unwrap_or("-"),
                    "garmin session established"
                );
                Ok(session)
            }
            Err(e) => {
                let err = AuthError::from(e);
                // Unexpected errors are reported by the HTTP layer.
                if !matches!(err, AuthError::Unexpected(_)) {
                    warn!(error = %err, "authentication error");
                }
                Err(err)
            }
        }
    }

    /// Snapshot of the active session, if any.
    pub async fn current(&self) -> Option<Arc<GarminSession>> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garmin_connect_client::GarminError;
    use crate::test_utils::{LoginOutcome, MockClient};
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn authenticate_stores_session() {
        let manager = SessionManager::new(Arc::new(MockClient::accepting("tok-a")));
        assert!(!manager.is_authenticated().await);

        let session = manager
            .authenticate("a@example.com", "pw")
            .await
            .expect("session");
        assert_eq!(session.access_token().expose_secret(), "tok-a");
        let current = manager.current().await.expect("current");
        assert!(Arc::ptr_eq(&session, &current));
    }

    #[tokio::test]
    async fn rejected_login_leaves_no_session() {
        let manager = SessionManager::new(Arc::new(MockClient::rejecting()));
        let err = manager
            .authenticate("a@example.com", "wrong")
            .await
            .expect_err("should fail");
        assert!(matches!(err, AuthError::Rejected(_)));
        assert!(manager.current().await.is_none());
    }

    #[tokio::test]
    async fn rate_limited_and_connection_failures_are_typed() {
        let limited = SessionManager::new(Arc::new(MockClient::rate_limited()));
        assert!(matches!(
            limited.authenticate("a", "b").await,
            Err(AuthError::RateLimited(_))
        ));

        let offline = SessionManager::new(Arc::new(MockClient::offline()));
        assert!(matches!(
            offline.authenticate("a", "b").await,
            Err(AuthError::ConnectionFailed(_))
        ));
        assert!(!offline.is_authenticated().await);
    }

    #[tokio::test]
    async fn unreadable_provider_response_is_unexpected() {
        let manager = SessionManager::new(Arc::new(MockClient::garbled()));
        assert!(matches!(
            manager.authenticate("a", "b").await,
            Err(AuthError::Unexpected(GarminError::Decode(_)))
        ));
        assert!(!manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_session() {
        let client = Arc::new(MockClient::accepting("first"));
        let manager = SessionManager::new(client.clone());
        manager.authenticate("a", "pw").await.expect("first login");

        client.set_login_outcome(LoginOutcome::Reject);
        assert!(manager.authenticate("b", "bad").await.is_err());

        let current = manager.current().await.expect("still authenticated");
        assert_eq!(current.access_token().expose_secret(), "first");
    }

    #[tokio::test]
    async fn second_login_replaces_first() {
        let client = Arc::new(MockClient::accepting("first"));
        let manager = SessionManager::new(client.clone());
        manager.authenticate("a", "pw").await.expect("first login");

        client.set_login_token("second");
        manager.authenticate("b", "pw").await.expect("second login");

        let current = manager.current().await.expect("session");
        assert_eq!(current.access_token().expose_secret(), "second");
    }
}
