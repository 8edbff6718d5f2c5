use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::OnboardingSettings;
use crate::error::OnboardingError;
use crate::models::{OnboardingAction, OnboardingApplication, OnboardingStep};

/// Application state plus the number of transitions applied so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingSnapshot {
    pub revision: u64,
    pub application: OnboardingApplication,
}

#[derive(Debug)]
struct SessionState {
    revision: u64,
    application: OnboardingApplication,
}

/// Single-writer handle over one account's onboarding application.
///
/// Every transition takes the session lock, so concurrent requests run strictly
/// one after another. `apply_at` additionally rejects requests issued against an
/// older revision, which turns a double-submitted action into an error instead
/// of a second transition.
#[derive(Debug, Clone)]
pub struct OnboardingSession {
    state: Arc<Mutex<SessionState>>,
}

impl OnboardingSession {
    pub fn new(account: impl Into<String>, settings: &OnboardingSettings) -> Self {
        let application = OnboardingApplication::new(account).with_required_fields(settings.enforce_required_fields);
        info!(
            application_id = %application.id(),
            account = %application.account(),
            enforce_required_fields = settings.enforce_required_fields,
            "Onboarding session opened"
        );
        Self {
            state: Arc::new(Mutex::new(SessionState { revision: 0, application })),
        }
    }

    pub async fn snapshot(&self) -> OnboardingSnapshot {
        let state = self.state.lock().await;
        OnboardingSnapshot {
            revision: state.revision,
            application: state.application.clone(),
        }
    }

    pub async fn apply(&self, action: OnboardingAction) -> Result<OnboardingSnapshot, OnboardingError> {
        let mut state = self.state.lock().await;
        Self::transition(&mut state, action)
    }

    /// Applies `action` only if no other transition happened since `revision`.
    pub async fn apply_at(
        &self,
        revision: u64,
        action: OnboardingAction,
    ) -> Result<OnboardingSnapshot, OnboardingError> {
        let mut state = self.state.lock().await;
        if state.revision != revision {
            warn!(
                application_id = %state.application.id(),
                %action,
                expected = revision,
                actual = state.revision,
                "Rejected stale onboarding transition"
            );
            return Err(OnboardingError::StaleRevision {
                expected: revision,
                actual: state.revision,
            });
        }
        Self::transition(&mut state, action)
    }

    pub async fn set_field(
        &self,
        step: OnboardingStep,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), OnboardingError> {
        let mut state = self.state.lock().await;
        state.application.set_field(step, key, value)
    }

    pub async fn advance(&self) -> Result<OnboardingSnapshot, OnboardingError> {
        self.apply(OnboardingAction::Advance).await
    }

    pub async fn retreat(&self) -> Result<OnboardingSnapshot, OnboardingError> {
        self.apply(OnboardingAction::Retreat).await
    }

    pub async fn submit(&self) -> Result<OnboardingSnapshot, OnboardingError> {
        self.apply(OnboardingAction::Submit).await
    }

    pub async fn approve(&self) -> Result<OnboardingSnapshot, OnboardingError> {
        self.apply(OnboardingAction::Approve).await
    }

    pub async fn reject(&self) -> Result<OnboardingSnapshot, OnboardingError> {
        self.apply(OnboardingAction::Reject).await
    }

    pub async fn resubmit(&self) -> Result<OnboardingSnapshot, OnboardingError> {
        self.apply(OnboardingAction::Resubmit).await
    }

    fn transition(state: &mut SessionState, action: OnboardingAction) -> Result<OnboardingSnapshot, OnboardingError> {
        if let Err(e) = state.application.apply(action) {
            warn!(
                application_id = %state.application.id(),
                %action,
                error = %e,
                "Onboarding transition refused"
            );
            return Err(e);
        }

        state.revision += 1;
        info!(
            application_id = %state.application.id(),
            %action,
            revision = state.revision,
            step = %state.application.current_step(),
            status = %state.application.status(),
            "Onboarding transition applied"
        );

        Ok(OnboardingSnapshot {
            revision: state.revision,
            application: state.application.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OnboardingStatus;

    #[tokio::test]
    async fn test_revision_increments_only_on_success() {
        let session = OnboardingSession::new("GABC", &OnboardingSettings::default());
        assert_eq!(session.snapshot().await.revision, 0);

        assert!(session.retreat().await.is_err());
        assert_eq!(session.snapshot().await.revision, 0);

        let snapshot = session.advance().await.unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.application.status(), OnboardingStatus::InProgress);
    }

    #[tokio::test]
    async fn test_stale_request_is_rejected() {
        let session = OnboardingSession::new("GABC", &OnboardingSettings::default());
        let seen = session.snapshot().await.revision;

        session.apply_at(seen, OnboardingAction::Advance).await.unwrap();
        let err = session.apply_at(seen, OnboardingAction::Advance).await.unwrap_err();

        assert_eq!(err, OnboardingError::StaleRevision { expected: 0, actual: 1 });
        assert_eq!(session.snapshot().await.application.current_step(), OnboardingStep::EntityDetails);
    }
}
