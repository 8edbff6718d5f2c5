use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::OnboardingError;
use crate::models::ColorToken;

/// Named stages of the KYC wizard, numbered 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStep {
    PersonalInformation,
    EntityDetails,
    Documentation,
    Review,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 4] = [
        OnboardingStep::PersonalInformation,
        OnboardingStep::EntityDetails,
        OnboardingStep::Documentation,
        OnboardingStep::Review,
    ];

    pub const COUNT: u8 = 4;

    pub fn number(&self) -> u8 {
        match self {
            OnboardingStep::PersonalInformation => 1,
            OnboardingStep::EntityDetails => 2,
            OnboardingStep::Documentation => 3,
            OnboardingStep::Review => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx as usize))
            .copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            OnboardingStep::PersonalInformation => "Personal Information",
            OnboardingStep::EntityDetails => "Entity Details",
            OnboardingStep::Documentation => "Documentation",
            OnboardingStep::Review => "Review",
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    /// Form keys that must be non-empty before leaving this step when gating is enabled.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            OnboardingStep::PersonalInformation => &["first_name", "last_name", "email", "phone", "country"],
            OnboardingStep::EntityDetails => &["entity_type", "company_name", "tax_id"],
            OnboardingStep::Documentation | OnboardingStep::Review => &[],
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStatus {
    NotStarted,
    InProgress,
    UnderReview,
    Approved,
    Rejected,
}

impl OnboardingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OnboardingStatus::NotStarted => "Not Started",
            OnboardingStatus::InProgress => "In Progress",
            OnboardingStatus::UnderReview => "Under Review",
            OnboardingStatus::Approved => "Approved",
            OnboardingStatus::Rejected => "Rejected",
        }
    }

    /// Badge color for the status indicator.
    pub fn color(&self) -> ColorToken {
        match self {
            OnboardingStatus::NotStarted => ColorToken::Neutral,
            OnboardingStatus::InProgress => ColorToken::Brand,
            OnboardingStatus::UnderReview => ColorToken::Amber,
            OnboardingStatus::Approved => ColorToken::Green,
            OnboardingStatus::Rejected => ColorToken::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OnboardingStatus::NotStarted => "Start your verification to access institutional RWA markets.",
            OnboardingStatus::InProgress => "Complete all steps to submit your verification application.",
            OnboardingStatus::UnderReview => "We're reviewing your application. We'll notify you once complete.",
            OnboardingStatus::Approved => "You now have access to all institutional RWA markets.",
            OnboardingStatus::Rejected => "Please review the feedback and resubmit your application.",
        }
    }

    /// Whether the wizard form may still be edited and navigated.
    pub fn is_editable(&self) -> bool {
        matches!(self, OnboardingStatus::NotStarted | OnboardingStatus::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OnboardingStatus::Approved | OnboardingStatus::Rejected)
    }
}

impl fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingAction {
    Advance,
    Retreat,
    Submit,
    Approve,
    Reject,
    Resubmit,
}

impl fmt::Display for OnboardingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OnboardingAction::Advance => "advance",
            OnboardingAction::Retreat => "retreat",
            OnboardingAction::Submit => "submit",
            OnboardingAction::Approve => "approve",
            OnboardingAction::Reject => "reject",
            OnboardingAction::Resubmit => "resubmit",
        };
        f.write_str(name)
    }
}

/// Session-scoped KYC application. Step and status only change through the
/// transition methods below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingApplication {
    id: Uuid,
    account: String,
    current_step: OnboardingStep,
    status: OnboardingStatus,
    fields: BTreeMap<OnboardingStep, BTreeMap<String, String>>,
    enforce_required_fields: bool,
    created_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    decided_at: Option<DateTime<Utc>>,
}

impl OnboardingApplication {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account: account.into(),
            current_step: OnboardingStep::PersonalInformation,
            status: OnboardingStatus::NotStarted,
            fields: BTreeMap::new(),
            enforce_required_fields: false,
            created_at: Utc::now(),
            submitted_at: None,
            decided_at: None,
        }
    }

    pub fn with_required_fields(mut self, enforce: bool) -> Self {
        self.enforce_required_fields = enforce;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn current_step(&self) -> OnboardingStep {
        self.current_step
    }

    pub fn status(&self) -> OnboardingStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    pub fn progress_percent(&self) -> Decimal {
        Decimal::from(self.current_step.number()) * Decimal::ONE_HUNDRED
            / Decimal::from(OnboardingStep::COUNT)
    }

    pub fn field(&self, step: OnboardingStep, key: &str) -> Option<&str> {
        self.fields
            .get(&step)
            .and_then(|values| values.get(key))
            .map(String::as_str)
    }

    pub fn fields_for(&self, step: OnboardingStep) -> Option<&BTreeMap<String, String>> {
        self.fields.get(&step)
    }

    /// Stores a form value. Only allowed while the application is editable.
    pub fn set_field(
        &mut self,
        step: OnboardingStep,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), OnboardingError> {
        if !self.status.is_editable() {
            return Err(OnboardingError::FieldsLocked { status: self.status });
        }
        self.fields
            .entry(step)
            .or_default()
            .insert(key.into(), value.into());
        Ok(())
    }

    /// Required keys of `step` that are missing or blank.
    pub fn missing_fields(&self, step: OnboardingStep) -> Vec<&'static str> {
        step.required_fields()
            .iter()
            .copied()
            .filter(|key| self.field(step, key).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    pub fn apply(&mut self, action: OnboardingAction) -> Result<(), OnboardingError> {
        match action {
            OnboardingAction::Advance => self.advance(),
            OnboardingAction::Retreat => self.retreat(),
            OnboardingAction::Submit => self.submit(),
            OnboardingAction::Approve => self.approve(),
            OnboardingAction::Reject => self.reject(),
            OnboardingAction::Resubmit => self.resubmit(),
        }
    }

    pub fn advance(&mut self) -> Result<(), OnboardingError> {
        let next = match self.current_step.next() {
            Some(next) if self.status.is_editable() => next,
            _ => return Err(self.invalid(OnboardingAction::Advance)),
        };

        if self.enforce_required_fields {
            let missing = self.missing_fields(self.current_step);
            if !missing.is_empty() {
                return Err(OnboardingError::IncompleteStep {
                    step: self.current_step,
                    missing,
                });
            }
        }

        debug!(application_id = %self.id, from = %self.current_step, to = %next, "Advancing onboarding step");
        self.current_step = next;
        self.status = OnboardingStatus::InProgress;
        Ok(())
    }

    /// Fails at step 1 rather than silently doing nothing.
    pub fn retreat(&mut self) -> Result<(), OnboardingError> {
        let previous = match self.current_step.previous() {
            Some(previous) if self.status.is_editable() => previous,
            _ => return Err(self.invalid(OnboardingAction::Retreat)),
        };

        debug!(application_id = %self.id, from = %self.current_step, to = %previous, "Retreating onboarding step");
        self.current_step = previous;
        Ok(())
    }

    pub fn submit(&mut self) -> Result<(), OnboardingError> {
        if self.current_step != OnboardingStep::Review || !self.status.is_editable() {
            return Err(self.invalid(OnboardingAction::Submit));
        }

        self.status = OnboardingStatus::UnderReview;
        self.submitted_at = Some(Utc::now());
        info!(application_id = %self.id, account = %self.account, "Onboarding application submitted for review");
        Ok(())
    }

    pub fn approve(&mut self) -> Result<(), OnboardingError> {
        self.decide(OnboardingAction::Approve, OnboardingStatus::Approved)
    }

    pub fn reject(&mut self) -> Result<(), OnboardingError> {
        self.decide(OnboardingAction::Reject, OnboardingStatus::Rejected)
    }

    /// Reopens a rejected application at the first step, keeping the collected fields.
    pub fn resubmit(&mut self) -> Result<(), OnboardingError> {
        if self.status != OnboardingStatus::Rejected {
            return Err(self.invalid(OnboardingAction::Resubmit));
        }

        self.status = OnboardingStatus::InProgress;
        self.current_step = OnboardingStep::PersonalInformation;
        self.submitted_at = None;
        self.decided_at = None;
        info!(application_id = %self.id, account = %self.account, "Rejected onboarding application reopened");
        Ok(())
    }

    fn decide(&mut self, action: OnboardingAction, outcome: OnboardingStatus) -> Result<(), OnboardingError> {
        if self.status != OnboardingStatus::UnderReview {
            return Err(self.invalid(action));
        }

        self.status = outcome;
        self.decided_at = Some(Utc::now());
        info!(application_id = %self.id, account = %self.account, status = %outcome, "Onboarding decision recorded");
        Ok(())
    }

    fn invalid(&self, action: OnboardingAction) -> OnboardingError {
        OnboardingError::InvalidTransition {
            action,
            status: self.status,
            step: self.current_step,
        }
    }
}
