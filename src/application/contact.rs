//! Contact form validation and delivery.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::navigation::{FormDraft, FormFeedback, NavigationState};

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_MESSAGE: &str = "message";

pub const METRIC_CONTACT_SENT: &str = "folio_contact_sent_total";
pub const METRIC_CONTACT_FAILED: &str = "folio_contact_failed_total";

static EMAIL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .map_err(|err| warn!(target: "folio::contact", error = %err, "email pattern invalid"))
        .ok()
});

/// A message that passed validation and is ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    MissingName,
    InvalidEmail,
    MissingMessage,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldError::MissingName => "Please enter your name.",
            FieldError::InvalidEmail => "Please enter a valid email address.",
            FieldError::MissingMessage => "Please enter a message.",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} contact field(s) invalid", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("message delivery timed out after {0:?}")]
    Timeout(Duration),
    #[error("message delivery failed: {0}")]
    Transport(String),
}

impl SendError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<(), SendError>;
}

pub fn is_valid_email(value: &str) -> bool {
    match EMAIL_PATTERN.as_ref() {
        Some(pattern) => pattern.is_match(value),
        None => value
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.')),
    }
}

/// Check every field and report all violations at once.
pub fn validate(draft: &FormDraft) -> Result<ContactMessage, ValidationErrors> {
    let name = draft.get(FIELD_NAME).trim();
    let email = draft.get(FIELD_EMAIL).trim();
    let message = draft.get(FIELD_MESSAGE).trim();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError::MissingName);
    }
    if !is_valid_email(email) {
        errors.push(FieldError::InvalidEmail);
    }
    if message.is_empty() {
        errors.push(FieldError::MissingMessage);
    }

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    Ok(ContactMessage {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    Invalid(ValidationErrors),
    Failed(SendError),
}

#[derive(Clone)]
pub struct ContactService {
    sender: Arc<dyn EmailSender>,
    timeout: Duration,
}

impl ContactService {
    pub fn new(sender: Arc<dyn EmailSender>, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    /// Validate the draft held in `state` and, when valid, hand it to the
    /// sender. The draft survives every failure so the visitor can retry.
    pub async fn submit(&self, mut state: NavigationState) -> (NavigationState, SubmitOutcome) {
        let message = match validate(&state.form_draft) {
            Ok(message) => message,
            Err(errors) => {
                state.submitted = false;
                state.feedback = Some(FormFeedback::Invalid(errors.messages()));
                return (state, SubmitOutcome::Invalid(errors));
            }
        };

        let result = match tokio::time::timeout(self.timeout, self.sender.send(&message)).await {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout(self.timeout)),
        };

        match result {
            Ok(()) => {
                metrics::counter!(METRIC_CONTACT_SENT).increment(1);
                info!(target: "folio::contact", email = %message.email, "contact message sent");
                state.form_draft.clear();
                state.submitted = true;
                state.feedback = Some(FormFeedback::Sent);
                (state, SubmitOutcome::Sent)
            }
            Err(err) => {
                metrics::counter!(METRIC_CONTACT_FAILED).increment(1);
                warn!(target: "folio::contact", error = %err, "contact message not sent");
                state.submitted = false;
                state.feedback = Some(FormFeedback::Failed(format!(
                    "Your message could not be sent ({err}). Please try again."
                )));
                (state, SubmitOutcome::Failed(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::navigation::{FormKind, Page};

    #[derive(Default)]
    struct CountingSender {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmailSender for CountingSender {
        async fn send(&self, _message: &ContactMessage) -> Result<(), SendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSender;

    #[async_trait]
    impl EmailSender for FailingSender {
        async fn send(&self, _message: &ContactMessage) -> Result<(), SendError> {
            Err(SendError::transport("smtp unreachable"))
        }
    }

    struct SlowSender;

    #[async_trait]
    impl EmailSender for SlowSender {
        async fn send(&self, _message: &ContactMessage) -> Result<(), SendError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    fn contact_state(name: &str, email: &str, message: &str) -> NavigationState {
        let mut state = NavigationState {
            page: Page::Form(FormKind::Contact),
            ..NavigationState::default()
        };
        state.form_draft.set(FIELD_NAME, name);
        state.form_draft.set(FIELD_EMAIL, email);
        state.form_draft.set(FIELD_MESSAGE, message);
        state
    }

    #[test]
    fn validation_collects_every_error() {
        let state = contact_state("  ", "not-an-email", "");
        let errors = validate(&state.form_draft).expect_err("invalid");
        assert_eq!(
            errors.errors(),
            [
                FieldError::MissingName,
                FieldError::InvalidEmail,
                FieldError::MissingMessage
            ]
        );
    }

    #[test]
    fn email_pattern_accepts_common_addresses() {
        assert!(is_valid_email("ada.lovelace+site@example.co.uk"));
        assert!(!is_valid_email("ada@localhost"));
        assert!(!is_valid_email("@example.com"));
    }

    #[tokio::test]
    async fn invalid_submission_never_calls_sender() {
        let sender = Arc::new(CountingSender::default());
        let service = ContactService::new(sender.clone(), Duration::from_secs(1));

        let (state, outcome) = service.submit(contact_state("", "not-an-email", "")).await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(ref errors) if errors.errors().len() == 3));
        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
        assert!(!state.submitted);
        assert_eq!(state.form_draft.get(FIELD_EMAIL), "not-an-email");
    }

    #[tokio::test]
    async fn successful_submission_clears_draft() {
        let sender = Arc::new(CountingSender::default());
        let service = ContactService::new(sender.clone(), Duration::from_secs(1));

        let (state, outcome) = service
            .submit(contact_state("Ada", "ada@example.com", "Hello"))
            .await;

        assert_eq!(outcome, SubmitOutcome::Sent);
        assert_eq!(sender.calls.load(Ordering::SeqCst), 1);
        assert!(state.submitted);
        assert!(state.form_draft.is_empty());
        assert_eq!(state.feedback, Some(FormFeedback::Sent));
    }

    #[tokio::test]
    async fn failed_submission_keeps_draft() {
        let service = ContactService::new(Arc::new(FailingSender), Duration::from_secs(1));

        let (state, outcome) = service
            .submit(contact_state("Ada", "ada@example.com", "Hello"))
            .await;

        assert!(matches!(outcome, SubmitOutcome::Failed(SendError::Transport(_))));
        assert!(!state.submitted);
        assert_eq!(state.form_draft.get(FIELD_NAME), "Ada");
    }

    #[tokio::test]
    async fn slow_sender_times_out() {
        let service = ContactService::new(Arc::new(SlowSender), Duration::from_millis(20));

        let (state, outcome) = service
            .submit(contact_state("Ada", "ada@example.com", "Hello"))
            .await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(SendError::Timeout(Duration::from_millis(20)))
        );
        assert!(!state.submitted);
        assert_eq!(state.form_draft.get(FIELD_MESSAGE), "Hello");
    }
}
