//! State machine behind the contact form.
//!
//! [`ContactFormController`] owns the field values, their validation errors and
//! the submission status. A renderer feeds input events into
//! [`ContactFormController::update_field`], calls
//! [`ContactFormController::submit`] and follows [`SubmissionStatus`] through
//! [`ContactFormController::subscribe`].

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use folio_di::Build;
use folio_extern_contracts::contact::ContactApiService;
use folio_models::contact::{
    ContactField, ContactFieldError, ContactSubmission, UnknownContactFieldError,
};
use folio_utils::trace_instrument;
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info, warn};

/// How long the success confirmation stays visible before the form is cleared.
pub const RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Build)]
pub struct ContactFormController<Api> {
    api: Api,
    config: ContactFormConfig,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct ContactFormConfig {
    pub reset_delay: Duration,
}

impl Default for ContactFormConfig {
    fn default() -> Self {
        Self {
            reset_delay: RESET_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// At most one error per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<ContactField, ContactFieldError>);

impl FieldErrors {
    pub fn get(&self, field: ContactField) -> Option<ContactFieldError> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, ContactFieldError)> + '_ {
        self.0.iter().map(|(&field, &error)| (field, error))
    }

    fn set(&mut self, field: ContactField, result: Result<(), ContactFieldError>) {
        match result {
            Ok(()) => self.0.remove(&field),
            Err(error) => self.0.insert(field, error),
        };
    }
}

impl FromIterator<(ContactField, ContactFieldError)> for FieldErrors {
    fn from_iter<T: IntoIterator<Item = (ContactField, ContactFieldError)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactFormSubmitError {
    #[error("A submission is already in progress.")]
    AlreadyPending,
    #[error("The form contains invalid fields.")]
    Invalid(FieldErrors),
}

#[derive(Debug)]
struct State {
    form: Mutex<FormState>,
    status: watch::Sender<SubmissionStatus>,
    reset: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug, Default)]
struct FormState {
    submission: ContactSubmission,
    errors: FieldErrors,
}

impl Default for State {
    fn default() -> Self {
        Self {
            form: Default::default(),
            status: watch::Sender::new(SubmissionStatus::Idle),
            reset: Default::default(),
        }
    }
}

impl State {
    fn form(&self) -> MutexGuard<'_, FormState> {
        lock(&self.form)
    }

    /// Clear the form if the success confirmation is still showing.
    fn reset_after_success(&self) {
        let mut form = self.form();
        self.status.send_if_modified(|status| {
            if *status != SubmissionStatus::Success {
                return false;
            }
            *form = FormState::default();
            *status = SubmissionStatus::Idle;
            true
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<Api> ContactFormController<Api> {
    pub fn new(api: Api, config: ContactFormConfig) -> Self {
        Self {
            api,
            config,
            state: Default::default(),
        }
    }

    /// Store `value` for `field`.
    ///
    /// `email` and `contactNumber` are re-validated on every change. Other
    /// fields only lose a stale `Required` error once they hold a value.
    pub fn update_field(&self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        let mut form = self.state.form();
        match field {
            ContactField::Email | ContactField::ContactNumber => {
                form.errors.set(field, field.validate(&value));
            }
            _ if !value.is_empty() => form.errors.set(field, Ok(())),
            _ => {}
        }
        form.submission.set(field, value);
    }

    /// Like [`update_field`](Self::update_field) but addressed by the field's
    /// wire name, e.g. `contactNumber`.
    pub fn update_field_by_name(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), UnknownContactFieldError> {
        self.update_field(name.parse()?, value);
        Ok(())
    }

    pub fn submission(&self) -> ContactSubmission {
        self.state.form().submission.clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.state.form().errors.clone()
    }

    pub fn status(&self) -> SubmissionStatus {
        *self.state.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.state.status.subscribe()
    }

    /// Whether the submit affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        self.status() != SubmissionStatus::Pending
    }

    /// Move to `Pending` unless a submission is already in flight.
    fn begin(&self) -> bool {
        let mut acquired = false;
        self.state.status.send_if_modified(|status| {
            if *status == SubmissionStatus::Pending {
                return false;
            }
            *status = SubmissionStatus::Pending;
            acquired = true;
            true
        });
        acquired
    }

    fn cancel_reset(&self) {
        if let Some(handle) = lock(&self.state.reset).take() {
            handle.abort();
        }
    }

    fn schedule_reset(&self) {
        let state = Arc::clone(&self.state);
        let delay = self.config.reset_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.reset_after_success();
        });
        if let Some(previous) = lock(&self.state.reset).replace(handle) {
            previous.abort();
        }
    }
}

impl<Api: ContactApiService> ContactFormController<Api> {
    /// Validate the whole form and, if it is clean, send it to the contact
    /// endpoint.
    ///
    /// Returns the terminal status of this attempt (`Success` or `Error`). On
    /// success the form is cleared after the configured reset delay; on error
    /// it is left as is so the visitor can retry.
    #[trace_instrument(skip(self))]
    pub async fn submit(&self) -> Result<SubmissionStatus, ContactFormSubmitError> {
        if !self.can_submit() {
            return Err(ContactFormSubmitError::AlreadyPending);
        }

        let submission = {
            let mut form = self.state.form();
            let errors = validate(&form.submission);
            form.errors = errors.clone();
            if !errors.is_empty() {
                return Err(ContactFormSubmitError::Invalid(errors));
            }
            form.submission.clone()
        };

        if !self.begin() {
            return Err(ContactFormSubmitError::AlreadyPending);
        }
        self.cancel_reset();

        let status = match self.api.submit(submission).await {
            Ok(response) if response.success => {
                info!("contact form submitted");
                self.state.form().errors = FieldErrors::default();
                self.schedule_reset();
                SubmissionStatus::Success
            }
            Ok(response) => {
                warn!(message = %response.message, "contact endpoint reported a failure");
                SubmissionStatus::Error
            }
            Err(err) => {
                error!("Form submission failed: {err:#}");
                SubmissionStatus::Error
            }
        };

        self.state.status.send_replace(status);
        Ok(status)
    }
}

/// Required check for all fields plus the format checks for email and phone.
fn validate(submission: &ContactSubmission) -> FieldErrors {
    ContactField::ALL
        .into_iter()
        .filter_map(|field| {
            let value = submission.get(field);
            if value.is_empty() {
                return Some((field, ContactFieldError::Required));
            }
            field.validate(value).err().map(|error| (field, error))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use folio_extern_contracts::contact::{ContactApiResponse, MockContactApiService};
    use folio_utils::assert_matches;
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    use super::*;

    fn jane() -> ContactSubmission {
        ContactSubmission {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            contact_number: "+1 555 1234567".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
        }
    }

    fn fill(sut: &ContactFormController<MockContactApiService>, submission: &ContactSubmission) {
        for field in ContactField::ALL {
            sut.update_field(field, submission.get(field));
        }
    }

    fn sut(api: MockContactApiService) -> ContactFormController<MockContactApiService> {
        ContactFormController::new(api, ContactFormConfig::default())
    }

    #[test]
    fn update_field_validates_email_immediately() {
        let sut = sut(MockContactApiService::new().without_submit());

        sut.update_field(ContactField::Email, "jane@");
        assert_eq!(
            sut.errors().get(ContactField::Email),
            Some(ContactFieldError::InvalidEmail)
        );

        sut.update_field(ContactField::Email, "jane@x.com");
        assert_eq!(sut.errors().get(ContactField::Email), None);
        assert_eq!(sut.submission().email, "jane@x.com");
    }

    #[test]
    fn update_field_does_not_revalidate_other_fields() {
        let sut = sut(MockContactApiService::new().without_submit());

        sut.update_field(ContactField::Email, "nope");
        sut.update_field(ContactField::ContactNumber, "123");
        sut.update_field(ContactField::ContactNumber, "+1 555 1234567");

        assert_eq!(
            sut.errors().iter().collect::<Vec<_>>(),
            [(ContactField::Email, ContactFieldError::InvalidEmail)]
        );
    }

    #[test]
    fn empty_email_is_not_a_format_error() {
        let sut = sut(MockContactApiService::new().without_submit());

        sut.update_field(ContactField::Email, "x");
        sut.update_field(ContactField::Email, "");

        assert!(sut.errors().is_empty());
    }

    #[test]
    fn update_field_by_name() {
        let sut = sut(MockContactApiService::new().without_submit());

        sut.update_field_by_name("contactNumber", "0123456789").unwrap();
        assert_eq!(sut.submission().contact_number, "0123456789");

        assert_eq!(
            sut.update_field_by_name("phone", "0123456789"),
            Err(UnknownContactFieldError("phone".into()))
        );
    }

    #[tokio::test]
    async fn invalid_email_is_not_submitted() {
        // Arrange
        let sut = sut(MockContactApiService::new().without_submit());
        fill(
            &sut,
            &ContactSubmission {
                email: "not-an-email".into(),
                ..jane()
            },
        );

        // Act
        let result = sut.submit().await;

        // Assert
        assert_matches!(result, Err(ContactFormSubmitError::Invalid(errors)) if errors.get(ContactField::Email) == Some(ContactFieldError::InvalidEmail));
        assert_eq!(
            sut.errors().get(ContactField::Email),
            Some(ContactFieldError::InvalidEmail)
        );
        assert_eq!(sut.status(), SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn short_contact_number_is_not_submitted() {
        // Arrange
        let sut = sut(MockContactApiService::new().without_submit());
        fill(
            &sut,
            &ContactSubmission {
                contact_number: "123".into(),
                ..jane()
            },
        );

        // Act
        let result = sut.submit().await;

        // Assert
        let expected = [(
            ContactField::ContactNumber,
            ContactFieldError::InvalidContactNumber,
        )]
        .into_iter()
        .collect();
        assert_eq!(result, Err(ContactFormSubmitError::Invalid(expected)));
        assert_eq!(sut.submission().contact_number, "123");
    }

    #[tokio::test]
    async fn empty_fields_are_not_submitted() {
        // Arrange
        let sut = sut(MockContactApiService::new().without_submit());
        sut.update_field(ContactField::Email, "jane@x.com");

        // Act
        let result = sut.submit().await;

        // Assert
        let expected = FieldErrors::from_iter(
            ContactField::ALL
                .into_iter()
                .filter(|&field| field != ContactField::Email)
                .map(|field| (field, ContactFieldError::Required)),
        );
        assert_eq!(result, Err(ContactFormSubmitError::Invalid(expected)));

        // typing into a field drops its required error
        sut.update_field(ContactField::Subject, "Hi");
        assert_eq!(sut.errors().get(ContactField::Subject), None);
        assert_eq!(
            sut.errors().get(ContactField::Message),
            Some(ContactFieldError::Required)
        );
    }

    #[tokio::test]
    async fn submit_revalidates_stale_state() {
        // Arrange
        let sut = sut(MockContactApiService::new().without_submit());
        fill(&sut, &jane());
        sut.state.form().submission.email = "broken".into();
        assert!(sut.errors().is_empty());

        // Act
        let result = sut.submit().await;

        // Assert
        assert_matches!(result, Err(ContactFormSubmitError::Invalid(_)));
        assert_eq!(
            sut.errors().get(ContactField::Email),
            Some(ContactFieldError::InvalidEmail)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_clears_form_after_delay() {
        // Arrange
        let sut = sut(MockContactApiService::new().with_submit(jane(), true));
        fill(&sut, &jane());
        let mut status = sut.subscribe();

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, Ok(SubmissionStatus::Success));
        assert_eq!(sut.status(), SubmissionStatus::Success);
        assert!(sut.errors().is_empty());
        assert_eq!(sut.submission(), jane());

        tokio::time::advance(RESET_DELAY - Duration::from_millis(100)).await;
        assert_eq!(sut.status(), SubmissionStatus::Success);
        assert_eq!(sut.submission(), jane());

        status
            .wait_for(|&s| s == SubmissionStatus::Idle)
            .await
            .unwrap();
        assert_eq!(sut.submission(), ContactSubmission::default());
        assert!(sut.can_submit());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_form() {
        // Arrange
        let sut = sut(MockContactApiService::new().with_submit(jane(), false));
        fill(&sut, &jane());

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, Ok(SubmissionStatus::Error));
        tokio::time::sleep(RESET_DELAY * 2).await;
        assert_eq!(sut.status(), SubmissionStatus::Error);
        assert_eq!(sut.submission(), jane());
    }

    #[tokio::test]
    async fn transport_failure_keeps_form() {
        // Arrange
        let sut = sut(MockContactApiService::new().with_submit_error(jane()));
        fill(&sut, &jane());

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, Ok(SubmissionStatus::Error));
        assert_eq!(sut.submission(), jane());
        assert!(sut.can_submit());
    }

    #[tokio::test]
    async fn one_submission_in_flight() {
        // Arrange
        let (tx, rx) = oneshot::channel::<()>();
        let mut api = MockContactApiService::new();
        api.expect_submit().once().return_once(move |_| {
            Box::pin(async move {
                rx.await?;
                anyhow::Ok(ContactApiResponse {
                    success: true,
                    message: "Email sent successfully!".into(),
                })
            })
        });
        let sut = Arc::new(sut(api));
        fill(&sut, &jane());

        // Act
        let first = tokio::spawn({
            let sut = Arc::clone(&sut);
            async move { sut.submit().await }
        });
        sut.subscribe()
            .wait_for(|&s| s == SubmissionStatus::Pending)
            .await
            .unwrap();
        let second = sut.submit().await;

        // Assert
        assert!(!sut.can_submit());
        assert_eq!(second, Err(ContactFormSubmitError::AlreadyPending));

        tx.send(()).unwrap();
        assert_eq!(first.await.unwrap(), Ok(SubmissionStatus::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn resubmission_is_independent() {
        // Arrange
        let api = MockContactApiService::new()
            .with_submit(jane(), true)
            .with_submit(jane(), false);
        let sut = sut(api);
        fill(&sut, &jane());

        // Act
        let first = sut.submit().await;
        let second = sut.submit().await;

        // Assert
        assert_eq!(first, Ok(SubmissionStatus::Success));
        assert_eq!(second, Ok(SubmissionStatus::Error));

        // the reset scheduled by the first success must not wipe the retry
        tokio::time::sleep(RESET_DELAY * 2).await;
        assert_eq!(sut.status(), SubmissionStatus::Error);
        assert_eq!(sut.submission(), jane());
    }
}
