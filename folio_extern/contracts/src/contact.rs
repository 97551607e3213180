use std::future::Future;

use folio_models::contact::ContactSubmission;

/// Client for the contact delivery endpoint.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactApiService: Send + Sync + 'static {
    /// Send the submission to the endpoint and wait for its verdict.
    ///
    /// Fails if the endpoint cannot be reached or its response cannot be
    /// understood.
    fn submit(
        &self,
        submission: ContactSubmission,
    ) -> impl Future<Output = anyhow::Result<ContactApiResponse>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactApiResponse {
    /// `true` only if the endpoint answered with a success status and a
    /// success body.
    pub success: bool,
    pub message: String,
}

#[cfg(feature = "mock")]
impl MockContactApiService {
    pub fn with_submit(mut self, submission: ContactSubmission, success: bool) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| {
                Box::pin(std::future::ready(Ok(ContactApiResponse {
                    success,
                    message: if success {
                        "Email sent successfully!".into()
                    } else {
                        "Failed to send email.".into()
                    },
                })))
            });
        self
    }

    pub fn with_submit_error(mut self, submission: ContactSubmission) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(|_| {
                Box::pin(std::future::ready(Err(anyhow::anyhow!(
                    "error sending request"
                ))))
            });
        self
    }

    pub fn without_submit(mut self) -> Self {
        self.expect_submit().never();
        self
    }
}
