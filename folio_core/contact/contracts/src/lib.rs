use std::{future::Future, time::Duration};

use folio_models::contact::ContactMessage;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Format a notification for the given message and hand it to the mail
    /// transport, addressed to the site owner.
    ///
    /// Exactly one delivery attempt is made.
    fn send_message(
        &self,
        message: ContactMessage,
    ) -> impl Future<Output = Result<(), ContactSendMessageError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSendMessageError {
    #[error("The mail transport refused the message.")]
    Rejected,
    #[error("The mail transport did not respond within {0:?}.")]
    Timeout(Duration),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_send_message(
        mut self,
        message: ContactMessage,
        result: Result<(), ContactSendMessageError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(message))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
