use std::{sync::Arc, time::Duration};

use folio_core_contact_contracts::{ContactFeatureService, ContactSendMessageError};
use folio_di::Build;
use folio_email_contracts::{ContentType, Email, EmailService};
use folio_models::{contact::ContactMessage, email_address::EmailAddressWithName};
use folio_shared_contracts::time::TimeService;
use folio_templates_contracts::{ContactNotificationTemplate, TemplateService};
use folio_utils::trace_instrument;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Build)]
pub struct ContactFeatureServiceImpl<Time, Template, Email> {
    time: Time,
    template: Template,
    email: Email,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Where notifications are delivered to.
    pub recipient: Arc<EmailAddressWithName>,
    /// Upper bound for a single call to the mail transport.
    pub send_timeout: Duration,
}

impl<Time, Template, EmailS> ContactFeatureService
    for ContactFeatureServiceImpl<Time, Template, EmailS>
where
    Time: TimeService,
    Template: TemplateService,
    EmailS: EmailService,
{
    #[trace_instrument(skip(self))]
    async fn send_message(&self, message: ContactMessage) -> Result<(), ContactSendMessageError> {
        let email = self.notification(&message)?;

        debug!("dispatching contact message");
        let timeout = self.config.send_timeout;
        match tokio::time::timeout(timeout, self.email.send(email)).await {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => return Err(ContactSendMessageError::Rejected),
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(ContactSendMessageError::Timeout(timeout)),
        }

        info!(
            from = %*message.author.email,
            phone = message.author.phone.as_deref().map(String::as_str),
            subject = %*message.subject,
            "contact message delivered"
        );

        Ok(())
    }
}

impl<Time, Template, EmailS> ContactFeatureServiceImpl<Time, Template, EmailS>
where
    Time: TimeService,
    Template: TemplateService,
    EmailS: EmailService,
{
    /// Compose the notification for the site owner. Replies go straight to the
    /// author of the message.
    fn notification(&self, message: &ContactMessage) -> anyhow::Result<Email> {
        let author = &message.author;
        let reply_to = author.mailbox();
        if reply_to.is_none() {
            warn!(email = %*author.email, "author address is not usable as reply-to");
        }

        let body = self.template.render(&ContactNotificationTemplate {
            first_name: (*author.first_name).clone(),
            last_name: (*author.last_name).clone(),
            email: (*author.email).clone(),
            contact_number: author.phone.as_deref().cloned(),
            subject: (*message.subject).clone(),
            message: (*message.content).clone(),
            sent_at: self.time.now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        })?;

        Ok(Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!("Portfolio Contact: {}", *message.subject),
            body,
            content_type: ContentType::Html,
            reply_to,
        })
    }
}
