use anyhow::Context;
use folio_config::EmailConfig;
use folio_email_impl::EmailServiceImpl;

/// Set up the SMTP transport. The connection itself is opened lazily.
pub fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    EmailServiceImpl::new(&config.smtp_url, config.from.clone())
        .context("Failed to set up SMTP transport")
}
