use anyhow::bail;
use clap::Args;
use folio_config::Config;
use folio_di::Provide;
use folio_form::{ContactFormSubmitError, SubmissionStatus};
use folio_models::contact::ContactField;
use url::Url;

use crate::environment::{types::ContactForm, ClientProvider};

/// Fill in the contact form and submit it to a running server
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Base url of the server, defaults to `client.base_url`
    #[arg(long)]
    url: Option<Url>,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    contact_number: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
}

impl SubmitCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let base_url = self.url.unwrap_or(config.client.base_url);
        let mut provider = ClientProvider::new(&base_url, config.client.timeout.into())?;
        let form: ContactForm = provider.provide();

        for (field, value) in [
            (ContactField::FirstName, self.first_name),
            (ContactField::LastName, self.last_name),
            (ContactField::Email, self.email),
            (ContactField::ContactNumber, self.contact_number),
            (ContactField::Subject, self.subject),
            (ContactField::Message, self.message),
        ] {
            form.update_field(field, value);
        }

        match form.submit().await {
            Ok(SubmissionStatus::Success) => {
                println!("Message sent successfully!");
                Ok(())
            }
            Ok(_) => bail!("Failed to send message, please try again later"),
            Err(ContactFormSubmitError::Invalid(errors)) => {
                for (field, error) in errors.iter() {
                    eprintln!("{field}: {error}");
                }
                bail!("The form contains invalid fields")
            }
            Err(err) => Err(err.into()),
        }
    }
}
