use folio_models::contact::{
    ContactMessage, ContactMessageAuthor, ContactMessageAuthorName, ContactMessageContent,
    ContactMessageEmail, ContactMessagePhone, ContactMessageSubject,
};
use serde::Deserialize;
use thiserror::Error;

/// Request body of `POST /api/contact`.
///
/// Every field is optional here so that a missing field can be answered with
/// the same message as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiContactSubmission {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiContactSubmissionError {
    #[error("All fields are required")]
    MissingField,
}

impl ApiContactSubmissionError {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingField => "All fields are required",
        }
    }
}

fn required(value: Option<String>) -> Result<String, ApiContactSubmissionError> {
    value
        .filter(|x| !x.is_empty())
        .ok_or(ApiContactSubmissionError::MissingField)
}

impl TryFrom<ApiContactSubmission> for ContactMessage {
    type Error = ApiContactSubmissionError;

    fn try_from(value: ApiContactSubmission) -> Result<Self, Self::Error> {
        use ApiContactSubmissionError::MissingField;

        // Presence is the only check. Format rules live in the form.
        // contactNumber is optional here even though the form requires it
        let first_name = required(value.first_name)?;
        let last_name = required(value.last_name)?;
        let email = required(value.email)?;
        let subject = required(value.subject)?;
        let content = required(value.message)?;
        let phone = value.contact_number.filter(|x| !x.is_empty());

        Ok(Self {
            author: ContactMessageAuthor {
                first_name: ContactMessageAuthorName::try_new(first_name)
                    .map_err(|_| MissingField)?,
                last_name: ContactMessageAuthorName::try_new(last_name)
                    .map_err(|_| MissingField)?,
                email: ContactMessageEmail::try_new(email).map_err(|_| MissingField)?,
                phone: phone
                    .map(ContactMessagePhone::try_new)
                    .transpose()
                    .map_err(|_| MissingField)?,
            },
            subject: ContactMessageSubject::try_new(subject).map_err(|_| MissingField)?,
            content: ContactMessageContent::try_new(content).map_err(|_| MissingField)?,
        })
    }
}
