use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    email_address::{EmailAddress, EmailAddressWithName},
    macros::nutype_string,
};

pub static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub static CONTACT_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[0-9\s\-()]{10,15}$").unwrap());

/// The contact form payload as filled in by a visitor.
///
/// This is both the client-side form state and the request body sent to the
/// contact endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: String,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::ContactNumber => &self.contact_number,
            ContactField::Subject => &self.subject,
            ContactField::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: ContactField, value: String) {
        let slot = match field {
            ContactField::FirstName => &mut self.first_name,
            ContactField::LastName => &mut self.last_name,
            ContactField::Email => &mut self.email,
            ContactField::ContactNumber => &mut self.contact_number,
            ContactField::Subject => &mut self.subject,
            ContactField::Message => &mut self.message,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    ContactNumber,
    Subject,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 6] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::ContactNumber,
        Self::Subject,
        Self::Message,
    ];

    /// The name of this field in the wire format.
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::ContactNumber => "contactNumber",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }

    /// Validates the format of `value` for this field.
    ///
    /// Only `email` and `contactNumber` carry a format; every other field
    /// accepts any value.
    pub fn validate(self, value: &str) -> Result<(), ContactFieldError> {
        match self {
            Self::Email => validate_email(value),
            Self::ContactNumber => validate_contact_number(value),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown contact form field: {0}")]
pub struct UnknownContactFieldError(pub String);

impl FromStr for ContactField {
    type Err = UnknownContactFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownContactFieldError(s.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactFieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address (e.g., john@example.com)")]
    InvalidEmail,
    #[error(
        "Please enter a valid contact number (10-15 digits, may include +, spaces, -, (), e.g., \
         +94 77 123 4567)"
    )]
    InvalidContactNumber,
}

/// Checks the shape of an email address. An empty value is not an error, the
/// required check happens separately.
pub fn validate_email(value: &str) -> Result<(), ContactFieldError> {
    if value.is_empty() || EMAIL_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ContactFieldError::InvalidEmail)
    }
}

/// Checks the shape of a phone number. An empty value is not an error, the
/// required check happens separately.
pub fn validate_contact_number(value: &str) -> Result<(), ContactFieldError> {
    if value.is_empty() || CONTACT_NUMBER_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ContactFieldError::InvalidContactNumber)
    }
}

/// A validated contact message, ready to be delivered to the site owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub author: ContactMessageAuthor,
    pub subject: ContactMessageSubject,
    pub content: ContactMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageAuthor {
    pub first_name: ContactMessageAuthorName,
    pub last_name: ContactMessageAuthorName,
    /// The address as typed by the author. It is not required to be a valid
    /// mail header value.
    pub email: ContactMessageEmail,
    pub phone: Option<ContactMessagePhone>,
}

impl ContactMessageAuthor {
    pub fn full_name(&self) -> String {
        format!("{} {}", *self.first_name, *self.last_name)
    }

    /// The author's address with their full name attached, used as reply-to.
    ///
    /// `None` if the address cannot be used in a mail header.
    pub fn mailbox(&self) -> Option<EmailAddressWithName> {
        self.email
            .parse::<EmailAddress>()
            .ok()
            .map(|email| email.with_name(self.full_name()))
    }
}

nutype_string!(ContactMessageAuthorName(validate(not_empty)));
nutype_string!(ContactMessageEmail(validate(not_empty)));
nutype_string!(ContactMessagePhone(validate(not_empty)));
nutype_string!(ContactMessageSubject(validate(not_empty)));
nutype_string!(ContactMessageContent(validate(not_empty)));

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn email_validation() {
        for (input, ok) in [
            ("", true),
            ("jane@x.com", true),
            ("john@example.com", true),
            ("a.b+c@sub.domain.org", true),
            ("not-an-email", false),
            ("jane@x", false),
            ("@x.com", false),
            ("jane@.com", false),
            ("jane@mail.example.co.uk", true),
            ("ja ne@x.com", false),
            ("jane@@x.com", false),
            (" ", false),
        ] {
            let result = validate_email(input);
            if ok {
                assert_eq!(result, Ok(()), "{input:?} should be accepted");
            } else {
                assert_eq!(
                    result,
                    Err(ContactFieldError::InvalidEmail),
                    "{input:?} should be rejected"
                );
            }
        }
    }

    #[test]
    fn contact_number_validation() {
        for (input, ok) in [
            ("", true),
            ("+1 555 1234567", true),
            ("+94 77 123 4567", true),
            ("0123456789", true),
            ("(555) 123-4567", true),
            ("123456789012345", true),
            ("+123456789012345", true),
            ("123", false),
            ("123456789", false),
            ("1234567890123456", false),
            ("555-CALL-NOW", false),
            ("++1234567890", false),
            ("12345 67890x", false),
        ] {
            let result = validate_contact_number(input);
            if ok {
                assert_eq!(result, Ok(()), "{input:?} should be accepted");
            } else {
                assert_eq!(
                    result,
                    Err(ContactFieldError::InvalidContactNumber),
                    "{input:?} should be rejected"
                );
            }
        }
    }

    #[test]
    fn error_messages_are_human_readable() {
        assert!(ContactFieldError::InvalidEmail
            .to_string()
            .contains("valid email address"));
        assert!(ContactFieldError::InvalidContactNumber
            .to_string()
            .contains("10-15 digits"));
    }

    #[test]
    fn field_names_round_trip() {
        for field in ContactField::ALL {
            assert_eq!(field.name().parse::<ContactField>().unwrap(), field);
        }
        assert_eq!(
            "phone".parse::<ContactField>(),
            Err(UnknownContactFieldError("phone".into()))
        );
    }

    #[test]
    fn submission_wire_format() {
        let submission = ContactSubmission {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            contact_number: "+1 555 1234567".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
        };

        let json = serde_json::to_value(&submission).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "email": "jane@x.com",
                "contactNumber": "+1 555 1234567",
                "subject": "Hi",
                "message": "Hello",
            })
        );
    }

    #[test]
    fn submission_get_set() {
        let mut submission = ContactSubmission::default();
        for field in ContactField::ALL {
            submission.set(field, field.name().to_uppercase());
        }
        for field in ContactField::ALL {
            assert_eq!(submission.get(field), field.name().to_uppercase());
        }
    }

    #[test]
    fn author_mailbox() {
        let author = ContactMessageAuthor {
            first_name: "Jane".try_into().unwrap(),
            last_name: "Doe".try_into().unwrap(),
            email: "jane@x.com".try_into().unwrap(),
            phone: None,
        };

        assert_eq!(author.full_name(), "Jane Doe");
        let mailbox = author.mailbox().unwrap();
        assert_eq!(mailbox.0.name.as_deref(), Some("Jane Doe"));
        assert_eq!(mailbox.into_email_address().as_str(), "jane@x.com");
    }

    #[test]
    fn author_mailbox_unusable_address() {
        for email in ["a,b@x.com", "a;b@x.com"] {
            assert_eq!(validate_email(email), Ok(()));

            let author = ContactMessageAuthor {
                first_name: "Jane".try_into().unwrap(),
                last_name: "Doe".try_into().unwrap(),
                email: email.try_into().unwrap(),
                phone: None,
            };

            assert_eq!(author.mailbox(), None, "{email:?}");
        }
    }

    #[test]
    fn message_values() {
        assert!(ContactMessageSubject::try_new(String::new()).is_err());
        assert!(ContactMessageContent::try_new("x".repeat(5000)).is_ok());
        assert!(ContactMessageAuthorName::try_new("x".repeat(300)).is_ok());
    }
}
