use std::sync::Arc;

use anyhow::Context;
use folio_di::Build;
use folio_extern_contracts::contact::{ContactApiResponse, ContactApiService};
use folio_models::contact::ContactSubmission;
use folio_utils::trace_instrument;
use serde::Deserialize;
use url::Url;

use crate::http::HttpClient;

const CONTACT_PATH: &str = "api/contact";

#[derive(Debug, Clone, Build)]
pub struct ContactApiServiceImpl {
    client: HttpClient,
    config: ContactApiServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactApiServiceConfig {
    endpoint: Arc<Url>,
}

impl ContactApiServiceConfig {
    /// Resolve the contact endpoint relative to the site's base url.
    pub fn new(base_url: &Url) -> anyhow::Result<Self> {
        let endpoint = base_url
            .join(CONTACT_PATH)
            .with_context(|| format!("Failed to build contact endpoint from {base_url}"))?;
        Ok(Self {
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ContactApiService for ContactApiServiceImpl {
    #[trace_instrument(skip(self, submission), fields(endpoint = %self.config.endpoint))]
    async fn submit(&self, submission: ContactSubmission) -> anyhow::Result<ContactApiResponse> {
        let response = self
            .client
            .post((*self.config.endpoint).clone())
            .json(&submission)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .json::<ContactResponse>()
            .await
            .with_context(|| format!("Failed to parse contact response (status {status})"))?;

        Ok(ContactApiResponse {
            success: status.is_success() && body.success,
            message: body.message,
        })
    }
}

#[derive(Deserialize)]
struct ContactResponse {
    success: bool,
    message: String,
}

#[cfg(test)]
mod tests {
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            contact_number: "+1 555 1234567".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
        }
    }

    fn sut(server: &MockServer) -> ContactApiServiceImpl {
        ContactApiServiceImpl {
            client: HttpClient::new(None).unwrap(),
            config: ContactApiServiceConfig::new(&server.uri().parse().unwrap()).unwrap(),
        }
    }

    #[test]
    fn endpoint_is_resolved_against_base_url() {
        let config = ContactApiServiceConfig::new(&"https://example.com/".parse().unwrap()).unwrap();
        assert_eq!(config.endpoint().as_str(), "https://example.com/api/contact");
    }

    #[tokio::test]
    async fn success() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact"))
            .and(body_json(serde_json::json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "email": "jane@x.com",
                "contactNumber": "+1 555 1234567",
                "subject": "Hi",
                "message": "Hello",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Email sent successfully!",
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let result = sut(&server).submit(submission()).await;

        // Assert
        assert_eq!(
            result.unwrap(),
            ContactApiResponse {
                success: true,
                message: "Email sent successfully!".into(),
            }
        );
    }

    #[tokio::test]
    async fn failure_status() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "success": false,
                "message": "Failed to send email.",
            })))
            .mount(&server)
            .await;

        // Act
        let result = sut(&server).submit(submission()).await;

        // Assert
        assert!(!result.unwrap().success);
    }

    #[tokio::test]
    async fn error_status_with_success_body_is_not_success() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({
                "success": true,
                "message": "proxy",
            })))
            .mount(&server)
            .await;

        // Act
        let result = sut(&server).submit(submission()).await;

        // Assert
        assert!(!result.unwrap().success);
    }

    #[tokio::test]
    async fn malformed_response() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        // Act
        let result = sut(&server).submit(submission()).await;

        // Assert
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unreachable() {
        // Arrange
        let server = MockServer::start().await;
        let sut = sut(&server);
        drop(server);

        // Act
        let result = sut.submit(submission()).await;

        // Assert
        assert!(result.is_err());
    }
}
