use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing, Json, Router,
};
use folio_core_contact_contracts::ContactFeatureService;
use folio_models::contact::ContactMessage;
use tracing::{error, warn};

use crate::{
    errors::{failure, success},
    models::contact::ApiContactSubmission,
};

pub const SEND_SUCCESS: &str = "Email sent successfully!";
pub const SEND_FAILURE: &str = "Failed to send email. Please try again or contact me directly.";
pub const INVALID_REQUEST_BODY: &str = "Invalid request body";

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(send_message))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactFeatureService>>,
    body: Result<Json<ApiContactSubmission>, JsonRejection>,
) -> Response {
    let submission = match body {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            warn!(%rejection, "invalid contact request body");
            return failure(StatusCode::BAD_REQUEST, INVALID_REQUEST_BODY);
        }
    };

    let message = match ContactMessage::try_from(submission) {
        Ok(message) => message,
        Err(err) => {
            warn!(%err, "rejected contact submission");
            return failure(StatusCode::BAD_REQUEST, err.message());
        }
    };

    match service.send_message(message).await {
        Ok(()) => success(SEND_SUCCESS),
        Err(err) => {
            error!("Error sending email: {err:#}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILURE)
        }
    }
}
