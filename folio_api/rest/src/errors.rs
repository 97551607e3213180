use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::models::ApiResult;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    error!("internal server error: {err:#}");
    failure(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

pub fn failure(code: StatusCode, message: &'static str) -> Response {
    (
        code,
        Json(ApiResult {
            success: false,
            message,
        }),
    )
        .into_response()
}

pub fn success(message: &'static str) -> Response {
    Json(ApiResult {
        success: true,
        message,
    })
    .into_response()
}
