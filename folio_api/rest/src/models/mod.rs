use serde::Serialize;

pub mod contact;

/// Body of every response of the contact API.
#[derive(Debug, Serialize)]
pub struct ApiResult {
    pub success: bool,
    pub message: &'static str,
}
