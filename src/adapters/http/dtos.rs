use serde::Serialize;

/// Error body returned by the JSON endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  pub error: String,
}

/// Generic success response
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
  pub success: bool,
}

impl SuccessResponse {
  pub fn ok() -> Self {
    Self { success: true }
  }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
  pub status: &'static str,
}
