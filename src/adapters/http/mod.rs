pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod templates;

// Re-export commonly used types
pub use dtos::{ErrorResponse, HealthResponse, SuccessResponse};
pub use errors::ApiError;
pub use middleware::{
  AuthContextExt, RequestId, RequestIdExt, RequestIdMiddleware, SessionMiddleware,
};
pub use routes::{HttpDependencies, configure_routes};
pub use templates::{DEFAULT_TEMPLATE_GLOB, TemplateEngine};
