use actix_web::{
  Error, HttpMessage,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  sync::Arc,
};

use crate::application::AuthContext;
use crate::application::auth::GetCurrentUserUseCase;
use crate::domain::auth::errors::{AuthError, RepositoryError};

pub const SESSION_COOKIE: &str = "session_token";

/// Resolves the session of every request into an [`AuthContext`].
///
/// The token is read from the `session_token` cookie, or else from an
/// `Authorization: Bearer` header. The middleware never rejects a request:
/// a missing, malformed or expired session yields an anonymous context and
/// each handler decides what that means for it. A failing session store
/// yields an unavailable context, which handlers turn into a 500.
pub struct SessionMiddleware {
  get_user_use_case: Arc<GetCurrentUserUseCase>,
}

impl SessionMiddleware {
  pub fn new(get_user_use_case: Arc<GetCurrentUserUseCase>) -> Self {
    Self { get_user_use_case }
  }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Transform = SessionMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(SessionMiddlewareService {
      service: Rc::new(service),
      get_user_use_case: self.get_user_use_case.clone(),
    }))
  }
}

pub struct SessionMiddlewareService<S> {
  service: Rc<S>,
  get_user_use_case: Arc<GetCurrentUserUseCase>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);
    let get_user_use_case = self.get_user_use_case.clone();
    let token = extract_session_token(&req);

    Box::pin(async move {
      let ctx = match token {
        Some(token) => match get_user_use_case.execute(token).await {
          Ok(user) => AuthContext::authenticated(user),
          Err(AuthError::Repository(e)) if !matches!(e, RepositoryError::NotFound) => {
            tracing::error!(error = %e, "Session lookup failed");
            AuthContext::unavailable(e.to_string())
          }
          Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session");
            AuthContext::anonymous()
          }
        },
        None => AuthContext::anonymous(),
      };

      req.extensions_mut().insert(ctx);
      service.call(req).await
    })
  }
}

/// Cookie first, then `Authorization: Bearer`
fn extract_session_token(req: &ServiceRequest) -> Option<String> {
  if let Some(cookie) = req.cookie(SESSION_COOKIE) {
    return Some(cookie.value().to_string());
  }

  req
    .headers()
    .get("Authorization")
    .and_then(|h| h.to_str().ok())
    .and_then(|s| s.strip_prefix("Bearer "))
    .map(|s| s.trim().to_string())
}

/// Extension trait to read the resolved [`AuthContext`] in handlers
pub trait AuthContextExt {
  /// Anonymous when the session middleware is not installed
  fn auth_context(&self) -> AuthContext;
}

impl AuthContextExt for actix_web::HttpRequest {
  fn auth_context(&self) -> AuthContext {
    self
      .extensions()
      .get::<AuthContext>()
      .cloned()
      .unwrap_or_default()
  }
}
