use std::sync::Arc;

use crate::application::forms::{FormData, OnboardingSchema, Submission, parse_with_schema};
use crate::application::outcome::{ActionOutcome, AuthContext, Route};
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;

/// Stores the first name, last name and address of a new user
pub struct OnboardUserUseCase {
  auth_service: Arc<AuthService>,
}

impl OnboardUserUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  pub async fn execute(
    &self,
    ctx: &AuthContext,
    form: &FormData,
  ) -> Result<ActionOutcome, AuthError> {
    let Some(user) = ctx.resolve()? else {
      return Ok(ActionOutcome::AuthRequired);
    };

    let profile = match parse_with_schema::<OnboardingSchema>(form) {
      Submission::Success(profile) => profile,
      Submission::Invalid(reply) => return Ok(ActionOutcome::ValidationFailed(reply)),
    };

    self.auth_service.update_profile(user.id, profile).await?;
    tracing::info!(user_id = %user.id, "User onboarded");

    Ok(ActionOutcome::Navigate(Route::Dashboard))
  }
}
