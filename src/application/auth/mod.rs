//! Authentication use cases
//!
//! Sessions are issued by the external sign-in provider; these use cases
//! only resolve them and complete the user's profile.

mod get_current_user;
mod onboard_user;

pub use get_current_user::GetCurrentUserUseCase;
pub use onboard_user::OnboardUserUseCase;
