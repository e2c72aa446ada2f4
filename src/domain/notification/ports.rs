use async_trait::async_trait;

use super::entities::TemplatedEmail;
use super::errors::NotificationError;

/// Delivers a templated email through a provider
#[async_trait]
pub trait EmailSender: Send + Sync {
  async fn send(&self, email: &TemplatedEmail) -> Result<(), NotificationError>;
}

/// Hands an email off for background delivery without waiting on it
pub trait NotificationPublisher: Send + Sync {
  fn publish(&self, email: TemplatedEmail) -> Result<(), NotificationError>;
}
