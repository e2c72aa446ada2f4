use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
  #[error("Email provider rejected the request: {0}")]
  Rejected(String),

  #[error("Email transport failed: {0}")]
  Transport(String),

  #[error("Notification queue is full")]
  QueueFull,

  #[error("Notification queue is closed")]
  QueueClosed,

  #[error("Email configuration error: {0}")]
  Configuration(String),
}

impl NotificationError {
  /// Provider-side rejections will not succeed on retry
  pub fn is_permanent(&self) -> bool {
    matches!(
      self,
      NotificationError::Rejected(_) | NotificationError::Configuration(_)
    )
  }
}
