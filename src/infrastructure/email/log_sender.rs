use async_trait::async_trait;

use crate::domain::notification::{EmailSender, NotificationError, TemplatedEmail};

/// Logs emails instead of sending them; used in development
#[derive(Debug, Default, Clone)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
  async fn send(&self, email: &TemplatedEmail) -> Result<(), NotificationError> {
    tracing::info!(
      template = email.template.as_str(),
      to = %email.to.email,
      invoice_number = email.variables.invoice_number,
      invoice_link = %email.variables.invoice_link,
      "Email delivery skipped (log provider)"
    );
    Ok(())
  }
}
