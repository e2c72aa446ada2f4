use std::sync::Arc;
use uuid::Uuid;

use crate::application::outcome::AuthContext;
use crate::domain::invoice::{InvoiceError, InvoiceService};
use crate::domain::notification::{EmailSender, EmailTemplate};

use super::notifications::InvoiceMailer;

/// Sends the payment reminder right away so the caller learns whether
/// the provider accepted it.
pub struct SendInvoiceReminderUseCase {
  invoice_service: Arc<InvoiceService>,
  sender: Arc<dyn EmailSender>,
  mailer: Arc<InvoiceMailer>,
}

impl SendInvoiceReminderUseCase {
  pub fn new(
    invoice_service: Arc<InvoiceService>,
    sender: Arc<dyn EmailSender>,
    mailer: Arc<InvoiceMailer>,
  ) -> Self {
    Self {
      invoice_service,
      sender,
      mailer,
    }
  }

  pub async fn execute(&self, ctx: &AuthContext, invoice_id: Uuid) -> Result<(), InvoiceError> {
    let user = ctx.resolve()?.ok_or(InvoiceError::AuthRequired)?;
    let invoice = self
      .invoice_service
      .get_owned_invoice(user.id, invoice_id)
      .await?;

    let email = self.mailer.compose(EmailTemplate::InvoiceReminder, &invoice);
    self.sender.send(&email).await?;

    tracing::info!(invoice_id = %invoice.id, to = %email.to.email, "Invoice reminder sent");
    Ok(())
  }
}
