use std::sync::Arc;
use uuid::Uuid;

use crate::application::outcome::AuthContext;
use crate::domain::invoice::{Invoice, InvoiceError, InvoiceService};

/// Loads an owned invoice, e.g. to pre-fill the edit form
pub struct GetInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, ctx: &AuthContext, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
    let user = ctx.resolve()?.ok_or(InvoiceError::AuthRequired)?;
    self
      .invoice_service
      .get_owned_invoice(user.id, invoice_id)
      .await
  }
}
