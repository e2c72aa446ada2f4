use std::sync::Arc;

use crate::application::outcome::AuthContext;
use crate::domain::invoice::{InvoiceError, InvoiceService, InvoiceSummary};

/// Backs the JSON list endpoint; always reads the store
pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, ctx: &AuthContext) -> Result<Vec<InvoiceSummary>, InvoiceError> {
    let user = ctx.resolve()?.ok_or(InvoiceError::AuthRequired)?;
    self.invoice_service.list_invoices(user.id).await
  }
}
