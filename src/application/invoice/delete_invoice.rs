use std::sync::Arc;
use uuid::Uuid;

use crate::application::outcome::{ActionOutcome, AuthContext, Route};
use crate::domain::invoice::{InvoiceError, InvoiceListCache, InvoiceService};

use super::invoice_list_view::invalidate_list_view;

pub struct DeleteInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
  list_cache: Arc<dyn InvoiceListCache>,
}

impl DeleteInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>, list_cache: Arc<dyn InvoiceListCache>) -> Self {
    Self {
      invoice_service,
      list_cache,
    }
  }

  pub async fn execute(
    &self,
    ctx: &AuthContext,
    invoice_id: Uuid,
  ) -> Result<ActionOutcome, InvoiceError> {
    let Some(user) = ctx.resolve()? else {
      return Ok(ActionOutcome::AuthRequired);
    };

    self
      .invoice_service
      .delete_invoice(user.id, invoice_id)
      .await?;
    tracing::info!(invoice_id = %invoice_id, user_id = %user.id, "Invoice deleted");

    invalidate_list_view(self.list_cache.as_ref(), user.id).await;
    Ok(ActionOutcome::Navigate(Route::Invoices))
  }
}
