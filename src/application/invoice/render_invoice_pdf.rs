use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoicePdfRenderer, InvoiceService};

#[derive(Debug)]
pub struct RenderedInvoice {
  pub filename: String,
  pub content: Vec<u8>,
}

/// Renders any invoice by id. The download link is shared with clients, so
/// no session is needed.
pub struct RenderInvoicePdfUseCase {
  invoice_service: Arc<InvoiceService>,
  renderer: Arc<dyn InvoicePdfRenderer>,
}

impl RenderInvoicePdfUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>, renderer: Arc<dyn InvoicePdfRenderer>) -> Self {
    Self {
      invoice_service,
      renderer,
    }
  }

  pub async fn execute(&self, invoice_id: Uuid) -> Result<RenderedInvoice, InvoiceError> {
    let invoice = self.invoice_service.get_invoice(invoice_id).await?;
    let filename = format!("invoice-{}.pdf", invoice.invoice_number);

    let renderer = self.renderer.clone();
    let content = tokio::task::spawn_blocking(move || renderer.render(&invoice))
      .await
      .map_err(|e| InvoiceError::Internal(format!("PDF render task failed: {}", e)))??;

    Ok(RenderedInvoice { filename, content })
  }
}
