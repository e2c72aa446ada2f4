use std::sync::Arc;

use crate::application::forms::{FormData, InvoiceSchema, Submission, parse_with_schema};
use crate::application::outcome::{ActionOutcome, AuthContext, Route};
use crate::domain::invoice::{InvoiceError, InvoiceListCache, InvoiceService};
use crate::domain::notification::{EmailTemplate, NotificationPublisher};

use super::invoice_list_view::invalidate_list_view;
use super::notifications::InvoiceMailer;

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
  publisher: Arc<dyn NotificationPublisher>,
  list_cache: Arc<dyn InvoiceListCache>,
  mailer: Arc<InvoiceMailer>,
}

impl CreateInvoiceUseCase {
  pub fn new(
    invoice_service: Arc<InvoiceService>,
    publisher: Arc<dyn NotificationPublisher>,
    list_cache: Arc<dyn InvoiceListCache>,
    mailer: Arc<InvoiceMailer>,
  ) -> Self {
    Self {
      invoice_service,
      publisher,
      list_cache,
      mailer,
    }
  }

  /// Stores a new PENDING invoice for the caller and queues the
  /// "invoice created" email.
  pub async fn execute(
    &self,
    ctx: &AuthContext,
    form: &FormData,
  ) -> Result<ActionOutcome, InvoiceError> {
    let Some(user) = ctx.resolve()? else {
      return Ok(ActionOutcome::AuthRequired);
    };

    let draft = match parse_with_schema::<InvoiceSchema>(form) {
      Submission::Success(draft) => draft,
      Submission::Invalid(reply) => return Ok(ActionOutcome::ValidationFailed(reply)),
    };

    let invoice = self.invoice_service.create_invoice(user.id, draft).await?;
    tracing::info!(invoice_id = %invoice.id, user_id = %user.id, "Invoice created");

    let email = self.mailer.compose(EmailTemplate::InvoiceCreated, &invoice);
    if let Err(e) = self.publisher.publish(email) {
      tracing::warn!(invoice_id = %invoice.id, error = %e, "Invoice created email not queued");
    }

    invalidate_list_view(self.list_cache.as_ref(), user.id).await;
    Ok(ActionOutcome::Navigate(Route::Invoices))
  }
}
