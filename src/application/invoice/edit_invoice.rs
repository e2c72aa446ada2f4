use std::sync::Arc;

use crate::application::forms::{
  FieldErrors, FormData, InvoiceSchema, Submission, SubmissionReply, invoice_id, parse_with_schema,
};
use crate::application::outcome::{ActionOutcome, AuthContext, Route};
use crate::domain::invoice::{InvoiceError, InvoiceService};
use crate::domain::notification::{EmailTemplate, NotificationPublisher};

use super::notifications::InvoiceMailer;

pub struct EditInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
  publisher: Arc<dyn NotificationPublisher>,
  mailer: Arc<InvoiceMailer>,
}

impl EditInvoiceUseCase {
  pub fn new(
    invoice_service: Arc<InvoiceService>,
    publisher: Arc<dyn NotificationPublisher>,
    mailer: Arc<InvoiceMailer>,
  ) -> Self {
    Self {
      invoice_service,
      publisher,
      mailer,
    }
  }

  /// Overwrites the invoice named by the form's `id` field. The cached
  /// invoice list is left alone; it catches up when its entry expires.
  pub async fn execute(
    &self,
    ctx: &AuthContext,
    form: &FormData,
  ) -> Result<ActionOutcome, InvoiceError> {
    let Some(user) = ctx.resolve()? else {
      return Ok(ActionOutcome::AuthRequired);
    };

    let (id, draft) = match (invoice_id(form), parse_with_schema::<InvoiceSchema>(form)) {
      (Some(id), Submission::Success(draft)) => (id, draft),
      (id, submission) => {
        let mut errors = match submission {
          Submission::Invalid(reply) => reply.errors,
          Submission::Success(_) => FieldErrors::new(),
        };
        if id.is_none() {
          errors.insert("id".to_string(), vec!["Invoice id is missing".to_string()]);
        }
        return Ok(ActionOutcome::ValidationFailed(SubmissionReply::new(
          errors,
          form.clone(),
        )));
      }
    };

    let invoice = self
      .invoice_service
      .update_invoice(user.id, id, draft)
      .await?;
    tracing::info!(invoice_id = %invoice.id, user_id = %user.id, "Invoice updated");

    let email = self.mailer.compose(EmailTemplate::InvoiceUpdated, &invoice);
    if let Err(e) = self.publisher.publish(email) {
      tracing::warn!(invoice_id = %invoice.id, error = %e, "Invoice updated email not queued");
    }

    Ok(ActionOutcome::Navigate(Route::Invoices))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::forms::fixtures::invoice_form;
  use crate::application::invoice::notifications::fixtures::mailer;
  use crate::domain::auth::User;
  use crate::domain::invoice::entities::fixtures::draft;
  use crate::domain::invoice::{Invoice, InvoiceRepository, InvoiceStatus};
  use crate::testing::{InMemoryInvoiceRepository, RecordingPublisher};
  use rust_decimal_macros::dec;
  use uuid::Uuid;

  fn setup() -> (
    EditInvoiceUseCase,
    Arc<InMemoryInvoiceRepository>,
    Arc<RecordingPublisher>,
  ) {
    let repo = Arc::new(InMemoryInvoiceRepository::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let use_case = EditInvoiceUseCase::new(
      Arc::new(InvoiceService::new(repo.clone())),
      publisher.clone(),
      Arc::new(mailer()),
    );
    (use_case, repo, publisher)
  }

  fn edit_form(id: Uuid) -> FormData {
    let mut form = invoice_form();
    form.insert("id".to_string(), id.to_string());
    form.insert("clientName".to_string(), "Hopper & Co".to_string());
    form.insert("total".to_string(), "4200.50".to_string());
    form
  }

  #[tokio::test]
  async fn test_edit_overwrites_fields() {
    let (use_case, repo, publisher) = setup();
    let user = User::new("ada@example.com".to_string());
    let invoice = repo.insert(Invoice::new(user.id, draft()));

    let outcome = use_case
      .execute(&AuthContext::authenticated(user.clone()), &edit_form(invoice.id))
      .await
      .unwrap();
    assert_eq!(outcome, ActionOutcome::Navigate(Route::Invoices));

    let stored = repo.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.client_name, "Hopper & Co");
    assert_eq!(stored.total, dec!(4200.50));

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].template, EmailTemplate::InvoiceUpdated);
    assert_eq!(published[0].variables.invoice_amount, "$4,200.50");
  }

  #[tokio::test]
  async fn test_edit_foreign_invoice_is_not_found() {
    let (use_case, repo, publisher) = setup();
    let owner = User::new("ada@example.com".to_string());
    let intruder = User::new("eve@example.com".to_string());
    let invoice = repo.insert(Invoice::new(owner.id, draft()));

    let result = use_case
      .execute(&AuthContext::authenticated(intruder), &edit_form(invoice.id))
      .await;
    assert!(matches!(result, Err(InvoiceError::InvoiceNotFound(_))));

    let stored = repo.find_by_id(invoice.id).await.unwrap().unwrap();
    assert_eq!(stored.client_name, "Grace Ltd");
    assert!(publisher.published().is_empty());
  }

  #[tokio::test]
  async fn test_edit_cannot_reopen_paid_invoice() {
    let (use_case, repo, _publisher) = setup();
    let user = User::new("ada@example.com".to_string());
    let mut invoice = Invoice::new(user.id, draft());
    invoice.mark_paid();
    let invoice = repo.insert(invoice);

    let result = use_case
      .execute(&AuthContext::authenticated(user), &edit_form(invoice.id))
      .await;
    assert!(matches!(
      result,
      Err(InvoiceError::InvalidStatusTransition {
        from: InvoiceStatus::Paid,
        to: InvoiceStatus::Pending
      })
    ));
  }

  #[tokio::test]
  async fn test_edit_without_id() {
    let (use_case, _repo, _publisher) = setup();
    let ctx = AuthContext::authenticated(User::new("ada@example.com".to_string()));

    let outcome = use_case.execute(&ctx, &invoice_form()).await.unwrap();
    let ActionOutcome::ValidationFailed(reply) = outcome else {
      panic!("expected validation failure");
    };
    assert!(reply.has_error("id"));
    assert_eq!(reply.errors.len(), 1);
  }

  #[tokio::test]
  async fn test_edit_without_id_reports_every_field() {
    let (use_case, repo, _publisher) = setup();
    let ctx = AuthContext::authenticated(User::new("ada@example.com".to_string()));

    let mut form = invoice_form();
    form.remove("clientEmail");
    form.insert("invoiceItemQuantity".to_string(), "0".to_string());

    let outcome = use_case.execute(&ctx, &form).await.unwrap();
    let ActionOutcome::ValidationFailed(reply) = outcome else {
      panic!("expected validation failure");
    };
    for field in ["id", "clientEmail", "invoiceItemQuantity"] {
      assert!(reply.has_error(field), "missing error for {}", field);
    }
    assert_eq!(reply.values, form);
    assert_eq!(repo.len(), 0);
  }
}
