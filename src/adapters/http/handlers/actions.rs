use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::http::handlers::{
  InvoiceFormMode, WebSettings, render_invoice_form, render_onboarding_form, see_other,
};
use crate::adapters::http::middleware::AuthContextExt;
use crate::adapters::http::{errors::ApiError, templates::TemplateEngine};
use crate::application::ActionOutcome;
use crate::application::auth::OnboardUserUseCase;
use crate::application::forms::{FormData, SubmissionReply, decode_form};
use crate::application::invoice::{
  CreateInvoiceUseCase, DeleteInvoiceUseCase, EditInvoiceUseCase, MarkInvoicePaidUseCase,
};
use crate::infrastructure::metrics::INVOICES_CREATED;

fn read_form(body: &web::Bytes) -> Result<FormData, ApiError> {
  decode_form(body).map_err(|e| ApiError::Validation(format!("Malformed form body: {}", e)))
}

/// Turns an action outcome into the response the browser follows
fn follow<F>(
  outcome: ActionOutcome,
  settings: &WebSettings,
  rerender: F,
) -> Result<HttpResponse, ApiError>
where
  F: FnOnce(&SubmissionReply) -> Result<HttpResponse, ApiError>,
{
  match outcome {
    ActionOutcome::Navigate(route) => Ok(see_other(route.path())),
    ActionOutcome::AuthRequired => Ok(see_other(&settings.sign_in_url)),
    ActionOutcome::ValidationFailed(reply) => rerender(&reply),
  }
}

// POST /onboarding
pub async fn onboard(
  req: HttpRequest,
  body: web::Bytes,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<WebSettings>,
  onboard_user_use_case: web::Data<Arc<OnboardUserUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let form = read_form(&body)?;
  let outcome = onboard_user_use_case
    .execute(&req.auth_context(), &form)
    .await?;

  follow(outcome, &settings, |reply| {
    render_onboarding_form(
      &templates,
      &reply.values,
      &reply.errors,
      StatusCode::UNPROCESSABLE_ENTITY,
    )
  })
}

// POST /dashboard/invoices
pub async fn create_invoice(
  req: HttpRequest,
  body: web::Bytes,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<WebSettings>,
  create_invoice_use_case: web::Data<Arc<CreateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let form = read_form(&body)?;
  let outcome = create_invoice_use_case
    .execute(&req.auth_context(), &form)
    .await?;

  if matches!(outcome, ActionOutcome::Navigate(_)) {
    INVOICES_CREATED.inc();
  }

  follow(outcome, &settings, |reply| {
    render_invoice_form(
      &templates,
      InvoiceFormMode::Create,
      &reply.values,
      &reply.errors,
      StatusCode::UNPROCESSABLE_ENTITY,
    )
  })
}

// POST /dashboard/invoices/edit
pub async fn edit_invoice(
  req: HttpRequest,
  body: web::Bytes,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<WebSettings>,
  edit_invoice_use_case: web::Data<Arc<EditInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let form = read_form(&body)?;
  let outcome = edit_invoice_use_case
    .execute(&req.auth_context(), &form)
    .await?;

  follow(outcome, &settings, |reply| {
    render_invoice_form(
      &templates,
      InvoiceFormMode::Edit,
      &reply.values,
      &reply.errors,
      StatusCode::UNPROCESSABLE_ENTITY,
    )
  })
}

// POST /dashboard/invoices/{id}/delete
pub async fn delete_invoice(
  req: HttpRequest,
  path: web::Path<Uuid>,
  settings: web::Data<WebSettings>,
  delete_invoice_use_case: web::Data<Arc<DeleteInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let outcome = delete_invoice_use_case
    .execute(&req.auth_context(), path.into_inner())
    .await?;

  follow(outcome, &settings, |_| {
    Err(ApiError::Validation("Unexpected form errors".to_string()))
  })
}

// POST /dashboard/invoices/{id}/paid
pub async fn mark_invoice_paid(
  req: HttpRequest,
  path: web::Path<Uuid>,
  settings: web::Data<WebSettings>,
  mark_paid_use_case: web::Data<Arc<MarkInvoicePaidUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let outcome = mark_paid_use_case
    .execute(&req.auth_context(), path.into_inner())
    .await?;

  follow(outcome, &settings, |_| {
    Err(ApiError::Validation("Unexpected form errors".to_string()))
  })
}
