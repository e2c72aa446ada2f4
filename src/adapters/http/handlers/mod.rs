pub mod actions;
pub mod api;
pub mod pages;

use actix_web::{HttpResponse, http::StatusCode, http::header};
use serde::Serialize;

use crate::adapters::http::{errors::ApiError, templates::TemplateEngine};
use crate::application::forms::{FieldErrors, FormData};
use crate::domain::invoice::{Currency, InvoiceStatus};

/// Values shared by the HTML handlers
#[derive(Debug, Clone)]
pub struct WebSettings {
  /// Where unauthenticated visitors are sent
  pub sign_in_url: String,
}

/// `303 See Other` to `location`
pub fn see_other(location: &str) -> HttpResponse {
  HttpResponse::SeeOther()
    .insert_header((header::LOCATION, location))
    .finish()
}

pub fn html(status: StatusCode, body: String) -> HttpResponse {
  HttpResponse::build(status)
    .content_type("text/html; charset=utf-8")
    .body(body)
}

#[derive(Serialize)]
struct Choice {
  value: &'static str,
  label: &'static str,
}

/// Which invoice form is being shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceFormMode {
  Create,
  Edit,
}

/// Renders the invoice form with the given values and field errors
pub fn render_invoice_form(
  templates: &TemplateEngine,
  mode: InvoiceFormMode,
  values: &FormData,
  errors: &FieldErrors,
  status: StatusCode,
) -> Result<HttpResponse, ApiError> {
  let (title, action) = match mode {
    InvoiceFormMode::Create => ("Create invoice", "/dashboard/invoices".to_string()),
    InvoiceFormMode::Edit => ("Edit invoice", "/dashboard/invoices/edit".to_string()),
  };

  let currencies: Vec<Choice> = Currency::ALL
    .iter()
    .map(|c| Choice {
      value: c.as_str(),
      label: c.as_str(),
    })
    .collect();
  let statuses = [InvoiceStatus::Pending, InvoiceStatus::Paid]
    .iter()
    .map(|s| Choice {
      value: s.as_str(),
      label: s.as_str(),
    })
    .collect::<Vec<_>>();

  let mut context = tera::Context::new();
  context.insert("title", title);
  context.insert("action", &action);
  context.insert("editing", &(mode == InvoiceFormMode::Edit));
  context.insert("values", values);
  context.insert("errors", errors);
  context.insert("currencies", &currencies);
  context.insert("statuses", &statuses);

  let body = templates.render("invoices/form.html.tera", &context)?;
  Ok(html(status, body))
}

/// Renders the onboarding form
pub fn render_onboarding_form(
  templates: &TemplateEngine,
  values: &FormData,
  errors: &FieldErrors,
  status: StatusCode,
) -> Result<HttpResponse, ApiError> {
  let mut context = tera::Context::new();
  context.insert("title", "Onboarding");
  context.insert("values", values);
  context.insert("errors", errors);

  let body = templates.render("onboarding.html.tera", &context)?;
  Ok(html(status, body))
}
