use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::http::handlers::{
  InvoiceFormMode, WebSettings, html, render_invoice_form, render_onboarding_form, see_other,
};
use crate::adapters::http::middleware::AuthContextExt;
use crate::adapters::http::{errors::ApiError, templates::TemplateEngine};
use crate::application::Route;
use crate::application::forms::{FieldErrors, FormData};
use crate::application::invoice::{GetDashboardUseCase, GetInvoiceUseCase, InvoiceListViewUseCase};
use crate::domain::invoice::{Currency, DashboardStats, format_currency};

const DEFAULT_DUE_IN_DAYS: &str = "30";

#[derive(Serialize)]
struct CurrencyTotal {
  currency: &'static str,
  amount: String,
}

#[derive(Serialize)]
struct StatsView {
  total_invoices: usize,
  paid_invoices: usize,
  pending_invoices: usize,
  paid_revenue: Vec<CurrencyTotal>,
  outstanding: Vec<CurrencyTotal>,
}

impl From<&DashboardStats> for StatsView {
  fn from(stats: &DashboardStats) -> Self {
    let totals = |map: &BTreeMap<Currency, Decimal>| -> Vec<CurrencyTotal> {
      map
        .iter()
        .map(|(currency, amount)| CurrencyTotal {
          currency: currency.as_str(),
          amount: format_currency(*amount, *currency),
        })
        .collect()
    };

    Self {
      total_invoices: stats.total_invoices,
      paid_invoices: stats.paid_invoices,
      pending_invoices: stats.pending_invoices,
      paid_revenue: totals(&stats.paid_revenue),
      outstanding: totals(&stats.outstanding),
    }
  }
}

// GET / - Land on the dashboard
pub async fn index() -> HttpResponse {
  see_other(Route::Dashboard.path())
}

// GET /dashboard
pub async fn dashboard_page(
  req: HttpRequest,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<WebSettings>,
  get_dashboard_use_case: web::Data<Arc<GetDashboardUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let ctx = req.auth_context();
  let Some(user) = ctx.resolve()? else {
    return Ok(see_other(&settings.sign_in_url));
  };
  if !user.is_onboarded() {
    return Ok(see_other(Route::Onboarding.path()));
  }

  let dashboard = get_dashboard_use_case.execute(&ctx).await?;

  let mut context = tera::Context::new();
  context.insert("title", "Dashboard");
  context.insert("user", &dashboard.user);
  context.insert("display_name", &dashboard.user.display_name());
  context.insert("stats", &StatsView::from(&dashboard.stats));
  context.insert("invoices", &dashboard.recent_invoices);

  let body = templates.render("dashboard.html.tera", &context)?;
  Ok(html(StatusCode::OK, body))
}

// GET /onboarding
pub async fn onboarding_page(
  req: HttpRequest,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<WebSettings>,
) -> Result<HttpResponse, ApiError> {
  let ctx = req.auth_context();
  let Some(user) = ctx.resolve()? else {
    return Ok(see_other(&settings.sign_in_url));
  };

  let mut values = FormData::new();
  for (field, value) in [
    ("firstName", &user.first_name),
    ("lastName", &user.last_name),
    ("address", &user.address),
  ] {
    if let Some(value) = value {
      values.insert(field.to_string(), value.clone());
    }
  }

  render_onboarding_form(&templates, &values, &FieldErrors::new(), StatusCode::OK)
}

// GET /dashboard/invoices
pub async fn invoices_page(
  req: HttpRequest,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<WebSettings>,
  list_view_use_case: web::Data<Arc<InvoiceListViewUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let ctx = req.auth_context();
  if ctx.resolve()?.is_none() {
    return Ok(see_other(&settings.sign_in_url));
  }

  let invoices = list_view_use_case.execute(&ctx).await?;

  let mut context = tera::Context::new();
  context.insert("title", "Invoices");
  context.insert("invoices", &invoices);

  let body = templates.render("invoices/list.html.tera", &context)?;
  Ok(html(StatusCode::OK, body))
}

// GET /dashboard/invoices/create
pub async fn create_invoice_page(
  req: HttpRequest,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<WebSettings>,
) -> Result<HttpResponse, ApiError> {
  let ctx = req.auth_context();
  let Some(user) = ctx.resolve()? else {
    return Ok(see_other(&settings.sign_in_url));
  };

  let mut values: FormData = [
    ("currency", Currency::USD.as_str().to_string()),
    ("date", Utc::now().date_naive().format("%Y-%m-%d").to_string()),
    ("dueDate", DEFAULT_DUE_IN_DAYS.to_string()),
    ("invoiceItemQuantity", "1".to_string()),
    ("status", "PENDING".to_string()),
    ("fromName", user.display_name()),
    ("fromEmail", user.email.clone()),
  ]
  .into_iter()
  .map(|(k, v)| (k.to_string(), v))
  .collect();
  if let Some(address) = &user.address {
    values.insert("fromAddress".to_string(), address.clone());
  }

  render_invoice_form(
    &templates,
    InvoiceFormMode::Create,
    &values,
    &FieldErrors::new(),
    StatusCode::OK,
  )
}

// GET /dashboard/invoices/{id}/edit
pub async fn edit_invoice_page(
  req: HttpRequest,
  path: web::Path<Uuid>,
  templates: web::Data<TemplateEngine>,
  settings: web::Data<WebSettings>,
  get_invoice_use_case: web::Data<Arc<GetInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let ctx = req.auth_context();
  if ctx.resolve()?.is_none() {
    return Ok(see_other(&settings.sign_in_url));
  }

  let invoice = get_invoice_use_case.execute(&ctx, path.into_inner()).await?;
  let values: FormData = invoice
    .form_values()
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

  render_invoice_form(
    &templates,
    InvoiceFormMode::Edit,
    &values,
    &FieldErrors::new(),
    StatusCode::OK,
  )
}

#[cfg(test)]
mod tests {
  use crate::adapters::http::handlers::test_support::{SIGN_IN_URL, TestWorld, onboarded_user};
  use crate::domain::auth::User;
  use crate::domain::invoice::Invoice;
  use crate::domain::invoice::entities::fixtures::draft;
  use actix_web::{App, http::StatusCode, http::header, test};

  fn cookie(token: &str) -> (header::HeaderName, String) {
    (header::COOKIE, format!("session_token={}", token))
  }

  #[actix_web::test]
  async fn test_dashboard_redirects_anonymous_to_sign_in() {
    let world = TestWorld::new();
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get().uri("/dashboard").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), SIGN_IN_URL);
  }

  #[actix_web::test]
  async fn test_dashboard_sends_new_users_to_onboarding() {
    let world = TestWorld::new();
    let (_, token) = world.sign_in(User::new("new@example.com".to_string()), 1);
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri("/dashboard")
      .insert_header(cookie(&token))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/onboarding");
  }

  #[actix_web::test]
  async fn test_dashboard_renders_for_onboarded_user() {
    let world = TestWorld::new();
    let (user, token) = world.sign_in(onboarded_user("ada@example.com"), 2);
    world.invoices.insert(Invoice::new(user.id, draft()));
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri("/dashboard")
      .insert_header(cookie(&token))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("Grace Ltd"));
  }

  #[actix_web::test]
  async fn test_edit_page_is_prefilled() {
    let world = TestWorld::new();
    let (user, token) = world.sign_in(onboarded_user("ada@example.com"), 3);
    let invoice = world.invoices.insert(Invoice::new(user.id, draft()));
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri(&format!("/dashboard/invoices/{}/edit", invoice.id))
      .insert_header(cookie(&token))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(&invoice.id.to_string()));
    assert!(body.contains(&invoice.client_email));
  }

  #[actix_web::test]
  async fn test_edit_page_of_foreign_invoice_is_not_found() {
    let world = TestWorld::new();
    let (_, token) = world.sign_in(onboarded_user("ada@example.com"), 4);
    let stranger = User::new("eve@example.com".to_string());
    let invoice = world.invoices.insert(Invoice::new(stranger.id, draft()));
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri(&format!("/dashboard/invoices/{}/edit", invoice.id))
      .insert_header(cookie(&token))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
