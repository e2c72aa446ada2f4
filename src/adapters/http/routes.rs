use actix_files as fs;
use actix_governor::{Governor, GovernorConfig, GovernorConfigBuilder};
use actix_web::web;
use std::sync::Arc;

use crate::application::auth::{GetCurrentUserUseCase, OnboardUserUseCase};
use crate::application::invoice::{
  CreateInvoiceUseCase, DeleteInvoiceUseCase, EditInvoiceUseCase, GetDashboardUseCase,
  GetInvoiceUseCase, InvoiceListViewUseCase, ListInvoicesUseCase, MarkInvoicePaidUseCase,
  RenderInvoicePdfUseCase, SendInvoiceReminderUseCase,
};

use super::errors::ApiError;
use super::handlers::{WebSettings, actions, api, pages};
use super::templates::TemplateEngine;

const STATIC_DIR: &str = "./static";

/// Everything the routes hand to their handlers
#[derive(Clone)]
pub struct HttpDependencies {
  pub templates: TemplateEngine,
  pub sign_in_url: String,
  /// Reminder emails allowed per client IP and minute
  pub reminder_rate_per_minute: u32,
  pub get_current_user: Arc<GetCurrentUserUseCase>,
  pub onboard_user: Arc<OnboardUserUseCase>,
  pub get_dashboard: Arc<GetDashboardUseCase>,
  pub invoice_list_view: Arc<InvoiceListViewUseCase>,
  pub get_invoice: Arc<GetInvoiceUseCase>,
  pub create_invoice: Arc<CreateInvoiceUseCase>,
  pub edit_invoice: Arc<EditInvoiceUseCase>,
  pub delete_invoice: Arc<DeleteInvoiceUseCase>,
  pub mark_invoice_paid: Arc<MarkInvoicePaidUseCase>,
  pub list_invoices: Arc<ListInvoicesUseCase>,
  pub render_invoice_pdf: Arc<RenderInvoicePdfUseCase>,
  pub send_invoice_reminder: Arc<SendInvoiceReminderUseCase>,
}

/// Mounts pages, form actions, the JSON API and the operational endpoints.
///
/// Expects the session middleware to wrap the app, every handler reads the
/// caller from the request's `AuthContext`.
///
/// # Routes
///
/// - GET /dashboard, /onboarding, /dashboard/invoices, /dashboard/invoices/create,
///   /dashboard/invoices/{id}/edit - HTML pages
/// - POST /onboarding, /dashboard/invoices, /dashboard/invoices/edit,
///   /dashboard/invoices/{id}/delete, /dashboard/invoices/{id}/paid - form actions
/// - GET /api/invoice/{id} - invoice PDF, no session needed
/// - GET /api/invoice - invoice list as JSON
/// - POST /api/email/{id} - payment reminder, rate limited per client IP
/// - GET /health, GET /metrics
/// - GET /static/* - stylesheets
pub fn configure_routes(cfg: &mut web::ServiceConfig, deps: HttpDependencies) {
  let reminder_limit = GovernorConfigBuilder::default()
    .milliseconds_per_request(60_000 / u64::from(deps.reminder_rate_per_minute.max(1)))
    .burst_size(deps.reminder_rate_per_minute.max(1))
    .finish()
    .unwrap_or_else(|| {
      tracing::warn!("Invalid reminder rate limit, falling back to defaults");
      GovernorConfig::default()
    });

  // Every path parameter is an invoice id; one that is not a UUID names no invoice
  cfg
    .app_data(
      web::PathConfig::default().error_handler(|_, _| ApiError::InvoiceNotFound.into()),
    )
    .app_data(web::Data::new(deps.templates))
    .app_data(web::Data::new(WebSettings {
      sign_in_url: deps.sign_in_url,
    }))
    .app_data(web::Data::new(deps.onboard_user))
    .app_data(web::Data::new(deps.get_dashboard))
    .app_data(web::Data::new(deps.invoice_list_view))
    .app_data(web::Data::new(deps.get_invoice))
    .app_data(web::Data::new(deps.create_invoice))
    .app_data(web::Data::new(deps.edit_invoice))
    .app_data(web::Data::new(deps.delete_invoice))
    .app_data(web::Data::new(deps.mark_invoice_paid))
    .app_data(web::Data::new(deps.list_invoices))
    .app_data(web::Data::new(deps.render_invoice_pdf))
    .app_data(web::Data::new(deps.send_invoice_reminder));

  // Pages
  cfg
    .route("/", web::get().to(pages::index))
    .route("/dashboard", web::get().to(pages::dashboard_page))
    .route("/onboarding", web::get().to(pages::onboarding_page))
    .route("/onboarding", web::post().to(actions::onboard))
    .route("/dashboard/invoices", web::get().to(pages::invoices_page))
    .route("/dashboard/invoices", web::post().to(actions::create_invoice))
    .route(
      "/dashboard/invoices/create",
      web::get().to(pages::create_invoice_page),
    )
    .route(
      "/dashboard/invoices/edit",
      web::post().to(actions::edit_invoice),
    )
    .route(
      "/dashboard/invoices/{id}/edit",
      web::get().to(pages::edit_invoice_page),
    )
    .route(
      "/dashboard/invoices/{id}/delete",
      web::post().to(actions::delete_invoice),
    )
    .route(
      "/dashboard/invoices/{id}/paid",
      web::post().to(actions::mark_invoice_paid),
    );

  // API
  cfg
    .route("/api/invoice", web::get().to(api::list_invoices))
    .route("/api/invoice/{invoice_id}", web::get().to(api::invoice_pdf))
    .service(
      web::resource("/api/email/{invoice_id}")
        .wrap(Governor::new(&reminder_limit))
        .route(web::post().to(api::send_reminder)),
    )
    .route("/health", web::get().to(api::health))
    .route("/metrics", web::get().to(api::metrics));

  cfg.service(fs::Files::new("/static", STATIC_DIR));
}
