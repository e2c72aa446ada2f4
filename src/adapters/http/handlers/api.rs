use actix_web::{
  HttpRequest, HttpResponse,
  http::header::{ContentDisposition, DispositionParam, DispositionType},
  web,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::http::dtos::{HealthResponse, SuccessResponse};
use crate::adapters::http::errors::ApiError;
use crate::adapters::http::middleware::AuthContextExt;
use crate::application::invoice::{
  ListInvoicesUseCase, RenderInvoicePdfUseCase, SendInvoiceReminderUseCase,
};
use crate::infrastructure::metrics;

// GET /api/invoice/{invoice_id} - Public download link for the invoice PDF
pub async fn invoice_pdf(
  path: web::Path<Uuid>,
  render_pdf_use_case: web::Data<Arc<RenderInvoicePdfUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let invoice_id = path.into_inner();
  let rendered = render_pdf_use_case
    .execute(invoice_id)
    .await
    .map_err(|e| ApiError::from(e).or_internal("Error generating invoice PDF"))?;

  Ok(
    HttpResponse::Ok()
      .content_type("application/pdf")
      .insert_header(ContentDisposition {
        disposition: DispositionType::Inline,
        parameters: vec![DispositionParam::Filename(rendered.filename)],
      })
      .body(rendered.content),
  )
}

// GET /api/invoice - Invoices of the caller, newest first
pub async fn list_invoices(
  req: HttpRequest,
  list_invoices_use_case: web::Data<Arc<ListInvoicesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let invoices = list_invoices_use_case
    .execute(&req.auth_context())
    .await
    .map_err(|e| ApiError::from(e).or_internal("Error fetching invoices"))?;

  Ok(HttpResponse::Ok().json(invoices))
}

// POST /api/email/{invoice_id} - Send a payment reminder to the client
pub async fn send_reminder(
  req: HttpRequest,
  path: web::Path<Uuid>,
  send_reminder_use_case: web::Data<Arc<SendInvoiceReminderUseCase>>,
) -> Result<HttpResponse, ApiError> {
  send_reminder_use_case
    .execute(&req.auth_context(), path.into_inner())
    .await
    .map_err(|e| ApiError::from(e).or_internal("Failed to send Email reminder"))?;

  Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

// GET /health
pub async fn health() -> HttpResponse {
  HttpResponse::Ok().json(HealthResponse { status: "ok" })
}

// GET /metrics - Prometheus text exposition
pub async fn metrics() -> Result<HttpResponse, ApiError> {
  let body =
    metrics::encode().map_err(|e| ApiError::internal(format!("Metrics encoding: {}", e)))?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/plain; version=0.0.4")
      .body(body),
  )
}

#[cfg(test)]
mod tests {
  use crate::adapters::http::handlers::test_support::{TestWorld, onboarded_user};
  use crate::domain::auth::User;
  use crate::domain::invoice::Invoice;
  use crate::domain::invoice::entities::fixtures::draft;
  use crate::testing::RecordingEmailSender;
  use actix_web::{App, http::StatusCode, http::header, test};
  use chrono::{TimeZone, Utc};
  use std::net::SocketAddr;
  use uuid::Uuid;

  fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
  }

  fn peer() -> SocketAddr {
    "127.0.0.1:41000".parse().unwrap()
  }

  #[actix_web::test]
  async fn test_invoice_pdf_is_served_inline() {
    let world = TestWorld::new();
    let owner = User::new("ada@example.com".to_string());
    let invoice = world.invoices.insert(Invoice::new(owner.id, draft()));
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri(&format!("/api/invoice/{}", invoice.id))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers().get(header::CONTENT_TYPE).unwrap(),
      "application/pdf"
    );
    let disposition = resp
      .headers()
      .get(header::CONTENT_DISPOSITION)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(disposition.starts_with("inline"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF-"));
  }

  #[actix_web::test]
  async fn test_unknown_invoice_pdf_is_not_found() {
    let world = TestWorld::new();
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri(&format!("/api/invoice/{}", Uuid::new_v4()))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"error":"Invoice not found"}"#);
  }

  #[actix_web::test]
  async fn test_malformed_invoice_id_is_not_found() {
    let world = TestWorld::new();
    let (_, token) = world.sign_in(onboarded_user("ada@example.com"), 25);
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri("/api/invoice/not-a-uuid")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"error":"Invoice not found"}"#);

    let req = test::TestRequest::post()
      .uri("/api/email/not-a-uuid")
      .insert_header(bearer(&token))
      .peer_addr(peer())
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"error":"Invoice not found"}"#);
  }

  #[actix_web::test]
  async fn test_list_invoices_newest_first() {
    let world = TestWorld::new();
    let (user, token) = world.sign_in(onboarded_user("ada@example.com"), 20);

    let mut older = Invoice::new(user.id, draft());
    older.invoice_number = 1;
    older.created_at = Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap();
    let mut newer = Invoice::new(user.id, draft());
    newer.invoice_number = 2;
    newer.created_at = Utc.with_ymd_and_hms(2025, 2, 1, 8, 30, 0).unwrap();
    world.invoices.insert(older);
    world.invoices.insert(newer);
    world
      .invoices
      .insert(Invoice::new(Uuid::new_v4(), draft()));

    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;
    let req = test::TestRequest::get()
      .uri("/api/invoice")
      .insert_header(bearer(&token))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["invoiceNumber"], 2);
    assert_eq!(rows[0]["createdAt"], "2025-02-01T08:30:00.000Z");
    assert_eq!(rows[1]["createdAt"], "2025-01-05T10:00:00.000Z");
    assert_eq!(rows[1]["clientName"], "Grace Ltd");
    assert_eq!(rows[1]["status"], "PENDING");
    assert_eq!(rows[1]["currency"], "USD");
  }

  #[actix_web::test]
  async fn test_list_invoices_requires_session() {
    let world = TestWorld::new();
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get().uri("/api/invoice").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"error":"Unauthorized"}"#);
  }

  #[actix_web::test]
  async fn test_list_invoices_store_failure() {
    let world = TestWorld::new();
    let (_, token) = world.sign_in(onboarded_user("ada@example.com"), 21);
    world.invoices.fail_queries();
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri("/api/invoice")
      .insert_header(bearer(&token))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"error":"Error fetching invoices"}"#);
  }

  #[actix_web::test]
  async fn test_list_invoices_session_store_failure() {
    let world = TestWorld::new();
    let (_, token) = world.sign_in(onboarded_user("ada@example.com"), 26);
    world.sessions.fail_lookups();
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get()
      .uri("/api/invoice")
      .insert_header(bearer(&token))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"error":"Error fetching invoices"}"#);
  }

  #[actix_web::test]
  async fn test_send_reminder() {
    let world = TestWorld::new();
    let (user, token) = world.sign_in(onboarded_user("ada@example.com"), 22);
    let invoice = world.invoices.insert(Invoice::new(user.id, draft()));
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::post()
      .uri(&format!("/api/email/{}", invoice.id))
      .insert_header(bearer(&token))
      .peer_addr(peer())
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"success":true}"#);
    assert_eq!(world.sender.sent().len(), 1);
  }

  #[actix_web::test]
  async fn test_send_reminder_for_foreign_invoice_is_not_found() {
    let world = TestWorld::new();
    let (_, token) = world.sign_in(onboarded_user("ada@example.com"), 23);
    let invoice = world
      .invoices
      .insert(Invoice::new(Uuid::new_v4(), draft()));
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::post()
      .uri(&format!("/api/email/{}", invoice.id))
      .insert_header(bearer(&token))
      .peer_addr(peer())
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(world.sender.sent().is_empty());
  }

  #[actix_web::test]
  async fn test_send_reminder_provider_failure() {
    let world = TestWorld::with_sender(RecordingEmailSender::failing());
    let (user, token) = world.sign_in(onboarded_user("ada@example.com"), 24);
    let invoice = world.invoices.insert(Invoice::new(user.id, draft()));
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::post()
      .uri(&format!("/api/email/{}", invoice.id))
      .insert_header(bearer(&token))
      .peer_addr(peer())
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], br#"{"error":"Failed to send Email reminder"}"#);
  }

  #[actix_web::test]
  async fn test_health_and_metrics() {
    let world = TestWorld::new();
    let app =
      test::init_service(App::new().wrap(world.session()).configure(world.routes())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    crate::infrastructure::metrics::PDFS_RENDERED.get();
    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("invoicer_pdfs_rendered_total"));
  }
}
