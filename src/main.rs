use actix_web::{App, HttpServer, middleware::Logger};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoicer::{
  adapters::http::{
    DEFAULT_TEMPLATE_GLOB, HttpDependencies, RequestIdMiddleware, SessionMiddleware,
    TemplateEngine, configure_routes,
  },
  application::auth::{GetCurrentUserUseCase, OnboardUserUseCase},
  application::invoice::{
    CreateInvoiceUseCase, DeleteInvoiceUseCase, EditInvoiceUseCase, GetDashboardUseCase,
    GetInvoiceUseCase, InvoiceLinkBuilder, InvoiceListViewUseCase, InvoiceMailer,
    ListInvoicesUseCase, MarkInvoicePaidUseCase, RenderInvoicePdfUseCase,
    SendInvoiceReminderUseCase,
  },
  domain::auth::AuthService,
  domain::invoice::{InvoiceListCache, InvoiceService},
  domain::notification::{EmailSender, Mailbox},
  infrastructure::{
    cache::{MemoryInvoiceListCache, RedisInvoiceListCache},
    config::{CacheBackend, Config, EmailProvider, RedisConfig},
    email::{LogEmailSender, MailtrapEmailSender, NotificationDispatcher},
    pdf::PrintPdfInvoiceRenderer,
    persistence::postgres::{
      PostgresInvoiceRepository, PostgresSessionRepository, PostgresUserRepository,
    },
  },
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "invoicer=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting Invoicer");

  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  // Set up database connection pool with timeout
  tracing::info!("Connecting to database");
  let db_pool = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(config.database.max_connections)
      .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
      .connect(&config.database.url),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      config.database.connect_timeout_seconds
    );
    anyhow::anyhow!(
      "Database connection timed out after {} seconds",
      config.database.connect_timeout_seconds
    )
  })?
  .context("Could not connect to database")?;
  tracing::info!("Database connection pool created");

  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("Failed to run database migrations")?;
  tracing::info!("Database migrations completed");

  let view_ttl = Duration::from_secs(config.cache.view_ttl_seconds);
  let list_cache: Arc<dyn InvoiceListCache> = match config.cache.backend {
    CacheBackend::Redis => {
      let manager = connect_redis(&config.redis).await?;
      Arc::new(RedisInvoiceListCache::new(manager, view_ttl))
    }
    CacheBackend::Memory => {
      tracing::info!("Using in-process invoice list cache");
      Arc::new(MemoryInvoiceListCache::new(view_ttl))
    }
  };

  let email_sender: Arc<dyn EmailSender> = match config.email.provider {
    EmailProvider::Mailtrap => Arc::new(
      MailtrapEmailSender::new(
        config.email.api_url.clone(),
        config.email.api_token.clone(),
        config.email.templates.clone(),
        Duration::from_secs(config.email.request_timeout_seconds),
      )
      .context("Invalid email provider configuration")?,
    ),
    EmailProvider::Log => {
      tracing::warn!("Email provider is `log`, emails will not be delivered");
      Arc::new(LogEmailSender)
    }
  };

  let shutdown = CancellationToken::new();
  let (dispatcher, dispatcher_handle) = NotificationDispatcher::start(
    email_sender.clone(),
    config.email.queue_capacity,
    Duration::from_secs(config.email.retry_max_elapsed_seconds),
    shutdown.clone(),
  );

  // Repositories
  let user_repo = Arc::new(PostgresUserRepository::new(db_pool.clone()));
  let session_repo = Arc::new(PostgresSessionRepository::new(db_pool.clone()));
  let invoice_repo = Arc::new(PostgresInvoiceRepository::new(db_pool.clone()));

  // Domain services
  let auth_service = Arc::new(AuthService::new(user_repo, session_repo));
  let invoice_service = Arc::new(InvoiceService::new(invoice_repo));

  let mailer = Arc::new(InvoiceMailer::new(
    Mailbox::named(
      config.email.sender_email.clone(),
      config.email.sender_name.clone(),
    ),
    config.email.support_email.clone(),
    config.email.recipient_override.clone(),
    InvoiceLinkBuilder::for_environment(
      config.app.is_production(),
      &config.app.local_base_url,
      &config.app.production_url,
    ),
  ));
  let publisher = Arc::new(dispatcher);

  let templates =
    TemplateEngine::new(DEFAULT_TEMPLATE_GLOB).context("Failed to load templates")?;

  let deps = HttpDependencies {
    templates,
    sign_in_url: config.app.sign_in_url.clone(),
    reminder_rate_per_minute: config.server.reminder_rate_per_minute,
    get_current_user: Arc::new(GetCurrentUserUseCase::new(auth_service.clone())),
    onboard_user: Arc::new(OnboardUserUseCase::new(auth_service)),
    get_dashboard: Arc::new(GetDashboardUseCase::new(invoice_service.clone())),
    invoice_list_view: Arc::new(InvoiceListViewUseCase::new(
      invoice_service.clone(),
      list_cache.clone(),
    )),
    get_invoice: Arc::new(GetInvoiceUseCase::new(invoice_service.clone())),
    create_invoice: Arc::new(CreateInvoiceUseCase::new(
      invoice_service.clone(),
      publisher.clone(),
      list_cache.clone(),
      mailer.clone(),
    )),
    edit_invoice: Arc::new(EditInvoiceUseCase::new(
      invoice_service.clone(),
      publisher,
      mailer.clone(),
    )),
    delete_invoice: Arc::new(DeleteInvoiceUseCase::new(
      invoice_service.clone(),
      list_cache.clone(),
    )),
    mark_invoice_paid: Arc::new(MarkInvoicePaidUseCase::new(
      invoice_service.clone(),
      list_cache,
    )),
    list_invoices: Arc::new(ListInvoicesUseCase::new(invoice_service.clone())),
    render_invoice_pdf: Arc::new(RenderInvoicePdfUseCase::new(
      invoice_service.clone(),
      Arc::new(PrintPdfInvoiceRenderer::new()),
    )),
    send_invoice_reminder: Arc::new(SendInvoiceReminderUseCase::new(
      invoice_service,
      email_sender,
      mailer,
    )),
  };

  let server_host = config.server.host.clone();
  let server_port = config.server.port;
  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    let deps = deps.clone();
    App::new()
      .wrap(SessionMiddleware::new(deps.get_current_user.clone()))
      .wrap(Logger::default())
      .wrap(RequestIdMiddleware::new())
      .configure(move |cfg| configure_routes(cfg, deps))
  })
  .bind((server_host.as_str(), server_port))
  .with_context(|| format!("Failed to bind {}:{}", server_host, server_port))?
  .run()
  .await?;

  // Flush queued emails before exiting
  tracing::info!("HTTP server stopped, draining email queue");
  shutdown.cancel();
  if let Err(e) = dispatcher_handle.await {
    tracing::error!("Email delivery worker panicked: {}", e);
  }

  Ok(())
}

async fn connect_redis(config: &RedisConfig) -> anyhow::Result<redis::aio::ConnectionManager> {
  tracing::info!("Connecting to Redis");
  let client = redis::Client::open(config.url.clone()).context("Invalid Redis URL")?;

  let manager = tokio::time::timeout(
    Duration::from_secs(config.connect_timeout_seconds),
    client.get_connection_manager(),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Redis connection timed out after {} seconds. Is Redis running?",
      config.connect_timeout_seconds
    );
    anyhow::anyhow!(
      "Redis connection timed out after {} seconds",
      config.connect_timeout_seconds
    )
  })?
  .context("Failed to connect to Redis")?;

  tracing::info!("Redis connection established");
  Ok(manager)
}
