//! Prometheus counters exposed on `/metrics`

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, TextEncoder, register_int_counter, register_int_counter_vec};

lazy_static! {
  pub static ref INVOICES_CREATED: IntCounter =
    register_int_counter!("invoicer_invoices_created_total", "Invoices created")
      .expect("invoices_created metric could not be registered");
  pub static ref EMAILS_SENT: IntCounterVec = register_int_counter_vec!(
    "invoicer_emails_sent_total",
    "Emails accepted by the provider",
    &["template"]
  )
  .expect("emails_sent metric could not be registered");
  pub static ref EMAILS_FAILED: IntCounterVec = register_int_counter_vec!(
    "invoicer_emails_failed_total",
    "Emails that could not be delivered",
    &["template"]
  )
  .expect("emails_failed metric could not be registered");
  pub static ref EMAILS_DROPPED: IntCounter = register_int_counter!(
    "invoicer_emails_dropped_total",
    "Emails dropped because the delivery queue was full or closed"
  )
  .expect("emails_dropped metric could not be registered");
  pub static ref PDFS_RENDERED: IntCounter =
    register_int_counter!("invoicer_pdfs_rendered_total", "Invoice PDFs rendered")
      .expect("pdfs_rendered metric could not be registered");
}

/// Renders every registered metric in the Prometheus text format
pub fn encode() -> Result<String, prometheus::Error> {
  let encoder = TextEncoder::new();
  let mut buffer = Vec::new();
  encoder.encode(&prometheus::gather(), &mut buffer)?;
  String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
