use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tera::Tera;

use crate::domain::invoice::{Currency, format_currency};

pub const DEFAULT_TEMPLATE_GLOB: &str = "templates/**/*.html.tera";

/// Template engine wrapper for rendering HTML templates
#[derive(Clone)]
pub struct TemplateEngine {
  tera: Arc<Tera>,
}

impl TemplateEngine {
  /// Loads every template matching `glob` and registers the invoice filters
  pub fn new(glob: &str) -> Result<Self, tera::Error> {
    let mut tera = Tera::new(glob)?;
    tera.autoescape_on(vec!["html.tera", ".html"]);
    tera.register_filter("currency", currency_filter);

    Ok(Self {
      tera: Arc::new(tera),
    })
  }

  /// Render a template with the given context
  pub fn render(&self, template: &str, context: &tera::Context) -> Result<String, tera::Error> {
    self.tera.render(template, context)
  }
}

/// `{{ amount | currency(code="EUR") }}`
fn currency_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
  let code = args
    .get("code")
    .and_then(Value::as_str)
    .ok_or_else(|| tera::Error::msg("currency filter expects a `code` argument"))?;
  let currency = Currency::from_str(code).map_err(|e| tera::Error::msg(e.to_string()))?;

  let amount = match value {
    Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
    Value::String(s) => Decimal::from_str(s).ok(),
    _ => None,
  }
  .ok_or_else(|| tera::Error::msg(format!("currency filter cannot format {}", value)))?;

  Ok(Value::String(format_currency(amount.round_dp(2), currency)))
}
