//! Display formatting for amounts and dates.
//!
//! Amounts follow the conventions of the locale tied to each currency
//! (en-US, de-DE, en-NG) and always carry exactly two fraction digits.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use super::value_objects::Currency;

const NBSP: char = '\u{a0}';

/// Formats `amount` the way a reader of the currency's locale expects it.
///
/// ```
/// use invoicer::domain::invoice::{Currency, format_currency};
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_currency(Decimal::new(123456, 2), Currency::USD), "$1,234.56");
/// ```
pub fn format_currency(amount: Decimal, currency: Currency) -> String {
  let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
  let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
    "-"
  } else {
    ""
  };

  let digits = format!("{:.2}", rounded.abs());
  let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

  let symbol = currency.symbol();
  match currency {
    Currency::EUR => format!("{sign}{},{fraction}{NBSP}{symbol}", group_thousands(integer, '.')),
    Currency::USD | Currency::NGN => {
      format!("{sign}{symbol}{}.{fraction}", group_thousands(integer, ','))
    }
  }
}

fn group_thousands(integer: &str, separator: char) -> String {
  let len = integer.len();
  let mut out = String::with_capacity(len + len / 3);
  for (i, ch) in integer.chars().enumerate() {
    if i > 0 && (len - i) % 3 == 0 {
      out.push(separator);
    }
    out.push(ch);
  }
  out
}

/// Long US date, e.g. `January 5, 2025`.
pub fn format_long_date_us(date: NaiveDate) -> String {
  date.format("%B %-d, %Y").to_string()
}

/// Long Nigerian-English date, e.g. `5 January 2025`.
pub fn format_long_date_ng(date: NaiveDate) -> String {
  date.format("%-d %B %Y").to_string()
}
