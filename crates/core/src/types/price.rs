//! Order totals as reported by webhook payloads.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is not a decimal number.
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    /// The currency code is not three ASCII letters.
    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),
}

/// ISO 4217 currency code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a currency code, accepting any case.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::InvalidCurrency` unless the input is exactly three
    /// ASCII letters.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let code = s.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(PriceError::InvalidCurrency(s.to_owned()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A price with currency information.
///
/// Displays as `"<amount> <currency>"`, exactly as the platform sent the
/// amount (`"10.00"` stays `"10.00"`). Amounts that would be rewritten by
/// parsing, such as `"1_000"` or `"+5"`, are rejected.
///
/// ```
/// use order_sync_core::Price;
///
/// let price = Price::parse("10.00", "usd").unwrap();
/// assert_eq!(price.to_string(), "10.00 USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse an amount string and a currency code.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if either part is malformed, or if the amount is
    /// not already in canonical decimal form.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let raw = amount.trim();
        let amount = Decimal::from_str(raw)
            .ok()
            .filter(|parsed| parsed.to_string() == raw)
            .ok_or_else(|| PriceError::InvalidAmount(amount.to_owned()))?;
        let currency_code = CurrencyCode::parse(currency_code)?;
        Ok(Self::new(amount, currency_code))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency_code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_scale() {
        assert_eq!(Price::parse("10.00", "USD").unwrap().to_string(), "10.00 USD");
        assert_eq!(Price::parse("7", "eur").unwrap().to_string(), "7 EUR");
        assert_eq!(
            Price::parse("1234.5", "CAD").unwrap().to_string(),
            "1234.5 CAD"
        );
    }

    #[test]
    fn test_invalid_amount() {
        assert_eq!(
            Price::parse("ten", "USD"),
            Err(PriceError::InvalidAmount("ten".to_string()))
        );
        assert!(Price::parse("", "USD").is_err());
    }

    #[test]
    fn test_rejects_amounts_parsing_would_rewrite() {
        for input in ["1_000", "+5", "010.00", ".5"] {
            assert_eq!(
                Price::parse(input, "USD"),
                Err(PriceError::InvalidAmount(input.to_string())),
                "{input} should be rejected"
            );
        }
        assert_eq!(
            Price::parse(" 598.94 ", "usd").unwrap().to_string(),
            "598.94 USD"
        );
        assert_eq!(Price::parse("-3.50", "USD").unwrap().to_string(), "-3.50 USD");
    }

    #[test]
    fn test_invalid_currency() {
        assert!(matches!(
            Price::parse("1.00", "US"),
            Err(PriceError::InvalidCurrency(_))
        ));
        assert!(matches!(
            Price::parse("1.00", "U$D"),
            Err(PriceError::InvalidCurrency(_))
        ));
    }
}
