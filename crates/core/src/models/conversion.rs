use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A single user-initiated conversion: `amount` of `from_code` into `to_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub from_code: String,
    pub to_code: String,
    pub amount: f64,
}

impl ConversionRequest {
    pub fn new(from_code: impl Into<String>, to_code: impl Into<String>, amount: f64) -> Self {
        Self {
            from_code: from_code.into().to_uppercase(),
            to_code: to_code.into().to_uppercase(),
            amount,
        }
    }

    /// Build a request from the raw amount text typed by the user.
    ///
    /// Empty or non-numeric input is rejected with `InvalidAmount`.
    /// Range checks (negative, non-finite) happen at conversion time.
    pub fn parse(
        from_code: impl Into<String>,
        to_code: impl Into<String>,
        amount_text: &str,
    ) -> Result<Self, CoreError> {
        let trimmed = amount_text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidAmount("please enter an amount".into()));
        }
        let amount: f64 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidAmount(format!("'{trimmed}' is not a number")))?;
        Ok(Self::new(from_code, to_code, amount))
    }
}

/// Outcome of a conversion. `converted_amount` is unrounded;
/// the `Display` impl is the 2-decimal presentation form (e.g. `"90.00 EUR"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub converted_amount: f64,
    pub to_code: String,
}

impl std::fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.converted_amount, self.to_code)
    }
}

/// The currently selected (from, to) currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

impl CurrencyPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into().to_uppercase(),
            to: to.into().to_uppercase(),
        }
    }

    /// The same pair with `from` and `to` exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}
