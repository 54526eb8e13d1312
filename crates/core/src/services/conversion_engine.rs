use crate::errors::CoreError;
use crate::models::conversion::{ConversionRequest, ConversionResult};
use crate::models::rates::RateSnapshot;

/// Converts amounts between any two currencies present in a rate snapshot.
///
/// Snapshot rates are "units of currency per 1 unit of base", so the amount
/// is first divided into base units and then multiplied out into the target:
///
/// `converted = (amount / rate[from]) * rate[to]`
///
/// No rounding happens here; 2-decimal formatting is a display concern.
pub struct ConversionEngine;

impl ConversionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Convert `request.amount` of `request.from_code` into `request.to_code`.
    pub fn convert(
        &self,
        snapshot: Option<&RateSnapshot>,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, CoreError> {
        let snapshot = snapshot.ok_or_else(|| {
            CoreError::SnapshotUnavailable("exchange rates have not been fetched yet".into())
        })?;

        let amount = request.amount;
        if !amount.is_finite() {
            return Err(CoreError::InvalidAmount(format!("{amount} is not a finite number")));
        }
        if amount < 0.0 {
            return Err(CoreError::InvalidAmount(format!("{amount} is negative")));
        }

        let from = request.from_code.to_uppercase();
        let to = request.to_code.to_uppercase();

        let from_rate = snapshot
            .rate(&from)
            .ok_or_else(|| CoreError::UnknownCurrency(from.clone()))?;
        let to_rate = snapshot
            .rate(&to)
            .ok_or_else(|| CoreError::UnknownCurrency(to.clone()))?;

        let converted_amount = (amount / from_rate) * to_rate;

        // Guards against overflow on extreme inputs (e.g. f64::MAX with a large rate ratio).
        if !converted_amount.is_finite() {
            return Err(CoreError::InvalidAmount(format!(
                "{amount} {from} is too large to convert to {to}"
            )));
        }

        Ok(ConversionResult {
            converted_amount,
            to_code: to,
        })
    }
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new()
    }
}
