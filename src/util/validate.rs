//! Argument validation shared by the store and the transactions.

use chrono::NaiveDate;

use crate::core::EngineError;

/// Check that a meter-like value is finite and non-negative.
///
/// `field` names the argument in the error message.
pub fn check_meter(field: &str, value: f64) -> Result<f64, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::InvalidArgument(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(value)
}

/// Same as [`check_meter`] for an optional value; `None` passes through.
pub fn check_optional_meter(field: &str, value: Option<f64>) -> Result<Option<f64>, EngineError> {
    value.map(|v| check_meter(field, v)).transpose()
}

/// Validate a list of schedule milestones and return it sorted and de-duplicated.
pub fn normalize_milestones(milestones: &[f64]) -> Result<Vec<f64>, EngineError> {
    let mut out = milestones
        .iter()
        .map(|m| check_meter("schedule milestone", *m))
        .collect::<Result<Vec<_>, _>>()?;
    out.sort_by(f64::total_cmp);
    out.dedup();
    Ok(out)
}

/// Parse a calendar date written as `YYYY-MM-DD`.
pub fn parse_service_date(date: &str) -> Result<NaiveDate, EngineError> {
    let invalid = || EngineError::InvalidArgument(format!("service date `{date}` is not YYYY-MM-DD"));
    // chrono accepts unpadded fields; the wire format does not.
    if date.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())
}
