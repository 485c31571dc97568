//! Constraint helpers shared by the entity validators.
//!
//! The declarative rules (lengths, integer ranges, patterns, e-mail, URL, card
//! numbers) are derived with `validator`; what `validator` cannot express on
//! decimals, dates and booleans is collected here through [`Violations`].

use rust_decimal::Decimal;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

pub fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("not_blank", "Value cannot be blank"));
    }
    Ok(())
}

/// At most `integer` digits before and `fraction` digits after the point,
/// ignoring trailing fractional zeros.
pub fn fits_digits(value: Decimal, integer: u32, fraction: u32) -> bool {
    let value = value.normalize();
    let precision = value
        .mantissa()
        .unsigned_abs()
        .checked_ilog10()
        .map_or(1, |log| log + 1);
    let scale = value.scale();
    precision.saturating_sub(scale) <= integer && scale <= fraction
}

/// Accumulates hand-written violations on top of the derived ones.
pub struct Violations(ValidationErrors);

impl Violations {
    pub fn from_derived(result: Result<(), ValidationErrors>) -> Self {
        Self(result.err().unwrap_or_else(ValidationErrors::new))
    }

    pub fn check(&mut self, field: &'static str, ok: bool, code: &'static str, message: &'static str) {
        if !ok {
            self.0.add(field, rule(code, message));
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.errors().is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}
