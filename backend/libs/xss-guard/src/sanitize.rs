//! `SanitizeStrings` capability for request DTOs
//!
//! Each request DTO implements `sanitize_strings` over its top-level
//! string fields; no runtime type inspection is involved. Numeric,
//! boolean, datetime and enum fields are not touched, and nested
//! structures are deliberately not recursed into: sanitization applies
//! to the fields a handler binds directly.

use crate::sanitizer::sanitize_with_report;

/// Sanitize every top-level string field in place.
///
/// Implementations call [`sanitize_field`] / [`sanitize_opt`] once per
/// `String` / `Option<String>` field and leave everything else alone.
pub trait SanitizeStrings {
    fn sanitize_strings(&mut self);
}

/// Sanitize one owned string field in place. Emits a security-audit log
/// entry when the raw value carried an injection signature.
pub fn sanitize_field(field: &mut String) {
    if field.is_empty() {
        return;
    }
    let outcome = sanitize_with_report(field);
    if outcome.had_matches {
        tracing::warn!("injection signature sanitized from request field");
    }
    *field = outcome.value;
}

/// Sanitize an optional string field in place. `None` is a no-op.
pub fn sanitize_opt(field: &mut Option<String>) {
    if let Some(value) = field.as_mut() {
        sanitize_field(value);
    }
}
