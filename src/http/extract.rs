//! Shared header extraction: every endpoint that authenticates by device
//! fingerprint does it the same way (spec.md §4.4 step 1).

use axum::http::HeaderMap;

use crate::domain::errors::DomainError;

/// Read and validate a 64-hex device-fingerprint header, returning a
/// [`DomainError::ValidationFailed`] (400 per spec.md §7) if it is absent
/// or malformed.
pub fn device_id_header(headers: &HeaderMap, name: &'static str) -> Result<String, DomainError> {
    let value = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.len() == 64 && v.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| DomainError::ValidationFailed(format!("missing or invalid {name} header")))?;
    Ok(value.to_string())
}
