// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to provider error reasons.
//!
//! This module provides utilities for mapping HTTP status codes from the DNS provider
//! APIs to standardized reason strings. The reasons show up in log lines, in
//! [`ProviderError`](crate::dns_errors::ProviderError) messages and in metric labels.
//!
//! # Usage
//!
//! ```rust
//! use zonesync::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "NotFound");
//!
//! let (reason, message) = map_http_error_to_reason(500);
//! assert_eq!(reason, "ProviderInternalError");
//! ```

/// Request rejected as malformed (400)
pub const REASON_BAD_REQUEST: &str = "BadRequest";

/// Token missing, invalid or lacking permissions (401, 403)
pub const REASON_AUTH_FAILED: &str = "AuthFailed";

/// Zone or record does not exist (404)
pub const REASON_NOT_FOUND: &str = "NotFound";

/// Conflicting record, e.g. duplicate name and type (409)
pub const REASON_CONFLICT: &str = "Conflict";

/// Record payload failed provider validation (422)
pub const REASON_INVALID_RECORD: &str = "InvalidRecord";

/// Provider rate limit hit (429)
pub const REASON_RATE_LIMITED: &str = "RateLimited";

/// Provider-side failure (500)
pub const REASON_PROVIDER_INTERNAL_ERROR: &str = "ProviderInternalError";

/// Gateway failure in front of the provider API (502, 503, 504)
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// Provider API could not be reached or returned something unexpected
pub const REASON_PROVIDER_UNREACHABLE: &str = "ProviderUnreachable";

/// Map HTTP status code to reason and message.
///
/// # Arguments
///
/// * `status_code` - HTTP status code (e.g., 400, 404, 500)
///
/// # Returns
///
/// A tuple of `(reason, message)`.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `BadRequest` | Invalid request format |
/// | 401 | `AuthFailed` | Authentication required |
/// | 403 | `AuthFailed` | Insufficient permissions |
/// | 404 | `NotFound` | Zone or record not found |
/// | 409 | `Conflict` | Conflicting record |
/// | 422 | `InvalidRecord` | Record rejected by validation |
/// | 429 | `RateLimited` | Too many requests |
/// | 500 | `ProviderInternalError` | Internal server error |
/// | 502 | `GatewayError` | Bad gateway |
/// | 503 | `GatewayError` | Service unavailable |
/// | 504 | `GatewayError` | Gateway timeout |
/// | Other | `ProviderUnreachable` | Unexpected error |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_BAD_REQUEST,
            "Invalid request to provider API (400)".into(),
        ),
        401 => (
            REASON_AUTH_FAILED,
            "Provider authentication required (401)".into(),
        ),
        403 => (
            REASON_AUTH_FAILED,
            "Provider authorization failed (403)".into(),
        ),
        404 => (
            REASON_NOT_FOUND,
            "Zone or record not found at provider (404)".into(),
        ),
        409 => (
            REASON_CONFLICT,
            "Record conflicts with an existing record (409)".into(),
        ),
        422 => (
            REASON_INVALID_RECORD,
            "Record rejected by provider validation (422)".into(),
        ),
        429 => (
            REASON_RATE_LIMITED,
            "Provider rate limit exceeded (429)".into(),
        ),
        500 => (
            REASON_PROVIDER_INTERNAL_ERROR,
            "Provider API internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching provider (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Provider service unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching provider (504)".into(),
        ),
        _ => (
            REASON_PROVIDER_UNREACHABLE,
            format!("Unexpected HTTP error from provider ({status_code})"),
        ),
    }
}

/// Map connection error to reason and message.
///
/// Use this when the HTTP client cannot establish a connection to the provider,
/// before receiving any HTTP status code.
#[must_use]
pub fn map_connection_error() -> (&'static str, String) {
    (
        REASON_PROVIDER_UNREACHABLE,
        "Cannot connect to provider API".into(),
    )
}
