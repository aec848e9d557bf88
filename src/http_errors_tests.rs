// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for http_errors module
//!
//! These tests verify HTTP error code mapping to provider error reasons.

#[cfg(test)]
mod tests {
    use crate::http_errors::*;

    // ============================================================================
    // Test HTTP 4xx Error Code Mappings
    // ============================================================================

    #[test]
    fn test_map_http_400_bad_request() {
        let (reason, message) = map_http_error_to_reason(400);
        assert_eq!(reason, REASON_BAD_REQUEST);
        assert!(message.contains("400"));
    }

    #[test]
    fn test_map_http_401_and_403_auth_failed() {
        let (reason, message) = map_http_error_to_reason(401);
        assert_eq!(reason, REASON_AUTH_FAILED);
        assert!(message.contains("authentication"));

        let (reason, message) = map_http_error_to_reason(403);
        assert_eq!(reason, REASON_AUTH_FAILED);
        assert!(message.contains("authorization"));
    }

    #[test]
    fn test_map_http_404_not_found() {
        let (reason, _) = map_http_error_to_reason(404);
        assert_eq!(reason, REASON_NOT_FOUND);
    }

    #[test]
    fn test_map_record_rejections() {
        assert_eq!(map_http_error_to_reason(409).0, REASON_CONFLICT);
        assert_eq!(map_http_error_to_reason(422).0, REASON_INVALID_RECORD);
        assert_eq!(map_http_error_to_reason(429).0, REASON_RATE_LIMITED);
    }

    // ============================================================================
    // Test HTTP 5xx Error Code Mappings
    // ============================================================================

    #[test]
    fn test_map_http_500_internal_error() {
        let (reason, message) = map_http_error_to_reason(500);
        assert_eq!(reason, REASON_PROVIDER_INTERNAL_ERROR);
        assert!(message.contains("500"));
    }

    #[test]
    fn test_map_gateway_errors() {
        for code in [502, 503, 504] {
            let (reason, message) = map_http_error_to_reason(code);
            assert_eq!(reason, REASON_GATEWAY_ERROR);
            assert!(message.contains(&code.to_string()));
        }
    }

    // ============================================================================
    // Test Unknown Codes and Connection Errors
    // ============================================================================

    #[test]
    fn test_map_unknown_code() {
        let (reason, message) = map_http_error_to_reason(418);
        assert_eq!(reason, REASON_PROVIDER_UNREACHABLE);
        assert!(message.contains("418"));
    }

    #[test]
    fn test_map_connection_error() {
        let (reason, message) = map_connection_error();
        assert_eq!(reason, REASON_PROVIDER_UNREACHABLE);
        assert!(message.contains("Cannot connect"));
    }

    #[test]
    fn test_all_reasons_are_distinct() {
        let reasons = [
            REASON_BAD_REQUEST,
            REASON_AUTH_FAILED,
            REASON_NOT_FOUND,
            REASON_CONFLICT,
            REASON_INVALID_RECORD,
            REASON_RATE_LIMITED,
            REASON_PROVIDER_INTERNAL_ERROR,
            REASON_GATEWAY_ERROR,
            REASON_PROVIDER_UNREACHABLE,
        ];
        let unique: std::collections::HashSet<_> = reasons.iter().collect();
        assert_eq!(unique.len(), reasons.len());
    }
}
