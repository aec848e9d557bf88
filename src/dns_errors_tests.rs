// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for error types.

#[cfg(test)]
mod tests {
    use crate::dns_errors::*;
    use crate::records::{RecordSet, RecordType};

    #[test]
    fn test_config_error_messages() {
        let error = ConfigError::RecordOutsideZone {
            record: "www.bar.com".to_string(),
            zone: "foo.com".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Record 'www.bar.com' is not part of zone 'foo.com'"
        );

        let error = ConfigError::DuplicateEntry {
            name: "foo.com".to_string(),
            record_type: RecordType::AAAA,
        };
        assert_eq!(
            error.to_string(),
            "Found multiple entries for record 'foo.com' and type AAAA"
        );

        let error = ConfigError::MissingToken {
            provider: "hetzner".to_string(),
            env_var: "HETZNER_TOKEN".to_string(),
        };
        assert!(error.to_string().contains("HETZNER_TOKEN"));
    }

    #[test]
    fn test_provider_error_from_status() {
        let error = ProviderError::from_status("hetzner", 422, "  invalid value  ");
        assert_eq!(error.http_status, Some(422));
        assert_eq!(error.reason(), "InvalidRecord");
        assert_eq!(
            error.to_string(),
            "hetzner API request failed (HTTP 422): Record rejected by provider validation (422): invalid value"
        );
    }

    #[test]
    fn test_provider_error_from_status_empty_body() {
        let error = ProviderError::from_status("hosttech", 401, "");
        assert_eq!(error.message, "Provider authentication required (401)");
        assert_eq!(error.reason(), "AuthFailed");
    }

    #[test]
    fn test_provider_error_without_response() {
        let error = ProviderError::connection("hosttech", "connection refused");
        assert_eq!(error.http_status, None);
        assert_eq!(error.reason(), "ProviderUnreachable");
        assert_eq!(
            error.to_string(),
            "hosttech API request failed: Cannot connect to provider API: connection refused"
        );

        let error = ProviderError::not_supported("hosttech", "bulk operations");
        assert_eq!(error.message, "bulk operations is not supported");
    }

    #[test]
    fn test_reconcile_error_reasons() {
        let config: ReconcileError = ConfigError::InvalidTtl { ttl: 0 }.into();
        assert!(config.is_config_error());
        assert_eq!(config.reason(), "ConfigurationError");
        assert!(config.partial_snapshot().is_none());

        let provider: ReconcileError = ProviderError::from_status("hetzner", 404, "").into();
        assert!(!provider.is_config_error());
        assert_eq!(provider.reason(), "NotFound");

        let mismatch = ReconcileError::ExistingRecordMismatch {
            name: "www.foo.com".to_string(),
            record_type: RecordType::A,
            existing: vec!["1.1.1.1".to_string()],
        };
        assert_eq!(mismatch.reason(), "ExistingRecordMismatch");
        assert!(mismatch.to_string().contains("on_existing=replace"));
    }

    #[test]
    fn test_apply_error_carries_partial_snapshot() {
        let partial = vec![RecordSet::new(
            "www.foo.com",
            RecordType::A,
            None,
            vec!["1.1.1.1".to_string()],
        )];
        let error = ReconcileError::Apply {
            source: ProviderError::from_status("hetzner", 500, "boom"),
            partial: partial.clone(),
        };

        assert_eq!(error.reason(), "ProviderInternalError");
        assert_eq!(error.partial_snapshot(), Some(partial.as_slice()));
        assert!(error.to_string().starts_with("Failed to apply changes:"));
    }
}
