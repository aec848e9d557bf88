// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for provider information and zone references.

#[cfg(test)]
mod tests {
    use crate::providers::{ProviderInformation, ZoneRef};
    use crate::records::{RecordType, TxtEncoding};

    #[test]
    fn test_hetzner_information() {
        let info = ProviderInformation::hetzner();
        assert_eq!(info.name, "hetzner");
        assert_eq!(info.default_ttl, None);
        assert!(!info.supports_notes);
        assert_eq!(info.txt_encoding, TxtEncoding::Quoted);
        assert!(info.supports_type(RecordType::SOA, false));
        assert!(!info.supports_type(RecordType::SOA, true));
        assert!(!info.supports_type(RecordType::SPF, false));
    }

    #[test]
    fn test_hosttech_information() {
        let info = ProviderInformation::hosttech();
        assert_eq!(info.name, "hosttech");
        assert_eq!(info.default_ttl, Some(3600));
        assert!(info.supports_notes);
        assert_eq!(info.txt_encoding, TxtEncoding::Unquoted);
        assert!(info.supports_type(RecordType::SPF, true));
        assert!(!info.supports_type(RecordType::DS, false));
    }

    #[test]
    fn test_encode_value_only_touches_text_types() {
        let hetzner = ProviderInformation::hetzner();
        assert_eq!(
            hetzner.encode_value(RecordType::TXT, "hello world"),
            "\"hello world\""
        );
        assert_eq!(
            hetzner.encode_value(RecordType::MX, "10 mail.example.com."),
            "10 mail.example.com."
        );

        let hosttech = ProviderInformation::hosttech();
        assert_eq!(
            hosttech.encode_value(RecordType::TXT, "hello world"),
            "hello world"
        );
    }

    #[test]
    fn test_decode_value() {
        let hetzner = ProviderInformation::hetzner();
        assert_eq!(hetzner.decode_value(RecordType::TXT, "\"a\" \"b\""), "ab");
        assert_eq!(hetzner.decode_value(RecordType::CNAME, "WWW.foo.com."), "www.foo.com.");

        let hosttech = ProviderInformation::hosttech();
        assert_eq!(hosttech.decode_value(RecordType::TXT, "v=spf1 -all"), "v=spf1 -all");
    }

    #[test]
    fn test_zone_ref_display() {
        assert_eq!(ZoneRef::Id("42".into()).to_string(), "id 42");
        assert_eq!(
            ZoneRef::Name("example.com".into()).to_string(),
            "name example.com"
        );
    }
}
