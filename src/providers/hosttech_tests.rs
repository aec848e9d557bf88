// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the Hosttech DNS client and its record conversions.

#[cfg(test)]
mod tests {
    use crate::providers::hosttech::{record_from_json, record_to_json};
    use crate::providers::{DnsProviderClient, HosttechClient, ZoneRef};
    use crate::records::{RawRecord, RecordType};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // =====================================================
    // Record Conversion Tests
    // =====================================================

    #[test]
    fn test_record_from_json_a_with_comment() {
        let raw = record_from_json(&json!({
            "id": 17, "type": "A", "name": "www", "ipv4": "1.2.3.4", "ttl": 3600, "comment": "web"
        }))
        .unwrap();
        assert_eq!(
            raw,
            RawRecord::new("www", RecordType::A, Some(3600), "1.2.3.4")
                .with_id("17")
                .with_notes(Some("web".to_string()))
        );
    }

    #[test]
    fn test_record_from_json_empty_comment_is_no_notes() {
        let raw = record_from_json(&json!({
            "id": 1, "type": "AAAA", "name": "", "ipv6": "2001:DB8::1", "ttl": 300, "comment": ""
        }))
        .unwrap();
        assert_eq!(raw.notes, None);
        assert_eq!(raw.prefix, "");
        assert_eq!(raw.value, "2001:DB8::1");
    }

    #[test]
    fn test_record_from_json_multi_field_types() {
        let mx = record_from_json(&json!({
            "id": 2, "type": "MX", "ownername": "", "name": "mail.example.com", "pref": 10, "ttl": 3600
        }))
        .unwrap();
        assert_eq!(mx.value, "10 mail.example.com");

        let srv = record_from_json(&json!({
            "id": 3, "type": "SRV", "service": "_sip._tcp", "priority": 10, "weight": 20,
            "port": 5060, "target": "sip.example.com", "ttl": 3600
        }))
        .unwrap();
        assert_eq!(srv.prefix, "_sip._tcp");
        assert_eq!(srv.value, "10 20 5060 sip.example.com");

        let caa = record_from_json(&json!({
            "id": 4, "type": "CAA", "name": "", "flag": "0", "tag": "issue",
            "value": "letsencrypt.org", "ttl": 3600
        }))
        .unwrap();
        assert_eq!(caa.value, "0 issue \"letsencrypt.org\"");

        let ns = record_from_json(&json!({
            "id": 5, "type": "NS", "ownername": "sub", "targetname": "ns1.example.com", "ttl": 3600
        }))
        .unwrap();
        assert_eq!(ns.prefix, "sub");
        assert_eq!(ns.value, "ns1.example.com");
    }

    #[test]
    fn test_record_from_json_skips_unknown_type() {
        assert!(record_from_json(&json!({"id": 9, "type": "LOC", "name": "x"})).is_none());
    }

    #[test]
    fn test_record_to_json_mx_and_srv() {
        let mx = RawRecord::new("", RecordType::MX, Some(600), "10 mail.example.com");
        assert_eq!(
            record_to_json(&mx).unwrap(),
            json!({
                "type": "MX", "ownername": "", "pref": 10, "name": "mail.example.com",
                "ttl": 600, "comment": ""
            })
        );

        let srv = RawRecord::new("_sip._tcp", RecordType::SRV, None, "10 20 5060 sip.example.com")
            .with_notes(Some("voip".to_string()));
        assert_eq!(
            record_to_json(&srv).unwrap(),
            json!({
                "type": "SRV", "service": "_sip._tcp", "priority": 10, "weight": 20,
                "port": 5060, "target": "sip.example.com", "ttl": 3600, "comment": "voip"
            })
        );
    }

    #[test]
    fn test_record_to_json_caa_strips_value_quotes() {
        let caa = RawRecord::new("", RecordType::CAA, Some(3600), "0 issue \"letsencrypt.org\"");
        let body = record_to_json(&caa).unwrap();
        assert_eq!(body["flag"], json!("0"));
        assert_eq!(body["tag"], json!("issue"));
        assert_eq!(body["value"], json!("letsencrypt.org"));
    }

    #[test]
    fn test_record_to_json_rejects_malformed_mx() {
        let mx = RawRecord::new("", RecordType::MX, Some(3600), "mail.example.com");
        let err = record_to_json(&mx).unwrap_err();
        assert!(err.message.contains("Invalid MX value"));

        let mx = RawRecord::new("", RecordType::MX, Some(3600), "ten mail.example.com");
        let err = record_to_json(&mx).unwrap_err();
        assert!(err.message.contains("preference must be a number"));
    }

    #[test]
    fn test_record_to_json_rejects_unsupported_type() {
        let ds = RawRecord::new("", RecordType::DS, Some(3600), "1 2 3 abcd");
        assert!(record_to_json(&ds).is_err());
    }

    // =====================================================
    // HTTP Tests
    // =====================================================

    #[tokio::test]
    async fn test_get_zone_by_name_and_fetch_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(query_param("query", "example.com"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": 7, "name": "sub.example.com"},
                    {"id": 8, "name": "example.com"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/zones/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "id": 8,
                    "name": "example.com",
                    "records": [
                        {"id": 100, "type": "A", "name": "", "ipv4": "1.1.1.1", "ttl": 3600, "comment": ""},
                        {"id": 101, "type": "TXT", "name": "", "text": "v=spf1 -all", "ttl": 3600, "comment": ""}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = HosttechClient::with_base_url(&server.uri(), "tok").unwrap();
        let zone = client
            .get_zone(&ZoneRef::Name("example.com".into()))
            .await
            .unwrap();
        assert_eq!(zone.id, "8");

        let records = client.fetch_zone_records(&zone.id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].value, "v=spf1 -all");
        assert_eq!(records[1].id.as_deref(), Some("101"));
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/zones/8/records"))
            .and(body_json(json!({
                "type": "A", "name": "www", "ipv4": "5.5.5.5", "ttl": 300, "comment": ""
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"id": 200, "type": "A", "name": "www", "ipv4": "5.5.5.5", "ttl": 300, "comment": ""}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/zones/8/records/200"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/zones/8/records/200"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = HosttechClient::with_base_url(&server.uri(), "tok").unwrap();
        assert!(!client.supports_bulk());

        let record = RawRecord::new("www", RecordType::A, Some(300), "5.5.5.5");
        let id = client.create_record("8", &record).await.unwrap();
        assert_eq!(id, "200");

        let updated = RawRecord::new("www", RecordType::A, Some(300), "6.6.6.6");
        client.update_record("8", &id, &updated).await.unwrap();
        client.delete_record("8", &id).await.unwrap();
    }

    #[tokio::test]
    async fn test_bulk_apply_is_not_supported() {
        let client = HosttechClient::with_base_url("http://127.0.0.1:9", "tok").unwrap();
        let err = client.bulk_apply("8", &[], &[], &[]).await.unwrap_err();
        assert!(err.message.contains("not supported"));
    }

    #[tokio::test]
    async fn test_server_error_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/8"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = HosttechClient::with_base_url(&server.uri(), "tok").unwrap();
        let err = client.fetch_zone_records("8").await.unwrap_err();
        assert_eq!(err.http_status, Some(500));
        assert_eq!(err.reason(), "ProviderInternalError");
    }
}
