// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hosttech DNS JSON API client.
//!
//! Unlike most APIs, Hosttech does not store a record as name plus a single
//! value string. Every record type has its own JSON fields:
//!
//! | Type       | Name field  | Value fields                          |
//! |------------|-------------|---------------------------------------|
//! | A          | `name`      | `ipv4`                                |
//! | AAAA       | `name`      | `ipv6`                                |
//! | CAA        | `name`      | `flag`, `tag`, `value`                |
//! | CNAME      | `name`      | `cname`                               |
//! | MX         | `ownername` | `pref`, `name`                        |
//! | NS         | `ownername` | `targetname`                          |
//! | PTR        | -           | `origin`, `name`                      |
//! | SRV        | `service`   | `priority`, `weight`, `port`, `target`|
//! | SPF/TXT/TLSA | `name`    | `text`                                |
//!
//! This module converts between those objects and [`RawRecord`]s whose value
//! is the usual zone-file presentation (`10 mail.example.com` for MX, ...).
//! Record comments are exposed as notes.

use super::http::{ApiAuth, ApiClient};
use super::{DnsProviderClient, ProviderInformation, Zone, ZoneRef};
use crate::constants::{DEFAULT_HOSTTECH_RECORD_TTL_SECS, HOSTTECH_API_BASE_URL};
use crate::dns_errors::ProviderError;
use crate::records::{normalize_name, RawRecord, RecordType};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

const PROVIDER: &str = "hosttech";

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct HosttechZone {
    id: Value,
    name: String,
    #[serde(default)]
    records: Vec<Value>,
}

/// Client for the Hosttech DNS JSON API.
#[derive(Debug, Clone)]
pub struct HosttechClient {
    api: ApiClient,
    info: ProviderInformation,
}

impl HosttechClient {
    /// Create a client for the public Hosttech API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(HOSTTECH_API_BASE_URL, token)
    }

    /// Create a client for a custom API endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            api: ApiClient::new(PROVIDER, base_url, ApiAuth::Bearer(token.into()))?,
            info: ProviderInformation::hosttech(),
        })
    }

    async fn zone_by_id(&self, id: &str) -> Result<HosttechZone, ProviderError> {
        let response: DataResponse<HosttechZone> = self
            .api
            .send_json(Method::GET, &format!("/zones/{id}"), &[], None::<&Value>)
            .await?;
        Ok(response.data)
    }
}

/// Render a JSON scalar (string or number) as a string.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field(record: &Map<String, Value>, name: &str) -> String {
    record.get(name).and_then(scalar).unwrap_or_default()
}

/// Convert an API record object into a [`RawRecord`].
///
/// Returns `None` for records of types zonesync does not manage.
pub(crate) fn record_from_json(record: &Value) -> Option<RawRecord> {
    let object = record.as_object()?;
    let type_name = field(object, "type");
    let Ok(record_type) = type_name.parse::<RecordType>() else {
        debug!(record_type = %type_name, "Skipping record of unsupported type");
        return None;
    };

    let (prefix, value) = match record_type {
        RecordType::A => (field(object, "name"), field(object, "ipv4")),
        RecordType::AAAA => (field(object, "name"), field(object, "ipv6")),
        RecordType::CNAME => (field(object, "name"), field(object, "cname")),
        RecordType::CAA => (
            field(object, "name"),
            format!(
                "{} {} \"{}\"",
                field(object, "flag"),
                field(object, "tag"),
                field(object, "value")
            ),
        ),
        RecordType::MX => (
            field(object, "ownername"),
            format!("{} {}", field(object, "pref"), field(object, "name")),
        ),
        RecordType::NS => (field(object, "ownername"), field(object, "targetname")),
        RecordType::PTR => (
            String::new(),
            format!("{} {}", field(object, "origin"), field(object, "name")),
        ),
        RecordType::SRV => (
            field(object, "service"),
            format!(
                "{} {} {} {}",
                field(object, "priority"),
                field(object, "weight"),
                field(object, "port"),
                field(object, "target")
            ),
        ),
        RecordType::SPF | RecordType::TXT | RecordType::TLSA => {
            (field(object, "name"), field(object, "text"))
        }
        _ => {
            debug!(record_type = %record_type, "Skipping record type not offered by Hosttech");
            return None;
        }
    };

    let ttl = object
        .get("ttl")
        .and_then(Value::as_u64)
        .and_then(|t| u32::try_from(t).ok());
    let raw = RawRecord::new(&normalize_name(&prefix), record_type, ttl, &value)
        .with_notes(object.get("comment").and_then(Value::as_str).map(str::to_string));

    Some(match object.get("id").and_then(scalar) {
        Some(id) => raw.with_id(id),
        None => raw,
    })
}

fn split_fields<const N: usize>(
    record: &RawRecord,
    expected: &str,
) -> Result<[String; N], ProviderError> {
    let parts: Vec<String> = record
        .value
        .splitn(N, char::is_whitespace)
        .map(|p| p.trim().to_string())
        .collect();
    parts.try_into().map_err(|_| {
        ProviderError::other(
            PROVIDER,
            format!(
                "Invalid {} value '{}': expected '{expected}'",
                record.record_type, record.value
            ),
        )
    })
}

fn number(record: &RawRecord, field: &str, raw: &str) -> Result<u64, ProviderError> {
    raw.parse().map_err(|_| {
        ProviderError::other(
            PROVIDER,
            format!(
                "Invalid {} value '{}': {field} must be a number",
                record.record_type, record.value
            ),
        )
    })
}

/// Build the API request body for a [`RawRecord`].
pub(crate) fn record_to_json(record: &RawRecord) -> Result<Value, ProviderError> {
    let mut body = match record.record_type {
        RecordType::A => json!({"name": record.prefix, "ipv4": record.value}),
        RecordType::AAAA => json!({"name": record.prefix, "ipv6": record.value}),
        RecordType::CNAME => json!({"name": record.prefix, "cname": record.value}),
        RecordType::CAA => {
            let [flag, tag, value] = split_fields::<3>(record, "flag tag value")?;
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(&value);
            json!({
                "name": record.prefix,
                "flag": flag,
                "tag": tag,
                "value": value,
            })
        }
        RecordType::MX => {
            let [pref, name] = split_fields::<2>(record, "preference exchange")?;
            json!({
                "ownername": record.prefix,
                "pref": number(record, "preference", &pref)?,
                "name": name,
            })
        }
        RecordType::NS => json!({"ownername": record.prefix, "targetname": record.value}),
        RecordType::PTR => {
            let [origin, name] = split_fields::<2>(record, "origin name")?;
            json!({"origin": origin, "name": name})
        }
        RecordType::SRV => {
            let [priority, weight, port, target] =
                split_fields::<4>(record, "priority weight port target")?;
            json!({
                "service": record.prefix,
                "priority": number(record, "priority", &priority)?,
                "weight": number(record, "weight", &weight)?,
                "port": number(record, "port", &port)?,
                "target": target,
            })
        }
        RecordType::SPF | RecordType::TXT | RecordType::TLSA => {
            json!({"name": record.prefix, "text": record.value})
        }
        other => {
            return Err(ProviderError::not_supported(
                PROVIDER,
                &format!("record type {other}"),
            ))
        }
    };

    if let Value::Object(map) = &mut body {
        map.insert("type".to_string(), json!(record.record_type.as_str()));
        map.insert(
            "ttl".to_string(),
            json!(record.ttl.unwrap_or(DEFAULT_HOSTTECH_RECORD_TTL_SECS)),
        );
        map.insert(
            "comment".to_string(),
            json!(record.notes.clone().unwrap_or_default()),
        );
    }
    Ok(body)
}

#[async_trait]
impl DnsProviderClient for HosttechClient {
    fn information(&self) -> &ProviderInformation {
        &self.info
    }

    async fn get_zone(&self, zone: &ZoneRef) -> Result<Zone, ProviderError> {
        let found = match zone {
            ZoneRef::Id(id) => self.zone_by_id(id).await?,
            ZoneRef::Name(name) => {
                let wanted = normalize_name(name);
                let response: DataResponse<Vec<HosttechZone>> = self
                    .api
                    .send_json(
                        Method::GET,
                        "/zones",
                        &[("query", wanted.as_str())],
                        None::<&Value>,
                    )
                    .await?;
                response
                    .data
                    .into_iter()
                    .find(|z| normalize_name(&z.name) == wanted)
                    .ok_or_else(|| {
                        ProviderError::other(PROVIDER, format!("Zone '{wanted}' not found"))
                    })?
            }
        };

        let id = scalar(&found.id)
            .ok_or_else(|| ProviderError::other(PROVIDER, "Zone without id in response"))?;
        debug!(zone_id = %id, zone = %found.name, "Resolved Hosttech zone");
        Ok(Zone {
            id,
            name: normalize_name(&found.name),
        })
    }

    async fn fetch_zone_records(&self, zone_id: &str) -> Result<Vec<RawRecord>, ProviderError> {
        let zone = self.zone_by_id(zone_id).await?;
        let total = zone.records.len();
        let records: Vec<RawRecord> = zone.records.iter().filter_map(record_from_json).collect();
        debug!(
            zone_id = %zone_id,
            total_items = total,
            managed_items = records.len(),
            "Fetched Hosttech zone records"
        );
        Ok(records)
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record: &RawRecord,
    ) -> Result<String, ProviderError> {
        let body = record_to_json(record)?;
        let response: DataResponse<Value> = self
            .api
            .send_json(
                Method::POST,
                &format!("/zones/{zone_id}/records"),
                &[],
                Some(&body),
            )
            .await?;
        let id = response
            .data
            .get("id")
            .and_then(scalar)
            .ok_or_else(|| ProviderError::other(PROVIDER, "Created record has no id"))?;
        info!(
            zone_id = %zone_id,
            id = %id,
            prefix = %record.prefix,
            record_type = %record.record_type,
            "Created Hosttech record"
        );
        Ok(id)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        id: &str,
        record: &RawRecord,
    ) -> Result<(), ProviderError> {
        let body = record_to_json(record)?;
        self.api
            .send(
                Method::PUT,
                &format!("/zones/{zone_id}/records/{id}"),
                &[],
                Some(&body),
            )
            .await?;
        info!(
            zone_id = %zone_id,
            id = %id,
            prefix = %record.prefix,
            record_type = %record.record_type,
            "Updated Hosttech record"
        );
        Ok(())
    }

    async fn delete_record(&self, zone_id: &str, id: &str) -> Result<(), ProviderError> {
        self.api
            .send(
                Method::DELETE,
                &format!("/zones/{zone_id}/records/{id}"),
                &[],
                None::<&Value>,
            )
            .await?;
        info!(zone_id = %zone_id, id = %id, "Deleted Hosttech record");
        Ok(())
    }
}

#[cfg(test)]
#[path = "hosttech_tests.rs"]
mod hosttech_tests;
