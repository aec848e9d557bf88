// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hetzner DNS API client.
//!
//! Hetzner stores one record per value. The zone apex is named `@`, TXT values
//! are stored as quoted character-strings, and a record without `ttl` uses the
//! zone default. Records of types zonesync does not know are skipped when a
//! zone is fetched, so they are never reconciled or purged.

use super::http::{ApiAuth, ApiClient};
use super::{DnsProviderClient, ProviderInformation, Zone, ZoneRef};
use crate::constants::{
    HETZNER_API_BASE_URL, HETZNER_APEX_NAME, HETZNER_AUTH_HEADER, HETZNER_RECORDS_PAGE_SIZE,
};
use crate::dns_errors::ProviderError;
use crate::records::{normalize_name, RawRecord, RecordType};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

const PROVIDER: &str = "hetzner";

#[derive(Debug, Deserialize)]
struct HetznerZone {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ZoneResponse {
    zone: HetznerZone,
}

#[derive(Debug, Deserialize)]
struct ZonesResponse {
    #[serde(default)]
    zones: Vec<HetznerZone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HetznerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    zone_id: String,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    page: u32,
    last_page: u32,
}

#[derive(Debug, Deserialize)]
struct Meta {
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<HetznerRecord>,
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    record: HetznerRecord,
}

#[derive(Debug, Serialize)]
struct BulkRequest<'a> {
    records: &'a [HetznerRecord],
}

#[derive(Debug, Deserialize)]
struct BulkCreateResponse {
    #[serde(default)]
    records: Vec<HetznerRecord>,
    #[serde(default)]
    invalid_records: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct BulkUpdateResponse {
    #[serde(default)]
    failed_records: Vec<Value>,
}

impl HetznerRecord {
    fn from_raw(zone_id: &str, record: &RawRecord) -> Self {
        let name = if record.prefix.is_empty() {
            HETZNER_APEX_NAME.to_string()
        } else {
            record.prefix.clone()
        };
        Self {
            id: record.id.clone(),
            zone_id: zone_id.to_string(),
            record_type: record.record_type.to_string(),
            name,
            value: record.value.clone(),
            ttl: record.ttl,
        }
    }

    fn into_raw(self) -> Option<RawRecord> {
        let Ok(record_type) = self.record_type.parse::<RecordType>() else {
            debug!(
                record_type = %self.record_type,
                name = %self.name,
                "Skipping record of unsupported type"
            );
            return None;
        };
        let prefix = if self.name == HETZNER_APEX_NAME {
            String::new()
        } else {
            normalize_name(&self.name)
        };
        let raw = RawRecord::new(&prefix, record_type, self.ttl, &self.value);
        Some(match self.id {
            Some(id) => raw.with_id(id),
            None => raw,
        })
    }
}

/// Client for the Hetzner DNS public API.
#[derive(Debug, Clone)]
pub struct HetznerClient {
    api: ApiClient,
    info: ProviderInformation,
}

impl HetznerClient {
    /// Create a client for the public Hetzner DNS API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(HETZNER_API_BASE_URL, token)
    }

    /// Create a client for a custom API endpoint (used by tests and proxies).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, ProviderError> {
        let auth = ApiAuth::Header {
            name: HETZNER_AUTH_HEADER,
            token: token.into(),
        };
        Ok(Self {
            api: ApiClient::new(PROVIDER, base_url, auth)?,
            info: ProviderInformation::hetzner(),
        })
    }

    fn created_id(record: HetznerRecord) -> Result<String, ProviderError> {
        record
            .id
            .ok_or_else(|| ProviderError::other(PROVIDER, "Created record has no id"))
    }
}

#[async_trait]
impl DnsProviderClient for HetznerClient {
    fn information(&self) -> &ProviderInformation {
        &self.info
    }

    async fn get_zone(&self, zone: &ZoneRef) -> Result<Zone, ProviderError> {
        let found = match zone {
            ZoneRef::Id(id) => {
                let response: ZoneResponse = self
                    .api
                    .send_json(Method::GET, &format!("/zones/{id}"), &[], None::<&Value>)
                    .await?;
                response.zone
            }
            ZoneRef::Name(name) => {
                let wanted = normalize_name(name);
                let response: ZonesResponse = self
                    .api
                    .send_json(Method::GET, "/zones", &[("name", wanted.as_str())], None::<&Value>)
                    .await?;
                response
                    .zones
                    .into_iter()
                    .find(|z| normalize_name(&z.name) == wanted)
                    .ok_or_else(|| {
                        ProviderError::other(PROVIDER, format!("Zone '{wanted}' not found"))
                    })?
            }
        };

        debug!(zone_id = %found.id, zone = %found.name, "Resolved Hetzner zone");
        Ok(Zone {
            id: found.id,
            name: normalize_name(&found.name),
        })
    }

    async fn fetch_zone_records(&self, zone_id: &str) -> Result<Vec<RawRecord>, ProviderError> {
        let per_page = HETZNER_RECORDS_PAGE_SIZE.to_string();
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_str = page.to_string();
            let response: RecordsResponse = self
                .api
                .send_json(
                    Method::GET,
                    "/records",
                    &[
                        ("zone_id", zone_id),
                        ("page", page_str.as_str()),
                        ("per_page", per_page.as_str()),
                    ],
                    None::<&Value>,
                )
                .await?;

            let item_count = response.records.len();
            records.extend(response.records.into_iter().filter_map(HetznerRecord::into_raw));

            debug!(
                zone_id = %zone_id,
                page = page,
                items_in_page = item_count,
                total_items = records.len(),
                "Fetched page of Hetzner records"
            );

            let last_page = response
                .meta
                .and_then(|m| m.pagination)
                .map_or(page, |p| p.last_page.max(p.page));
            if item_count == 0 || page >= last_page {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record: &RawRecord,
    ) -> Result<String, ProviderError> {
        let body = HetznerRecord::from_raw(zone_id, record);
        let response: RecordResponse = self
            .api
            .send_json(Method::POST, "/records", &[], Some(&body))
            .await?;
        let id = Self::created_id(response.record)?;
        info!(
            zone_id = %zone_id,
            id = %id,
            name = %body.name,
            record_type = %body.record_type,
            "Created Hetzner record"
        );
        Ok(id)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        id: &str,
        record: &RawRecord,
    ) -> Result<(), ProviderError> {
        let mut body = HetznerRecord::from_raw(zone_id, record);
        body.id = None;
        self.api
            .send(Method::PUT, &format!("/records/{id}"), &[], Some(&body))
            .await?;
        info!(
            zone_id = %zone_id,
            id = %id,
            name = %body.name,
            record_type = %body.record_type,
            "Updated Hetzner record"
        );
        Ok(())
    }

    async fn delete_record(&self, zone_id: &str, id: &str) -> Result<(), ProviderError> {
        self.api
            .send(Method::DELETE, &format!("/records/{id}"), &[], None::<&Value>)
            .await?;
        info!(zone_id = %zone_id, id = %id, "Deleted Hetzner record");
        Ok(())
    }

    fn supports_bulk(&self) -> bool {
        true
    }

    async fn bulk_apply(
        &self,
        zone_id: &str,
        creates: &[RawRecord],
        updates: &[RawRecord],
        deletes: &[RawRecord],
    ) -> Result<Vec<String>, ProviderError> {
        // The API has no bulk delete.
        for record in deletes {
            let id = record.id.as_deref().ok_or_else(|| {
                ProviderError::other(PROVIDER, "Cannot delete a record without id")
            })?;
            self.delete_record(zone_id, id).await?;
        }

        if !updates.is_empty() {
            let records: Vec<HetznerRecord> = updates
                .iter()
                .map(|r| HetznerRecord::from_raw(zone_id, r))
                .collect();
            if records.iter().any(|r| r.id.is_none()) {
                return Err(ProviderError::other(
                    PROVIDER,
                    "Cannot update a record without id",
                ));
            }
            let response: BulkUpdateResponse = self
                .api
                .send_json(
                    Method::PUT,
                    "/records/bulk",
                    &[],
                    Some(&BulkRequest { records: &records }),
                )
                .await?;
            if !response.failed_records.is_empty() {
                return Err(ProviderError::other(
                    PROVIDER,
                    format!(
                        "Bulk update rejected {} record(s): {}",
                        response.failed_records.len(),
                        Value::Array(response.failed_records)
                    ),
                ));
            }
            info!(zone_id = %zone_id, count = records.len(), "Bulk-updated Hetzner records");
        }

        if creates.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<HetznerRecord> = creates
            .iter()
            .map(|r| {
                let mut record = HetznerRecord::from_raw(zone_id, r);
                record.id = None;
                record
            })
            .collect();
        let response: BulkCreateResponse = self
            .api
            .send_json(
                Method::POST,
                "/records/bulk",
                &[],
                Some(&BulkRequest { records: &records }),
            )
            .await?;
        if !response.invalid_records.is_empty() {
            return Err(ProviderError::other(
                PROVIDER,
                format!(
                    "Bulk create rejected {} record(s): {}",
                    response.invalid_records.len(),
                    Value::Array(response.invalid_records)
                ),
            ));
        }
        if response.records.len() != creates.len() {
            return Err(ProviderError::other(
                PROVIDER,
                format!(
                    "Bulk create returned {} record(s), expected {}",
                    response.records.len(),
                    creates.len()
                ),
            ));
        }
        info!(zone_id = %zone_id, count = records.len(), "Bulk-created Hetzner records");

        response
            .records
            .into_iter()
            .map(Self::created_id)
            .collect()
    }
}

#[cfg(test)]
#[path = "hetzner_tests.rs"]
mod hetzner_tests;
