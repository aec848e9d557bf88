// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS provider clients.
//!
//! The reconciliation engine is written once against [`DnsProviderClient`].
//! Each hosting provider is an implementation of that trait:
//!
//! - [`hetzner::HetznerClient`] - Hetzner DNS public API
//! - [`hosttech::HosttechClient`] - Hosttech DNS JSON API
//! - [`memory::InMemoryProvider`] - in-process zone store for tests and offline dry runs
//!
//! Provider-specific behaviour the engine needs to know about (supported
//! record types, default TTL, TXT encoding, notes support) is described by
//! [`ProviderInformation`].

pub mod hetzner;
pub mod hosttech;
pub(crate) mod http;
pub mod memory;

use crate::constants::DEFAULT_HOSTTECH_RECORD_TTL_SECS;
use crate::dns_errors::ProviderError;
use crate::records::{decode_value, encode_txt, RawRecord, RecordType, TxtEncoding};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use hetzner::HetznerClient;
pub use hosttech::HosttechClient;
pub use memory::InMemoryProvider;

/// How a task selects its zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneRef {
    /// Provider-assigned zone id
    Id(String),
    /// Zone name, e.g. `example.com`
    Name(String),
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name {name}"),
        }
    }
}

/// A resolved zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    /// Normalized zone name
    pub name: String,
}

/// Static description of a provider's capabilities and conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInformation {
    /// Short provider name used in logs, errors and metric labels
    pub name: &'static str,
    /// Record types accepted for single record set tasks
    pub record_types: &'static [RecordType],
    /// Record types managed by bulk tasks; other types are never touched or purged
    pub bulk_record_types: &'static [RecordType],
    /// TTL applied at the configuration boundary when a task omits it
    pub default_ttl: Option<u32>,
    /// Whether records can carry notes
    pub supports_notes: bool,
    /// Wire form of TXT content
    pub txt_encoding: TxtEncoding,
    /// Whether raw records with different TTLs form separate record sets
    pub split_by_ttl: bool,
}

const HETZNER_RECORD_TYPES: &[RecordType] = &[
    RecordType::A,
    RecordType::AAAA,
    RecordType::CAA,
    RecordType::CNAME,
    RecordType::DANE,
    RecordType::DS,
    RecordType::HINFO,
    RecordType::MX,
    RecordType::NS,
    RecordType::PTR,
    RecordType::RP,
    RecordType::SOA,
    RecordType::SRV,
    RecordType::TLSA,
    RecordType::TXT,
];

const HETZNER_BULK_RECORD_TYPES: &[RecordType] = &[
    RecordType::A,
    RecordType::AAAA,
    RecordType::CAA,
    RecordType::CNAME,
    RecordType::DANE,
    RecordType::DS,
    RecordType::HINFO,
    RecordType::MX,
    RecordType::NS,
    RecordType::PTR,
    RecordType::RP,
    RecordType::SRV,
    RecordType::TLSA,
    RecordType::TXT,
];

const HOSTTECH_RECORD_TYPES: &[RecordType] = &[
    RecordType::A,
    RecordType::AAAA,
    RecordType::CAA,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::NS,
    RecordType::PTR,
    RecordType::SPF,
    RecordType::SRV,
    RecordType::TLSA,
    RecordType::TXT,
];

impl ProviderInformation {
    /// Hetzner DNS: zone-default TTL when omitted, quoted TXT, no notes.
    #[must_use]
    pub fn hetzner() -> Self {
        Self {
            name: "hetzner",
            record_types: HETZNER_RECORD_TYPES,
            bulk_record_types: HETZNER_BULK_RECORD_TYPES,
            default_ttl: None,
            supports_notes: false,
            txt_encoding: TxtEncoding::Quoted,
            split_by_ttl: false,
        }
    }

    /// Hosttech DNS: TTL always set, raw TXT, notes stored as comments.
    #[must_use]
    pub fn hosttech() -> Self {
        Self {
            name: "hosttech",
            record_types: HOSTTECH_RECORD_TYPES,
            bulk_record_types: HOSTTECH_RECORD_TYPES,
            default_ttl: Some(DEFAULT_HOSTTECH_RECORD_TTL_SECS),
            supports_notes: true,
            txt_encoding: TxtEncoding::Unquoted,
            split_by_ttl: false,
        }
    }

    /// Whether `record_type` can be managed by a single (`bulk = false`)
    /// or bulk (`bulk = true`) task.
    #[must_use]
    pub fn supports_type(&self, record_type: RecordType, bulk: bool) -> bool {
        let types = if bulk {
            self.bulk_record_types
        } else {
            self.record_types
        };
        types.contains(&record_type)
    }

    /// Convert a normalized value into the provider's wire form.
    #[must_use]
    pub fn encode_value(&self, record_type: RecordType, canonical: &str) -> String {
        if record_type.is_text() {
            encode_txt(canonical, self.txt_encoding)
        } else {
            canonical.to_string()
        }
    }

    /// Convert a value read from the provider into its normalized form.
    #[must_use]
    pub fn decode_value(&self, record_type: RecordType, wire: &str) -> String {
        decode_value(record_type, wire, self.txt_encoding)
    }
}

/// Operations the reconciliation engine needs from a DNS provider.
///
/// Calls are awaited one after another; implementations never have to cope
/// with concurrent mutations from the engine. Failures are reported as
/// [`ProviderError`] and are never retried by the caller.
#[async_trait]
pub trait DnsProviderClient: Send + Sync {
    /// Capabilities and conventions of this provider.
    fn information(&self) -> &ProviderInformation;

    /// Resolve a zone by id or name.
    async fn get_zone(&self, zone: &ZoneRef) -> Result<Zone, ProviderError>;

    /// List all raw records of a zone.
    async fn fetch_zone_records(&self, zone_id: &str) -> Result<Vec<RawRecord>, ProviderError>;

    /// Create a record and return its provider id.
    async fn create_record(&self, zone_id: &str, record: &RawRecord)
        -> Result<String, ProviderError>;

    /// Replace the record with id `id`.
    async fn update_record(
        &self,
        zone_id: &str,
        id: &str,
        record: &RawRecord,
    ) -> Result<(), ProviderError>;

    /// Delete the record with id `id`.
    async fn delete_record(&self, zone_id: &str, id: &str) -> Result<(), ProviderError>;

    /// Whether [`DnsProviderClient::bulk_apply`] is available.
    fn supports_bulk(&self) -> bool {
        false
    }

    /// Apply several operations in as few requests as possible.
    ///
    /// `updates` and `deletes` carry their ids in [`RawRecord::id`]. Returns
    /// the ids of the created records, in the order of `creates`.
    async fn bulk_apply(
        &self,
        zone_id: &str,
        creates: &[RawRecord],
        updates: &[RawRecord],
        deletes: &[RawRecord],
    ) -> Result<Vec<String>, ProviderError> {
        let _ = (zone_id, creates, updates, deletes);
        Err(ProviderError::not_supported(
            self.information().name,
            "bulk operations",
        ))
    }
}

#[cfg(test)]
mod mod_tests;
