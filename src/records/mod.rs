// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS record types, value normalization and the record set model.
//!
//! - [`normalize`] - canonical forms of record values so that equal values compare equal
//! - [`record_set`] - raw provider records, logical record sets and name handling

pub mod normalize;
pub mod record_set;

use crate::dns_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use normalize::{
    decode_txt, decode_value, encode_txt, normalize_name, normalize_value, normalize_values,
    TxtEncoding,
};
pub use record_set::{
    group_into_record_sets, merge_identity, prefix_for, values_equal, RawRecord, RecordSet,
};

/// DNS record types known to zonesync.
///
/// Each provider only accepts a subset, see
/// [`ProviderInformation`](crate::providers::ProviderInformation).
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CAA,
    CNAME,
    DANE,
    DS,
    HINFO,
    MX,
    NS,
    PTR,
    RP,
    SOA,
    SPF,
    SRV,
    TLSA,
    TXT,
}

impl RecordType {
    /// All record types, in display order.
    pub const ALL: [RecordType; 16] = [
        Self::A,
        Self::AAAA,
        Self::CAA,
        Self::CNAME,
        Self::DANE,
        Self::DS,
        Self::HINFO,
        Self::MX,
        Self::NS,
        Self::PTR,
        Self::RP,
        Self::SOA,
        Self::SPF,
        Self::SRV,
        Self::TLSA,
        Self::TXT,
    ];

    /// Upper-case mnemonic as used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CAA => "CAA",
            Self::CNAME => "CNAME",
            Self::DANE => "DANE",
            Self::DS => "DS",
            Self::HINFO => "HINFO",
            Self::MX => "MX",
            Self::NS => "NS",
            Self::PTR => "PTR",
            Self::RP => "RP",
            Self::SOA => "SOA",
            Self::SPF => "SPF",
            Self::SRV => "SRV",
            Self::TLSA => "TLSA",
            Self::TXT => "TXT",
        }
    }

    /// TXT-like types whose values are character-strings.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::TXT | Self::SPF)
    }

    /// Types whose value consists of several whitespace-separated fields.
    #[must_use]
    pub fn is_multi_field(self) -> bool {
        matches!(
            self,
            Self::CAA
                | Self::DANE
                | Self::DS
                | Self::HINFO
                | Self::MX
                | Self::PTR
                | Self::RP
                | Self::SOA
                | Self::SRV
                | Self::TLSA
        )
    }

    /// Types whose whole value is a single host name.
    #[must_use]
    pub fn is_host_name(self) -> bool {
        matches!(self, Self::CNAME | Self::NS)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ConfigError::UnknownRecordType(s.to_string()))
    }
}

/// Desired presence of a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    #[default]
    Present,
    Absent,
}
