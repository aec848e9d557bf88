// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Raw provider records and logical record sets.
//!
//! Providers store one raw record per value. The engine reasons about
//! *record sets* instead: all raw records sharing a name and a type (and,
//! for providers that require uniform TTLs, the TTL) form one set with a
//! collection of values.

use super::normalize::{decode_value, normalize_name, normalize_value, TxtEncoding};
use super::RecordType;
use crate::dns_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single record as stored by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Provider-assigned id; `None` for records that do not exist yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name relative to the zone, `""` for the apex
    pub prefix: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Value in the provider's wire form
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RawRecord {
    #[must_use]
    pub fn new(prefix: &str, record_type: RecordType, ttl: Option<u32>, value: &str) -> Self {
        Self {
            id: None,
            prefix: prefix.to_string(),
            record_type,
            ttl,
            value: value.to_string(),
            notes: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.is_empty());
        self
    }
}

/// One logical DNS record set.
///
/// Equality (`==`) compares the logical content: name, type, ttl, the values
/// as a multiset, and notes. Use [`RecordSet::satisfies`] to check an existing
/// set against a desired one, which ignores the ttl when the desired set does
/// not specify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSet {
    /// Fully-qualified name, lowercase, without trailing dot
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// `None` means "provider default" for desired sets, and "mixed" for
    /// fetched sets whose raw records disagree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Normalized values
    #[serde(rename = "value")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip)]
    members: Vec<RawRecord>,
}

impl RecordSet {
    /// Build a desired record set. Name and values are normalized.
    #[must_use]
    pub fn new(name: &str, record_type: RecordType, ttl: Option<u32>, values: Vec<String>) -> Self {
        let values = values
            .iter()
            .map(|v| normalize_value(record_type, v))
            .collect();
        Self {
            name: normalize_name(name),
            record_type,
            ttl,
            values,
            notes: None,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.is_empty());
        self
    }

    /// Build a fetched record set from the raw records that compose it.
    ///
    /// Member values are in the provider's wire form; TXT content is decoded
    /// according to `txt_encoding`.
    pub(crate) fn from_members(
        name: String,
        record_type: RecordType,
        members: Vec<RawRecord>,
        txt_encoding: TxtEncoding,
    ) -> Self {
        let first_ttl = members.first().and_then(|m| m.ttl);
        let ttl = if members.iter().all(|m| m.ttl == first_ttl) {
            first_ttl
        } else {
            None
        };
        let values = members
            .iter()
            .map(|m| decode_value(record_type, &m.value, txt_encoding))
            .collect();
        let notes = members.iter().find_map(|m| m.notes.clone());
        Self {
            name,
            record_type,
            ttl,
            values,
            notes,
            members,
        }
    }

    /// Raw records composing this set (empty for desired sets).
    #[must_use]
    pub fn members(&self) -> &[RawRecord] {
        &self.members
    }

    /// Provider ids of the raw records composing this set.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.members.iter().filter_map(|m| m.id.as_deref()).collect()
    }

    /// True if both sets have the same name and type.
    #[must_use]
    pub fn same_identity(&self, other: &RecordSet) -> bool {
        self.name == other.name && self.record_type == other.record_type
    }

    /// Check whether this (existing) set already is in the `desired` state.
    ///
    /// The ttl is only compared when `desired.ttl` is set; notes only when
    /// `compare_notes` is true and the desired set carries notes.
    #[must_use]
    pub fn satisfies(&self, desired: &RecordSet, compare_notes: bool) -> bool {
        self.same_identity(desired)
            && desired.ttl.is_none_or(|ttl| self.ttl == Some(ttl))
            && values_equal(&self.values, &desired.values)
            && (!compare_notes || desired.notes.is_none() || self.notes == desired.notes)
    }
}

impl PartialEq for RecordSet {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
            && self.ttl == other.ttl
            && values_equal(&self.values, &other.values)
            && self.notes == other.notes
    }
}

impl Eq for RecordSet {}

/// Compare two value collections as multisets.
#[must_use]
pub fn values_equal(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Group raw records into record sets.
///
/// Records sharing name and type end up in the same set, in the order the
/// provider returned them. With `split_by_ttl`, records with different TTLs
/// form separate sets. Sets are returned in order of first appearance.
///
/// `txt_encoding` is the provider's TXT wire form; it must be the same one
/// used when the sets are later lowered back to raw records.
#[must_use]
pub fn group_into_record_sets(
    records: &[RawRecord],
    zone_name: &str,
    split_by_ttl: bool,
    txt_encoding: TxtEncoding,
) -> Vec<RecordSet> {
    type GroupKey = (String, RecordType, Option<Option<u32>>);

    let mut order: Vec<GroupKey> = Vec::new();
    let mut groups: HashMap<GroupKey, Vec<RawRecord>> = HashMap::new();

    for record in records {
        let name = name_for_prefix(&record.prefix, zone_name);
        let key = (name, record.record_type, split_by_ttl.then_some(record.ttl));
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record.clone());
    }

    order
        .into_iter()
        .filter_map(|key| {
            let members = groups.remove(&key)?;
            Some(RecordSet::from_members(key.0, key.1, members, txt_encoding))
        })
        .collect()
}

/// Compute a fully-qualified record name from either `record` or `prefix`.
///
/// Exactly one of the two must be given. `prefix = ""` (or `"@"`) is the
/// zone apex.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidIdentity`] if both or neither are given, and
/// [`ConfigError::RecordOutsideZone`] if `record` is not inside the zone.
pub fn merge_identity(
    prefix: Option<&str>,
    record: Option<&str>,
    zone_name: &str,
) -> Result<String, ConfigError> {
    match (prefix, record) {
        (Some(prefix), None) => Ok(name_for_prefix(prefix, zone_name)),
        (None, Some(record)) => {
            let name = normalize_name(record);
            let zone = normalize_name(zone_name);
            if prefix_for(&name, &zone).is_some() {
                Ok(name)
            } else {
                Err(ConfigError::RecordOutsideZone { record: name, zone })
            }
        }
        (Some(_), Some(_)) => Err(ConfigError::InvalidIdentity {
            reason: "both were given".to_string(),
        }),
        (None, None) => Err(ConfigError::InvalidIdentity {
            reason: "neither was given".to_string(),
        }),
    }
}

/// Name of `name` relative to `zone_name`, or `None` if it lies outside.
///
/// The apex maps to `""`.
#[must_use]
pub fn prefix_for(name: &str, zone_name: &str) -> Option<String> {
    let name = normalize_name(name);
    let zone = normalize_name(zone_name);
    if name == zone {
        return Some(String::new());
    }
    name.strip_suffix(&format!(".{zone}"))
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
}

fn name_for_prefix(prefix: &str, zone_name: &str) -> String {
    let prefix = normalize_name(prefix);
    let zone = normalize_name(zone_name);
    if prefix.is_empty() || prefix == "@" {
        zone
    } else {
        format!("{prefix}.{zone}")
    }
}

#[cfg(test)]
#[path = "record_set_tests.rs"]
mod record_set_tests;
