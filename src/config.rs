// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! YAML task files.
//!
//! A task file names a provider, a zone and either one record set
//! (`record_set`) or the complete list of record sets of the zone
//! (`record_sets`):
//!
//! ```yaml
//! provider:
//!   kind: hosttech
//!   token: secret
//! zone: foo.com
//! record_sets:
//!   purge: true
//!   records:
//!     - prefix: ""
//!       type: A
//!       value: 127.0.0.1
//!     - prefix: ""
//!       type: AAAA
//!       value: "::1"
//!     - record: old.foo.com
//!       type: TXT
//!       ignore: true
//! ```
//!
//! Two options tune how the task runs. `bulk_operations` (default `true`)
//! allows the provider's bulk endpoint. `txt_transformation` selects how TXT
//! and SPF values in the task are read:
//!
//! - `quoted` (default): zone file style character-strings (`"a" "b"`); a
//!   value without a leading quote is taken as plain text
//! - `unquoted`: plain text, quotes are part of the content
//! - `api`: the provider's own wire form
//!
//! Everything the engine relies on is checked once, here, by
//! [`TaskFile::into_task`]: identities, record types supported by the
//! provider, TTLs, notes support and non-empty values. Provider defaults
//! (such as the Hosttech default TTL) are resolved at the same time so the
//! reconcilers never consult them.

use crate::constants::{HETZNER_TOKEN_ENV, HOSTTECH_TOKEN_ENV};
use crate::dns_errors::{ConfigError, ReconcileError};
use crate::providers::memory::MemoryZone;
use crate::providers::{
    DnsProviderClient, HetznerClient, HosttechClient, InMemoryProvider, ProviderInformation,
    ZoneRef,
};
use crate::reconcilers::{OnExisting, RecordSetEntry, RecordSetTask, RecordSetsTask, Task};
use crate::records::{decode_txt, merge_identity, RecordState, RecordType, TxtEncoding};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A complete task file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    pub provider: ProviderConfig,

    /// Zone name; exclusive with `zone_id`
    #[serde(default)]
    pub zone: Option<String>,

    /// Provider zone id; exclusive with `zone`
    #[serde(default)]
    pub zone_id: Option<String>,

    /// Compute and report changes without applying them
    #[serde(default)]
    pub check_mode: bool,

    /// Use the provider's bulk endpoint when it has one
    #[serde(default = "default_bulk_operations")]
    pub bulk_operations: bool,

    /// How TXT and SPF values in this file are written
    #[serde(default)]
    pub txt_transformation: TxtTransformation,

    #[serde(default)]
    pub record_set: Option<RecordSetConfig>,

    #[serde(default)]
    pub record_sets: Option<RecordSetsConfig>,
}

fn default_bulk_operations() -> bool {
    true
}

/// How TXT and SPF values are written in a task file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxtTransformation {
    /// The provider's wire form
    Api,
    /// Quoted character-strings; unquoted text is accepted as is
    #[default]
    Quoted,
    /// Plain text
    Unquoted,
}

impl TxtTransformation {
    /// Turn a value from the task file into normalized TXT content.
    fn canonical(self, record_type: RecordType, value: &str, info: &ProviderInformation) -> String {
        if !record_type.is_text() {
            return value.to_string();
        }
        match self {
            Self::Api => info.decode_value(record_type, value),
            Self::Quoted => decode_txt(value, TxtEncoding::Quoted),
            Self::Unquoted => decode_txt(value, TxtEncoding::Unquoted),
        }
    }
}

/// Options shared by both task kinds.
#[derive(Debug, Clone, Copy)]
struct TaskOptions {
    check_mode: bool,
    bulk_operations: bool,
    txt_transformation: TxtTransformation,
}

/// Provider selection, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    Hetzner(ApiProviderConfig),
    Hosttech(ApiProviderConfig),
    /// Offline zone store, for dry runs against recorded zone contents
    Memory(MemoryProviderConfig),
}

/// Settings shared by the HTTP providers.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiProviderConfig {
    /// API token; falls back to the provider's environment variable
    #[serde(default)]
    pub token: Option<String>,

    /// Override of the API base URL
    #[serde(default)]
    pub api_url: Option<String>,
}

impl fmt::Debug for ApiProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiProviderConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Which provider the in-memory store behaves like.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFlavor {
    #[default]
    Hetzner,
    Hosttech,
}

impl ProviderFlavor {
    #[must_use]
    pub fn information(self) -> ProviderInformation {
        match self {
            Self::Hetzner => ProviderInformation::hetzner(),
            Self::Hosttech => ProviderInformation::hosttech(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryProviderConfig {
    #[serde(default)]
    pub flavor: ProviderFlavor,

    /// Offer the bulk endpoint
    #[serde(default)]
    pub bulk: bool,

    #[serde(default)]
    pub zones: Vec<MemoryZone>,
}

/// A value given either as one string or as a list.
///
/// A single string of a non-TXT type is split at commas, so
/// `value: 1.1.1.1,2.2.2.2` means two values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ValueList {
    One(String),
    Many(Vec<String>),
}

impl ValueList {
    fn into_values(self, record_type: RecordType) -> Vec<String> {
        match self {
            Self::One(value) if record_type.is_text() => vec![value],
            Self::One(value) => value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
            Self::Many(values) => values,
        }
    }
}

/// `record_set` section: one record set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSetConfig {
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub record: Option<String>,

    #[serde(rename = "type")]
    pub record_type: String,

    #[serde(default)]
    pub ttl: Option<u32>,

    #[serde(default)]
    pub value: Option<ValueList>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub state: RecordState,

    #[serde(default)]
    pub on_existing: OnExisting,
}

/// `record_sets` section: every record set wanted in the zone.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSetsConfig {
    /// Delete record sets that are not listed
    #[serde(default)]
    pub purge: bool,

    #[serde(default)]
    pub records: Vec<RecordSetEntryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSetEntryConfig {
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub record: Option<String>,

    #[serde(rename = "type")]
    pub record_type: String,

    #[serde(default)]
    pub ttl: Option<u32>,

    #[serde(default)]
    pub value: Option<ValueList>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Keep an existing record set out of purge without managing it
    #[serde(default)]
    pub ignore: bool,
}

/// Load and parse a task file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid task file.
pub fn load_task_file(path: &Path) -> anyhow::Result<TaskFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file {}", path.display()))?;
    let task_file = TaskFile::from_yaml_str(&content)
        .with_context(|| format!("Invalid task file {}", path.display()))?;
    debug!(path = %path.display(), "Loaded task file");
    Ok(task_file)
}

impl TaskFile {
    /// Parse a task file from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document does not match the task file format.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Validate the task file and resolve provider defaults.
    ///
    /// `info` must describe the provider the task will run against.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn into_task(self, info: &ProviderInformation) -> Result<Task, ConfigError> {
        let zone = match (self.zone, self.zone_id) {
            (Some(name), None) => ZoneRef::Name(name),
            (None, Some(id)) => ZoneRef::Id(id),
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidZoneSelector {
                    reason: "'zone' and 'zone_id' are mutually exclusive".to_string(),
                })
            }
            (None, None) => {
                return Err(ConfigError::InvalidZoneSelector {
                    reason: "one of 'zone' or 'zone_id' is required".to_string(),
                })
            }
        };

        let options = TaskOptions {
            check_mode: self.check_mode,
            bulk_operations: self.bulk_operations,
            txt_transformation: self.txt_transformation,
        };

        match (self.record_set, self.record_sets) {
            (Some(record_set), None) => {
                Ok(Task::RecordSet(record_set_task(record_set, zone, options, info)?))
            }
            (None, Some(record_sets)) => {
                Ok(Task::RecordSets(record_sets_task(record_sets, zone, options, info)?))
            }
            (Some(_), Some(_)) => Err(ConfigError::InvalidTask {
                reason: "'record_set' and 'record_sets' are mutually exclusive".to_string(),
            }),
            (None, None) => Err(ConfigError::InvalidTask {
                reason: "one of 'record_set' or 'record_sets' is required".to_string(),
            }),
        }
    }
}

fn check_identity(prefix: Option<&str>, record: Option<&str>) -> Result<(), ConfigError> {
    match (prefix, record) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        (Some(_), Some(_)) => Err(ConfigError::InvalidIdentity {
            reason: "both were given".to_string(),
        }),
        (None, None) => Err(ConfigError::InvalidIdentity {
            reason: "neither was given".to_string(),
        }),
    }
}

fn display_name(prefix: Option<&str>, record: Option<&str>) -> String {
    record.or(prefix).unwrap_or_default().to_string()
}

fn parse_type(
    record_type: &str,
    info: &ProviderInformation,
    bulk: bool,
) -> Result<RecordType, ConfigError> {
    let record_type: RecordType = record_type.parse()?;
    if info.supports_type(record_type, bulk) {
        Ok(record_type)
    } else {
        Err(ConfigError::UnsupportedRecordType {
            record_type,
            provider: info.name.to_string(),
        })
    }
}

fn check_ttl(ttl: Option<u32>) -> Result<(), ConfigError> {
    match ttl {
        Some(0) => Err(ConfigError::InvalidTtl { ttl: 0 }),
        _ => Ok(()),
    }
}

fn check_notes(
    notes: Option<String>,
    info: &ProviderInformation,
) -> Result<Option<String>, ConfigError> {
    let notes = notes.filter(|n| !n.is_empty());
    if notes.is_some() && !info.supports_notes {
        return Err(ConfigError::NotesNotSupported {
            provider: info.name.to_string(),
        });
    }
    Ok(notes)
}

fn task_values(
    value: Option<ValueList>,
    record_type: RecordType,
    options: TaskOptions,
    info: &ProviderInformation,
) -> Vec<String> {
    value
        .map(|v| v.into_values(record_type))
        .unwrap_or_default()
        .iter()
        .map(|v| options.txt_transformation.canonical(record_type, v, info))
        .collect()
}

fn record_set_task(
    config: RecordSetConfig,
    zone: ZoneRef,
    options: TaskOptions,
    info: &ProviderInformation,
) -> Result<RecordSetTask, ConfigError> {
    check_identity(config.prefix.as_deref(), config.record.as_deref())?;
    let record_type = parse_type(&config.record_type, info, false)?;
    check_ttl(config.ttl)?;
    let notes = check_notes(config.notes, info)?;
    let values = task_values(config.value, record_type, options, info);

    // The provider default only fills in for records that are written.
    let ttl = match config.state {
        RecordState::Present => {
            if values.is_empty() {
                return Err(ConfigError::EmptyValues {
                    name: display_name(config.prefix.as_deref(), config.record.as_deref()),
                    record_type,
                });
            }
            config.ttl.or(info.default_ttl)
        }
        RecordState::Absent => config.ttl,
    };

    Ok(RecordSetTask {
        zone,
        prefix: config.prefix,
        record: config.record,
        record_type,
        ttl,
        values,
        notes,
        state: config.state,
        on_existing: config.on_existing,
        check_mode: options.check_mode,
        bulk_operations: options.bulk_operations,
    })
}

fn record_sets_task(
    config: RecordSetsConfig,
    zone: ZoneRef,
    options: TaskOptions,
    info: &ProviderInformation,
) -> Result<RecordSetsTask, ConfigError> {
    let mut entries = Vec::with_capacity(config.records.len());

    for entry in config.records {
        check_identity(entry.prefix.as_deref(), entry.record.as_deref())?;
        let record_type = parse_type(&entry.record_type, info, true)?;
        check_ttl(entry.ttl)?;
        let notes = check_notes(entry.notes, info)?;

        let values = task_values(entry.value, record_type, options, info);
        if !entry.ignore && values.is_empty() {
            return Err(ConfigError::EmptyValues {
                name: display_name(entry.prefix.as_deref(), entry.record.as_deref()),
                record_type,
            });
        }

        entries.push(RecordSetEntry {
            prefix: entry.prefix,
            record: entry.record,
            record_type,
            ttl: if entry.ignore {
                entry.ttl
            } else {
                entry.ttl.or(info.default_ttl)
            },
            values,
            notes,
            ignore: entry.ignore,
        });
    }

    // Without a zone name, duplicates surface once the zone is resolved.
    if let ZoneRef::Name(zone_name) = &zone {
        let mut seen = HashSet::new();
        for entry in &entries {
            let name = merge_identity(entry.prefix.as_deref(), entry.record.as_deref(), zone_name)?;
            if !seen.insert((name.clone(), entry.record_type)) {
                return Err(ConfigError::DuplicateEntry {
                    name,
                    record_type: entry.record_type,
                });
            }
        }
    }

    Ok(RecordSetsTask {
        zone,
        entries,
        purge: config.purge,
        check_mode: options.check_mode,
        bulk_operations: options.bulk_operations,
    })
}

/// Pick the configured token, or the environment variable as a fallback.
fn resolve_token(
    token: Option<&str>,
    provider: &str,
    env_var: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    token
        .map(str::to_string)
        .or_else(|| lookup(env_var))
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingToken {
            provider: provider.to_string(),
            env_var: env_var.to_string(),
        })
}

impl ProviderConfig {
    /// Capabilities of the configured provider, without building a client.
    #[must_use]
    pub fn information(&self) -> ProviderInformation {
        match self {
            Self::Hetzner(_) => ProviderInformation::hetzner(),
            Self::Hosttech(_) => ProviderInformation::hosttech(),
            Self::Memory(memory) => memory.flavor.information(),
        }
    }

    /// Build the provider client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when an HTTP provider has no
    /// token, or a provider error if the HTTP client cannot be created.
    pub fn build_client(&self) -> Result<Box<dyn DnsProviderClient>, ReconcileError> {
        self.build_client_with_env(|name| std::env::var(name).ok())
    }

    pub(crate) fn build_client_with_env(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Box<dyn DnsProviderClient>, ReconcileError> {
        let client: Box<dyn DnsProviderClient> = match self {
            Self::Hetzner(api) => {
                let token =
                    resolve_token(api.token.as_deref(), "hetzner", HETZNER_TOKEN_ENV, lookup)?;
                match &api.api_url {
                    Some(url) => Box::new(HetznerClient::with_base_url(url, token)?),
                    None => Box::new(HetznerClient::new(token)?),
                }
            }
            Self::Hosttech(api) => {
                let token =
                    resolve_token(api.token.as_deref(), "hosttech", HOSTTECH_TOKEN_ENV, lookup)?;
                match &api.api_url {
                    Some(url) => Box::new(HosttechClient::with_base_url(url, token)?),
                    None => Box::new(HosttechClient::new(token)?),
                }
            }
            Self::Memory(memory) => Box::new(
                InMemoryProvider::new(memory.flavor.information())
                    .with_zones(memory.zones.clone())
                    .with_bulk(memory.bulk),
            ),
        };
        debug!(provider = client.information().name, "Built provider client");
        Ok(client)
    }
}
