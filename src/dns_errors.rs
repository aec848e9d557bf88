// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for zonesync.
//!
//! This module provides specialized error types for:
//! - Desired-state validation at the configuration boundary
//! - Provider API failures (HTTP status plus message)
//! - Reconciliation failures, including partially applied change sets
//!
//! Configuration errors are always raised before any record is mutated. Provider
//! errors are propagated unchanged and are never retried by the engine.

use crate::http_errors::{map_connection_error, map_http_error_to_reason};
use crate::records::{RecordSet, RecordType};
use thiserror::Error;

/// Errors in the desired-state input.
///
/// These are detected while validating a task, before reconciliation begins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The task file could not be parsed
    #[error("Failed to parse task: {reason}")]
    Parse {
        /// Parser error message
        reason: String,
    },

    /// A record set entry gave both `record` and `prefix`, or neither
    #[error("Exactly one of 'record' or 'prefix' must be set: {reason}")]
    InvalidIdentity {
        /// Explanation of what is wrong
        reason: String,
    },

    /// `record` names a domain outside the zone
    #[error("Record '{record}' is not part of zone '{zone}'")]
    RecordOutsideZone {
        /// The fully-qualified record name
        record: String,
        /// The zone name
        zone: String,
    },

    /// `state=present` with no values
    #[error("Record set '{name}' ({record_type}) must have at least one value when state=present")]
    EmptyValues {
        /// The record name
        name: String,
        /// The record type
        record_type: RecordType,
    },

    /// Record type string is not known at all
    #[error("Unknown record type '{0}'")]
    UnknownRecordType(String),

    /// Record type is known but not supported by the selected provider
    #[error("Record type {record_type} is not supported by {provider} for this operation")]
    UnsupportedRecordType {
        /// The record type
        record_type: RecordType,
        /// Provider name
        provider: String,
    },

    /// TTL out of range
    #[error("Invalid TTL {ttl}: must be a positive number of seconds")]
    InvalidTtl {
        /// The offending TTL
        ttl: u32,
    },

    /// Notes were given for a provider that cannot store them
    #[error("Provider {provider} does not support record notes")]
    NotesNotSupported {
        /// Provider name
        provider: String,
    },

    /// The same record name and type appears twice in one bulk task
    #[error("Found multiple entries for record '{name}' and type {record_type}")]
    DuplicateEntry {
        /// The record name
        name: String,
        /// The record type
        record_type: RecordType,
    },

    /// No API token configured
    #[error("No API token configured for {provider} (set 'token' or {env_var})")]
    MissingToken {
        /// Provider name
        provider: String,
        /// Environment variable that was consulted
        env_var: String,
    },

    /// Zone selector is missing or ambiguous
    #[error("Invalid zone selection: {reason}")]
    InvalidZoneSelector {
        /// Explanation of what is wrong
        reason: String,
    },

    /// The task shape is invalid (e.g. both `record_set` and `record_sets`)
    #[error("Invalid task: {reason}")]
    InvalidTask {
        /// Explanation of what is wrong
        reason: String,
    },
}

/// Failure reported by a provider API client.
///
/// `http_status` is `None` when no HTTP response was received at all
/// (connection refused, timeout, malformed response body).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{provider} API request failed{}: {message}", status_suffix(.http_status))]
pub struct ProviderError {
    /// Provider name (`hetzner`, `hosttech`, `memory`)
    pub provider: String,
    /// HTTP status code, if a response was received
    pub http_status: Option<u16>,
    /// Human-readable error message
    pub message: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |code| format!(" (HTTP {code})"))
}

impl ProviderError {
    /// Build an error from a non-success HTTP response.
    #[must_use]
    pub fn from_status(provider: &str, status: u16, body: &str) -> Self {
        let (_, description) = map_http_error_to_reason(status);
        let message = if body.trim().is_empty() {
            description
        } else {
            format!("{description}: {}", body.trim())
        };
        Self {
            provider: provider.to_string(),
            http_status: Some(status),
            message,
        }
    }

    /// Build an error for a request that never produced a response.
    #[must_use]
    pub fn connection(provider: &str, reason: impl std::fmt::Display) -> Self {
        let (_, description) = map_connection_error();
        Self {
            provider: provider.to_string(),
            http_status: None,
            message: format!("{description}: {reason}"),
        }
    }

    /// Build an error that carries only a message.
    #[must_use]
    pub fn other(provider: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            http_status: None,
            message: message.into(),
        }
    }

    /// Build the error returned for optional capabilities a provider lacks.
    #[must_use]
    pub fn not_supported(provider: &str, operation: &str) -> Self {
        Self::other(provider, format!("{operation} is not supported"))
    }

    /// Stable reason string used for logging and metric labels.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self.http_status {
            Some(status) => map_http_error_to_reason(status).0,
            None => map_connection_error().0,
        }
    }
}

/// Top-level error returned by the reconciliation entry points.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Desired state is malformed; nothing was sent to the provider
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider failure while resolving the zone or fetching records
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// `on_existing=keep_and_fail` and the existing set differs from the desired one
    #[error("Record set '{name}' ({record_type}) already exists with different values {existing:?}; set on_existing=replace to replace it")]
    ExistingRecordMismatch {
        /// The record name
        name: String,
        /// The record type
        record_type: RecordType,
        /// Values currently stored at the provider
        existing: Vec<String>,
    },

    /// A provider operation failed while applying the change set.
    ///
    /// Operations that completed before the failure are not rolled back;
    /// `partial` describes the zone as it was left.
    #[error("Failed to apply changes: {source}")]
    Apply {
        /// The first provider error
        source: ProviderError,
        /// Zone snapshot reflecting what was actually achieved
        partial: Vec<RecordSet>,
    },
}

impl ReconcileError {
    /// Zone snapshot left behind by a failed apply, if any.
    #[must_use]
    pub fn partial_snapshot(&self) -> Option<&[RecordSet]> {
        match self {
            Self::Apply { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Returns true if the error was raised before any network activity.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Short reason string for metric labels.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigurationError",
            Self::Provider(e) | Self::Apply { source: e, .. } => e.reason(),
            Self::ExistingRecordMismatch { .. } => "ExistingRecordMismatch",
        }
    }
}
