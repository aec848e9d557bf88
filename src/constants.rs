// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for zonesync.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Provider API Constants
// ============================================================================

/// Base URL of the Hetzner DNS public API
pub const HETZNER_API_BASE_URL: &str = "https://dns.hetzner.com/api/v1";

/// Base URL of the Hosttech DNS JSON API
pub const HOSTTECH_API_BASE_URL: &str = "https://api.ns1.hosttech.eu/api/user/v1";

/// Header carrying the Hetzner API token
pub const HETZNER_AUTH_HEADER: &str = "Auth-API-Token";

/// Environment variable consulted when no Hetzner token is configured
pub const HETZNER_TOKEN_ENV: &str = "HETZNER_TOKEN";

/// Environment variable consulted when no Hosttech token is configured
pub const HOSTTECH_TOKEN_ENV: &str = "HOSTTECH_TOKEN";

/// Record name Hetzner uses for the zone apex
pub const HETZNER_APEX_NAME: &str = "@";

/// Page size used when listing Hetzner records
pub const HETZNER_RECORDS_PAGE_SIZE: u32 = 100;

/// Timeout for a single provider HTTP request
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Default TTL applied to Hosttech records when the task does not set one (1 hour)
pub const DEFAULT_HOSTTECH_RECORD_TTL_SECS: u32 = 3600;

/// Maximum length of a single TXT character-string (RFC 1035)
pub const TXT_CHARACTER_STRING_MAX_LEN: usize = 255;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Environment variable selecting the task file when `--config` is not given
pub const CONFIG_PATH_ENV: &str = "ZONESYNC_CONFIG";
