// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use zonesync::config::TaskFile;
use zonesync::dns_errors::ReconcileError;
use zonesync::providers::{DnsProviderClient, InMemoryProvider, ProviderInformation};
use zonesync::reconcilers::{run_task, ReconcileResult};
use zonesync::records::{group_into_record_sets, RawRecord, RecordSet, RecordType};

pub const ZONE: &str = "foo.com";
pub const ZONE_ID: &str = "z1";

/// A raw record without id; the in-memory provider assigns one.
pub fn raw(prefix: &str, record_type: RecordType, ttl: Option<u32>, value: &str) -> RawRecord {
    RawRecord::new(prefix, record_type, ttl, value)
}

/// In-memory provider holding `foo.com` with the given records.
pub fn provider(info: ProviderInformation, records: Vec<RawRecord>) -> InMemoryProvider {
    InMemoryProvider::new(info).with_zone(ZONE_ID, ZONE, records)
}

/// Current record sets of the test zone.
pub fn zone_sets(provider: &InMemoryProvider) -> Vec<RecordSet> {
    group_into_record_sets(
        &provider.records(ZONE_ID),
        ZONE,
        provider.information().split_by_ttl,
        provider.information().txt_encoding,
    )
}

/// Parse a task body (everything below `zone:`) and run it against `provider`.
pub async fn run_yaml(
    provider: &InMemoryProvider,
    body: &str,
) -> Result<ReconcileResult, ReconcileError> {
    let yaml = format!("provider:\n  kind: memory\nzone: {ZONE}\n{body}");
    let task = TaskFile::from_yaml_str(&yaml)?.into_task(provider.information())?;
    run_task(provider, &task).await
}
