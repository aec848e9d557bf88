// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-process zone store implementing [`DnsProviderClient`].
//!
//! Used by the test suite and for offline dry runs against a recorded zone.
//! Every mutation is appended to a call log, and a failure can be injected
//! after a given number of successful mutations to exercise partial-apply
//! handling.

use super::{DnsProviderClient, ProviderInformation, Zone, ZoneRef};
use crate::dns_errors::ProviderError;
use crate::records::{normalize_name, RawRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A zone held by [`InMemoryProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

/// One mutating call received by [`InMemoryProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Create { zone_id: String, record: RawRecord },
    Update { zone_id: String, id: String, record: RawRecord },
    Delete { zone_id: String, id: String },
    Bulk {
        zone_id: String,
        creates: usize,
        updates: usize,
        deletes: usize,
    },
}

fn not_found(provider: &str, what: &str) -> ProviderError {
    ProviderError::from_status(provider, 404, &format!("{what} not found"))
}

#[derive(Debug, Default)]
struct MemoryState {
    zones: Vec<MemoryZone>,
    next_id: u64,
    calls: Vec<ProviderCall>,
    mutations: usize,
    fail_after: Option<usize>,
}

impl MemoryState {
    fn zone_mut(
        &mut self,
        provider: &str,
        zone_id: &str,
    ) -> Result<&mut MemoryZone, ProviderError> {
        self.zones
            .iter_mut()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| not_found(provider, &format!("zone {zone_id}")))
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem-{}", self.next_id)
    }

    /// Count one mutation, failing if the injected failure point is reached.
    fn begin_mutation(&mut self, provider: &str) -> Result<(), ProviderError> {
        if self.fail_after.is_some_and(|limit| self.mutations >= limit) {
            return Err(ProviderError::from_status(provider, 500, "injected failure"));
        }
        self.mutations += 1;
        Ok(())
    }

    fn create(
        &mut self,
        provider: &str,
        zone_id: &str,
        record: &RawRecord,
    ) -> Result<String, ProviderError> {
        self.begin_mutation(provider)?;
        self.insert(provider, zone_id, record)
    }

    fn insert(
        &mut self,
        provider: &str,
        zone_id: &str,
        record: &RawRecord,
    ) -> Result<String, ProviderError> {
        let id = self.allocate_id();
        let stored = RawRecord {
            id: Some(id.clone()),
            ..record.clone()
        };
        self.zone_mut(provider, zone_id)?.records.push(stored);
        Ok(id)
    }

    fn update(
        &mut self,
        provider: &str,
        zone_id: &str,
        id: &str,
        record: &RawRecord,
    ) -> Result<(), ProviderError> {
        self.begin_mutation(provider)?;
        self.replace(provider, zone_id, id, record)
    }

    fn replace(
        &mut self,
        provider: &str,
        zone_id: &str,
        id: &str,
        record: &RawRecord,
    ) -> Result<(), ProviderError> {
        let zone = self.zone_mut(provider, zone_id)?;
        let existing = zone
            .records
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| not_found(provider, &format!("record {id}")))?;
        *existing = RawRecord {
            id: Some(id.to_string()),
            ..record.clone()
        };
        Ok(())
    }

    fn delete(&mut self, provider: &str, zone_id: &str, id: &str) -> Result<(), ProviderError> {
        self.begin_mutation(provider)?;
        self.remove(provider, zone_id, id)
    }

    fn remove(&mut self, provider: &str, zone_id: &str, id: &str) -> Result<(), ProviderError> {
        let zone = self.zone_mut(provider, zone_id)?;
        let before = zone.records.len();
        zone.records.retain(|r| r.id.as_deref() != Some(id));
        if zone.records.len() == before {
            return Err(not_found(provider, &format!("record {id}")));
        }
        Ok(())
    }

    fn apply_bulk(
        &mut self,
        provider: &str,
        zone_id: &str,
        creates: &[RawRecord],
        updates: &[RawRecord],
        deletes: &[RawRecord],
    ) -> Result<Vec<String>, ProviderError> {
        for record in deletes {
            let id = record.id.as_deref().ok_or_else(|| {
                ProviderError::other(provider, "Cannot delete a record without id")
            })?;
            self.remove(provider, zone_id, id)?;
        }
        for record in updates {
            let id = record.id.as_deref().ok_or_else(|| {
                ProviderError::other(provider, "Cannot update a record without id")
            })?;
            self.replace(provider, zone_id, id, record)?;
        }
        creates
            .iter()
            .map(|record| self.insert(provider, zone_id, record))
            .collect()
    }
}

/// In-memory DNS provider.
///
/// Behaves like the provider described by its [`ProviderInformation`]
/// (record types, notes, TXT encoding) without any network access.
#[derive(Debug)]
pub struct InMemoryProvider {
    info: ProviderInformation,
    bulk: bool,
    state: Mutex<MemoryState>,
}

impl InMemoryProvider {
    #[must_use]
    pub fn new(info: ProviderInformation) -> Self {
        Self {
            info,
            bulk: false,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Add a zone. Records without an id are assigned one.
    #[must_use]
    pub fn with_zone(self, id: &str, name: &str, records: Vec<RawRecord>) -> Self {
        {
            let mut state = self.lock();
            let records = records
                .into_iter()
                .map(|r| match r.id {
                    Some(_) => r,
                    None => {
                        let id = state.allocate_id();
                        r.with_id(id)
                    }
                })
                .collect();
            state.zones.push(MemoryZone {
                id: id.to_string(),
                name: normalize_name(name),
                records,
            });
        }
        self
    }

    /// Add several zones at once.
    #[must_use]
    pub fn with_zones(self, zones: Vec<MemoryZone>) -> Self {
        zones.into_iter().fold(self, |provider, zone| {
            provider.with_zone(&zone.id, &zone.name, zone.records)
        })
    }

    /// Offer [`DnsProviderClient::bulk_apply`].
    #[must_use]
    pub fn with_bulk(mut self, bulk: bool) -> Self {
        self.bulk = bulk;
        self
    }

    /// Fail every mutation after the first `successful` ones.
    pub fn fail_after(&self, successful: usize) {
        self.lock().fail_after = Some(successful);
    }

    /// Current raw records of a zone.
    #[must_use]
    pub fn records(&self, zone_id: &str) -> Vec<RawRecord> {
        self.lock()
            .zones
            .iter()
            .find(|z| z.id == zone_id)
            .map(|z| z.records.clone())
            .unwrap_or_default()
    }

    /// All mutating calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DnsProviderClient for InMemoryProvider {
    fn information(&self) -> &ProviderInformation {
        &self.info
    }

    async fn get_zone(&self, zone: &ZoneRef) -> Result<Zone, ProviderError> {
        let state = self.lock();
        let found = match zone {
            ZoneRef::Id(id) => state.zones.iter().find(|z| &z.id == id),
            ZoneRef::Name(name) => {
                let wanted = normalize_name(name);
                state.zones.iter().find(|z| z.name == wanted)
            }
        };
        found
            .map(|z| Zone {
                id: z.id.clone(),
                name: z.name.clone(),
            })
            .ok_or_else(|| not_found(self.info.name, &format!("zone {zone}")))
    }

    async fn fetch_zone_records(&self, zone_id: &str) -> Result<Vec<RawRecord>, ProviderError> {
        let mut state = self.lock();
        Ok(state.zone_mut(self.info.name, zone_id)?.records.clone())
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record: &RawRecord,
    ) -> Result<String, ProviderError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::Create {
            zone_id: zone_id.to_string(),
            record: record.clone(),
        });
        let id = state.create(self.info.name, zone_id, record)?;
        debug!(zone_id = %zone_id, id = %id, "Created in-memory record");
        Ok(id)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        id: &str,
        record: &RawRecord,
    ) -> Result<(), ProviderError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::Update {
            zone_id: zone_id.to_string(),
            id: id.to_string(),
            record: record.clone(),
        });
        state.update(self.info.name, zone_id, id, record)
    }

    async fn delete_record(&self, zone_id: &str, id: &str) -> Result<(), ProviderError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::Delete {
            zone_id: zone_id.to_string(),
            id: id.to_string(),
        });
        state.delete(self.info.name, zone_id, id)
    }

    fn supports_bulk(&self) -> bool {
        self.bulk
    }

    async fn bulk_apply(
        &self,
        zone_id: &str,
        creates: &[RawRecord],
        updates: &[RawRecord],
        deletes: &[RawRecord],
    ) -> Result<Vec<String>, ProviderError> {
        let provider = self.info.name;
        if !self.bulk {
            return Err(ProviderError::not_supported(provider, "bulk operations"));
        }

        let mut state = self.lock();
        state.calls.push(ProviderCall::Bulk {
            zone_id: zone_id.to_string(),
            creates: creates.len(),
            updates: updates.len(),
            deletes: deletes.len(),
        });

        // One bulk request is one mutation, and it either fully applies or not at all.
        state.begin_mutation(provider)?;
        let saved = (state.zones.clone(), state.next_id);
        let result = state.apply_bulk(provider, zone_id, creates, updates, deletes);
        if result.is_err() {
            let (zones, next_id) = saved;
            state.zones = zones;
            state.next_id = next_id;
        }
        result
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
