// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Change set application.
//!
//! Record set level changes are lowered to raw record operations before they
//! are sent to the provider. For an update, raw records that already carry a
//! wanted value are kept (their ttl or notes are fixed in place if needed),
//! the remaining raw records are re-pointed to the remaining wanted values,
//! surplus raw records are deleted and missing values are created.
//!
//! Operations run in a fixed order: deletes, then updates, then creates. If
//! bulk operations are enabled, the provider has a bulk endpoint and more
//! than one update or create is pending, the updates are sent in one bulk
//! call and the creates in another.
//!
//! A raw record model of the zone is kept in step with every successful
//! operation. In check mode no operation is sent and the model alone yields
//! the `after` snapshot. When an operation fails, nothing is rolled back and
//! the model at that point is reported as the partial snapshot.

use super::types::{ApplyOutcome, ChangeSet};
use crate::dns_errors::{ConfigError, ProviderError, ReconcileError};
use crate::metrics::{record_operation, record_set_changes};
use crate::providers::{DnsProviderClient, ProviderInformation, Zone};
use crate::records::{group_into_record_sets, prefix_for, RawRecord, RecordSet};
use tracing::{debug, info};

/// Raw record operations implementing a [`ChangeSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawPlan {
    pub deletes: Vec<RawRecord>,
    /// `(current, replacement)` pairs; the replacement keeps the current id
    pub updates: Vec<(RawRecord, RawRecord)>,
    pub creates: Vec<RawRecord>,
}

impl RawPlan {
    /// Lower a change set to raw record operations.
    pub(crate) fn lower(
        change_set: &ChangeSet,
        zone: &Zone,
        info: &ProviderInformation,
    ) -> Result<Self, ConfigError> {
        let mut plan = Self::default();

        for existing in &change_set.to_delete {
            plan.deletes.extend(members_of(existing, zone, info)?);
        }
        for (existing, desired) in &change_set.to_update {
            plan.lower_update(existing, desired, zone, info)?;
        }
        for desired in &change_set.to_create {
            let prefix = prefix_of(desired, zone)?;
            plan.creates.extend(desired.values.iter().map(|value| {
                RawRecord::new(
                    &prefix,
                    desired.record_type,
                    desired.ttl,
                    &info.encode_value(desired.record_type, value),
                )
                .with_notes(desired.notes.clone())
            }));
        }

        Ok(plan)
    }

    fn lower_update(
        &mut self,
        existing: &RecordSet,
        desired: &RecordSet,
        zone: &Zone,
        info: &ProviderInformation,
    ) -> Result<(), ConfigError> {
        let record_type = desired.record_type;
        let notes_for = |current: Option<&String>| {
            if info.supports_notes {
                desired.notes.clone().or_else(|| current.cloned())
            } else {
                None
            }
        };

        let mut wanted: Vec<&String> = desired.values.iter().collect();
        let mut unmatched = Vec::new();

        for member in members_of(existing, zone, info)? {
            let canonical = info.decode_value(record_type, &member.value);
            let ttl = desired.ttl.or(member.ttl);
            let notes = notes_for(member.notes.as_ref());

            if let Some(position) = wanted.iter().position(|v| **v == canonical) {
                wanted.remove(position);
                if member.ttl != ttl || member.notes != notes {
                    let replacement = RawRecord {
                        ttl,
                        notes,
                        ..member.clone()
                    };
                    self.updates.push((member, replacement));
                }
            } else {
                unmatched.push(member);
            }
        }

        let mut wanted = wanted.into_iter();
        for member in unmatched {
            match wanted.next() {
                Some(value) => {
                    let replacement = RawRecord {
                        ttl: desired.ttl.or(member.ttl),
                        notes: notes_for(member.notes.as_ref()),
                        value: info.encode_value(record_type, value),
                        ..member.clone()
                    };
                    self.updates.push((member, replacement));
                }
                None => self.deletes.push(member),
            }
        }

        let prefix = prefix_of(desired, zone)?;
        for value in wanted {
            self.creates.push(
                RawRecord::new(
                    &prefix,
                    record_type,
                    desired.ttl.or(existing.ttl),
                    &info.encode_value(record_type, value),
                )
                .with_notes(notes_for(existing.notes.as_ref())),
            );
        }

        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.updates.is_empty() && self.creates.is_empty()
    }
}

fn prefix_of(set: &RecordSet, zone: &Zone) -> Result<String, ConfigError> {
    prefix_for(&set.name, &zone.name).ok_or_else(|| ConfigError::RecordOutsideZone {
        record: set.name.clone(),
        zone: zone.name.clone(),
    })
}

/// Raw records of a set. Sets built by hand (no members) get synthesized ones.
fn members_of(
    set: &RecordSet,
    zone: &Zone,
    info: &ProviderInformation,
) -> Result<Vec<RawRecord>, ConfigError> {
    if !set.members().is_empty() {
        return Ok(set.members().to_vec());
    }
    let prefix = prefix_of(set, zone)?;
    Ok(set
        .values
        .iter()
        .map(|value| {
            RawRecord::new(
                &prefix,
                set.record_type,
                set.ttl,
                &info.encode_value(set.record_type, value),
            )
            .with_notes(set.notes.clone())
        })
        .collect())
}

fn same_record(a: &RawRecord, b: &RawRecord) -> bool {
    match (&a.id, &b.id) {
        (Some(x), Some(y)) => x == y,
        _ => a.prefix == b.prefix && a.record_type == b.record_type && a.value == b.value,
    }
}

/// Zone model maintained while a plan executes.
struct ZoneModel<'a> {
    records: Vec<RawRecord>,
    zone: &'a Zone,
    info: &'a ProviderInformation,
}

impl ZoneModel<'_> {
    fn remove(&mut self, record: &RawRecord) {
        if let Some(position) = self.records.iter().position(|r| same_record(r, record)) {
            self.records.remove(position);
        }
    }

    fn replace(&mut self, current: &RawRecord, replacement: RawRecord) {
        match self.records.iter_mut().find(|r| same_record(r, current)) {
            Some(slot) => *slot = replacement,
            None => self.records.push(replacement),
        }
    }

    fn snapshot(&self) -> Vec<RecordSet> {
        group_into_record_sets(
            &self.records,
            &self.zone.name,
            self.info.split_by_ttl,
            self.info.txt_encoding,
        )
    }

    fn failed(&self, source: ProviderError) -> ReconcileError {
        ReconcileError::Apply {
            source,
            partial: self.snapshot(),
        }
    }
}

fn require_id<'r>(record: &'r RawRecord, provider: &str) -> Result<&'r str, ProviderError> {
    record.id.as_deref().ok_or_else(|| {
        ProviderError::other(
            provider,
            format!(
                "{} record '{}' has no provider id",
                record.record_type, record.prefix
            ),
        )
    })
}

/// Apply (or, in check mode, simulate) a change set.
///
/// `before` must be the snapshot the change set was computed from. With
/// `bulk_operations` off, the provider's bulk endpoint is never used.
///
/// # Errors
///
/// Returns [`ReconcileError::Apply`] with the partial snapshot if a provider
/// operation fails, and [`ReconcileError::Config`] if a record set lies
/// outside the zone.
pub async fn apply(
    change_set: &ChangeSet,
    before: &[RecordSet],
    client: &dyn DnsProviderClient,
    zone: &Zone,
    check_mode: bool,
    bulk_operations: bool,
) -> Result<ApplyOutcome, ReconcileError> {
    let info = client.information();
    let changed = !change_set.is_empty();

    record_set_changes("create", change_set.to_create.len(), check_mode);
    record_set_changes("update", change_set.to_update.len(), check_mode);
    record_set_changes("delete", change_set.to_delete.len(), check_mode);

    if !changed {
        return Ok(ApplyOutcome {
            changed,
            before: before.to_vec(),
            after: before.to_vec(),
        });
    }

    let plan = RawPlan::lower(change_set, zone, info)?;
    let mut records = Vec::new();
    for set in before {
        records.extend(members_of(set, zone, info)?);
    }
    let mut model = ZoneModel {
        records,
        zone,
        info,
    };

    info!(
        zone = %zone.name,
        zone_id = %zone.id,
        deletes = plan.deletes.len(),
        updates = plan.updates.len(),
        creates = plan.creates.len(),
        check_mode = check_mode,
        "Applying changes"
    );

    if !plan.is_empty() {
        execute(&plan, client, &mut model, check_mode, bulk_operations).await?;
    }

    Ok(ApplyOutcome {
        changed,
        before: before.to_vec(),
        after: model.snapshot(),
    })
}

async fn execute(
    plan: &RawPlan,
    client: &dyn DnsProviderClient,
    model: &mut ZoneModel<'_>,
    check_mode: bool,
    bulk_operations: bool,
) -> Result<(), ReconcileError> {
    let provider = model.info.name;
    let zone_id = model.zone.id.clone();

    for record in &plan.deletes {
        if !check_mode {
            let id = require_id(record, provider).map_err(|e| model.failed(e))?;
            client
                .delete_record(&zone_id, id)
                .await
                .map_err(|e| model.failed(e))?;
            record_operation(provider, "delete");
        }
        debug!(
            prefix = %record.prefix,
            record_type = %record.record_type,
            value = %record.value,
            "Deleted record"
        );
        model.remove(record);
    }

    let pending = plan.updates.len() + plan.creates.len();
    if !check_mode && bulk_operations && client.supports_bulk() && pending > 1 {
        return execute_bulk(plan, client, model).await;
    }

    for (current, replacement) in &plan.updates {
        if !check_mode {
            let id = require_id(current, provider).map_err(|e| model.failed(e))?;
            client
                .update_record(&zone_id, id, replacement)
                .await
                .map_err(|e| model.failed(e))?;
            record_operation(provider, "update");
        }
        debug!(
            prefix = %replacement.prefix,
            record_type = %replacement.record_type,
            value = %replacement.value,
            "Updated record"
        );
        model.replace(current, replacement.clone());
    }

    for record in &plan.creates {
        let mut created = record.clone();
        if !check_mode {
            let id = client
                .create_record(&zone_id, record)
                .await
                .map_err(|e| model.failed(e))?;
            record_operation(provider, "create");
            created = created.with_id(id);
        }
        debug!(
            prefix = %record.prefix,
            record_type = %record.record_type,
            value = %record.value,
            "Created record"
        );
        model.records.push(created);
    }

    Ok(())
}

/// Send updates and creates through the bulk endpoint, one call each.
///
/// The model advances after every call, so a failing create call still
/// reports the updates that went through.
async fn execute_bulk(
    plan: &RawPlan,
    client: &dyn DnsProviderClient,
    model: &mut ZoneModel<'_>,
) -> Result<(), ReconcileError> {
    let provider = model.info.name;
    let zone_id = model.zone.id.clone();

    if !plan.updates.is_empty() {
        let updates: Vec<RawRecord> = plan.updates.iter().map(|(_, r)| r.clone()).collect();
        client
            .bulk_apply(&zone_id, &[], &updates, &[])
            .await
            .map_err(|e| model.failed(e))?;
        record_operation(provider, "bulk_update");
        for (current, replacement) in &plan.updates {
            model.replace(current, replacement.clone());
        }
        debug!(count = updates.len(), "Bulk-updated records");
    }

    if !plan.creates.is_empty() {
        let ids = client
            .bulk_apply(&zone_id, &plan.creates, &[], &[])
            .await
            .map_err(|e| model.failed(e))?;
        record_operation(provider, "bulk_create");
        if ids.len() != plan.creates.len() {
            return Err(model.failed(ProviderError::other(
                provider,
                format!(
                    "Bulk create returned {} id(s) for {} record(s)",
                    ids.len(),
                    plan.creates.len()
                ),
            )));
        }
        for (record, id) in plan.creates.iter().zip(ids) {
            model.records.push(record.clone().with_id(id));
        }
        debug!(count = plan.creates.len(), "Bulk-created records");
    }

    Ok(())
}
