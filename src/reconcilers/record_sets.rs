// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bulk record set reconciliation.
//!
//! A bulk task lists every record set wanted in a zone. Each entry is
//! reconciled like a single `state=present` record set; snapshot sets matched
//! by an entry are *claimed*. With `purge`, every unclaimed set is deleted.
//! Only the provider's bulk record types take part: sets of other types are
//! filtered out of the snapshot and never touched.

use super::apply::apply;
use super::record_set::{find_match, reconcile_one};
use super::types::{
    ChangeSet, DesiredRecordSet, MatchPolicy, ReconcileResult, RecordSetDiff, RecordSetsTask,
    ResultPayload,
};
use crate::dns_errors::{ConfigError, ReconcileError};
use crate::providers::DnsProviderClient;
use crate::records::{
    group_into_record_sets, merge_identity, RecordSet, RecordState, RecordType,
};
use std::collections::HashSet;
use tracing::{debug, info};

/// Compute the change set turning `snapshot` into the `desired` list.
///
/// Deletes whose name and type collide with a create or update come first
/// in `to_delete`; everything else follows input (or snapshot) order.
///
/// # Errors
///
/// Returns [`ConfigError::DuplicateEntry`] if two entries share name and type.
pub fn reconcile_all(
    desired: &[DesiredRecordSet],
    purge: bool,
    snapshot: &[RecordSet],
    compare_notes: bool,
) -> Result<ChangeSet, ConfigError> {
    let mut seen: HashSet<(&str, RecordType)> = HashSet::new();
    for entry in desired {
        if !seen.insert((entry.set.name.as_str(), entry.set.record_type)) {
            return Err(ConfigError::DuplicateEntry {
                name: entry.set.name.clone(),
                record_type: entry.set.record_type,
            });
        }
    }

    let policy = MatchPolicy {
        match_by_content: false,
        compare_notes,
    };
    let mut claimed = vec![false; snapshot.len()];
    let mut change_set = ChangeSet::default();

    for entry in desired {
        if entry.ignore {
            for (index, existing) in snapshot.iter().enumerate() {
                if existing.same_identity(&entry.set) {
                    claimed[index] = true;
                }
            }
            debug!(
                name = %entry.set.name,
                record_type = %entry.set.record_type,
                "Ignoring record set"
            );
            continue;
        }

        if let Some(index) = find_match(&entry.set, snapshot, false) {
            claimed[index] = true;
        }
        change_set.push(reconcile_one(
            &entry.set,
            RecordState::Present,
            snapshot,
            policy,
        ));
    }

    if purge {
        let (colliding, rest): (Vec<RecordSet>, Vec<RecordSet>) = snapshot
            .iter()
            .zip(&claimed)
            .filter(|(_, claimed)| !**claimed)
            .map(|(existing, _)| existing.clone())
            .partition(|existing| {
                change_set.to_create.iter().any(|c| c.same_identity(existing))
                    || change_set
                        .to_update
                        .iter()
                        .any(|(_, d)| d.same_identity(existing))
            });
        change_set.to_delete.extend(colliding);
        change_set.to_delete.extend(rest);
    }

    Ok(change_set)
}

/// Reconcile the full list of record sets of a zone against the provider.
///
/// # Errors
///
/// Returns an error if the zone cannot be resolved, an entry is invalid for
/// the zone (outside it, duplicated), or the provider fails.
pub async fn reconcile_record_sets(
    client: &dyn DnsProviderClient,
    task: &RecordSetsTask,
) -> Result<ReconcileResult, ReconcileError> {
    let info = client.information();
    let zone = client.get_zone(&task.zone).await?;

    let desired = task
        .entries
        .iter()
        .map(|entry| {
            let name =
                merge_identity(entry.prefix.as_deref(), entry.record.as_deref(), &zone.name)?;
            if !entry.ignore && entry.values.is_empty() {
                return Err(ConfigError::EmptyValues {
                    name,
                    record_type: entry.record_type,
                });
            }
            let set = RecordSet::new(&name, entry.record_type, entry.ttl, entry.values.clone())
                .with_notes(entry.notes.clone());
            Ok(DesiredRecordSet {
                set,
                ignore: entry.ignore,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let raw_records = client.fetch_zone_records(&zone.id).await?;
    let managed: Vec<_> = raw_records
        .into_iter()
        .filter(|r| info.supports_type(r.record_type, true))
        .collect();
    let snapshot =
        group_into_record_sets(&managed, &zone.name, info.split_by_ttl, info.txt_encoding);
    debug!(
        zone = %zone.name,
        zone_id = %zone.id,
        raw_records = managed.len(),
        record_sets = snapshot.len(),
        "Fetched zone snapshot"
    );

    let change_set = reconcile_all(&desired, task.purge, &snapshot, info.supports_notes)?;
    info!(
        zone = %zone.name,
        entries = desired.len(),
        purge = task.purge,
        to_create = change_set.to_create.len(),
        to_update = change_set.to_update.len(),
        to_delete = change_set.to_delete.len(),
        check_mode = task.check_mode,
        "Reconciled record sets"
    );

    let outcome = apply(
        &change_set,
        &snapshot,
        client,
        &zone,
        task.check_mode,
        task.bulk_operations,
    )
    .await?;

    Ok(ReconcileResult {
        changed: outcome.changed,
        zone_id: zone.id,
        payload: ResultPayload::Sets(outcome.after.clone()),
        diff: RecordSetDiff {
            before: outcome.before,
            after: outcome.after,
        },
    })
}
