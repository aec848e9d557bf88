// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Single record set reconciliation.
//!
//! Decides what has to happen to one desired record set given the current
//! zone snapshot, and drives a complete single-set run against a provider.

use super::apply::apply;
use super::types::{
    ChangeSet, Decision, MatchPolicy, OnExisting, ReconcileResult, RecordSetDiff,
    RecordSetTask, ResultPayload,
};
use crate::dns_errors::{ConfigError, ReconcileError};
use crate::providers::DnsProviderClient;
use crate::records::{
    group_into_record_sets, merge_identity, values_equal, RecordSet, RecordState,
};
use tracing::{debug, info, warn};

/// Position of the snapshot record set `desired` refers to, if any.
///
/// Candidates share name and type with `desired`. With `match_by_content`,
/// a candidate must also carry the desired values (unless none are given) and
/// the desired ttl (if given). When several candidates remain, the first one
/// in provider order wins.
pub(crate) fn find_match(
    desired: &RecordSet,
    snapshot: &[RecordSet],
    match_by_content: bool,
) -> Option<usize> {
    let candidates: Vec<usize> = snapshot
        .iter()
        .enumerate()
        .filter(|(_, existing)| existing.same_identity(desired))
        .filter(|(_, existing)| {
            !match_by_content
                || ((desired.values.is_empty() || values_equal(&existing.values, &desired.values))
                    && desired.ttl.is_none_or(|ttl| existing.ttl == Some(ttl)))
        })
        .map(|(index, _)| index)
        .collect();

    if candidates.len() > 1 {
        warn!(
            name = %desired.name,
            record_type = %desired.record_type,
            candidates = candidates.len(),
            "Ambiguous match: several record sets share name and type, using the first one"
        );
    }
    candidates.first().copied()
}

/// Decide what has to happen to `desired` given the current `snapshot`.
///
/// - `absent`: an existing set is deleted, otherwise nothing happens.
/// - `present`: a missing set is created, a set that already satisfies
///   `desired` is left alone, anything else is replaced as a whole.
#[must_use]
pub fn reconcile_one(
    desired: &RecordSet,
    state: RecordState,
    snapshot: &[RecordSet],
    policy: MatchPolicy,
) -> Decision {
    let existing = find_match(desired, snapshot, policy.match_by_content).map(|i| &snapshot[i]);

    match (state, existing) {
        (RecordState::Absent, Some(existing)) => Decision::Delete(existing.clone()),
        (RecordState::Absent, None) => Decision::NoOp,
        (RecordState::Present, None) => Decision::Create(desired.clone()),
        (RecordState::Present, Some(existing)) => {
            if existing.satisfies(desired, policy.compare_notes) {
                Decision::NoOp
            } else {
                Decision::Update {
                    existing: existing.clone(),
                    desired: desired.clone(),
                }
            }
        }
    }
}

/// Apply the `on_existing` policy to a decision.
///
/// # Errors
///
/// Returns [`ReconcileError::ExistingRecordMismatch`] for an update under
/// [`OnExisting::KeepAndFail`].
pub fn apply_on_existing(
    decision: Decision,
    on_existing: OnExisting,
) -> Result<Decision, ReconcileError> {
    let Decision::Update { existing, desired } = decision else {
        return Ok(decision);
    };

    match on_existing {
        OnExisting::Replace => Ok(Decision::Update { existing, desired }),
        OnExisting::KeepAndFail => Err(ReconcileError::ExistingRecordMismatch {
            name: existing.name,
            record_type: existing.record_type,
            existing: existing.values,
        }),
        OnExisting::KeepAndWarn => {
            warn!(
                name = %existing.name,
                record_type = %existing.record_type,
                existing = ?existing.values,
                desired = ?desired.values,
                "Record set already exists with different content, keeping it"
            );
            Ok(Decision::NoOp)
        }
        OnExisting::Keep => Ok(Decision::NoOp),
    }
}

/// Reconcile a single record set against the provider.
///
/// # Errors
///
/// Returns an error if the zone cannot be resolved, the record name is not
/// part of the zone, the provider fails, or `on_existing=keep_and_fail`
/// refuses a change.
pub async fn reconcile_record_set(
    client: &dyn DnsProviderClient,
    task: &RecordSetTask,
) -> Result<ReconcileResult, ReconcileError> {
    if task.state == RecordState::Present && task.values.is_empty() {
        return Err(ConfigError::EmptyValues {
            name: task
                .record
                .clone()
                .or_else(|| task.prefix.clone())
                .unwrap_or_default(),
            record_type: task.record_type,
        }
        .into());
    }

    let info = client.information();
    let zone = client.get_zone(&task.zone).await?;
    let name = merge_identity(task.prefix.as_deref(), task.record.as_deref(), &zone.name)?;

    let desired = RecordSet::new(&name, task.record_type, task.ttl, task.values.clone())
        .with_notes(task.notes.clone());

    let raw_records = client.fetch_zone_records(&zone.id).await?;
    let snapshot = group_into_record_sets(
        &raw_records,
        &zone.name,
        info.split_by_ttl,
        info.txt_encoding,
    );
    debug!(
        zone = %zone.name,
        zone_id = %zone.id,
        raw_records = raw_records.len(),
        record_sets = snapshot.len(),
        "Fetched zone snapshot"
    );

    let policy = MatchPolicy {
        match_by_content: task.state == RecordState::Absent
            && (!desired.values.is_empty() || desired.ttl.is_some()),
        compare_notes: info.supports_notes,
    };
    let decision = reconcile_one(&desired, task.state, &snapshot, policy);
    let decision = apply_on_existing(decision, task.on_existing)?;

    info!(
        zone = %zone.name,
        name = %desired.name,
        record_type = %desired.record_type,
        state = ?task.state,
        decision = decision_label(&decision),
        check_mode = task.check_mode,
        "Reconciled record set"
    );

    let change_set = ChangeSet::from(decision);
    let outcome = apply(
        &change_set,
        &snapshot,
        client,
        &zone,
        task.check_mode,
        task.bulk_operations,
    )
    .await?;

    let for_desired = |sets: &[RecordSet]| -> Vec<RecordSet> {
        sets.iter()
            .filter(|s| s.same_identity(&desired))
            .cloned()
            .collect()
    };
    let before = for_desired(&outcome.before);
    let after = for_desired(&outcome.after);

    Ok(ReconcileResult {
        changed: outcome.changed,
        zone_id: zone.id,
        payload: ResultPayload::Set(after.first().cloned()),
        diff: RecordSetDiff { before, after },
    })
}

fn decision_label(decision: &Decision) -> &'static str {
    match decision {
        Decision::NoOp => "noop",
        Decision::Create(_) => "create",
        Decision::Update { .. } => "update",
        Decision::Delete(_) => "delete",
    }
}
