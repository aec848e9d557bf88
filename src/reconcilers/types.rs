// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Types used in record set reconciliation.

use crate::providers::ZoneRef;
use crate::records::{RecordSet, RecordState, RecordType};
use serde::{Deserialize, Serialize};

/// Outcome of reconciling one desired record set against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do
    NoOp,
    /// The record set does not exist yet
    Create(RecordSet),
    /// The existing record set is replaced by the desired one
    Update {
        existing: RecordSet,
        desired: RecordSet,
    },
    /// The existing record set is removed
    Delete(RecordSet),
}

/// Record set level changes computed by the reconcilers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub to_create: Vec<RecordSet>,
    /// `(existing, desired)` pairs
    pub to_update: Vec<(RecordSet, RecordSet)>,
    pub to_delete: Vec<RecordSet>,
}

impl ChangeSet {
    /// Returns true if applying this change set would not modify anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Total number of record set changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }

    /// Add a decision to the matching list.
    pub fn push(&mut self, decision: Decision) {
        match decision {
            Decision::NoOp => {}
            Decision::Create(desired) => self.to_create.push(desired),
            Decision::Update { existing, desired } => self.to_update.push((existing, desired)),
            Decision::Delete(existing) => self.to_delete.push(existing),
        }
    }
}

impl From<Decision> for ChangeSet {
    fn from(decision: Decision) -> Self {
        let mut change_set = Self::default();
        change_set.push(decision);
        change_set
    }
}

/// What to do when a record set already exists with different content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnExisting {
    /// Replace the existing record set
    #[default]
    Replace,
    /// Leave it alone and fail
    KeepAndFail,
    /// Leave it alone and log a warning
    KeepAndWarn,
    /// Leave it alone silently
    Keep,
}

/// How [`reconcile_one`](super::reconcile_one) matches and compares record sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Only match existing sets whose values (and ttl, if given) equal the
    /// desired ones. Used for `state=absent` with explicit values.
    pub match_by_content: bool,
    /// Compare notes (providers that store notes)
    pub compare_notes: bool,
}

/// A single record set task, validated at the configuration boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetTask {
    pub zone: ZoneRef,
    /// Name relative to the zone; exclusive with `record`
    pub prefix: Option<String>,
    /// Fully-qualified name; exclusive with `prefix`
    pub record: Option<String>,
    pub record_type: RecordType,
    /// Already resolved against the provider default
    pub ttl: Option<u32>,
    pub values: Vec<String>,
    pub notes: Option<String>,
    pub state: RecordState,
    pub on_existing: OnExisting,
    pub check_mode: bool,
    /// Allow the provider's bulk endpoint
    pub bulk_operations: bool,
}

/// One entry of a bulk task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetEntry {
    pub prefix: Option<String>,
    pub record: Option<String>,
    pub record_type: RecordType,
    pub ttl: Option<u32>,
    pub values: Vec<String>,
    pub notes: Option<String>,
    /// Protect the existing record set from purge without managing it
    pub ignore: bool,
}

/// A bulk task: the complete list of record sets wanted in a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetsTask {
    pub zone: ZoneRef,
    pub entries: Vec<RecordSetEntry>,
    /// Delete record sets not listed in `entries`
    pub purge: bool,
    pub check_mode: bool,
    /// Allow the provider's bulk endpoint
    pub bulk_operations: bool,
}

/// A validated task of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    RecordSet(RecordSetTask),
    RecordSets(RecordSetsTask),
}

impl Task {
    /// Mode label used in logs and metrics.
    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            Self::RecordSet(_) => "record_set",
            Self::RecordSets(_) => "record_sets",
        }
    }
}

/// A desired record set in a bulk reconciliation, with its identity merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecordSet {
    pub set: RecordSet,
    pub ignore: bool,
}

/// Result of applying (or simulating) a change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub changed: bool,
    pub before: Vec<RecordSet>,
    pub after: Vec<RecordSet>,
}

/// Before and after views of the reconciled record sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordSetDiff {
    pub before: Vec<RecordSet>,
    pub after: Vec<RecordSet>,
}

/// Record set payload of a [`ReconcileResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultPayload {
    /// The managed record set after reconciliation (`None` if absent)
    Set(Option<RecordSet>),
    /// All managed record sets of the zone after reconciliation
    Sets(Vec<RecordSet>),
}

/// Result payload returned by the entry points and printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    pub changed: bool,
    pub zone_id: String,
    #[serde(flatten)]
    pub payload: ResultPayload,
    pub diff: RecordSetDiff,
}
