// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record set reconciliation engine.
//!
//! # Reconciliation Pipeline
//!
//! 1. **Resolve** - Look up the zone and merge each entry's identity into a
//!    fully-qualified name
//! 2. **Snapshot** - Fetch the zone's raw records and group them into record sets
//! 3. **Diff** - Compare desired record sets with the snapshot ([`reconcile_one`],
//!    [`reconcile_all`])
//! 4. **Apply** - Execute or simulate the resulting [`ChangeSet`] ([`apply()`])
//!
//! # Available Reconcilers
//!
//! - [`reconcile_record_set`] - One record set, `state=present` or `state=absent`
//! - [`reconcile_record_sets`] - All record sets of a zone, optionally purging the rest
//! - [`run_task`] - Dispatches a validated [`Task`] and records metrics
//!
//! # Example
//!
//! ```rust,no_run
//! use zonesync::providers::{InMemoryProvider, ProviderInformation, ZoneRef};
//! use zonesync::reconcilers::{reconcile_record_set, OnExisting, RecordSetTask};
//! use zonesync::records::{RecordState, RecordType};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = InMemoryProvider::new(ProviderInformation::hetzner())
//!     .with_zone("z1", "example.com", vec![]);
//!
//! let task = RecordSetTask {
//!     zone: ZoneRef::Name("example.com".to_string()),
//!     prefix: Some("www".to_string()),
//!     record: None,
//!     record_type: RecordType::A,
//!     ttl: Some(300),
//!     values: vec!["192.0.2.1".to_string()],
//!     notes: None,
//!     state: RecordState::Present,
//!     on_existing: OnExisting::Replace,
//!     check_mode: false,
//!     bulk_operations: true,
//! };
//!
//! let result = reconcile_record_set(&client, &task).await?;
//! assert!(result.changed);
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod record_set;
pub mod record_sets;
pub mod types;

pub use apply::apply;
pub use record_set::{apply_on_existing, reconcile_one, reconcile_record_set};
pub use record_sets::{reconcile_all, reconcile_record_sets};
pub use types::{
    ApplyOutcome, ChangeSet, Decision, DesiredRecordSet, MatchPolicy, OnExisting,
    ReconcileResult, RecordSetDiff, RecordSetEntry, RecordSetTask, RecordSetsTask,
    ResultPayload, Task,
};

use crate::dns_errors::ReconcileError;
use crate::metrics::{record_reconciliation_error, record_reconciliation_success};
use crate::providers::DnsProviderClient;
use std::time::Instant;
use tracing::error;

/// Run a validated task against a provider and record its metrics.
///
/// # Errors
///
/// Propagates any [`ReconcileError`] of the underlying reconciler.
pub async fn run_task(
    client: &dyn DnsProviderClient,
    task: &Task,
) -> Result<ReconcileResult, ReconcileError> {
    let start = Instant::now();
    let mode = task.mode();

    let result = match task {
        Task::RecordSet(task) => reconcile_record_set(client, task).await,
        Task::RecordSets(task) => reconcile_record_sets(client, task).await,
    };

    match &result {
        Ok(outcome) => record_reconciliation_success(mode, outcome.changed, start.elapsed()),
        Err(e) => {
            error!(
                mode = mode,
                provider = client.information().name,
                reason = e.reason(),
                error = %e,
                "Reconciliation failed"
            );
            record_reconciliation_error(mode, start.elapsed());
        }
    }

    result
}
