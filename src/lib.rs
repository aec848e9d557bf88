// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # zonesync - declarative DNS record set reconciliation
//!
//! zonesync keeps the contents of a DNS zone hosted at a third-party provider
//! (Hetzner DNS, Hosttech DNS) in line with a declarative description of the
//! record sets that should exist.
//!
//! ## Overview
//!
//! A reconciliation run always follows the same pipeline:
//!
//! 1. Load and validate a task ([`config`])
//! 2. Fetch the zone's current records from the provider ([`providers`])
//! 3. Normalize values and group raw records into record sets ([`records`])
//! 4. Diff the desired record sets against the snapshot ([`reconcilers`])
//! 5. Apply (or, in check mode, simulate) the resulting change set
//!
//! ## Modules
//!
//! - [`records`] - Record types, value normalization and the record set model
//! - [`reconcilers`] - Single and bulk reconcilers plus the change applier
//! - [`providers`] - Provider client trait and the Hetzner/Hosttech/in-memory clients
//! - [`config`] - YAML task files and boundary validation
//! - [`dns_errors`] - Error types
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use zonesync::config::TaskFile;
//! use zonesync::reconcilers::run_task;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let task_file = TaskFile::from_yaml_str(
//!     r#"
//! provider:
//!   kind: hetzner
//!   token: secret
//! zone: foo.com
//! record_set:
//!   record: new.foo.com
//!   type: A
//!   ttl: 7200
//!   value: 1.1.1.1,2.2.2.2,3.3.3.3
//! "#,
//! )?;
//!
//! let client = task_file.provider.build_client()?;
//! let task = task_file.into_task(client.information())?;
//! let result = run_task(client.as_ref(), &task).await?;
//! println!("changed: {}", result.changed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod dns_errors;
pub mod http_errors;
pub mod metrics;
pub mod providers;
pub mod reconcilers;
pub mod records;

#[cfg(test)]
mod dns_errors_tests;
#[cfg(test)]
mod http_errors_tests;
