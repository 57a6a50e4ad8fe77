//! # Chassis Scheduler
//!
//! Admission control and resource accounting for logical execution units that
//! share the capacity of a biological "chassis".
//!
//! A chassis (for example `prokaryote` or `eukaryote`) describes how many
//! catalytic-synthesis units, how much memory and how much energy currency and
//! cofactor supply one execution environment has, and what fraction of it is
//! permanently held back as overhead. Units are admitted against that capacity,
//! moved through a small lifecycle, and reclaimed on teardown.
//!
//! ## Guarantees
//!
//! - **Capacity**: no dimension of a pool is ever allocated past
//!   `total - reserve`.
//! - **Conservation**: a pool's allocated figure always equals the sum of the
//!   claims of its live units.
//! - **Atomic admission**: a multi-dimension request is granted whole or not
//!   at all; rejected requests change nothing.
//! - **Serialized mutation**: the [`Hypervisor`](runtime::Hypervisor) façade
//!   runs every operation under one lock.
//!
//! ## Example
//!
//! ```rust
//! use chassis_scheduler::core::{ChassisRegistry, Scheduler, UnitState};
//! use chassis_scheduler::runtime::Hypervisor;
//! use chassis_scheduler::util::serde::{amounts, Priority, CATALYTIC_UNITS, MEMORY};
//!
//! let hv = Hypervisor::new(Scheduler::new(ChassisRegistry::builtin(), 10));
//!
//! hv.create_unit(
//!     "operon-7",
//!     "prokaryote",
//!     &amounts([(CATALYTIC_UNITS, 40), (MEMORY, 512)]),
//!     Priority(2),
//! )?;
//! assert_eq!(hv.start_unit("operon-7")?, UnitState::Running);
//!
//! let snapshot = hv.get_pool_snapshot("prokaryote")?;
//! assert_eq!(snapshot.dimension(CATALYTIC_UNITS).unwrap().available, 50);
//!
//! hv.destroy_unit("operon-7")?;
//! # Ok::<(), chassis_scheduler::core::SchedulerError>(())
//! ```
//!
//! Configuration can also come from JSON (see
//! [`SchedulerConfig`](config::SchedulerConfig)) and be turned into a ready
//! façade with [`build_hypervisor`](builders::build_hypervisor).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Chassis profiles, resource accounting, units and the scheduler.
pub mod core;
/// Configuration models for chassis and scheduling parameters.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Hypervisor façade, API models and runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
