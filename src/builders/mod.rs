//! Builders that turn configuration into scheduler components.

pub mod hypervisor_builder;

pub use hypervisor_builder::{build_hypervisor, build_registry, build_scheduler};
