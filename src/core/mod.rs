//! Chassis profiles, resource accounting, units and the scheduler.

pub mod audit;
pub mod chassis;
pub mod error;
pub mod resource_pool;
pub mod scheduler;
pub mod unit;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use chassis::{ArchitectureFlavor, ChassisProfile, ChassisRegistry};
pub use error::{AppResult, SchedulerError, Shortfall};
pub use resource_pool::{DimensionSnapshot, PoolSnapshot, Reservation, ResourcePool};
pub use scheduler::{Scheduler, SliceAssignment, DEFAULT_QUANTUM_TICKS};
pub use unit::{can_transition, Unit, UnitState, UnitStatus};
