//! Configuration models for chassis profiles and the scheduler.

pub mod scheduler;

pub use scheduler::{ChassisConfig, SchedulerConfig, CONFIG_ENV_VAR};
