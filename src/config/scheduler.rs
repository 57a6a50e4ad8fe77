//! Scheduler and chassis configuration structures.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, ArchitectureFlavor, ChassisProfile, ChassisRegistry, SchedulerError};
use crate::core::DEFAULT_QUANTUM_TICKS;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "CHASSIS_SCHEDULER_CONFIG";

const DEFAULT_AUDIT_CAPACITY: usize = 1024;

const fn default_quantum_ticks() -> u64 {
    DEFAULT_QUANTUM_TICKS
}

const fn default_audit_capacity() -> usize {
    DEFAULT_AUDIT_CAPACITY
}

const fn default_architecture() -> ArchitectureFlavor {
    ArchitectureFlavor::SingleCompartment
}

/// Capacity description of one chassis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChassisConfig {
    /// Total catalytic-synthesis units.
    pub max_catalytic_units: u64,
    /// Total memory, abstract units.
    pub max_memory: u64,
    /// Memory layout.
    #[serde(default = "default_architecture")]
    pub architecture: ArchitectureFlavor,
    /// Fraction of each dimension withheld from allocation, in `[0, 1)`.
    pub overhead_reserve_fraction: f64,
    /// Extra dimensions (energy currency, cofactors) and their totals.
    #[serde(default)]
    pub dimensions: BTreeMap<String, u64>,
}

impl ChassisConfig {
    /// Build the immutable profile this entry describes.
    pub fn to_profile(&self, name: &str) -> Result<ChassisProfile, SchedulerError> {
        ChassisProfile::with_dimensions(
            name,
            self.max_catalytic_units,
            self.max_memory,
            self.architecture,
            self.overhead_reserve_fraction,
            self.dimensions.clone(),
        )
    }
}

impl From<&ChassisProfile> for ChassisConfig {
    fn from(profile: &ChassisProfile) -> Self {
        Self {
            max_catalytic_units: profile.max_catalytic_units(),
            max_memory: profile.max_memory(),
            architecture: profile.architecture(),
            overhead_reserve_fraction: profile.overhead_reserve_fraction(),
            dimensions: profile.extra_dimensions().clone(),
        }
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Map of chassis name to capacity description.
    pub chassis: HashMap<String, ChassisConfig>,
    /// Logical ticks per scheduling quantum.
    #[serde(default = "default_quantum_ticks")]
    pub quantum_ticks: u64,
    /// Events retained by the in-memory audit sink.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

impl Default for SchedulerConfig {
    /// The stock chassis classes with default scheduling parameters.
    fn default() -> Self {
        let registry = ChassisRegistry::builtin();
        let chassis = registry
            .names()
            .into_iter()
            .filter_map(|name| {
                let cfg = registry.lookup(&name).ok().map(ChassisConfig::from)?;
                Some((name, cfg))
            })
            .collect();
        Self {
            chassis,
            quantum_ticks: DEFAULT_QUANTUM_TICKS,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    /// Validate all chassis and ensure at least one exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.chassis.is_empty() {
            return Err("at least one chassis must be defined".into());
        }
        if self.quantum_ticks == 0 {
            return Err("quantum_ticks must be greater than 0".into());
        }
        for (name, chassis) in &self.chassis {
            chassis
                .to_profile(name)
                .map_err(|e| format!("chassis `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&raw)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("loading config {}", path.display()))
    }

    /// Load `.env`, then read the file named by [`CONFIG_ENV_VAR`]; fall back to
    /// [`SchedulerConfig::default`] when the variable is unset.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_file(path),
            Err(_) => {
                tracing::debug!("{CONFIG_ENV_VAR} unset, using built-in chassis registry");
                Ok(Self::default())
            }
        }
    }

    /// Build the chassis registry this configuration describes.
    pub fn to_registry(&self) -> Result<ChassisRegistry, SchedulerError> {
        let profiles = self
            .chassis
            .iter()
            .map(|(name, cfg)| cfg.to_profile(name))
            .collect::<Result<Vec<_>, _>>()?;
        ChassisRegistry::new(profiles)
    }
}
