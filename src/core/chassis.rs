//! Chassis profiles and the read-only registry they live in.
//!
//! A chassis describes one execution-environment class: its total capacity per
//! resource dimension, how its memory is partitioned, and the overhead reserve
//! fraction that is never handed out to units. Profiles are validated once on
//! construction and never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;
use crate::util::serde::{CATALYTIC_UNITS, ENERGY_CURRENCY, MEMORY};

/// Absorbs float noise such as `100.0 * 0.1 == 10.000000000000002`.
const RESERVE_EPSILON: f64 = 1e-9;

/// Memory layout of a chassis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ArchitectureFlavor {
    /// One undivided memory region.
    SingleCompartment,
    /// Memory split evenly across a fixed number of regions.
    Compartmentalized {
        /// Number of regions, at least one.
        regions: u32,
    },
}

impl ArchitectureFlavor {
    /// Number of memory regions.
    pub const fn regions(self) -> u32 {
        match self {
            Self::SingleCompartment => 1,
            Self::Compartmentalized { regions } => regions,
        }
    }
}

/// Immutable capacity description of one chassis class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChassisProfile {
    name: String,
    max_catalytic_units: u64,
    max_memory: u64,
    architecture: ArchitectureFlavor,
    overhead_reserve_fraction: f64,
    extra_dimensions: BTreeMap<String, u64>,
}

impl ChassisProfile {
    /// Validate and build a profile with no extra dimensions.
    pub fn new(
        name: impl Into<String>,
        max_catalytic_units: u64,
        max_memory: u64,
        architecture: ArchitectureFlavor,
        overhead_reserve_fraction: f64,
    ) -> Result<Self, SchedulerError> {
        Self::with_dimensions(
            name,
            max_catalytic_units,
            max_memory,
            architecture,
            overhead_reserve_fraction,
            BTreeMap::new(),
        )
    }

    /// Validate and build a profile that also tracks extra named dimensions
    /// (energy currency, cofactors).
    pub fn with_dimensions(
        name: impl Into<String>,
        max_catalytic_units: u64,
        max_memory: u64,
        architecture: ArchitectureFlavor,
        overhead_reserve_fraction: f64,
        extra_dimensions: BTreeMap<String, u64>,
    ) -> Result<Self, SchedulerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchedulerError::InvalidConfig(
                "chassis name must not be empty".into(),
            ));
        }
        if !overhead_reserve_fraction.is_finite()
            || !(0.0..1.0).contains(&overhead_reserve_fraction)
        {
            return Err(SchedulerError::InvalidConfig(format!(
                "chassis `{name}`: overhead_reserve_fraction must be in [0, 1), got {overhead_reserve_fraction}"
            )));
        }
        if architecture.regions() == 0 {
            return Err(SchedulerError::InvalidConfig(format!(
                "chassis `{name}`: compartmentalized architecture needs at least one region"
            )));
        }
        for dimension in extra_dimensions.keys() {
            if dimension.trim().is_empty() {
                return Err(SchedulerError::InvalidConfig(format!(
                    "chassis `{name}`: dimension names must not be empty"
                )));
            }
            if dimension == CATALYTIC_UNITS || dimension == MEMORY {
                return Err(SchedulerError::InvalidConfig(format!(
                    "chassis `{name}`: `{dimension}` is a built-in dimension"
                )));
            }
        }
        Ok(Self {
            name,
            max_catalytic_units,
            max_memory,
            architecture,
            overhead_reserve_fraction,
            extra_dimensions,
        })
    }

    /// Registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total catalytic-synthesis units.
    pub const fn max_catalytic_units(&self) -> u64 {
        self.max_catalytic_units
    }

    /// Total memory, in abstract units.
    pub const fn max_memory(&self) -> u64 {
        self.max_memory
    }

    /// Memory layout.
    pub const fn architecture(&self) -> ArchitectureFlavor {
        self.architecture
    }

    /// Fraction of every dimension withheld from allocation.
    pub const fn overhead_reserve_fraction(&self) -> f64 {
        self.overhead_reserve_fraction
    }

    /// Dimensions tracked beyond catalytic units and memory.
    pub const fn extra_dimensions(&self) -> &BTreeMap<String, u64> {
        &self.extra_dimensions
    }

    /// Memory capacity of a single region.
    pub fn memory_per_region(&self) -> u64 {
        self.max_memory / u64::from(self.architecture.regions())
    }

    /// Full pool schema: built-in dimensions plus extras, with their totals.
    pub fn dimensions(&self) -> BTreeMap<String, u64> {
        let mut dims = self.extra_dimensions.clone();
        dims.insert(CATALYTIC_UNITS.to_string(), self.max_catalytic_units);
        dims.insert(MEMORY.to_string(), self.max_memory);
        dims
    }

    /// Amount of `total` held back as overhead reserve, rounded up to whole units.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn reserve(&self, total: u64) -> u64 {
        let raw = total as f64 * self.overhead_reserve_fraction;
        let reserved = (raw - RESERVE_EPSILON).ceil().max(0.0) as u64;
        reserved.min(total)
    }

    /// Largest amount of `total` that may ever be allocated.
    pub fn usable(&self, total: u64) -> u64 {
        total - self.reserve(total)
    }
}

/// Read-only lookup of chassis profiles by name.
#[derive(Debug, Clone, Default)]
pub struct ChassisRegistry {
    profiles: BTreeMap<String, ChassisProfile>,
}

impl ChassisRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(
        profiles: impl IntoIterator<Item = ChassisProfile>,
    ) -> Result<Self, SchedulerError> {
        let mut map = BTreeMap::new();
        for profile in profiles {
            let name = profile.name().to_string();
            if map.insert(name.clone(), profile).is_some() {
                return Err(SchedulerError::InvalidConfig(format!(
                    "chassis `{name}` registered twice"
                )));
            }
        }
        Ok(Self { profiles: map })
    }

    /// Registry of the stock chassis classes.
    pub fn builtin() -> Self {
        let profiles = builtin_profiles()
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();
        Self { profiles }
    }

    /// Look a profile up by name.
    pub fn lookup(&self, name: &str) -> Result<&ChassisProfile, SchedulerError> {
        self.profiles
            .get(name)
            .ok_or_else(|| SchedulerError::ChassisNotFound {
                name: name.to_string(),
            })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }
}

fn cofactors(energy: u64, nadh: u64, coenzyme_a: u64) -> BTreeMap<String, u64> {
    BTreeMap::from([
        (ENERGY_CURRENCY.to_string(), energy),
        ("nadh".to_string(), nadh),
        ("coenzyme_a".to_string(), coenzyme_a),
    ])
}

fn builtin_profiles() -> Vec<ChassisProfile> {
    vec![
        ChassisProfile {
            name: "minimal".into(),
            max_catalytic_units: 64,
            max_memory: 512,
            architecture: ArchitectureFlavor::SingleCompartment,
            overhead_reserve_fraction: 0.1,
            extra_dimensions: cofactors(100, 200, 100),
        },
        ChassisProfile {
            name: "prokaryote".into(),
            max_catalytic_units: 100,
            max_memory: 4096,
            architecture: ArchitectureFlavor::SingleCompartment,
            overhead_reserve_fraction: 0.1,
            extra_dimensions: cofactors(100, 1000, 500),
        },
        ChassisProfile {
            name: "eukaryote".into(),
            max_catalytic_units: 400,
            max_memory: 16384,
            architecture: ArchitectureFlavor::Compartmentalized { regions: 4 },
            overhead_reserve_fraction: 0.15,
            extra_dimensions: cofactors(100, 4000, 2000),
        },
    ]
}
