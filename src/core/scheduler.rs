//! Admission control, lifecycle transitions and the time-slice loop.
//!
//! The scheduler is a plain single-owner value: every mutating method takes
//! `&mut self`, so any caller that shares it must serialize access (the
//! [`Hypervisor`](crate::runtime::Hypervisor) façade does this with one mutex).
//! Each method validates before it mutates, so a returned error always means
//! nothing changed.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::chassis::ChassisRegistry;
use crate::core::resource_pool::{PoolSnapshot, ResourcePool};
use crate::core::unit::{Unit, UnitState, UnitStatus};
use crate::core::SchedulerError;
use crate::util::clock::{now_ms, LogicalClock};
use crate::util::serde::{Priority, ResourceAmounts, UnitId};

/// Default number of logical ticks per quantum.
pub const DEFAULT_QUANTUM_TICKS: u64 = 10;

/// One time slice handed out by [`Scheduler::tick`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceAssignment {
    /// Chassis whose processing capacity the unit occupies.
    pub chassis: String,
    /// Selected unit.
    pub unit_id: UnitId,
    /// Logical tick at which the slice starts.
    pub tick: u64,
}

/// Owns the live unit table and one resource pool per chassis in use.
#[derive(Debug)]
pub struct Scheduler {
    registry: ChassisRegistry,
    pools: BTreeMap<String, ResourcePool>,
    units: HashMap<UnitId, Unit>,
    /// Current slice holder per chassis.
    occupants: BTreeMap<String, UnitId>,
    clock: LogicalClock,
}

impl Scheduler {
    /// Create a scheduler over a fixed registry.
    pub fn new(registry: ChassisRegistry, quantum_ticks: u64) -> Self {
        Self {
            registry,
            pools: BTreeMap::new(),
            units: HashMap::new(),
            occupants: BTreeMap::new(),
            clock: LogicalClock::new(quantum_ticks),
        }
    }

    /// Chassis registry the scheduler admits against.
    pub const fn registry(&self) -> &ChassisRegistry {
        &self.registry
    }

    /// Admit a new unit, claiming `requested` from its chassis pool.
    pub fn create(
        &mut self,
        unit_id: &str,
        chassis: &str,
        requested: &ResourceAmounts,
        priority: Priority,
    ) -> Result<&Unit, SchedulerError> {
        if self.units.contains_key(unit_id) {
            tracing::warn!(unit = unit_id, "admission rejected: duplicate id");
            return Err(SchedulerError::DuplicateUnit {
                unit_id: unit_id.to_string(),
            });
        }
        let profile = self.registry.lookup(chassis)?;
        if !priority.is_valid() {
            return Err(SchedulerError::InvalidPriority(priority.value()));
        }

        let pool = self
            .pools
            .entry(chassis.to_string())
            .or_insert_with(|| ResourcePool::new(profile));
        let reservation = pool.try_allocate(requested).inspect_err(|e| {
            tracing::warn!(unit = unit_id, chassis, error = %e, "admission rejected");
        })?;

        let unit = Unit::new(
            unit_id.to_string(),
            chassis.to_string(),
            priority,
            reservation,
            now_ms(),
            self.clock.now(),
        );
        tracing::info!(unit = unit_id, chassis, %priority, "unit admitted");
        Ok(self.units.entry(unit_id.to_string()).or_insert(unit))
    }

    /// `Created -> Running`.
    pub fn start(&mut self, unit_id: &str) -> Result<UnitState, SchedulerError> {
        self.transition(unit_id, UnitState::Running, UnitState::Created)
    }

    /// `Running -> Paused`.
    pub fn pause(&mut self, unit_id: &str) -> Result<UnitState, SchedulerError> {
        self.transition(unit_id, UnitState::Paused, UnitState::Running)
    }

    /// `Paused -> Running`.
    pub fn resume(&mut self, unit_id: &str) -> Result<UnitState, SchedulerError> {
        self.transition(unit_id, UnitState::Running, UnitState::Paused)
    }

    /// `Paused -> Stopped`.
    pub fn stop(&mut self, unit_id: &str) -> Result<UnitState, SchedulerError> {
        self.transition(unit_id, UnitState::Stopped, UnitState::Paused)
    }

    /// Move a unit to `Error`, recording why. The claim is kept until destroy.
    pub fn fail(&mut self, unit_id: &str, reason: &str) -> Result<UnitState, SchedulerError> {
        let unit = self.unit_mut(unit_id)?;
        unit.apply_transition(UnitState::Error)?;
        unit.set_error_reason(reason.to_string());
        tracing::warn!(unit = unit_id, reason, "unit failed");
        self.vacate(unit_id);
        Ok(UnitState::Error)
    }

    /// Release the unit's claim and drop it from the live table.
    ///
    /// Returns the `Destroyed` tombstone; the scheduler keeps no copy, so the
    /// id is immediately free for reuse.
    pub fn destroy(&mut self, unit_id: &str) -> Result<Unit, SchedulerError> {
        let Some(mut unit) = self.units.remove(unit_id) else {
            return Err(not_found(unit_id));
        };
        if let Some(pool) = self.pools.get_mut(unit.chassis()) {
            pool.release(unit.claim());
        }
        let state = unit.state();
        unit.apply_transition(UnitState::Destroyed)?;
        self.vacate(unit_id);
        tracing::info!(unit = unit_id, chassis = unit.chassis(), from = %state, "unit destroyed");
        Ok(unit)
    }

    /// Status record for a live unit.
    pub fn status(&self, unit_id: &str) -> Result<UnitStatus, SchedulerError> {
        self.unit(unit_id).map(Unit::status)
    }

    /// Borrow a live unit.
    pub fn unit(&self, unit_id: &str) -> Result<&Unit, SchedulerError> {
        self.units.get(unit_id).ok_or_else(|| not_found(unit_id))
    }

    /// Attach opaque metadata (for example a validated sequence reference).
    pub fn attach_metadata(
        &mut self,
        unit_id: &str,
        metadata: serde_json::Value,
    ) -> Result<(), SchedulerError> {
        self.unit_mut(unit_id)?.set_metadata(metadata);
        Ok(())
    }

    /// Snapshot of a chassis pool. A chassis nobody has used yet reports an
    /// empty pool.
    pub fn pool_snapshot(&self, chassis: &str) -> Result<PoolSnapshot, SchedulerError> {
        let profile = self.registry.lookup(chassis)?;
        Ok(self.pools.get(chassis).map_or_else(
            || ResourcePool::new(profile).snapshot(),
            ResourcePool::snapshot,
        ))
    }

    /// Live units on a chassis, sorted by id.
    pub fn units_on(&self, chassis: &str) -> Result<Vec<UnitStatus>, SchedulerError> {
        self.registry.lookup(chassis)?;
        let mut statuses: Vec<UnitStatus> = self
            .units
            .values()
            .filter(|u| u.chassis() == chassis)
            .map(Unit::status)
            .collect();
        statuses.sort_by(|a, b| a.unit_id.cmp(&b.unit_id));
        Ok(statuses)
    }

    /// Number of live units across all chassis.
    pub fn live_units(&self) -> usize {
        self.units.len()
    }

    /// Current logical tick.
    pub const fn clock(&self) -> u64 {
        self.clock.now()
    }

    /// Unit currently occupying a chassis, if any.
    pub fn occupant(&self, chassis: &str) -> Option<&str> {
        self.occupants.get(chassis).map(String::as_str)
    }

    /// Advance one quantum and hand each pool's slice to its next unit.
    ///
    /// Strict priority with round robin inside a priority level: among
    /// `Running` units of a pool the lowest priority value always wins, and
    /// ties go to the unit scheduled longest ago (never-scheduled first), then
    /// to the smaller id. A lower level only runs while no higher level has a
    /// `Running` unit on that pool. Resource accounting is untouched.
    pub fn tick(&mut self) -> Vec<SliceAssignment> {
        let tick = self.clock.advance();

        let mut winners: BTreeMap<&str, &Unit> = BTreeMap::new();
        for unit in self.units.values() {
            if unit.state() != UnitState::Running {
                continue;
            }
            winners
                .entry(unit.chassis())
                .and_modify(|best| {
                    if slice_order(unit) < slice_order(best) {
                        *best = unit;
                    }
                })
                .or_insert(unit);
        }
        let assignments: Vec<SliceAssignment> = winners
            .into_iter()
            .map(|(chassis, unit)| SliceAssignment {
                chassis: chassis.to_string(),
                unit_id: unit.id().to_string(),
                tick,
            })
            .collect();

        self.occupants.clear();
        for assignment in &assignments {
            if let Some(unit) = self.units.get_mut(&assignment.unit_id) {
                unit.record_slice(tick);
            }
            self.occupants
                .insert(assignment.chassis.clone(), assignment.unit_id.clone());
            tracing::debug!(
                chassis = %assignment.chassis,
                unit = %assignment.unit_id,
                tick,
                "slice granted"
            );
        }
        assignments
    }

    /// Run `quanta` consecutive ticks and return every assignment made.
    pub fn run_quanta(&mut self, quanta: u64) -> Vec<SliceAssignment> {
        (0..quanta).flat_map(|_| self.tick()).collect()
    }

    /// Destroy every live unit of a chassis and drop its pool.
    ///
    /// Returns how many units were destroyed.
    pub fn teardown_chassis(&mut self, chassis: &str) -> Result<usize, SchedulerError> {
        self.registry.lookup(chassis)?;
        let mut ids: Vec<UnitId> = self
            .units
            .values()
            .filter(|u| u.chassis() == chassis)
            .map(|u| u.id().to_string())
            .collect();
        ids.sort();
        for id in &ids {
            self.destroy(id)?;
        }
        self.pools.remove(chassis);
        self.occupants.remove(chassis);
        tracing::info!(chassis, destroyed = ids.len(), "chassis torn down");
        Ok(ids.len())
    }

    /// Verify capacity and conservation for every pool.
    ///
    /// Each pool must stay within its usable capacity, and per dimension its
    /// allocated total must equal the sum of its live units' claims.
    pub fn check_invariants(&self) -> Result<(), SchedulerError> {
        let mut claimed: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
        for unit in self.units.values() {
            let Some(pool) = self.pools.get(unit.chassis()) else {
                return Err(SchedulerError::InvariantViolation {
                    chassis: unit.chassis().to_string(),
                    detail: format!("unit {} has no pool", unit.id()),
                });
            };
            if !pool.holds(unit.claim()) {
                return Err(SchedulerError::InvariantViolation {
                    chassis: unit.chassis().to_string(),
                    detail: format!("claim of unit {} is not live in its pool", unit.id()),
                });
            }
            let sums = claimed.entry(unit.chassis()).or_default();
            for (dimension, amount) in unit.claim().amounts() {
                *sums.entry(dimension.as_str()).or_default() += amount;
            }
        }

        for (chassis, pool) in &self.pools {
            pool.verify()?;
            let snapshot = pool.snapshot();
            let sums = claimed.get(chassis.as_str());
            for (dimension, figures) in &snapshot.dimensions {
                let claim_sum = sums
                    .and_then(|s| s.get(dimension.as_str()))
                    .copied()
                    .unwrap_or(0);
                if claim_sum != figures.allocated {
                    return Err(SchedulerError::InvariantViolation {
                        chassis: chassis.clone(),
                        detail: format!(
                            "{dimension}: allocated {} but unit claims sum to {claim_sum}",
                            figures.allocated
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn transition(
        &mut self,
        unit_id: &str,
        to: UnitState,
        expected_from: UnitState,
    ) -> Result<UnitState, SchedulerError> {
        let unit = self.unit_mut(unit_id)?;
        let from = unit.state();
        // Running is reachable from two states; each verb owns exactly one edge.
        if from != expected_from {
            return Err(SchedulerError::InvalidStateTransition { from, to });
        }
        unit.apply_transition(to)?;
        tracing::info!(unit = unit_id, %from, %to, "unit transitioned");
        if to != UnitState::Running {
            self.vacate(unit_id);
        }
        Ok(to)
    }

    fn unit_mut(&mut self, unit_id: &str) -> Result<&mut Unit, SchedulerError> {
        self.units.get_mut(unit_id).ok_or_else(|| not_found(unit_id))
    }

    /// Clear any pool occupancy held by `unit_id`.
    fn vacate(&mut self, unit_id: &str) {
        self.occupants.retain(|_, occupant| occupant != unit_id);
    }
}

fn slice_order(unit: &Unit) -> (Priority, Option<u64>, &str) {
    (unit.priority(), unit.last_scheduled_at(), unit.id())
}

fn not_found(unit_id: &str) -> SchedulerError {
    SchedulerError::UnitNotFound {
        unit_id: unit_id.to_string(),
    }
}
