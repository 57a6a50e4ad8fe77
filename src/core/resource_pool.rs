//! Per-chassis resource ledger with all-or-nothing reservations.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::chassis::ChassisProfile;
use crate::core::error::Shortfall;
use crate::core::SchedulerError;
use crate::util::serde::ResourceAmounts;

/// Exact amounts granted to one unit by one pool.
///
/// Reservations are bound to the pool instance that issued them, so a stale
/// reservation from a torn-down pool can never release capacity from its
/// replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pool_instance: Uuid,
    id: u64,
    amounts: ResourceAmounts,
}

impl Reservation {
    /// Sequence number within the issuing pool.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Granted amounts per dimension.
    pub const fn amounts(&self) -> &ResourceAmounts {
        &self.amounts
    }

    /// Granted amount on one dimension, zero if absent.
    pub fn amount(&self, dimension: &str) -> u64 {
        self.amounts.get(dimension).copied().unwrap_or(0)
    }
}

/// Ledger line for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DimensionLedger {
    total: u64,
    usable: u64,
    allocated: u64,
}

impl DimensionLedger {
    const fn available(&self) -> u64 {
        self.usable.saturating_sub(self.allocated)
    }
}

/// Read-only view of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSnapshot {
    /// Chassis capacity.
    pub total: u64,
    /// Capacity left after the overhead reserve.
    pub usable: u64,
    /// Sum of live reservations.
    pub allocated: u64,
    /// `usable - allocated`.
    pub available: u64,
}

/// Point-in-time view of a pool, safe to hand to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Chassis the pool belongs to.
    pub chassis: String,
    /// Number of memory regions of the chassis architecture.
    pub memory_regions: u32,
    /// Memory capacity of each region.
    pub memory_per_region: u64,
    /// Live reservations.
    pub outstanding_reservations: usize,
    /// Per-dimension figures.
    pub dimensions: BTreeMap<String, DimensionSnapshot>,
}

impl PoolSnapshot {
    /// Figures for one dimension.
    pub fn dimension(&self, name: &str) -> Option<&DimensionSnapshot> {
        self.dimensions.get(name)
    }
}

/// Mutable ledger of total vs. allocated capacity for one chassis instance.
///
/// Holds `allocated <= usable` for every dimension after every call, where
/// `usable` is the chassis total minus its overhead reserve.
#[derive(Debug)]
pub struct ResourcePool {
    chassis: String,
    instance: Uuid,
    memory_regions: u32,
    memory_per_region: u64,
    ledger: BTreeMap<String, DimensionLedger>,
    /// Live reservations by id. Releasing removes the entry, which makes a
    /// second release a no-op.
    outstanding: HashMap<u64, ResourceAmounts>,
    next_reservation: u64,
}

impl ResourcePool {
    /// Create an empty pool sized from a chassis profile.
    pub fn new(profile: &ChassisProfile) -> Self {
        let ledger = profile
            .dimensions()
            .into_iter()
            .map(|(name, total)| {
                let line = DimensionLedger {
                    total,
                    usable: profile.usable(total),
                    allocated: 0,
                };
                (name, line)
            })
            .collect();
        Self {
            chassis: profile.name().to_string(),
            instance: Uuid::new_v4(),
            memory_regions: profile.architecture().regions(),
            memory_per_region: profile.memory_per_region(),
            ledger,
            outstanding: HashMap::new(),
            next_reservation: 0,
        }
    }

    /// Chassis this pool belongs to.
    pub fn chassis(&self) -> &str {
        &self.chassis
    }

    /// Reserve every requested amount, or nothing at all.
    ///
    /// Unknown dimensions are reported before capacity is considered. When
    /// several dimensions fall short the error lists all of them.
    pub fn try_allocate(
        &mut self,
        requested: &ResourceAmounts,
    ) -> Result<Reservation, SchedulerError> {
        if let Some(dimension) = requested.keys().find(|d| !self.ledger.contains_key(*d)) {
            return Err(SchedulerError::UnknownDimension {
                dimension: dimension.clone(),
            });
        }

        let shortfalls: Vec<Shortfall> = requested
            .iter()
            .filter_map(|(dimension, &amount)| {
                let available = self.ledger[dimension].available();
                (amount > available).then(|| Shortfall {
                    dimension: dimension.clone(),
                    requested: amount,
                    available,
                })
            })
            .collect();

        if let Some(first) = shortfalls.first() {
            tracing::debug!(
                chassis = %self.chassis,
                dimension = %first.dimension,
                requested = first.requested,
                available = first.available,
                "allocation rejected"
            );
            return Err(SchedulerError::ResourceExhausted {
                dimension: first.dimension.clone(),
                requested: first.requested,
                available: first.available,
                shortfalls,
            });
        }

        for (dimension, &amount) in requested {
            if let Some(line) = self.ledger.get_mut(dimension) {
                line.allocated += amount;
            }
        }

        let id = self.next_reservation;
        self.next_reservation += 1;
        self.outstanding.insert(id, requested.clone());
        tracing::debug!(chassis = %self.chassis, reservation = id, "reserved {:?}", requested);

        Ok(Reservation {
            pool_instance: self.instance,
            id,
            amounts: requested.clone(),
        })
    }

    /// Return a reservation's amounts to the pool.
    ///
    /// Returns `false` when the reservation was already released or was
    /// issued by a different pool instance; nothing changes in that case.
    pub fn release(&mut self, reservation: &Reservation) -> bool {
        if reservation.pool_instance != self.instance {
            return false;
        }
        let Some(amounts) = self.outstanding.remove(&reservation.id) else {
            return false;
        };
        for (dimension, amount) in &amounts {
            if let Some(line) = self.ledger.get_mut(dimension) {
                line.allocated = line.allocated.saturating_sub(*amount);
            }
        }
        tracing::debug!(
            chassis = %self.chassis,
            reservation = reservation.id,
            "released {:?}",
            amounts
        );
        true
    }

    /// Read-only figures for every dimension.
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            chassis: self.chassis.clone(),
            memory_regions: self.memory_regions,
            memory_per_region: self.memory_per_region,
            outstanding_reservations: self.outstanding.len(),
            dimensions: self
                .ledger
                .iter()
                .map(|(name, line)| {
                    let snap = DimensionSnapshot {
                        total: line.total,
                        usable: line.usable,
                        allocated: line.allocated,
                        available: line.available(),
                    };
                    (name.clone(), snap)
                })
                .collect(),
        }
    }

    /// Currently allocated amount on one dimension.
    pub fn allocated(&self, dimension: &str) -> Option<u64> {
        self.ledger.get(dimension).map(|line| line.allocated)
    }

    /// Sum of one dimension over every live reservation.
    pub fn reserved_total(&self, dimension: &str) -> u64 {
        self.outstanding
            .values()
            .filter_map(|amounts| amounts.get(dimension))
            .sum()
    }

    /// Number of live reservations.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Whether `reservation` is still live in this pool.
    pub fn holds(&self, reservation: &Reservation) -> bool {
        reservation.pool_instance == self.instance
            && self.outstanding.contains_key(&reservation.id)
    }

    /// Compare the ledger against its own live reservations and usable limits.
    pub fn verify(&self) -> Result<(), SchedulerError> {
        for (dimension, line) in &self.ledger {
            if line.allocated > line.usable {
                return Err(self.violation(format!(
                    "{dimension}: allocated {} exceeds usable {}",
                    line.allocated, line.usable
                )));
            }
            let reserved = self.reserved_total(dimension);
            if reserved != line.allocated {
                return Err(self.violation(format!(
                    "{dimension}: ledger says {} but reservations sum to {reserved}",
                    line.allocated
                )));
            }
        }
        Ok(())
    }

    fn violation(&self, detail: String) -> SchedulerError {
        SchedulerError::InvariantViolation {
            chassis: self.chassis.clone(),
            detail,
        }
    }
}
