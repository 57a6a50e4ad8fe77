//! Hypervisor façade: the only surface external collaborators talk to.
//!
//! Every operation takes the scheduler lock for its whole duration, which makes
//! each call atomic and serializes all calls against the same unit id. Status
//! and snapshot reads go through the same lock, so an observer never sees a
//! pool ledger that disagrees with the unit claims.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::SchedulerConfig;
use crate::core::{
    build_audit_event, AuditEvent, AuditSink, PoolSnapshot, Scheduler, SchedulerError,
    SliceAssignment, UnitState, UnitStatus,
};
use crate::runtime::api::Health;
use crate::util::serde::{Priority, ResourceAmounts};

/// Thread-safe wrapper around one [`Scheduler`].
pub struct Hypervisor {
    scheduler: Mutex<Scheduler>,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
    shutdown: AtomicBool,
}

impl Hypervisor {
    /// Wrap a scheduler.
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler: Mutex::new(scheduler),
            audit: None,
            shutdown: AtomicBool::new(false),
        }
    }

    /// Build from configuration (no audit sink attached).
    pub fn from_config(cfg: &SchedulerConfig) -> Result<Self, SchedulerError> {
        crate::builders::build_scheduler(cfg).map(Self::new)
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Mutex::new(audit));
        self
    }

    /// Admit a unit. Returns its status in `Created`.
    pub fn create_unit(
        &self,
        unit_id: &str,
        chassis: &str,
        resources: &ResourceAmounts,
        priority: Priority,
    ) -> Result<UnitStatus, SchedulerError> {
        self.create_unit_with_metadata(unit_id, chassis, resources, priority, None)
    }

    /// Admit a unit and attach `metadata` to it in the same locked step, so no
    /// other call can observe or touch the unit before its metadata is set.
    pub fn create_unit_with_metadata(
        &self,
        unit_id: &str,
        chassis: &str,
        resources: &ResourceAmounts,
        priority: Priority,
        metadata: Option<serde_json::Value>,
    ) -> Result<UnitStatus, SchedulerError> {
        let mut scheduler = self.scheduler.lock();
        let admitted = scheduler
            .create(unit_id, chassis, resources, priority)
            .map(|_| ())
            .and_then(|()| match metadata {
                Some(metadata) => scheduler.attach_metadata(unit_id, metadata),
                None => Ok(()),
            })
            .and_then(|()| scheduler.status(unit_id));
        match admitted {
            Ok(status) => {
                self.record(unit_id, chassis, "create", None);
                Ok(status)
            }
            Err(e) => {
                self.record(unit_id, chassis, "reject", Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// `Created -> Running`.
    pub fn start_unit(&self, unit_id: &str) -> Result<UnitState, SchedulerError> {
        self.transition(unit_id, "start", Scheduler::start)
    }

    /// `Running -> Paused`.
    pub fn pause_unit(&self, unit_id: &str) -> Result<UnitState, SchedulerError> {
        self.transition(unit_id, "pause", Scheduler::pause)
    }

    /// `Paused -> Running`.
    pub fn resume_unit(&self, unit_id: &str) -> Result<UnitState, SchedulerError> {
        self.transition(unit_id, "resume", Scheduler::resume)
    }

    /// `Paused -> Stopped`.
    pub fn stop_unit(&self, unit_id: &str) -> Result<UnitState, SchedulerError> {
        self.transition(unit_id, "stop", Scheduler::stop)
    }

    /// Any live state except `Error` `-> Error`.
    pub fn fail_unit(&self, unit_id: &str, reason: &str) -> Result<UnitState, SchedulerError> {
        let mut scheduler = self.scheduler.lock();
        let state = scheduler.fail(unit_id, reason)?;
        let chassis = scheduler.unit(unit_id)?.chassis().to_string();
        self.record(unit_id, &chassis, "fail", Some(reason.to_string()));
        Ok(state)
    }

    /// Release the unit's resources and return its `Destroyed` tombstone.
    ///
    /// A second call for the same id fails with `UnitNotFound`.
    pub fn destroy_unit(&self, unit_id: &str) -> Result<UnitStatus, SchedulerError> {
        let mut scheduler = self.scheduler.lock();
        let tombstone = scheduler.destroy(unit_id)?;
        self.record(unit_id, tombstone.chassis(), "destroy", None);
        Ok(tombstone.status())
    }

    /// Status of a live unit.
    pub fn get_status(&self, unit_id: &str) -> Result<UnitStatus, SchedulerError> {
        self.scheduler.lock().status(unit_id)
    }

    /// Pool figures for a chassis.
    pub fn get_pool_snapshot(&self, chassis: &str) -> Result<PoolSnapshot, SchedulerError> {
        self.scheduler.lock().pool_snapshot(chassis)
    }

    /// Attach opaque metadata (such as a validated sequence reference) to a unit.
    pub fn attach_metadata(
        &self,
        unit_id: &str,
        metadata: serde_json::Value,
    ) -> Result<(), SchedulerError> {
        self.scheduler.lock().attach_metadata(unit_id, metadata)
    }

    /// Live units on a chassis, sorted by id.
    pub fn list_units(&self, chassis: &str) -> Result<Vec<UnitStatus>, SchedulerError> {
        self.scheduler.lock().units_on(chassis)
    }

    /// Registered chassis names.
    pub fn list_chassis(&self) -> Vec<String> {
        self.scheduler.lock().registry().names()
    }

    /// Advance one quantum.
    pub fn tick(&self) -> Vec<SliceAssignment> {
        self.scheduler.lock().tick()
    }

    /// Advance `quanta` quanta under a single lock acquisition.
    pub fn run_quanta(&self, quanta: u64) -> Vec<SliceAssignment> {
        self.scheduler.lock().run_quanta(quanta)
    }

    /// Current logical tick.
    pub fn clock(&self) -> u64 {
        self.scheduler.lock().clock()
    }

    /// Unit currently occupying a chassis.
    pub fn occupant(&self, chassis: &str) -> Option<String> {
        self.scheduler.lock().occupant(chassis).map(str::to_string)
    }

    /// Destroy every unit of a chassis and drop its pool.
    pub fn teardown_chassis(&self, chassis: &str) -> Result<usize, SchedulerError> {
        let mut scheduler = self.scheduler.lock();
        let ids: Vec<String> = scheduler
            .units_on(chassis)?
            .into_iter()
            .map(|s| s.unit_id)
            .collect();
        let destroyed = scheduler.teardown_chassis(chassis)?;
        for id in &ids {
            self.record(id, chassis, "destroy", Some("teardown".into()));
        }
        Ok(destroyed)
    }

    /// Verify capacity and conservation across every pool.
    pub fn check_invariants(&self) -> Result<(), SchedulerError> {
        self.scheduler.lock().check_invariants()
    }

    /// Liveness and invariant summary.
    pub fn health(&self) -> Health {
        let scheduler = self.scheduler.lock();
        let violation = scheduler.check_invariants().err().map(|e| e.to_string());
        Health {
            ok: violation.is_none() && !self.is_shutdown(),
            live_units: scheduler.live_units(),
            clock: scheduler.clock(),
            violation,
        }
    }

    /// Events held by the audit sink, oldest first.
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit
            .as_ref()
            .map(|sink| sink.lock().events())
            .unwrap_or_default()
    }

    /// Ask background drivers to stop.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        tracing::info!("hypervisor shutting down");
    }

    /// Whether [`Hypervisor::shutdown`] has been called.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn transition(
        &self,
        unit_id: &str,
        action: &str,
        op: fn(&mut Scheduler, &str) -> Result<UnitState, SchedulerError>,
    ) -> Result<UnitState, SchedulerError> {
        let mut scheduler = self.scheduler.lock();
        let state = op(&mut *scheduler, unit_id)?;
        let chassis = scheduler.unit(unit_id)?.chassis().to_string();
        self.record(unit_id, &chassis, action, None);
        Ok(state)
    }

    /// Record an audit event (sync operation with parking_lot mutex).
    fn record(&self, unit_id: &str, chassis: &str, action: &str, payload: Option<String>) {
        if let Some(audit_sink) = &self.audit {
            let mut sink = audit_sink.lock();
            sink.record(build_audit_event(unit_id, chassis, action, payload));
        }
    }
}
