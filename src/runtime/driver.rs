//! Background quantum driver.
//!
//! The scheduler's clock is logical; this driver only decides *when* a
//! quantum elapses by calling [`Hypervisor::tick`] on a wall-clock period.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::runtime::Hypervisor;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Abstraction for spawning background work on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Tick `hypervisor` once per `period` until [`Hypervisor::shutdown`] is called.
pub fn spawn_quantum_driver<S: Spawn>(hypervisor: Arc<Hypervisor>, spawner: &S, period: Duration) {
    let period = period.max(MIN_PERIOD);
    spawner.spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            if hypervisor.is_shutdown() {
                tracing::info!("quantum driver stopped");
                break;
            }
            let assignments = hypervisor.tick();
            tracing::trace!(slices = assignments.len(), "quantum elapsed");
        }
    });
}
