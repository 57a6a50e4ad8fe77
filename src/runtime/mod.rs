//! Externally-facing façade, API models and runtime adapters.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod driver;
pub mod hypervisor;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;

pub use api::{create_from_request, Health, UnitRequest};
#[cfg(feature = "tokio-runtime")]
pub use driver::{spawn_quantum_driver, Spawn};
pub use hypervisor::Hypervisor;
#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::TokioSpawner;
