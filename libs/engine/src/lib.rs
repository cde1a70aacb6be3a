//! Synthetic retail event engine: record synthesis, fault injection and
//! the paced batch loop that writes through the blob and document sinks.

pub mod clock;
pub mod config;
pub mod error;
pub mod factory;
pub mod fault;
pub mod host;
mod runner;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{FaultConfig, RunnerConfig};
pub use error::{BatchError, HostResolutionError, InputError};
pub use factory::RecordFactory;
pub use fault::FaultInjector;
pub use host::{HostResolver, StaticHostResolver, SystemHostResolver};
pub use runner::{BatchRunner, validate_count};
