//! cpucap - runtime capacity override
//!
//! Makes a fixed-size, per-unit capacity table writable at runtime and puts the
//! original values back when the override is torn down.
//!
//! # Core Concepts
//!
//! - [`spec::parse`]: Pure parser for `"0-3:1024,4-7:512"` style strings
//! - [`CapacityStore`]: The table, its possible-unit mask, and the one-shot snapshot
//! - [`OverrideController`]: Serialized front end that applies whole batches
//! - [`CapacityAttribute`] / [`ModuleLifecycle`]: Seams for the attribute layer
//!   and for bring-up/teardown
//!
//! # Example
//!
//! ```rust,ignore
//! use cpucap::prelude::*;
//!
//! let controller = OverrideController::load(&OverrideConfig::new().with_units(8))?;
//!
//! controller.store(Some("0-3:1024,4-7:512\n"))?;
//! assert_eq!(controller.show(), "0-3:1024,4-7:512\n");
//!
//! // Teardown puts the process-start values back
//! controller.on_unload();
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod spec;
pub mod store;

// Re-exports
pub use api::{CapacityAttribute, ModuleLifecycle};
pub use config::{OverrideConfig, DEFAULT_MAX_CAPACITY, DEFAULT_UNITS};
pub use controller::{OverrideController, TableReport, DEFAULT_MAX_CONFIGURATION_LEN};
pub use error::{ConfigError, OverrideError, OverrideResult, SpecError, SpecField};
pub use spec::{Assignment, MAX_SPEC_LEN};
pub use store::{CapacityStore, SnapshotState};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the override table
    pub use crate::api::{CapacityAttribute, ModuleLifecycle};
    pub use crate::config::OverrideConfig;
    pub use crate::controller::{OverrideController, TableReport};
    pub use crate::error::{ConfigError, OverrideError};
    pub use crate::store::CapacityStore;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;

    #[test]
    fn full_override_lifecycle() {
        let config = OverrideConfig::new()
            .with_units(8)
            .with_capacities("0-3:1024,4-7:512");
        let controller = OverrideController::load(&config).unwrap();

        assert_eq!(controller.show(), "0-3:1024,4-7:512\n");
        assert_eq!(controller.capacity(7), Some(512));

        controller.on_unload();
        assert_eq!(controller.table().values, vec![1024; 8]);
    }

    #[test]
    fn load_rejects_bad_capacities() {
        let config = OverrideConfig::new().with_units(4).with_capacities("9:1");
        assert!(matches!(
            OverrideController::load(&config),
            Err(ConfigError::Capacities(OverrideError::OutOfRange { unit: 9, .. }))
        ));
    }
}
