//! Override controller
//!
//! Entry point for the attribute layer. Parses configuration text, applies it to
//! the [`CapacityStore`] under a single lock, and remembers the last accepted
//! string for read-back.

use crate::api::ModuleLifecycle;
use crate::config::OverrideConfig;
use crate::error::{ConfigError, OverrideError, OverrideResult};
use crate::spec;
use crate::store::CapacityStore;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Longest canonical string kept for read-back (256-byte buffer minus terminator)
pub const DEFAULT_MAX_CONFIGURATION_LEN: usize = 255;

/// Point-in-time copy of the table, taken under the controller lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    /// Number of unit slots
    pub units: usize,
    /// Largest accepted capacity
    pub max_capacity: u64,
    /// Current values
    pub values: Vec<u64>,
    /// Pristine values, present once the override has been exercised
    pub snapshot: Option<Vec<u64>>,
    /// Last accepted configuration string
    pub configuration: String,
}

/// Everything guarded by the controller lock
#[derive(Debug)]
struct OverrideState {
    store: CapacityStore,
    configuration: String,
}

/// Serialized front end of the capacity table
///
/// All writes, reads, and restore take the same lock, so a reader never sees a
/// configuration string that does not match the table.
#[derive(Debug)]
pub struct OverrideController {
    state: Mutex<OverrideState>,
    max_configuration_len: usize,
}

impl OverrideController {
    /// Create controller owning `store`
    #[must_use]
    pub fn new(store: CapacityStore) -> Self {
        Self {
            state: Mutex::new(OverrideState {
                store,
                configuration: String::new(),
            }),
            max_configuration_len: DEFAULT_MAX_CONFIGURATION_LEN,
        }
    }

    /// Set the read-back length limit
    #[inline]
    #[must_use]
    pub fn with_max_configuration_len(mut self, len: usize) -> Self {
        self.max_configuration_len = len;
        self
    }

    /// Build the store from configuration
    ///
    /// Does not apply the load-time `capacities`; [`load`](Self::load) does the
    /// full bring-up.
    ///
    /// # Errors
    /// Returns `ConfigError` if the table described by `config` is invalid
    pub fn from_config(config: &OverrideConfig) -> Result<Self, ConfigError> {
        let store = config.build_store()?;
        Ok(Self::new(store).with_max_configuration_len(config.max_configuration_len))
    }

    /// Build, announce, and apply the load-time `capacities` parameter
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if the table described by `config` is invalid
    /// - `ConfigError::Capacities` if the load-time parameter is rejected
    pub fn load(config: &OverrideConfig) -> Result<Self, ConfigError> {
        let controller = Self::from_config(config)?;
        controller.on_load();
        if let Some(capacities) = config.capacities.as_deref() {
            controller.set_configuration(Some(capacities))?;
        }
        Ok(controller)
    }

    /// Apply a configuration string
    ///
    /// Every assignment of the batch is validated before any is written, so a
    /// rejected batch leaves the table and the stored string as they were.
    ///
    /// # Errors
    /// - `OverrideError::InvalidInput` if `raw` is `None`
    /// - `OverrideError::Parse` if `raw` does not match the grammar
    /// - `OverrideError::ResourceExhausted` if the snapshot cannot be allocated
    /// - `OverrideError::OutOfRange` / `OverrideError::ValueTooLarge` from validation
    pub fn set_configuration(&self, raw: Option<&str>) -> OverrideResult<()> {
        let raw = raw.ok_or(OverrideError::InvalidInput)?;

        let assignments = spec::parse(raw).map_err(|e| {
            warn!(error = %e, "rejected capacity spec");
            OverrideError::from(e)
        })?;

        let mut state = self.state.lock();

        if !assignments.is_empty() {
            state.store.ensure_snapshot()?;

            if let Err(e) = assignments.iter().try_for_each(|a| state.store.validate(a)) {
                warn!(error = %e, "rejected capacity batch");
                return Err(e);
            }
            for assignment in &assignments {
                state.store.apply(assignment)?;
            }
        }

        state.configuration = canonicalize(raw, self.max_configuration_len);
        debug!(
            assignments = assignments.len(),
            configuration = %state.configuration,
            "capacities updated"
        );
        Ok(())
    }

    /// Last accepted configuration string, empty if never set
    #[must_use]
    pub fn get_configuration(&self) -> String {
        self.state.lock().configuration.clone()
    }

    /// Current value of one unit
    #[must_use]
    pub fn capacity(&self, unit: u32) -> Option<u64> {
        self.state.lock().store.capacity(unit)
    }

    /// Number of unit slots
    #[must_use]
    pub fn units(&self) -> usize {
        self.state.lock().store.units()
    }

    /// Check if a pristine snapshot is currently held
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.state.lock().store.is_saved()
    }

    /// Copy of the table, snapshot, and configuration string
    #[must_use]
    pub fn table(&self) -> TableReport {
        let state = self.state.lock();
        TableReport {
            units: state.store.units(),
            max_capacity: state.store.max_capacity(),
            values: state.store.values().to_vec(),
            snapshot: state.store.snapshot().map(<[u64]>::to_vec),
            configuration: state.configuration.clone(),
        }
    }

    /// Put pristine values back; no-op when the override was never exercised
    ///
    /// The configuration string is left as the last accepted write, so a read
    /// after restore still reports what was applied before teardown.
    pub fn restore(&self) -> bool {
        self.state.lock().store.restore()
    }

    pub(crate) fn log_loaded(&self) {
        let state = self.state.lock();
        info!(
            units = state.store.units(),
            max_capacity = state.store.max_capacity(),
            "capacity override loaded; syntax: 'unit:value' or 'start-end:value'"
        );
    }
}

/// Bounded copy of `raw` without its trailing newline
///
/// Truncation happens first, on a char boundary, then one `\n` is stripped.
fn canonicalize(raw: &str, max_len: usize) -> String {
    let mut end = raw.len().min(max_len);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    let text = &raw[..end];
    text.strip_suffix('\n').unwrap_or(text).to_string()
}
