//! Per-unit capacity table with a one-shot pristine snapshot
//!
//! The store owns the current values and the snapshot taken before the first
//! override. Mutation goes through `&mut self`, so callers serialize access
//! (the [`OverrideController`](crate::OverrideController) holds it behind its lock).

use crate::error::{ConfigError, OverrideError};
use crate::spec::Assignment;
use tracing::{debug, info};

/// Save/restore lifecycle of the pristine values
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SnapshotState {
    /// No override applied since construction or last restore
    #[default]
    Unsaved,
    /// Values as they were before the first override of this cycle
    Saved(Box<[u64]>),
}

impl SnapshotState {
    /// Check if a snapshot is held
    #[inline]
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    /// Saved values, if any
    #[inline]
    #[must_use]
    pub fn values(&self) -> Option<&[u64]> {
        match self {
            Self::Saved(values) => Some(values),
            Self::Unsaved => None,
        }
    }
}

/// Fixed-size capacity table
///
/// # Invariants
/// - Every value is within `0..=max_capacity`
/// - Length never changes after construction
/// - A snapshot, once taken, is kept until [`restore`](Self::restore)
#[derive(Debug, Clone)]
pub struct CapacityStore {
    values: Vec<u64>,
    possible: Vec<bool>,
    max_capacity: u64,
    snapshot: SnapshotState,
}

impl CapacityStore {
    /// Create store from process-start values
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if the table is empty, has more units than
    ///   `u32` can index, or holds a value above `max_capacity`
    pub fn new(values: Vec<u64>, max_capacity: u64) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::invalid("table must contain at least one unit"));
        }
        if u32::try_from(values.len() - 1).is_err() {
            return Err(ConfigError::invalid(format!(
                "table of {} units cannot be indexed by u32",
                values.len()
            )));
        }
        if let Some((unit, value)) = values.iter().enumerate().find(|&(_, &v)| v > max_capacity) {
            return Err(ConfigError::invalid(format!(
                "initial capacity {value} of unit {unit} exceeds max {max_capacity}"
            )));
        }

        Ok(Self {
            possible: vec![true; values.len()],
            values,
            max_capacity,
            snapshot: SnapshotState::Unsaved,
        })
    }

    /// Create store with every unit at the same value
    ///
    /// # Errors
    /// Same as [`new`](Self::new)
    pub fn uniform(units: usize, value: u64, max_capacity: u64) -> Result<Self, ConfigError> {
        Self::new(vec![value; units], max_capacity)
    }

    /// Replace the possible-unit mask
    ///
    /// Slots marked `false` exist in the table but reject every assignment.
    ///
    /// # Errors
    /// `ConfigError::Invalid` if the mask length differs from the table length
    pub fn with_possible(mut self, possible: Vec<bool>) -> Result<Self, ConfigError> {
        if possible.len() != self.values.len() {
            return Err(ConfigError::invalid(format!(
                "possible mask has {} entries, table has {}",
                possible.len(),
                self.values.len()
            )));
        }
        self.possible = possible;
        Ok(self)
    }

    /// Number of unit slots (`N`)
    #[inline]
    #[must_use]
    pub fn units(&self) -> usize {
        self.values.len()
    }

    /// Largest accepted capacity (`MAX`)
    #[inline]
    #[must_use]
    pub fn max_capacity(&self) -> u64 {
        self.max_capacity
    }

    /// Current value of one unit
    #[inline]
    #[must_use]
    pub fn capacity(&self, unit: u32) -> Option<u64> {
        self.values.get(unit as usize).copied()
    }

    /// Current table
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Check if `unit` is inside the table and marked possible
    #[inline]
    #[must_use]
    pub fn is_possible(&self, unit: u32) -> bool {
        self.possible.get(unit as usize).copied().unwrap_or(false)
    }

    /// Snapshot lifecycle state
    #[inline]
    #[must_use]
    pub fn snapshot_state(&self) -> &SnapshotState {
        &self.snapshot
    }

    /// Saved pristine values, if the override has been exercised
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Option<&[u64]> {
        self.snapshot.values()
    }

    /// Check if a snapshot is held
    #[inline]
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.snapshot.is_saved()
    }

    /// Save pristine values once per cycle
    ///
    /// A no-op when already saved.
    ///
    /// # Errors
    /// - `OverrideError::ResourceExhausted` if the snapshot cannot be allocated
    pub fn ensure_snapshot(&mut self) -> Result<(), OverrideError> {
        if self.snapshot.is_saved() {
            return Ok(());
        }

        let units = self.values.len();
        let mut saved = Vec::new();
        saved
            .try_reserve_exact(units)
            .map_err(|_| OverrideError::ResourceExhausted { units })?;
        saved.extend_from_slice(&self.values);

        self.snapshot = SnapshotState::Saved(saved.into_boxed_slice());
        debug!(units, "saved original capacities");
        Ok(())
    }

    /// Check an assignment against the table bounds without applying it
    ///
    /// Units are checked in order; the first unit also has its value checked
    /// before later units are inspected.
    ///
    /// # Errors
    /// - `OverrideError::OutOfRange` for a unit past the table or not possible
    /// - `OverrideError::ValueTooLarge` if the value exceeds `max_capacity`
    pub fn validate(&self, assignment: &Assignment) -> Result<(), OverrideError> {
        let first = assignment.start();
        if !self.is_possible(first) {
            return Err(self.out_of_range(first));
        }

        if assignment.value() > self.max_capacity {
            return Err(OverrideError::ValueTooLarge {
                unit: first,
                value: assignment.value(),
                max: self.max_capacity,
            });
        }

        // Stops at the first slot past the table, so at most N steps
        match assignment.units().skip(1).find(|&unit| !self.is_possible(unit)) {
            Some(unit) => Err(self.out_of_range(unit)),
            None => Ok(()),
        }
    }

    /// Validate and write an assignment
    ///
    /// # Errors
    /// Same as [`validate`](Self::validate); the table is untouched on error
    pub fn apply(&mut self, assignment: &Assignment) -> Result<(), OverrideError> {
        self.validate(assignment)?;

        let start = assignment.start() as usize;
        let end = assignment.end() as usize;
        self.values[start..=end].fill(assignment.value());

        info!(
            start = assignment.start(),
            end = assignment.end(),
            capacity = assignment.value(),
            "set unit capacity"
        );
        Ok(())
    }

    /// Put the saved values back and forget the snapshot
    ///
    /// Returns `false` (and does nothing) when no snapshot is held.
    pub fn restore(&mut self) -> bool {
        match std::mem::take(&mut self.snapshot) {
            SnapshotState::Saved(saved) => {
                self.values.copy_from_slice(&saved);
                info!(units = saved.len(), "restored original capacities");
                true
            }
            SnapshotState::Unsaved => false,
        }
    }

    fn out_of_range(&self, unit: u32) -> OverrideError {
        OverrideError::OutOfRange {
            unit,
            units: self.values.len(),
        }
    }
}
