//! Testing utilities for cpucap workspace
//!
//! Shared fixtures for building tables and controllers in tests.

#![allow(missing_docs)]

use cpucap::{CapacityStore, OverrideConfig, OverrideController, DEFAULT_MAX_CAPACITY};

/// Big/little layout: first half at full capacity, second half at half capacity
pub fn big_little_values(units: usize) -> Vec<u64> {
    (0..units)
        .map(|unit| {
            if unit < units / 2 {
                DEFAULT_MAX_CAPACITY
            } else {
                DEFAULT_MAX_CAPACITY / 2
            }
        })
        .collect()
}

/// Distinct value per unit so a wrong restore is visible
pub fn distinct_values(units: usize) -> Vec<u64> {
    (0..units as u64)
        .map(|unit| (unit * 37 + 100) % (DEFAULT_MAX_CAPACITY + 1))
        .collect()
}

pub fn create_store(values: Vec<u64>) -> CapacityStore {
    CapacityStore::new(values, DEFAULT_MAX_CAPACITY).unwrap()
}

pub fn create_controller_with_values(values: Vec<u64>) -> OverrideController {
    OverrideController::new(create_store(values))
}

/// `units` units at full capacity
pub fn create_controller(units: usize) -> OverrideController {
    create_controller_with_values(vec![DEFAULT_MAX_CAPACITY; units])
}

pub fn create_config(units: usize) -> OverrideConfig {
    OverrideConfig::new()
        .with_values(distinct_values(units))
        .with_max_capacity(DEFAULT_MAX_CAPACITY)
}
