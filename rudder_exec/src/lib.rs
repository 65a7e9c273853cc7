//! # Rudder library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to
//! access items defined inside the rudder crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - everything the executable carries between cycles
pub mod data_store;

/// Equipment - compass, navigation and rudder servo interfaces, plus their simulations
pub mod eqpt;

/// Rudder control module - converts a desired path and compass heading into a rudder demand
pub mod rudder_ctrl;
