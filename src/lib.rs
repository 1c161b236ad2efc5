//! idbgen: completion database generator.
//!
//! Scrapes a runtime's modules, types and members into one versioned `.idb`
//! file per module, enriching each from a previous database when one is
//! available.

// Core infrastructure - re-exported from idbgen-core
pub use idbgen_core::codec;
pub use idbgen_core::config;
pub use idbgen_core::error;
pub use idbgen_core::merge;
pub use idbgen_core::output;
pub use idbgen_core::store;
pub use idbgen_core::types;

// Runtime reflection
pub use idbgen_python as python;

// Driver operations
pub mod cli;
