//! Core infrastructure for idbgen.
//!
//! This crate provides the runtime-independent half of database generation:
//! - Record types persisted per module
//! - Baseline merge engine
//! - Versioned binary codec and the per-module store
//! - Scrape configuration
//! - Error types, error codes and JSON output types for CLI responses

pub mod codec;
pub mod config;
pub mod error;
pub mod merge;
pub mod output;
pub mod store;
pub mod types;
