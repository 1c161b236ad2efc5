//! Runtime reflection for idbgen.
//!
//! This crate turns a hosted runtime's object graph into database records:
//! - Capability traits a runtime implements ([`runtime`])
//! - Ordered classifier and the type/callable/accessor extractors ([`classify`])
//! - Ancestor linearization, including the legacy fallback ([`mro`])
//! - Pluggable overload resolvers and the doc-text signature parser
//! - Module extraction, including the root pseudo-module's hidden entries
//! - A JSON snapshot runtime for generating without a live interpreter

pub mod classify;
mod error_bridges;
pub mod module;
pub mod mro;
pub mod resolver;
pub mod runtime;
pub mod signature;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use classify::Classifier;
pub use module::{extract_builtin_module, extract_module};
pub use resolver::{resolver_for, OverloadResolver};
pub use runtime::{ModuleNamespace, ModuleProvider, Runtime, ScrapeError, WellKnownTypes};
pub use snapshot::{SnapshotError, SnapshotRuntime};
