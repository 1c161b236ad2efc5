//! Host-runtime capability traits.
//!
//! The classifier never inspects runtime objects directly. Each hosted runtime
//! implements [`Runtime`], which exposes two groups of operations:
//!
//! - **Capability table**: the four category predicates the classifier
//!   dispatches on (`is_native_callable`, `is_class_like`, `is_method_like`,
//!   `is_accessor_descriptor`). They may overlap; the classifier's check order
//!   decides.
//! - **Reflection**: doc text, runtime type, type names, ancestors, bases and
//!   directly declared members.
//!
//! [`ModuleProvider`] adds module lookup on top. [`WellKnownTypes`] is the
//! frozen table of representation types a runtime hands out once at startup.

use std::fmt;
use std::hash::Hash;

use idbgen_core::types::{Overload, TypeName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors resolving modules through a [`ModuleProvider`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("module not found: {name}")]
    ModuleNotFound { name: String },
}

/// Reflection over a live runtime's object graph.
pub trait Runtime {
    /// Handle to a runtime object. Equal handles denote the same object.
    type Object: Clone + Eq + Hash + fmt::Debug;

    // ------------------------------------------------------------------
    // Capability table
    // ------------------------------------------------------------------

    /// Free native callable (builtin function, class-method descriptor).
    fn is_native_callable(&self, obj: &Self::Object) -> bool;

    /// Class-like object, including legacy classes without a linearization.
    fn is_class_like(&self, obj: &Self::Object) -> bool;

    /// Bound or native method (including slot wrappers and method descriptors).
    fn is_method_like(&self, obj: &Self::Object) -> bool;

    /// Attribute accessor (get/set descriptor or fixed-slot member).
    fn is_accessor_descriptor(&self, obj: &Self::Object) -> bool;

    // ------------------------------------------------------------------
    // Reflection
    // ------------------------------------------------------------------

    /// Runtime type of any object.
    fn type_of(&self, obj: &Self::Object) -> Self::Object;

    /// Identity of a class-like object.
    fn type_name(&self, cls: &Self::Object) -> TypeName;

    /// Doc value, only when it is textual.
    fn doc(&self, obj: &Self::Object) -> Option<String>;

    /// Precomputed linearization (self first), when the runtime has one.
    /// Legacy classes return `None`.
    fn native_mro(&self, cls: &Self::Object) -> Option<Vec<Self::Object>>;

    /// Immediate bases in declaration order.
    fn bases(&self, cls: &Self::Object) -> Vec<Self::Object>;

    /// Attributes declared directly on `cls`, inherited ones excluded.
    fn declared_members(&self, cls: &Self::Object) -> Vec<(String, Self::Object)>;

    /// Whether a callable is static (needs no receiver).
    fn is_static_callable(&self, _obj: &Self::Object) -> bool {
        false
    }

    /// Signatures the runtime itself declares for a callable, if any.
    ///
    /// Typed runtimes can answer this from metadata; dynamic ones usually
    /// cannot and leave the default.
    fn declared_signatures(&self, _obj: &Self::Object) -> Option<Vec<Overload>> {
        None
    }

    /// Value type the runtime declares for an accessor, if any.
    fn declared_descriptor_type(&self, _obj: &Self::Object) -> Option<Self::Object> {
        None
    }

    /// The representation types this runtime exposes. Called once at startup.
    fn well_known_types(&self) -> WellKnownTypes<Self::Object>;
}

/// A resolved module: its doc and top-level namespace entries.
#[derive(Debug, Clone)]
pub struct ModuleNamespace<O> {
    pub name: String,
    pub doc: Option<String>,
    pub entries: Vec<(String, O)>,
}

/// Resolves module identifiers to live namespaces.
pub trait ModuleProvider: Runtime {
    fn import_module(&self, name: &str) -> Result<ModuleNamespace<Self::Object>, ScrapeError>;

    /// Names of the modules compiled into the runtime, in runtime order.
    fn builtin_module_names(&self) -> Vec<String>;
}

/// Foundational representation types, fixed for the lifetime of a run.
///
/// Everything except `root_object` is only reachable through this table,
/// since no namespace walk finds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownTypes<O> {
    /// The universal base type.
    pub root_object: O,
    /// Type of plain (non-native) functions.
    pub function: O,
    /// Type of native callables.
    pub builtin_function: O,
    /// Type of native method descriptors.
    pub builtin_method: O,
    pub generator: O,
    /// Type of the null value.
    pub none: O,
    /// Type of the ellipsis placeholder.
    pub ellipsis: O,
}

impl<O> WellKnownTypes<O> {
    /// Entries added, hidden, to the root pseudo-module, keyed by member name.
    pub fn hidden_entries(&self) -> [(&'static str, &O); 6] {
        [
            ("function", &self.function),
            ("builtin_function", &self.builtin_function),
            ("builtin_method_descriptor", &self.builtin_method),
            ("generator", &self.generator),
            ("NoneType", &self.none),
            ("ellipsis", &self.ellipsis),
        ]
    }
}
