//! Ancestor linearization for class-like objects.
//!
//! Runtimes with a precomputed Method Resolution Order expose it through
//! [`Runtime::native_mro`]; that sequence is copied verbatim (self first).
//!
//! Legacy class objects have no such sequence. For them the ancestors are
//! collected with a breadth-then-depth rule:
//!
//! 1. Append every immediate base, in declaration order, skipping any already
//!    collected
//! 2. Then, in the same order, apply rule 1 to each base
//!
//! This is **not** C3 linearization. The only guarantees are that the result
//! has no duplicates and that directly declared bases come before anything
//! reached through them. The class itself is not part of the result.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use idbgen_python::mro::legacy_mro;
//!
//! //     A
//! //    / \
//! //   B   C
//! //    \ /
//! //     D
//! let mut hierarchy: HashMap<&str, Vec<&str>> = HashMap::new();
//! hierarchy.insert("D", vec!["B", "C"]);
//! hierarchy.insert("B", vec!["A"]);
//! hierarchy.insert("C", vec!["A"]);
//! hierarchy.insert("A", vec![]);
//!
//! let mro = legacy_mro(&"D", |cls| hierarchy.get(cls).cloned().unwrap_or_default());
//! assert_eq!(mro, vec!["B", "C", "A"]);
//! ```

use std::collections::HashSet;
use std::hash::Hash;

use idbgen_core::types::TypeName;

use crate::runtime::Runtime;

/// Linearized ancestors of `cls` as type names.
///
/// Uses the runtime's native linearization when available and the legacy
/// rule otherwise.
pub fn compute_mro<R: Runtime>(runtime: &R, cls: &R::Object) -> Vec<TypeName> {
    match runtime.native_mro(cls) {
        Some(native) => native.iter().map(|t| runtime.type_name(t)).collect(),
        None => legacy_mro(cls, |c| runtime.bases(c))
            .iter()
            .map(|t| runtime.type_name(t))
            .collect(),
    }
}

/// Breadth-then-depth ancestor collection for legacy classes.
///
/// `bases_of` returns the immediate bases of a class in declaration order.
/// A base that has already been expanded is not expanded again, so cyclic
/// input terminates; on acyclic input that changes nothing.
pub fn legacy_mro<T, F>(cls: &T, bases_of: F) -> Vec<T>
where
    T: Clone + Eq + Hash,
    F: Fn(&T) -> Vec<T>,
{
    let mut result = Vec::new();
    let mut seen = HashSet::new();
    let mut expanded = HashSet::new();
    collect_legacy(cls, &bases_of, &mut result, &mut seen, &mut expanded);
    result
}

fn collect_legacy<T, F>(
    cls: &T,
    bases_of: &F,
    result: &mut Vec<T>,
    seen: &mut HashSet<T>,
    expanded: &mut HashSet<T>,
) where
    T: Clone + Eq + Hash,
    F: Fn(&T) -> Vec<T>,
{
    if !expanded.insert(cls.clone()) {
        return;
    }

    let bases = bases_of(cls);
    for base in &bases {
        if seen.insert(base.clone()) {
            result.push(base.clone());
        }
    }
    for base in &bases {
        collect_legacy(base, bases_of, result, seen, expanded);
    }
}
