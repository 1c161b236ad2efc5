//! Reflection classifier and extractors.
//!
//! [`Classifier::classify`] maps any runtime object to exactly one
//! [`MemberEntry`]. The category checks run in a fixed order and the first
//! match wins, because the runtime's function-like and method-like
//! representations overlap:
//!
//! 1. native callable -> `function`
//! 2. class-like -> `type` (members classified recursively)
//! 3. method-like -> `method`
//! 4. accessor descriptor -> `property`
//! 5. anything else -> `data`
//!
//! Nested type extraction is bounded. A type that is already being extracted
//! further up the chain, or that would sit deeper than the configured
//! maximum, is emitted as a `typeref` naming it instead.

use idbgen_core::config::ScrapeConfig;
use idbgen_core::types::{
    DataRecord, FunctionRecord, MemberEntry, MemberTable, Overload, Parameter, PropertyRecord,
    TypeName, TypeRecord,
};
use tracing::{debug, warn};

use crate::mro::compute_mro;
use crate::resolver::OverloadResolver;
use crate::runtime::{Runtime, WellKnownTypes};

/// Member of the universal base type whose signature is fixed rather than resolved.
pub const CONSTRUCTOR_MEMBER: &str = "__new__";

/// Classifies runtime objects into database entries.
///
/// Holds the runtime, the resolver strategy chosen at startup and the
/// well-known type table read once from the runtime.
pub struct Classifier<'a, R: Runtime> {
    runtime: &'a R,
    resolver: &'a dyn OverloadResolver<R>,
    well_known: WellKnownTypes<R::Object>,
    builtin_module: String,
    max_depth: usize,
}

/// Types currently being extracted, outermost first.
#[derive(Debug, Default)]
struct ExtractionChain {
    active: Vec<TypeName>,
}

impl ExtractionChain {
    fn contains(&self, name: &TypeName) -> bool {
        self.active.contains(name)
    }

    fn depth(&self) -> usize {
        self.active.len()
    }
}

impl<'a, R: Runtime> Classifier<'a, R> {
    pub fn new(runtime: &'a R, resolver: &'a dyn OverloadResolver<R>, config: &ScrapeConfig) -> Self {
        Classifier {
            runtime,
            resolver,
            well_known: runtime.well_known_types(),
            builtin_module: config.builtin_module.clone(),
            max_depth: config.max_type_depth,
        }
    }

    pub fn runtime(&self) -> &'a R {
        self.runtime
    }

    pub fn well_known(&self) -> &WellKnownTypes<R::Object> {
        &self.well_known
    }

    /// Classify one object. Never fails.
    ///
    /// `hidden` marks the resulting type record (if any) as not reachable by a
    /// namespace walk.
    pub fn classify(&self, obj: &R::Object, hidden: bool) -> MemberEntry {
        self.classify_in(obj, hidden, &mut ExtractionChain::default())
    }

    /// Extract a class-like object.
    pub fn extract_type(&self, cls: &R::Object, hidden: bool) -> TypeRecord {
        self.extract_type_in(cls, hidden, &mut ExtractionChain::default())
    }

    pub fn extract_function(&self, callable: &R::Object) -> FunctionRecord {
        FunctionRecord {
            doc: self.runtime.doc(callable),
            overloads: self.resolver.get_overloads(self.runtime, callable),
            builtin: true,
            is_static: self.runtime.is_static_callable(callable),
        }
    }

    pub fn extract_property(&self, descriptor: &R::Object) -> PropertyRecord {
        PropertyRecord {
            doc: self.runtime.doc(descriptor),
            type_name: self.resolver.get_descriptor_type(self.runtime, descriptor),
        }
    }

    /// A plain value is recorded by its runtime type only.
    pub fn extract_data(&self, value: &R::Object) -> DataRecord {
        let value_type = self.runtime.type_of(value);
        DataRecord {
            doc: None,
            type_name: self.runtime.type_name(&value_type),
        }
    }

    fn classify_in(&self, obj: &R::Object, hidden: bool, chain: &mut ExtractionChain) -> MemberEntry {
        let rt = self.runtime;
        if rt.is_native_callable(obj) {
            MemberEntry::Function(self.extract_function(obj))
        } else if rt.is_class_like(obj) {
            let name = rt.type_name(obj);
            if chain.contains(&name) {
                debug!(type_name = %name, "type already being extracted, emitting reference");
                return MemberEntry::type_ref(name);
            }
            if chain.depth() >= self.max_depth {
                warn!(
                    type_name = %name,
                    max_depth = self.max_depth,
                    "type nesting too deep, emitting reference"
                );
                return MemberEntry::type_ref(name);
            }
            MemberEntry::Type(self.extract_type_in(obj, hidden, chain))
        } else if rt.is_method_like(obj) {
            MemberEntry::Method(self.extract_function(obj))
        } else if rt.is_accessor_descriptor(obj) {
            MemberEntry::Property(self.extract_property(obj))
        } else {
            MemberEntry::Data(self.extract_data(obj))
        }
    }

    fn extract_type_in(&self, cls: &R::Object, hidden: bool, chain: &mut ExtractionChain) -> TypeRecord {
        let rt = self.runtime;
        let is_root = *cls == self.well_known.root_object;

        chain.active.push(rt.type_name(cls));
        let mut members = MemberTable::new();
        for (name, value) in rt.declared_members(cls) {
            let entry = if is_root && name == CONSTRUCTOR_MEMBER {
                self.root_constructor()
            } else {
                self.classify_in(&value, false, chain)
            };
            members.insert(name, entry);
        }
        chain.active.pop();

        TypeRecord {
            mro: compute_mro(rt, cls),
            bases: rt.bases(cls).iter().map(|b| rt.type_name(b)).collect(),
            members,
            doc: rt.doc(cls),
            is_hidden: hidden,
            builtin: Some(rt.native_mro(cls).is_some()),
        }
    }

    /// `__new__(cls: type) -> object` on the universal base type.
    fn root_constructor(&self) -> MemberEntry {
        let builtin = |name: &str| TypeName::new(&self.builtin_module, name);
        MemberEntry::Function(FunctionRecord {
            doc: None,
            overloads: vec![Overload::new(
                vec![Parameter::named("cls").with_type(builtin("type"))],
                builtin("object"),
            )],
            builtin: true,
            is_static: true,
        })
    }
}
