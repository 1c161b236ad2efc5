//! Overload resolver strategies.
//!
//! Signature discovery is pluggable. The classifier asks an
//! [`OverloadResolver`] for a callable's overloads and for an accessor's value
//! type; which strategy answers is decided once, at startup, by
//! [`resolver_for`].
//!
//! - [`DocstringResolver`]: reads the signature lines native callables carry
//!   at the top of their doc text
//! - [`IntrospectingResolver`]: trusts signatures and value types the runtime
//!   declares, and falls back to doc text when it declares nothing

use idbgen_core::config::{ResolverKind, ScrapeConfig};
use idbgen_core::types::{Overload, TypeName};

use crate::runtime::Runtime;
use crate::signature::parse_doc_signatures;

/// Signature and descriptor-type discovery for one runtime.
///
/// The trait is object-safe, so a strategy can be held as
/// `Box<dyn OverloadResolver<R>>`.
pub trait OverloadResolver<R: Runtime> {
    /// Call signatures of a callable, in discovery order. Empty when unknown.
    fn get_overloads(&self, runtime: &R, callable: &R::Object) -> Vec<Overload>;

    /// Value type of an attribute accessor.
    fn get_descriptor_type(&self, runtime: &R, descriptor: &R::Object) -> TypeName;
}

/// Strategy that parses doc-text signature lines.
#[derive(Debug, Clone)]
pub struct DocstringResolver {
    builtin_module: String,
    placeholder: TypeName,
}

impl DocstringResolver {
    pub fn new(config: &ScrapeConfig) -> Self {
        DocstringResolver {
            builtin_module: config.builtin_module.clone(),
            placeholder: config.placeholder(),
        }
    }
}

impl<R: Runtime> OverloadResolver<R> for DocstringResolver {
    fn get_overloads(&self, runtime: &R, callable: &R::Object) -> Vec<Overload> {
        match runtime.doc(callable) {
            Some(doc) => parse_doc_signatures(&doc, &self.builtin_module, &self.placeholder),
            None => Vec::new(),
        }
    }

    fn get_descriptor_type(&self, _runtime: &R, _descriptor: &R::Object) -> TypeName {
        self.placeholder.clone()
    }
}

/// Strategy for runtimes that carry signature metadata.
#[derive(Debug, Clone)]
pub struct IntrospectingResolver {
    fallback: DocstringResolver,
}

impl IntrospectingResolver {
    pub fn new(config: &ScrapeConfig) -> Self {
        IntrospectingResolver {
            fallback: DocstringResolver::new(config),
        }
    }
}

impl<R: Runtime> OverloadResolver<R> for IntrospectingResolver {
    fn get_overloads(&self, runtime: &R, callable: &R::Object) -> Vec<Overload> {
        match runtime.declared_signatures(callable) {
            Some(overloads) => overloads,
            None => OverloadResolver::<R>::get_overloads(&self.fallback, runtime, callable),
        }
    }

    fn get_descriptor_type(&self, runtime: &R, descriptor: &R::Object) -> TypeName {
        match runtime.declared_descriptor_type(descriptor) {
            Some(value_type) => runtime.type_name(&value_type),
            None => OverloadResolver::<R>::get_descriptor_type(&self.fallback, runtime, descriptor),
        }
    }
}

/// Build the strategy named by `config.resolver`.
pub fn resolver_for<R: Runtime>(config: &ScrapeConfig) -> Box<dyn OverloadResolver<R>> {
    match config.resolver {
        ResolverKind::Docstring => Box::new(DocstringResolver::new(config)),
        ResolverKind::Introspect => Box::new(IntrospectingResolver::new(config)),
    }
}
