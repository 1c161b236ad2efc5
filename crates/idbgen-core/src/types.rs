//! Record types for the completion database.
//!
//! A database is one [`ModuleRecord`] per module. Module and type records own
//! a [`MemberTable`] mapping member names to tagged [`MemberEntry`] values.
//! The shapes here are the persisted format: every type derives serde and the
//! field names are the ones written to `.idb` files.
//!
//! ## Encoding Conventions
//!
//! - [`TypeName`] encodes as a two-element sequence `(module, name)`
//! - [`MemberEntry`] encodes adjacently tagged as `{"kind": ..., "value": ...}`
//! - Absent optional fields are omitted rather than written as null
//! - Member tables are ordered by name so encodings are deterministic

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Names
// ============================================================================

/// Identity of a type across the whole database: origin module plus local name.
///
/// Two type names are equal iff both components match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct TypeName {
    /// Module the type was defined in.
    pub module: String,
    /// Name of the type within that module.
    pub name: String,
}

impl TypeName {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        TypeName {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl From<(String, String)> for TypeName {
    fn from((module, name): (String, String)) -> Self {
        TypeName { module, name }
    }
}

impl From<TypeName> for (String, String) {
    fn from(type_name: TypeName) -> Self {
        (type_name.module, type_name.name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

// ============================================================================
// Module and Type Records
// ============================================================================

/// Member name -> entry. Names are unique within a table.
pub type MemberTable = BTreeMap<String, MemberEntry>;

/// Top-level record persisted for one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Module doc text, only when the runtime value was textual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Every top-level namespace entry.
    #[serde(default)]
    pub members: MemberTable,
}

/// Record for a class-like object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeRecord {
    /// Linearized ancestors. Self-first when the runtime supplied a native
    /// linearization; never contains duplicates.
    #[serde(default)]
    pub mro: Vec<TypeName>,
    /// Immediate bases in declaration order. Not deduplicated.
    #[serde(default)]
    pub bases: Vec<TypeName>,
    /// Attributes declared directly on the type (inherited ones excluded).
    #[serde(default)]
    pub members: MemberTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Set for synthetic entries that are not reachable by a namespace walk.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<bool>,
}

// ============================================================================
// Callables
// ============================================================================

/// Record for a native function or method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Known call signatures, in the order the resolver reported them.
    #[serde(default)]
    pub overloads: Vec<Overload>,
    #[serde(default)]
    pub builtin: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

/// One call signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overload {
    #[serde(default)]
    pub params: Vec<Parameter>,
    pub ret_type: TypeName,
}

impl Overload {
    pub fn new(params: Vec<Parameter>, ret_type: TypeName) -> Self {
        Overload { params, ret_type }
    }
}

/// One formal parameter of an [`Overload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<TypeName>,
    /// Textual representation of the default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_format: Option<ArgFormat>,
}

impl Parameter {
    /// A plain positional-or-keyword parameter with no metadata.
    pub fn named(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            type_name: None,
            default: None,
            arg_format: None,
        }
    }

    pub fn with_type(mut self, type_name: TypeName) -> Self {
        self.type_name = Some(type_name);
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_arg_format(mut self, arg_format: ArgFormat) -> Self {
        self.arg_format = Some(arg_format);
        self
    }
}

/// Variadic parameter marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgFormat {
    /// `*args`
    #[serde(rename = "*")]
    VarPositional,
    /// `**kwargs`
    #[serde(rename = "**")]
    VarKeyword,
}

// ============================================================================
// Properties, Data, References
// ============================================================================

/// Record for an attribute-accessor descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(rename = "type")]
    pub type_name: TypeName,
}

/// Record for a plain value; only its runtime type is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(rename = "type")]
    pub type_name: TypeName,
}

/// A member that may resolve to any of several entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultipleRecord {
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

/// Reference to a type recorded elsewhere in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRefRecord {
    pub type_name: TypeName,
}

/// Reference to another module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRefRecord {
    pub module_name: String,
}

// ============================================================================
// Member Entries
// ============================================================================

/// A classified member: one kind tag plus its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MemberEntry {
    Function(FunctionRecord),
    Method(FunctionRecord),
    Property(PropertyRecord),
    Data(DataRecord),
    Type(TypeRecord),
    Multiple(MultipleRecord),
    TypeRef(TypeRefRecord),
    ModuleRef(ModuleRefRecord),
}

impl MemberEntry {
    /// The kind tag of this entry.
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberEntry::Function(_) => MemberKind::Function,
            MemberEntry::Method(_) => MemberKind::Method,
            MemberEntry::Property(_) => MemberKind::Property,
            MemberEntry::Data(_) => MemberKind::Data,
            MemberEntry::Type(_) => MemberKind::Type,
            MemberEntry::Multiple(_) => MemberKind::Multiple,
            MemberEntry::TypeRef(_) => MemberKind::TypeRef,
            MemberEntry::ModuleRef(_) => MemberKind::ModuleRef,
        }
    }

    /// Shorthand for a data entry with the given runtime type.
    pub fn data(type_name: TypeName) -> Self {
        MemberEntry::Data(DataRecord {
            doc: None,
            type_name,
        })
    }

    /// Shorthand for a reference to a type recorded elsewhere.
    pub fn type_ref(type_name: TypeName) -> Self {
        MemberEntry::TypeRef(TypeRefRecord { type_name })
    }
}

/// The closed set of member kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Function,
    Method,
    Property,
    Data,
    Type,
    Multiple,
    TypeRef,
    ModuleRef,
}

impl MemberKind {
    /// The kind string used in the persisted format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Function => "function",
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::Data => "data",
            MemberKind::Type => "type",
            MemberKind::Multiple => "multiple",
            MemberKind::TypeRef => "typeref",
            MemberKind::ModuleRef => "moduleref",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// Tests
// ============================================================================
