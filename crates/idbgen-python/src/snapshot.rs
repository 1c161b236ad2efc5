//! A runtime described by a JSON snapshot of its object graph.
//!
//! The snapshot is produced by dumping a live interpreter once; loading it
//! gives a [`Runtime`] + [`ModuleProvider`] that the classifier can walk
//! without the interpreter being present.
//!
//! ## Format
//!
//! ```json
//! {
//!   "builtin_modules": ["builtins", "sys"],
//!   "well_known": {
//!     "root_object": "object", "function": "function",
//!     "builtin_function": "builtin_function_or_method",
//!     "builtin_method": "method_descriptor", "generator": "generator",
//!     "none": "NoneType", "ellipsis": "ellipsis"
//!   },
//!   "modules": {
//!     "builtins": { "doc": "Built-in functions.", "members": { "len": "builtins.len" } }
//!   },
//!   "objects": {
//!     "builtins.len": { "category": "builtin_function", "doc": "len(obj) -> int" }
//!   }
//! }
//! ```
//!
//! Every id referenced anywhere must be a key of `objects`; loading fails
//! with [`SnapshotError::DanglingReference`] otherwise.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use idbgen_core::types::{Overload, TypeName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runtime::{ModuleNamespace, ModuleProvider, Runtime, ScrapeError, WellKnownTypes};

/// Errors loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{from} references unknown object '{id}'")]
    DanglingReference { from: String, id: String },

    #[error("class object '{id}' has no {field}")]
    MissingField { id: String, field: &'static str },
}

// ============================================================================
// Snapshot Document
// ============================================================================

/// Key of an object in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ObjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runtime representation category of a snapshot object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Class with a native linearization.
    Class,
    /// Old-style class without one.
    LegacyClass,
    BuiltinFunction,
    ClassMethodDescriptor,
    BuiltinMethod,
    SlotWrapper,
    MethodDescriptor,
    GetsetDescriptor,
    MemberDescriptor,
    /// Any other value.
    Instance,
}

impl Category {
    fn is_class(self) -> bool {
        matches!(self, Category::Class | Category::LegacyClass)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub category: Category,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Raw doc value. Only strings count as doc text.
    #[serde(default)]
    pub doc: Option<serde_json::Value>,
    /// Runtime type; defaults by category when absent.
    #[serde(default, rename = "type")]
    pub type_id: Option<ObjectId>,
    /// Native linearization, self first. Ignored for legacy classes.
    #[serde(default)]
    pub mro: Option<Vec<ObjectId>>,
    #[serde(default)]
    pub bases: Vec<ObjectId>,
    #[serde(default)]
    pub members: BTreeMap<String, ObjectId>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub signatures: Option<Vec<Overload>>,
    #[serde(default)]
    pub descriptor_type: Option<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    #[serde(default)]
    pub doc: Option<serde_json::Value>,
    #[serde(default)]
    pub members: BTreeMap<String, ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    builtin_modules: Vec<String>,
    well_known: WellKnownTypes<ObjectId>,
    #[serde(default)]
    modules: BTreeMap<String, ModuleSnapshot>,
    #[serde(default)]
    objects: BTreeMap<ObjectId, ObjectSnapshot>,
}

// ============================================================================
// SnapshotRuntime
// ============================================================================

/// A validated snapshot, queried through the [`Runtime`] traits.
#[derive(Debug, Clone)]
pub struct SnapshotRuntime {
    builtin_modules: Vec<String>,
    well_known: WellKnownTypes<ObjectId>,
    modules: BTreeMap<String, ModuleSnapshot>,
    objects: BTreeMap<ObjectId, ObjectSnapshot>,
}

impl SnapshotRuntime {
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let document: SnapshotDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, SnapshotError> {
        let document: SnapshotDocument = serde_json::from_value(value)?;
        Self::from_document(document)
    }

    fn from_document(document: SnapshotDocument) -> Result<Self, SnapshotError> {
        let runtime = SnapshotRuntime {
            builtin_modules: document.builtin_modules,
            well_known: document.well_known,
            modules: document.modules,
            objects: document.objects,
        };
        runtime.validate()?;
        Ok(runtime)
    }

    /// Number of objects in the snapshot.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Every object id, in key order.
    pub fn object_ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.objects.keys()
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let well_known = &self.well_known;
        let fields = [
            ("root_object", &well_known.root_object),
            ("function", &well_known.function),
            ("builtin_function", &well_known.builtin_function),
            ("builtin_method", &well_known.builtin_method),
            ("generator", &well_known.generator),
            ("none", &well_known.none),
            ("ellipsis", &well_known.ellipsis),
        ];
        for (field, id) in fields {
            self.check_ref(&format!("well_known.{field}"), id)?;
        }

        for (module, snapshot) in &self.modules {
            for (member, id) in &snapshot.members {
                self.check_ref(&format!("module {module}.{member}"), id)?;
            }
        }

        for (owner, object) in &self.objects {
            let from = format!("object {owner}");
            if object.category.is_class() {
                if object.name.is_none() {
                    return Err(SnapshotError::MissingField {
                        id: owner.to_string(),
                        field: "name",
                    });
                }
                if object.module.is_none() {
                    return Err(SnapshotError::MissingField {
                        id: owner.to_string(),
                        field: "module",
                    });
                }
            }
            let refs = object
                .type_id
                .iter()
                .chain(object.mro.iter().flatten())
                .chain(object.bases.iter())
                .chain(object.members.values())
                .chain(object.descriptor_type.iter());
            for id in refs {
                self.check_ref(&from, id)?;
            }
        }
        Ok(())
    }

    fn check_ref(&self, from: &str, id: &ObjectId) -> Result<(), SnapshotError> {
        if self.objects.contains_key(id) {
            Ok(())
        } else {
            Err(SnapshotError::DanglingReference {
                from: from.to_string(),
                id: id.to_string(),
            })
        }
    }

    fn category(&self, obj: &ObjectId) -> Category {
        self.objects
            .get(obj)
            .map(|o| o.category)
            .unwrap_or(Category::Instance)
    }
}

fn text_doc(value: Option<&serde_json::Value>) -> Option<String> {
    value.and_then(|v| v.as_str()).map(str::to_string)
}

impl Runtime for SnapshotRuntime {
    type Object = ObjectId;

    fn is_native_callable(&self, obj: &ObjectId) -> bool {
        matches!(
            self.category(obj),
            Category::BuiltinFunction | Category::ClassMethodDescriptor
        )
    }

    fn is_class_like(&self, obj: &ObjectId) -> bool {
        self.category(obj).is_class()
    }

    // Native functions answer here too, as they do in a live interpreter.
    fn is_method_like(&self, obj: &ObjectId) -> bool {
        matches!(
            self.category(obj),
            Category::BuiltinFunction
                | Category::ClassMethodDescriptor
                | Category::BuiltinMethod
                | Category::SlotWrapper
                | Category::MethodDescriptor
        )
    }

    fn is_accessor_descriptor(&self, obj: &ObjectId) -> bool {
        matches!(
            self.category(obj),
            Category::GetsetDescriptor | Category::MemberDescriptor
        )
    }

    fn type_of(&self, obj: &ObjectId) -> ObjectId {
        let Some(object) = self.objects.get(obj) else {
            return self.well_known.root_object.clone();
        };
        if let Some(type_id) = &object.type_id {
            return type_id.clone();
        }
        match object.category {
            Category::BuiltinFunction | Category::ClassMethodDescriptor => {
                self.well_known.builtin_function.clone()
            }
            Category::BuiltinMethod | Category::SlotWrapper | Category::MethodDescriptor => {
                self.well_known.builtin_method.clone()
            }
            _ => self.well_known.root_object.clone(),
        }
    }

    fn type_name(&self, cls: &ObjectId) -> TypeName {
        match self.objects.get(cls) {
            Some(object) => TypeName::new(
                object.module.clone().unwrap_or_default(),
                object.name.clone().unwrap_or_else(|| cls.to_string()),
            ),
            None => TypeName::new("", cls.as_str()),
        }
    }

    fn doc(&self, obj: &ObjectId) -> Option<String> {
        text_doc(self.objects.get(obj).and_then(|o| o.doc.as_ref()))
    }

    fn native_mro(&self, cls: &ObjectId) -> Option<Vec<ObjectId>> {
        let object = self.objects.get(cls)?;
        match object.category {
            Category::Class => Some(object.mro.clone().unwrap_or_else(|| vec![cls.clone()])),
            _ => None,
        }
    }

    fn bases(&self, cls: &ObjectId) -> Vec<ObjectId> {
        self.objects
            .get(cls)
            .map(|o| o.bases.clone())
            .unwrap_or_default()
    }

    fn declared_members(&self, cls: &ObjectId) -> Vec<(String, ObjectId)> {
        self.objects
            .get(cls)
            .map(|o| {
                o.members
                    .iter()
                    .map(|(name, id)| (name.clone(), id.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_static_callable(&self, obj: &ObjectId) -> bool {
        self.objects.get(obj).is_some_and(|o| o.is_static)
    }

    fn declared_signatures(&self, obj: &ObjectId) -> Option<Vec<Overload>> {
        self.objects.get(obj).and_then(|o| o.signatures.clone())
    }

    fn declared_descriptor_type(&self, obj: &ObjectId) -> Option<ObjectId> {
        self.objects.get(obj).and_then(|o| o.descriptor_type.clone())
    }

    fn well_known_types(&self) -> WellKnownTypes<ObjectId> {
        self.well_known.clone()
    }
}

impl ModuleProvider for SnapshotRuntime {
    fn import_module(&self, name: &str) -> Result<ModuleNamespace<ObjectId>, ScrapeError> {
        let module = self
            .modules
            .get(name)
            .ok_or_else(|| ScrapeError::ModuleNotFound {
                name: name.to_string(),
            })?;
        Ok(ModuleNamespace {
            name: name.to_string(),
            doc: text_doc(module.doc.as_ref()),
            entries: module
                .members
                .iter()
                .map(|(member, id)| (member.clone(), id.clone()))
                .collect(),
        })
    }

    fn builtin_module_names(&self) -> Vec<String> {
        self.builtin_modules.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_snapshot;
    use serde_json::json;

    fn id(s: &str) -> ObjectId {
        ObjectId::new(s)
    }

    mod loading {
        use super::*;

        #[test]
        fn sample_loads() {
            let runtime = SnapshotRuntime::from_value(sample_snapshot()).unwrap();
            assert!(runtime.object_count() > 10);
            assert_eq!(
                runtime.builtin_module_names(),
                vec!["builtins", "_demo", "_missing", "__main__"]
            );
        }

        #[test]
        fn dangling_member_is_rejected() {
            let mut snapshot = sample_snapshot();
            snapshot["modules"]["builtins"]["members"]["ghost"] = json!("no.such.object");

            let err = SnapshotRuntime::from_value(snapshot).unwrap_err();
            match err {
                SnapshotError::DanglingReference { from, id } => {
                    assert_eq!(from, "module builtins.ghost");
                    assert_eq!(id, "no.such.object");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn dangling_well_known_is_rejected() {
            let mut snapshot = sample_snapshot();
            snapshot["well_known"]["generator"] = json!("nope");
            assert!(matches!(
                SnapshotRuntime::from_value(snapshot),
                Err(SnapshotError::DanglingReference { .. })
            ));
        }

        #[test]
        fn class_without_name_is_rejected() {
            let mut snapshot = sample_snapshot();
            snapshot["objects"]["Anon"] = json!({"category": "class", "module": "m"});
            assert!(matches!(
                SnapshotRuntime::from_value(snapshot),
                Err(SnapshotError::MissingField { field: "name", .. })
            ));
        }

        #[test]
        fn malformed_json_is_parse_error() {
            assert!(matches!(
                SnapshotRuntime::from_json_str("{"),
                Err(SnapshotError::Parse(_))
            ));
        }

        #[test]
        fn loads_from_file() {
            let temp = tempfile::TempDir::new().unwrap();
            let path = temp.path().join("runtime.json");
            std::fs::write(&path, sample_snapshot().to_string()).unwrap();

            let runtime = SnapshotRuntime::from_file(&path).unwrap();
            assert!(runtime.import_module("builtins").is_ok());
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = SnapshotRuntime::from_file(Path::new("/nonexistent/runtime.json")).unwrap_err();
            assert!(matches!(err, SnapshotError::Io { .. }));
        }
    }

    mod capabilities {
        use super::*;

        fn runtime() -> SnapshotRuntime {
            SnapshotRuntime::from_value(sample_snapshot()).unwrap()
        }

        #[test]
        fn native_functions_also_look_like_methods() {
            let rt = runtime();
            assert!(rt.is_native_callable(&id("builtins.len")));
            assert!(rt.is_method_like(&id("builtins.len")));
            assert!(!rt.is_native_callable(&id("str.upper")));
            assert!(rt.is_method_like(&id("str.upper")));
        }

        #[test]
        fn classes_and_descriptors() {
            let rt = runtime();
            assert!(rt.is_class_like(&id("object")));
            assert!(rt.is_class_like(&id("_demo.Legacy")));
            assert!(rt.is_accessor_descriptor(&id("_demo.Point.x")));
            assert!(!rt.is_class_like(&id("_demo.answer")));
        }

        #[test]
        fn type_of_defaults_by_category() {
            let rt = runtime();
            assert_eq!(rt.type_of(&id("builtins.len")), id("builtin_function_or_method"));
            assert_eq!(rt.type_of(&id("str.upper")), id("method_descriptor"));
            assert_eq!(rt.type_of(&id("_demo.answer")), id("int"));
        }

        #[test]
        fn legacy_classes_have_no_native_mro() {
            let rt = runtime();
            assert_eq!(rt.native_mro(&id("str")), Some(vec![id("str"), id("object")]));
            assert_eq!(rt.native_mro(&id("_demo.Legacy")), None);
            assert_eq!(
                rt.bases(&id("_demo.Legacy")),
                vec![id("_demo.LegacyBase"), id("_demo.Mixin")]
            );
        }

        #[test]
        fn only_text_counts_as_doc() {
            let rt = runtime();
            assert_eq!(rt.doc(&id("builtins.len")).as_deref(), Some("len(obj) -> int\n\nReturn the number of items in a container."));
            assert_eq!(rt.doc(&id("_demo.answer")), None);
        }

        #[test]
        fn import_unknown_module_fails() {
            let rt = runtime();
            assert_eq!(
                rt.import_module("_missing").unwrap_err(),
                ScrapeError::ModuleNotFound {
                    name: "_missing".to_string()
                }
            );
            let demo = rt.import_module("_demo").unwrap();
            assert_eq!(demo.doc.as_deref(), Some("Demo extension module."));
        }
    }
}
