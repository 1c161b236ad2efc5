//! Baseline merge for freshly generated module records.
//!
//! Reflection cannot always recover everything a previous run recorded:
//! native callables may lose their signatures and accessors may report only
//! the placeholder type. Merging consults a previously persisted *baseline*
//! record and fills those gaps.
//!
//! # Rules
//!
//! The fresh record is authoritative. For each member of the fresh table:
//!
//! | Baseline entry      | Result                                             |
//! |---------------------|----------------------------------------------------|
//! | absent              | fresh entry unchanged                              |
//! | same kind: `type`   | nested member tables merged recursively            |
//! | same kind: callable | baseline overloads/doc fill empty fresh fields     |
//! | same kind: value    | baseline type replaces a fresh placeholder type    |
//! | same kind: other    | fresh entry unchanged                              |
//! | different kind      | fresh entry unchanged, conflict logged             |
//!
//! Members only present in the baseline are dropped. A type's own bases, mro,
//! doc and flags always come from the fresh record.

use tracing::{debug, warn};

use crate::types::{FunctionRecord, MemberEntry, MemberKind, MemberTable, ModuleRecord, TypeName};

/// A member whose kind differs between baseline and fresh records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConflict {
    /// Dotted path of the member from the module root, e.g. `Foo.bar`.
    pub path: String,
    pub fresh: MemberKind,
    pub baseline: MemberKind,
}

/// What a merge changed, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub conflicts: Vec<KindConflict>,
    pub overloads_adopted: usize,
    pub docs_adopted: usize,
    pub types_narrowed: usize,
}

impl MergeReport {
    /// True when the merge changed nothing and found no conflicts.
    pub fn is_noop(&self) -> bool {
        self.conflicts.is_empty()
            && self.overloads_adopted == 0
            && self.docs_adopted == 0
            && self.types_narrowed == 0
    }
}

/// Merge `fresh` against an optional baseline. See the module docs for rules.
///
/// `placeholder` is the generic type reflection reports when it cannot
/// determine anything narrower.
pub fn merge_module(
    baseline: Option<&ModuleRecord>,
    fresh: ModuleRecord,
    placeholder: &TypeName,
) -> ModuleRecord {
    merge_module_with_report(baseline, fresh, placeholder).0
}

/// Like [`merge_module`], also returning what changed.
pub fn merge_module_with_report(
    baseline: Option<&ModuleRecord>,
    mut fresh: ModuleRecord,
    placeholder: &TypeName,
) -> (ModuleRecord, MergeReport) {
    let mut merger = Merger::new(placeholder);
    if let Some(baseline) = baseline {
        merger.merge_table(&baseline.members, &mut fresh.members);
    }
    (fresh, merger.report)
}

struct Merger<'a> {
    placeholder: &'a TypeName,
    path: Vec<String>,
    report: MergeReport,
}

impl<'a> Merger<'a> {
    fn new(placeholder: &'a TypeName) -> Self {
        Merger {
            placeholder,
            path: Vec::new(),
            report: MergeReport::default(),
        }
    }

    fn merge_table(&mut self, baseline: &MemberTable, fresh: &mut MemberTable) {
        for (name, fresh_entry) in fresh.iter_mut() {
            let Some(base_entry) = baseline.get(name) else {
                continue;
            };
            self.path.push(name.clone());
            self.merge_entry(base_entry, fresh_entry);
            self.path.pop();
        }
    }

    fn merge_entry(&mut self, baseline: &MemberEntry, fresh: &mut MemberEntry) {
        match (baseline, fresh) {
            (MemberEntry::Type(base), MemberEntry::Type(new)) => {
                self.merge_table(&base.members, &mut new.members);
            }
            (MemberEntry::Function(base), MemberEntry::Function(new))
            | (MemberEntry::Method(base), MemberEntry::Method(new)) => {
                self.merge_callable(base, new);
            }
            (MemberEntry::Property(base), MemberEntry::Property(new)) => {
                self.merge_declared_type(&base.type_name, &mut new.type_name);
            }
            (MemberEntry::Data(base), MemberEntry::Data(new)) => {
                self.merge_declared_type(&base.type_name, &mut new.type_name);
            }
            (base, new) if base.kind() == new.kind() => {
                debug!(member = %self.dotted(), kind = %new.kind(), "no merge rule for kind");
            }
            (base, new) => {
                let conflict = KindConflict {
                    path: self.dotted(),
                    fresh: new.kind(),
                    baseline: base.kind(),
                };
                warn!(
                    member = %conflict.path,
                    fresh = %conflict.fresh,
                    baseline = %conflict.baseline,
                    "kinds differ, keeping fresh entry"
                );
                self.report.conflicts.push(conflict);
            }
        }
    }

    fn merge_callable(&mut self, baseline: &FunctionRecord, fresh: &mut FunctionRecord) {
        if fresh.overloads.is_empty() {
            if !baseline.overloads.is_empty() {
                debug!(member = %self.dotted(), count = baseline.overloads.len(), "adopting baseline overloads");
                fresh.overloads = baseline.overloads.clone();
                self.report.overloads_adopted += 1;
            }
        } else {
            debug!(member = %self.dotted(), count = fresh.overloads.len(), "has overloads, keeping fresh");
        }

        if fresh.doc.is_none() {
            if let Some(doc) = &baseline.doc {
                fresh.doc = Some(doc.clone());
                self.report.docs_adopted += 1;
            }
        }
    }

    fn merge_declared_type(&mut self, baseline: &TypeName, fresh: &mut TypeName) {
        if fresh == self.placeholder && baseline != self.placeholder {
            debug!(member = %self.dotted(), narrowed = %baseline, "replacing placeholder type");
            *fresh = baseline.clone();
            self.report.types_narrowed += 1;
        }
    }

    fn dotted(&self) -> String {
        self.path.join(".")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataRecord, Overload, Parameter, PropertyRecord, TypeRecord};

    fn placeholder() -> TypeName {
        TypeName::new("builtins", "object")
    }

    fn overload(param: &str) -> Overload {
        Overload::new(vec![Parameter::named(param)], TypeName::new("builtins", "int"))
    }

    fn method(overloads: Vec<Overload>, doc: Option<&str>) -> MemberEntry {
        MemberEntry::Method(FunctionRecord {
            doc: doc.map(str::to_string),
            overloads,
            builtin: true,
            is_static: false,
        })
    }

    fn property(type_name: TypeName) -> MemberEntry {
        MemberEntry::Property(PropertyRecord {
            doc: None,
            type_name,
        })
    }

    fn module_with(name: &str, entry: MemberEntry) -> ModuleRecord {
        let mut module = ModuleRecord::default();
        module.members.insert(name.to_string(), entry);
        module
    }

    fn type_with(name: &str, entry: MemberEntry) -> MemberEntry {
        let mut record = TypeRecord {
            mro: vec![TypeName::new("m", "T")],
            ..Default::default()
        };
        record.members.insert(name.to_string(), entry);
        MemberEntry::Type(record)
    }

    mod callables {
        use super::*;

        #[test]
        fn empty_fresh_adopts_baseline_overloads_and_doc() {
            let baseline = module_with("M", method(vec![overload("a")], Some("d")));
            let fresh = module_with("M", method(vec![], None));

            let (merged, report) = merge_module_with_report(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["M"], method(vec![overload("a")], Some("d")));
            assert_eq!(report.overloads_adopted, 1);
            assert_eq!(report.docs_adopted, 1);
        }

        #[test]
        fn fresh_overloads_take_precedence() {
            let baseline = module_with("M", method(vec![overload("a")], None));
            let fresh = module_with("M", method(vec![overload("b")], None));

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["M"], method(vec![overload("b")], None));
        }

        #[test]
        fn fresh_doc_is_kept() {
            let baseline = module_with("M", method(vec![], Some("old")));
            let fresh = module_with("M", method(vec![], Some("new")));

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["M"], method(vec![], Some("new")));
        }

        #[test]
        fn functions_merge_like_methods() {
            let base = FunctionRecord {
                doc: Some("len(obj)".to_string()),
                overloads: vec![overload("obj")],
                builtin: true,
                is_static: false,
            };
            let baseline = module_with("len", MemberEntry::Function(base.clone()));
            let fresh = module_with(
                "len",
                MemberEntry::Function(FunctionRecord {
                    builtin: true,
                    ..Default::default()
                }),
            );

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["len"], MemberEntry::Function(base));
        }
    }

    mod declared_types {
        use super::*;

        #[test]
        fn placeholder_is_narrowed_from_baseline() {
            let baseline = module_with("P", property(TypeName::new("m", "SpecificType")));
            let fresh = module_with("P", property(placeholder()));

            let (merged, report) = merge_module_with_report(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["P"], property(TypeName::new("m", "SpecificType")));
            assert_eq!(report.types_narrowed, 1);
        }

        #[test]
        fn concrete_fresh_type_is_kept() {
            let baseline = module_with("P", property(TypeName::new("m", "TypeA")));
            let fresh = module_with("P", property(TypeName::new("m", "TypeB")));

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["P"], property(TypeName::new("m", "TypeB")));
        }

        #[test]
        fn data_follows_same_rule() {
            let data = |t: TypeName| {
                MemberEntry::Data(DataRecord {
                    doc: None,
                    type_name: t,
                })
            };
            let baseline = module_with("x", data(TypeName::new("builtins", "dict")));
            let fresh = module_with("x", data(placeholder()));

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["x"], data(TypeName::new("builtins", "dict")));
        }

        #[test]
        fn placeholder_baseline_does_not_count_as_narrowing() {
            let baseline = module_with("P", property(placeholder()));
            let fresh = module_with("P", property(placeholder()));

            let (_, report) = merge_module_with_report(Some(&baseline), fresh, &placeholder());
            assert!(report.is_noop());
        }
    }

    mod nested_types {
        use super::*;

        #[test]
        fn type_members_merge_recursively() {
            let baseline = module_with("T", type_with("m", method(vec![overload("x")], None)));
            let fresh = module_with("T", type_with("m", method(vec![], None)));

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["T"], type_with("m", method(vec![overload("x")], None)));
        }

        #[test]
        fn type_own_fields_never_come_from_baseline() {
            let mut base_record = TypeRecord {
                mro: vec![TypeName::new("old", "T")],
                bases: vec![TypeName::new("old", "Base")],
                doc: Some("old doc".to_string()),
                is_hidden: true,
                ..Default::default()
            };
            base_record
                .members
                .insert("gone".to_string(), MemberEntry::data(placeholder()));
            let baseline = module_with("T", MemberEntry::Type(base_record));
            let fresh_record = TypeRecord {
                mro: vec![TypeName::new("m", "T")],
                ..Default::default()
            };
            let fresh = module_with("T", MemberEntry::Type(fresh_record.clone()));

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["T"], MemberEntry::Type(fresh_record));
        }
    }

    mod conflicts {
        use super::*;

        #[test]
        fn kind_conflict_keeps_fresh_entry() {
            let baseline = module_with("C", MemberEntry::data(TypeName::new("m", "C")));
            let fresh_entry = type_with("x", MemberEntry::data(placeholder()));
            let fresh = module_with("C", fresh_entry.clone());

            let (merged, report) = merge_module_with_report(Some(&baseline), fresh, &placeholder());
            assert_eq!(merged.members["C"], fresh_entry);
            assert_eq!(
                report.conflicts,
                vec![KindConflict {
                    path: "C".to_string(),
                    fresh: MemberKind::Type,
                    baseline: MemberKind::Data,
                }]
            );
        }

        #[test]
        fn nested_conflict_reports_dotted_path() {
            let baseline = module_with("T", type_with("x", method(vec![], None)));
            let fresh = module_with("T", type_with("x", property(placeholder())));

            let (_, report) = merge_module_with_report(Some(&baseline), fresh, &placeholder());
            assert_eq!(report.conflicts.len(), 1);
            assert_eq!(report.conflicts[0].path, "T.x");
        }
    }

    mod passthrough {
        use super::*;

        #[test]
        fn missing_baseline_returns_fresh_unchanged() {
            let mut fresh = module_with("M", method(vec![], None));
            fresh.doc = Some("module doc".to_string());

            let (merged, report) = merge_module_with_report(None, fresh.clone(), &placeholder());
            assert_eq!(merged, fresh);
            assert!(report.is_noop());
        }

        #[test]
        fn baseline_only_members_are_dropped() {
            let baseline = module_with("old", method(vec![overload("a")], None));
            let fresh = module_with("new", method(vec![], None));

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert!(!merged.members.contains_key("old"));
            assert_eq!(merged.members["new"], method(vec![], None));
        }

        #[test]
        fn module_doc_is_not_merged() {
            let baseline = ModuleRecord {
                doc: Some("baseline doc".to_string()),
                ..Default::default()
            };
            let fresh = ModuleRecord::default();

            let merged = merge_module(Some(&baseline), fresh, &placeholder());
            assert!(merged.doc.is_none());
        }
    }
}
