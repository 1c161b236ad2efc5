//! Module extraction.

use idbgen_core::types::{MemberTable, ModuleRecord};
use tracing::debug;

use crate::classify::Classifier;
use crate::runtime::{ModuleProvider, ScrapeError};

/// Resolve `name` and classify every top-level namespace entry.
pub fn extract_module<P: ModuleProvider>(
    classifier: &Classifier<'_, P>,
    name: &str,
) -> Result<ModuleRecord, ScrapeError> {
    let namespace = classifier.runtime().import_module(name)?;
    let mut members = MemberTable::new();
    for (member, value) in &namespace.entries {
        members.insert(member.clone(), classifier.classify(value, false));
    }
    debug!(module = name, members = members.len(), "extracted module");
    Ok(ModuleRecord {
        doc: namespace.doc,
        members,
    })
}

/// Extract the root pseudo-module, adding the hidden representation types.
///
/// The hidden entries replace same-named namespace entries.
pub fn extract_builtin_module<P: ModuleProvider>(
    classifier: &Classifier<'_, P>,
    name: &str,
) -> Result<ModuleRecord, ScrapeError> {
    let mut record = extract_module(classifier, name)?;
    for (member, obj) in classifier.well_known().hidden_entries() {
        record
            .members
            .insert(member.to_string(), classifier.classify(obj, true));
    }
    Ok(record)
}
