//! Driver operations behind the `idbgen` binary.
//!
//! - `generate` - scrape every builtin module of a runtime into a store
//! - `dump` - decode one store file
//!
//! ## Generation Order
//!
//! 1. The root pseudo-module, with its hidden representation types. Any
//!    failure here aborts the run.
//! 2. Every other builtin module the runtime reports, minus the configured
//!    skip list. A module that cannot be imported, encoded or written is
//!    skipped with a warning and the run continues.
//!
//! Each module is merged against the baseline store (when one is given)
//! before it is written. A baseline file that is missing means "no
//! baseline"; one that cannot be decoded is logged and treated the same way.
//!
//! ## Error Handling
//!
//! All functions return `Result<T, IdbError>` so the binary can map failures
//! to stable exit codes.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use idbgen_core::codec::decode_module;
use idbgen_core::config::{ResolverKind, ScrapeConfig};
use idbgen_core::error::IdbError;
use idbgen_core::merge::merge_module_with_report;
use idbgen_core::output::{DumpResponse, GenerateResponse, SkippedModule};
use idbgen_core::store::{DatabaseStore, StoreError};
use idbgen_core::types::{ModuleRecord, TypeName};
use idbgen_python::{
    extract_builtin_module, extract_module, resolver_for, Classifier, ModuleProvider,
    SnapshotRuntime,
};
use tracing::{debug, debug_span, info, info_span, warn};

/// Inputs for `generate`. `None` fields fall back to the config file, then
/// to defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Runtime snapshot (JSON).
    pub runtime: PathBuf,
    /// Output store directory.
    pub out: PathBuf,
    /// Previously generated store to enrich from.
    pub baseline: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub resolver: Option<ResolverKind>,
    pub max_depth: Option<usize>,
}

/// Build the run configuration: file (or defaults), then flag overrides.
pub fn load_config(options: &GenerateOptions) -> Result<ScrapeConfig, IdbError> {
    let mut config = match &options.config {
        Some(path) => ScrapeConfig::from_file(path)?,
        None => ScrapeConfig::default(),
    };
    if let Some(resolver) = options.resolver {
        config.resolver = resolver;
    }
    if let Some(max_depth) = options.max_depth {
        config.max_type_depth = max_depth;
    }
    config.validate()?;
    Ok(config)
}

/// Load the runtime snapshot and generate a store from it.
pub fn run_generate(options: &GenerateOptions) -> Result<GenerateResponse, IdbError> {
    let config = load_config(options)?;
    let runtime = SnapshotRuntime::from_file(&options.runtime)?;
    info!(
        runtime = %options.runtime.display(),
        objects = runtime.object_count(),
        "loaded runtime snapshot"
    );

    let out = DatabaseStore::new(&options.out);
    let baseline = options.baseline.as_ref().map(DatabaseStore::new);
    generate(&runtime, &config, &out, baseline.as_ref())
}

/// Generate a store for every builtin module `provider` reports.
pub fn generate<P: ModuleProvider>(
    provider: &P,
    config: &ScrapeConfig,
    out: &DatabaseStore,
    baseline: Option<&DatabaseStore>,
) -> Result<GenerateResponse, IdbError> {
    let _span = info_span!("generate", out = %out.root().display()).entered();
    let resolver = resolver_for::<P>(config);
    let classifier = Classifier::new(provider, resolver.as_ref(), config);
    let placeholder = config.placeholder();

    let root = &config.builtin_module;
    let fresh = extract_builtin_module(&classifier, root)?;
    let mut kind_conflicts = write_merged(out, baseline, root, fresh, &placeholder)?;
    let mut modules_written = vec![root.clone()];
    let mut modules_skipped = Vec::new();

    let mut seen = HashSet::new();
    for module in provider.builtin_module_names() {
        if !config.should_scrape(&module) || !seen.insert(module.clone()) {
            debug!(module = %module, "not scraping");
            continue;
        }
        let _module_span = debug_span!("module", module = %module).entered();
        let result = extract_module(&classifier, &module)
            .map_err(IdbError::from)
            .and_then(|fresh| write_merged(out, baseline, &module, fresh, &placeholder));
        match result {
            Ok(conflicts) => {
                kind_conflicts += conflicts;
                modules_written.push(module);
            }
            Err(err) => {
                warn!(module = %module, error = %err, "skipping module");
                modules_skipped.push(SkippedModule {
                    name: module,
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        written = modules_written.len(),
        skipped = modules_skipped.len(),
        kind_conflicts,
        "generation finished"
    );
    Ok(GenerateResponse::new(
        modules_written,
        modules_skipped,
        kind_conflicts,
    ))
}

/// Merge `fresh` against the baseline and save it. Returns the number of kind conflicts.
fn write_merged(
    out: &DatabaseStore,
    baseline: Option<&DatabaseStore>,
    module: &str,
    fresh: ModuleRecord,
    placeholder: &TypeName,
) -> Result<usize, IdbError> {
    let previous = baseline.and_then(|store| load_baseline(store, module));
    let (merged, report) = merge_module_with_report(previous.as_ref(), fresh, placeholder);
    let path = out.save(module, &merged)?;
    debug!(
        module,
        path = %path.display(),
        overloads_adopted = report.overloads_adopted,
        docs_adopted = report.docs_adopted,
        types_narrowed = report.types_narrowed,
        "wrote module"
    );
    Ok(report.conflicts.len())
}

fn load_baseline(store: &DatabaseStore, module: &str) -> Option<ModuleRecord> {
    match store.load(module) {
        Ok(record) => record,
        Err(err) => {
            warn!(module, error = %err, "ignoring unreadable baseline");
            None
        }
    }
}

/// Decode one store file.
pub fn run_dump(path: &Path) -> Result<DumpResponse, IdbError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            IdbError::file_not_found(path.display().to_string())
        } else {
            IdbError::from(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    })?;
    let module = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let record = decode_module(&bytes).map_err(|source| StoreError::Codec {
        module: module.clone(),
        source,
    })?;
    Ok(DumpResponse::new(module, record))
}
