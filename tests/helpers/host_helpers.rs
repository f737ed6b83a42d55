//! Building analysis hosts over the fixture schema.

use std::sync::Arc;

use layout_semantics::base::DescId;
use layout_semantics::{AnalysisHost, Diagnostic, DocumentId, SchemaRegistry};
use once_cell::sync::Lazy;

const SCHEMA_JSON: &str = include_str!("../fixtures/layout_schema.json");

/// The fixture schema, loaded once for the whole test binary.
pub static SCHEMA: Lazy<Arc<SchemaRegistry>> = Lazy::new(|| {
    Arc::new(SchemaRegistry::from_json(SCHEMA_JSON).expect("fixture schema should load"))
});

/// Create a host with the given `(path, text)` documents loaded in order.
pub fn host_with(files: &[(&str, &str)]) -> AnalysisHost {
    let mut host = AnalysisHost::new(Arc::clone(&SCHEMA));
    for (path, text) in files {
        set_file(&mut host, path, text);
    }
    host
}

/// Load or replace one document, panicking on malformed XML.
pub fn set_file(host: &mut AnalysisHost, path: &str, text: &str) -> DocumentId {
    host.set_file_content(path, text)
        .unwrap_or_else(|err| panic!("failed to parse {path}: {err}"))
}

/// Diagnostics of a loaded document.
pub fn check(host: &mut AnalysisHost, path: &str) -> Vec<Diagnostic> {
    let id = host
        .document_id(path)
        .unwrap_or_else(|| panic!("{path} is not loaded"));
    host.analysis().check_file(id)
}

/// The desc at a slash-joined namespace path.
pub fn desc(host: &AnalysisHost, fqn: &str) -> DescId {
    host.index()
        .lookup(fqn)
        .unwrap_or_else(|| panic!("desc {fqn} not found"))
}
