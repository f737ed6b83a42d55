//! Symbol listing for workspace and document views.

use std::sync::Arc;

use crate::base::{DocumentId, TextRange};
use crate::hir::{AnalysisContext, DescKind};
use crate::schema::ElementDefKind;
use crate::syntax::XmlDocument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Constant,
    Frame,
    Animation,
    StateGroup,
    State,
}

impl SymbolKind {
    fn from_desc(kind: DescKind) -> Option<Self> {
        match kind {
            DescKind::Frame => Some(SymbolKind::Frame),
            DescKind::Animation => Some(SymbolKind::Animation),
            DescKind::StateGroup => Some(SymbolKind::StateGroup),
            DescKind::Root | DescKind::File => None,
        }
    }
}

/// A symbol for the workspace symbol list or document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: Arc<str>,
    /// Slash-joined desc path; constants use their bare name.
    pub qualified_name: Arc<str>,
    pub kind: SymbolKind,
    pub document: DocumentId,
    /// The whole declaring element.
    pub range: TextRange,
    /// The `name` attribute value.
    pub selection_range: TextRange,
}

impl SymbolInfo {
    /// Get the container name (parent path) for hierarchy building.
    pub fn container_name(&self) -> Option<&str> {
        let qname = self.qualified_name.as_ref();
        qname.rfind('/').map(|idx| &qname[..idx])
    }
}

/// Get all symbols in a specific document, in source order.
pub fn document_symbols(ctx: AnalysisContext<'_>, document: &XmlDocument) -> Vec<SymbolInfo> {
    let mut results = Vec::new();

    for id in document.descendants() {
        let element = document.element(id);
        let Some(def) = element.sdef else {
            continue;
        };
        let Some(name_attr) = element.attr("name").filter(|a| !a.value.is_empty()) else {
            continue;
        };
        let eref = document.element_ref(id);

        let (kind, qualified_name) = match ctx.schema.element_def(def).kind {
            ElementDefKind::Constant => (SymbolKind::Constant, name_attr.value.clone()),
            ElementDefKind::StateGroupState => {
                let Some(scope) = ctx.index.resolve_element_desc(eref) else {
                    continue;
                };
                let fqn = &ctx.index.desc(scope).fqn;
                (SymbolKind::State, format!("{fqn}/{}", name_attr.value))
            }
            kind if kind.declares_desc() => {
                let Some(desc) = ctx.index.declared_desc(eref) else {
                    continue;
                };
                let ns = ctx.index.desc(desc);
                let Some(kind) = SymbolKind::from_desc(ns.kind) else {
                    continue;
                };
                (kind, ns.fqn.clone())
            }
            _ => continue,
        };

        results.push(SymbolInfo {
            name: name_attr.value.as_str().into(),
            qualified_name: qualified_name.into(),
            kind,
            document: document.id(),
            range: element.range(),
            selection_range: name_attr.value_range(),
        });
    }
    results
}

/// Get all descs and constants in the workspace, optionally filtered by a
/// case-insensitive substring of the name or path. Sorted by name.
pub fn workspace_symbols(ctx: AnalysisContext<'_>, query: Option<&str>) -> Vec<SymbolInfo> {
    let query_lower = query.map(str::to_lowercase);
    let matches = |name: &str, qualified: &str| match &query_lower {
        Some(q) => name.to_lowercase().contains(q) || qualified.to_lowercase().contains(q),
        None => true,
    };

    let mut results = Vec::new();
    for (_, ns) in ctx.index.descs() {
        let Some(kind) = SymbolKind::from_desc(ns.kind) else {
            continue;
        };
        if !matches(&ns.name, &ns.fqn) {
            continue;
        }
        let Some(decl) = ns.decls.first() else {
            continue;
        };
        let Some(element) = ctx.element(decl.element) else {
            continue;
        };
        results.push(SymbolInfo {
            name: ns.name.as_str().into(),
            qualified_name: ns.fqn.as_str().into(),
            kind,
            document: decl.element.document,
            range: element.range(),
            selection_range: element.attr("name").map_or(element.start_tag_range(), |a| a.value_range()),
        });
    }

    for (name, decls) in ctx.index.constants() {
        let Some(decl) = decls.first() else {
            continue;
        };
        if !matches(name, name) {
            continue;
        }
        let Some(element) = ctx.element(decl.site) else {
            continue;
        };
        results.push(SymbolInfo {
            name: name.as_str().into(),
            qualified_name: name.as_str().into(),
            kind: SymbolKind::Constant,
            document: decl.site.document,
            range: element.range(),
            selection_range: element.attr("name").map_or(element.start_tag_range(), |a| a.value_range()),
        });
    }

    results.sort_by(|a, b| a.name.cmp(&b.name));
    results
}
