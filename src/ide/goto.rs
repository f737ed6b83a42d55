//! Go-to-definition for attribute values.

use std::sync::Arc;

use crate::base::{DescId, DocumentId, TextRange, TextSize};
use crate::hir::{AnalysisContext, ConstantDecl, UiNavigator, UiTree, resolve_desc_path};
use crate::parser::{PathSelector, parse_path_selector, parse_property_bind};
use crate::schema::BuiltinType;
use crate::syntax::{AttrValueKind, ElementRef, XmlAttr, XmlDocument, classify_value};

/// Result of a go-to-definition request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GotoResult {
    /// The targets to jump to.
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if any targets were found.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub document: DocumentId,
    /// The whole declaring element.
    pub range: TextRange,
    /// The `name` attribute value, or the start tag when there is none.
    pub focus_range: TextRange,
    /// Desc path, or the bare constant name.
    pub name: Arc<str>,
}

/// Find what the attribute value under `offset` refers to.
///
/// Constants jump to their `<Constant>` element. Templates, `file=` links
/// and desc paths jump to every element declaring the desc selected by the
/// fragment under the cursor.
pub fn goto_definition(
    ctx: AnalysisContext<'_>,
    tree: &mut UiTree,
    document: &XmlDocument,
    offset: TextSize,
) -> GotoResult {
    let Some(id) = document.element_at(offset) else {
        return GotoResult::empty();
    };
    let element = document.element(id);
    let Some(ty) = element.stype else {
        return GotoResult::empty();
    };
    let Some((position, attr)) = element
        .attributes
        .values()
        .find_map(|attr| attr.value_position(offset).map(|at| (at, attr)))
    else {
        return GotoResult::empty();
    };

    let complex = ctx.schema.complex_type(ty);
    let as_type = complex
        .attribute(&attr.name)
        .map(|a| a.ty)
        .or_else(|| complex.indeterminate_attributes.first().map(|rule| rule.value));
    let builtin = as_type.map_or(BuiltinType::Unknown, |st| ctx.schema.simple_type(st).builtin);

    let index = ctx.index;
    let context = index
        .resolve_element_desc(document.element_ref(id))
        .unwrap_or(index.root());
    let mut nav = UiNavigator::new(ctx, tree);

    tracing::trace!(attr = %attr.name, ?builtin, "goto definition");
    match classify_value(&attr.value) {
        AttrValueKind::Constant => match index.constant(&attr.value[1..]) {
            Some(decl) => constant_target(ctx, decl),
            None if builtin.is_selector() => {
                path_targets(&mut nav, context, &parse_path_selector(&attr.value), position)
            }
            None => GotoResult::empty(),
        },
        AttrValueKind::ConstantRacial => index
            .racial_constant(&attr.value[1..])
            .map_or_else(GotoResult::empty, |decl| constant_target(ctx, decl)),
        AttrValueKind::PropertyBind => {
            let expr = parse_property_bind(&attr.value);
            path_targets(&mut nav, context, &expr.target, position)
        }
        AttrValueKind::Generic => match builtin {
            BuiltinType::DescTemplateName => {
                let path = parse_path_selector(&attr.value);
                let Some(i) = path.selection_index_at(position) else {
                    return GotoResult::empty();
                };
                let names = path.fragment_texts(&attr.value);
                index
                    .get_multi(index.root(), &names[..=i])
                    .map_or_else(GotoResult::empty, |desc| desc_targets(ctx, desc))
            }
            BuiltinType::FileDescName => index
                .get(index.root(), &attr.value)
                .map_or_else(GotoResult::empty, |desc| desc_targets(ctx, desc)),
            BuiltinType::DescInternal | BuiltinType::FrameReference => {
                path_targets(&mut nav, context, &parse_path_selector(&attr.value), position)
            }
            _ => GotoResult::empty(),
        },
    }
}

/// Targets for the fragment of `path` under `position`.
fn path_targets(nav: &mut UiNavigator<'_>, context: DescId, path: &PathSelector, position: TextSize) -> GotoResult {
    if path.has_errors() {
        return GotoResult::empty();
    }
    let Some(i) = path.selection_index_at(position) else {
        return GotoResult::empty();
    };
    let selection = resolve_desc_path(nav, context, path);
    let ctx = nav.context();
    let mut result = GotoResult::empty();
    for &desc in selection.items.get(i).into_iter().flatten() {
        result.targets.extend(desc_targets(ctx, desc).targets);
    }
    result
}

fn desc_targets(ctx: AnalysisContext<'_>, desc: DescId) -> GotoResult {
    let ns = ctx.index.desc(desc);
    let name: Arc<str> = Arc::from(ns.fqn.as_str());
    let targets = ns
        .decls
        .iter()
        .filter_map(|decl| element_target(ctx, decl.element, name.clone()))
        .collect();
    GotoResult { targets }
}

fn constant_target(ctx: AnalysisContext<'_>, decl: &ConstantDecl) -> GotoResult {
    let targets = element_target(ctx, decl.site, Arc::from(decl.name.as_str()))
        .into_iter()
        .collect();
    GotoResult { targets }
}

fn element_target(ctx: AnalysisContext<'_>, site: ElementRef, name: Arc<str>) -> Option<GotoTarget> {
    let element = ctx.element(site)?;
    let focus_range = element
        .attr("name")
        .map_or_else(|| element.start_tag_range(), XmlAttr::value_range);
    Some(GotoTarget {
        document: site.document,
        range: element.range(),
        focus_range,
        name,
    })
}
