//! Semantic checker for layout documents.
//!
//! Walks a bound document and reports, per element:
//!
//! - schema conformance: required and unknown attributes, unknown elements,
//!   attribute values against their simple types
//! - namespace references: constants, property binds, template and desc
//!   paths, `file=` links, redeclared siblings
//!
//! Schema conformance problems are reported first, followed by namespace
//! problems, each group in document order.

use crate::base::{ComplexTypeId, DescId, ElementId, SimpleTypeId, TextRange, offset};
use crate::parser::{PathSelector, SelectorKind, SyntaxError, parse_path_selector, parse_property_bind};
use crate::schema::{BuiltinType, ComplexType};
use crate::syntax::{AttrValueKind, ElementRef, XmlAttr, XmlDocument, XmlElement, classify_value};

use super::context::AnalysisContext;
use super::diagnostics::{Diagnostic, DiagnosticCollector, RelatedInfo, codes};
use super::hierarchy::{UiNavigator, UiTree};
use super::index::DescKind;

// ============================================================================
// DESC PATH RESOLUTION
// ============================================================================

/// Descs selected by each fragment of a desc path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescResolvedSelection {
    /// One entry per resolved fragment; a fragment can select several
    /// merged descs.
    pub items: Vec<Vec<DescId>>,
    pub fragment_count: usize,
}

impl DescResolvedSelection {
    pub fn is_valid(&self) -> bool {
        self.fragment_count > 0 && self.items.len() == self.fragment_count
    }

    /// First desc selected by the last fragment, if the path resolved.
    pub fn first_target(&self) -> Option<DescId> {
        if !self.is_valid() {
            return None;
        }
        self.items.last().and_then(|descs| descs.first()).copied()
    }
}

/// Resolve a desc path relative to `context`.
///
/// A path starting with `$root` names its first two fragments in the desc
/// namespace directly (`$root/File/Frame`); everything else is evaluated on
/// the effective hierarchy.
pub fn resolve_desc_path(nav: &mut UiNavigator<'_>, context: DescId, path: &PathSelector) -> DescResolvedSelection {
    let index = nav.context().index;
    let mut selection = DescResolvedSelection {
        items: Vec::with_capacity(path.len()),
        fragment_count: path.len(),
    };
    let rooted = path.path.first().is_some_and(|f| f.kind == SelectorKind::Root);
    let mut relative = context;
    let mut node = None;

    for (i, fragment) in path.path.iter().enumerate() {
        if rooted && i < 3 {
            if i == 0 {
                relative = index.root();
            } else {
                let next = match (fragment.kind, fragment.name()) {
                    (SelectorKind::Identifier, Some(name)) => index.get(relative, name),
                    _ => None,
                };
                match next {
                    Some(next) => relative = next,
                    None => break,
                }
            }
            selection.items.push(vec![relative]);
            continue;
        }

        let current = match node {
            Some(current) => current,
            None => match nav.builder().build_node_from_desc(relative) {
                Some(built) => built,
                None => break,
            },
        };
        let Some(next) = nav.resolve_selector_fragment(current, fragment) else {
            break;
        };
        node = Some(next);
        selection.items.push(nav.node(next).descs.iter().copied().collect());
    }
    selection
}

// ============================================================================
// CHECKER
// ============================================================================

/// Checks one document against the schema and the desc index.
pub struct LayoutChecker<'a> {
    ctx: AnalysisContext<'a>,
    nav: UiNavigator<'a>,
    document: &'a XmlDocument,
    validator: DiagnosticCollector,
    diagnostics: DiagnosticCollector,
}

impl<'a> LayoutChecker<'a> {
    pub fn new(ctx: AnalysisContext<'a>, tree: &'a mut UiTree, document: &'a XmlDocument) -> Self {
        Self {
            ctx,
            nav: UiNavigator::new(ctx, tree),
            document,
            validator: DiagnosticCollector::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Check the whole document.
    pub fn check(mut self) -> Vec<Diagnostic> {
        if let Some(root) = self.document.root() {
            self.check_element(root);
        }
        self.finish()
    }

    /// Schema diagnostics followed by namespace diagnostics.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        let mut all = self.validator.take();
        all.extend(self.diagnostics.take());
        all
    }

    fn check_element(&mut self, id: ElementId) {
        let doc = self.document;
        let element = doc.element(id);
        let (Some(def), Some(ty)) = (element.sdef, element.stype) else {
            return;
        };
        let eref = doc.element_ref(id);
        let schema = self.ctx.schema;
        let index = self.ctx.index;

        self.check_required_attributes(element, schema.complex_type(ty));

        let context = index.resolve_element_desc(eref).unwrap_or(index.root());
        if schema.element_def(def).kind.declares_desc() {
            if let Some(declared) = index.declared_desc(eref) {
                self.check_declaration(element, eref, declared);
            }
        }

        self.check_attributes(element, ty, context);

        for (_, child) in doc.children(id) {
            if !child.is_bound() {
                let name_range = TextRange::at(child.start + offset(1), offset(child.tag.len()));
                self.validator.message(
                    name_range,
                    codes::UNKNOWN_ELEMENT,
                    format!("Unknown element \"{}\"", child.tag),
                );
            }
        }
        for &child in &element.children {
            self.check_element(child);
        }
    }

    fn check_required_attributes(&mut self, element: &XmlElement, complex: &ComplexType) {
        for attr in complex.attributes.values().filter(|a| a.required) {
            if element.attr(&attr.name).is_none() {
                self.validator.error(
                    element.start_tag_range(),
                    codes::MISSING_REQUIRED_ATTRIBUTE,
                    format!("Missing required attribute \"{}\"", attr.name),
                );
            }
        }
    }

    /// `file=` links and same-document redeclarations of a desc-declaring
    /// element.
    fn check_declaration(&mut self, element: &XmlElement, eref: ElementRef, desc: DescId) {
        let index = self.ctx.index;
        let ns = index.desc(desc);

        if let Some(file) = element.attr("file") {
            if index.get(index.root(), &file.value).is_none() {
                self.diagnostics.error(
                    file.value_range(),
                    codes::FILE_DESC_NOT_FOUND,
                    format!("Failed to locate specified File Desc \"{}\"", file.value),
                );
            } else if self.nav.builder().build_node_from_desc(desc).is_none() {
                let range = element
                    .attr("name")
                    .map(XmlAttr::value_range)
                    .unwrap_or_else(|| element.start_tag_range());
                self.diagnostics.error(
                    range,
                    codes::DESC_NOT_IN_FILE,
                    format!(
                        "Failed to locate specified Desc \"{}\" in File Desc \"{}\"",
                        ns.name, file.value
                    ),
                );
            }
            return;
        }

        if ns.decls.len() < 2 {
            return;
        }
        let earlier = ns
            .decls_in(eref.document)
            .find(|d| d.element != eref && d.start <= element.start);
        if let Some(earlier) = earlier {
            let mut diagnostic = Diagnostic::error(
                element.start_tag_range(),
                format!("Child redeclared - element with that name already exists: \"{}\"", ns.fqn),
            )
            .with_code(codes::CHILD_REDECLARED);
            if let Some(first) = self.document.get(earlier.element.element) {
                diagnostic = diagnostic.with_related(RelatedInfo {
                    document: eref.document,
                    range: first.start_tag_range(),
                    message: "first declared here".into(),
                });
            }
            self.diagnostics.add(diagnostic);
        }
    }

    fn check_attributes(&mut self, element: &XmlElement, ty: ComplexTypeId, context: DescId) {
        let schema = self.ctx.schema;
        let complex = schema.complex_type(ty);
        let mut consumed = vec![false; complex.indeterminate_attributes.len()];

        for attr in element.attributes.values() {
            let declared = complex.attribute(&attr.name).map(|a| a.ty);
            let as_type = declared.or_else(|| {
                let i = consumed.iter().position(|&c| !c)?;
                consumed[i] = true;
                let rule = complex.indeterminate_attributes[i];
                self.check_indeterminate_name(attr, rule.key);
                Some(rule.value)
            });

            let Some(as_type) = as_type else {
                if !complex.flags.allow_extra_attrs {
                    self.diagnostics.message(
                        attr.name_range(),
                        codes::UNKNOWN_ATTRIBUTE,
                        format!("Unknown attribute \"{}\"", attr.name),
                    );
                }
                continue;
            };

            let kind = classify_value(&attr.value);
            match kind {
                AttrValueKind::Constant | AttrValueKind::ConstantRacial => {
                    self.check_constant_reference(attr, kind, as_type, context);
                }
                AttrValueKind::PropertyBind => self.check_property_bind(attr),
                AttrValueKind::Generic => self.check_generic_attribute(attr, as_type, context),
            }
        }

        for (rule, consumed) in complex.indeterminate_attributes.iter().zip(consumed) {
            if !consumed {
                self.diagnostics.error(
                    element.start_tag_range(),
                    codes::MISSING_SPECIAL_ATTRIBUTE,
                    format!("Missing special attribute [{}]", schema.simple_type(rule.key).name),
                );
            }
        }
    }

    /// Names matched by a wildcard rule must satisfy its key type.
    fn check_indeterminate_name(&mut self, attr: &XmlAttr, key: SimpleTypeId) {
        let schema = self.ctx.schema;
        if schema.simple_type(key).builtin == BuiltinType::PropertyName {
            if schema.property_by_name(&attr.name).is_none() {
                self.diagnostics.message(
                    attr.name_range(),
                    codes::INVALID_ATTRIBUTE_NAME,
                    format!("Unknown property \"{}\"", attr.name),
                );
            }
            return;
        }
        if let Err(err) = schema.validate_value(&attr.name, key) {
            self.diagnostics.message(
                attr.name_range(),
                codes::INVALID_ATTRIBUTE_NAME,
                format!("Invalid attribute name \"{}\": {err}", attr.name),
            );
        }
    }

    fn check_constant_reference(&mut self, attr: &XmlAttr, kind: AttrValueKind, as_type: SimpleTypeId, context: DescId) {
        let index = self.ctx.index;
        let name = &attr.value[1..];
        let found = match kind {
            AttrValueKind::ConstantRacial => index.racial_constant(name).is_some(),
            _ => index.constant(name).is_some(),
        };
        if found {
            return;
        }

        // `$Name` in a selector-typed attribute may be a handle rather than a constant.
        let builtin = self.ctx.schema.simple_type(as_type).builtin;
        if kind == AttrValueKind::Constant && builtin.is_selector() && index.handle(name).is_some() {
            self.check_generic_attribute(attr, as_type, context);
            return;
        }

        self.diagnostics.error(
            attr.value_range(),
            codes::UNDECLARED_CONSTANT,
            format!("Undeclared constant \"{}\"", attr.value),
        );
    }

    fn check_property_bind(&mut self, attr: &XmlAttr) {
        let expr = parse_property_bind(&attr.value);
        if expr.has_errors() {
            self.forward_syntax_errors(attr, &expr.diagnostics);
            return;
        }
        let Some(property) = expr.property_name() else {
            return;
        };
        if self.ctx.schema.property_by_name(property).is_none() {
            self.diagnostics.message(
                attr.value_range(),
                codes::UNKNOWN_PROPERTY,
                format!("Unknown property \"{property}\" in property bind expression"),
            );
        }
    }

    /// Validate a plain value, then check the references it makes.
    pub fn check_generic_attribute(&mut self, attr: &XmlAttr, as_type: SimpleTypeId, context: DescId) {
        let schema = self.ctx.schema;
        if let Err(err) = schema.validate_value(&attr.value, as_type) {
            self.diagnostics.error(
                attr.value_range(),
                codes::INVALID_VALUE,
                format!("Invalid value for \"{}\": {err}", attr.name),
            );
            return;
        }

        let st = schema.simple_type(as_type);
        match st.builtin {
            BuiltinType::DescTemplateName => {
                let Some(path) = self.parse_desc_path(attr) else {
                    return;
                };
                let index = self.ctx.index;
                match index.get_multi(index.root(), path.fragment_texts(&attr.value)) {
                    None => self.diagnostics.error(
                        attr.value_range(),
                        codes::TEMPLATE_NOT_FOUND,
                        format!("Could not find template \"{}\"", attr.value),
                    ),
                    Some(target) if index.desc(target).kind == DescKind::File => self.diagnostics.error(
                        attr.value_range(),
                        codes::FILE_AS_TEMPLATE,
                        "Cannot use FileDesc as template",
                    ),
                    Some(_) => {}
                }
            }
            BuiltinType::DescInternal => {
                let Some(path) = self.parse_desc_path(attr) else {
                    return;
                };
                let selection = resolve_desc_path(&mut self.nav, context, &path);
                if !selection.is_valid() {
                    let fragment = &path.path[selection.items.len()];
                    self.diagnostics.error(
                        attr.source_range(fragment.range),
                        codes::UNRESOLVED_DESC,
                        format!("Couldn't find matching desc for \"{}\"", attr.value),
                    );
                    return;
                }
                let Some(target) = selection.first_target() else {
                    return;
                };

                let Some(internal) = st.internal_type.as_deref() else {
                    return;
                };
                let frame_type = self.ctx.desc_frame_type(target);
                if !frame_type.is_some_and(|ft| ft.has_class(internal)) {
                    let found = match frame_type {
                        Some(ft) => ft.name.to_string(),
                        None => self.desc_type_name(target),
                    };
                    self.diagnostics.error(
                        attr.value_range(),
                        codes::DESC_TYPE_MISMATCH,
                        format!("Specified desc of type \"{found}\" is not a descendant of \"{internal}\""),
                    );
                }
            }
            _ => {}
        }
    }

    /// Parse a path-valued attribute, forwarding syntax errors. `None` if
    /// the path is malformed or empty.
    fn parse_desc_path(&mut self, attr: &XmlAttr) -> Option<PathSelector> {
        let path = parse_path_selector(&attr.value);
        if path.has_errors() {
            self.forward_syntax_errors(attr, &path.diagnostics);
            return None;
        }
        if path.is_empty() {
            self.diagnostics
                .error(attr.value_range(), codes::PATH_NOT_SPECIFIED, "Path not specified");
            return None;
        }
        Some(path)
    }

    fn forward_syntax_errors(&mut self, attr: &XmlAttr, errors: &[SyntaxError]) {
        self.diagnostics.extend(errors.iter().map(|e| {
            let mut diagnostic = Diagnostic::from(e);
            diagnostic.range = attr.source_range(e.range);
            diagnostic
        }));
    }

    fn desc_type_name(&self, desc: DescId) -> String {
        let ns = self.ctx.index.desc(desc);
        match ns.stype() {
            Some(ty) => self.ctx.schema.complex_type(ty).name.to_string(),
            None => ns.kind.as_str().to_string(),
        }
    }
}

/// Check one document. Returns no diagnostics for a document without a root.
pub fn check_file(ctx: AnalysisContext<'_>, tree: &mut UiTree, document: &XmlDocument) -> Vec<Diagnostic> {
    let diagnostics = LayoutChecker::new(ctx, tree, document).check();
    tracing::debug!(path = document.path(), count = diagnostics.len(), "checked document");
    diagnostics
}
