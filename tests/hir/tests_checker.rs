//! Layout checker diagnostics.

use layout_semantics::{LineCol, LineIndex, Severity};
use layout_semantics::hir::codes;
use rstest::rstest;

use crate::helpers::diagnostic_helpers::{
    assert_no_diagnostics, diagnostics_for, diagnostics_from_layout, errors_from_layout, format_diagnostics,
    single, text_at, with_code,
};
use crate::helpers::host_helpers::{check, host_with, set_file};
use crate::helpers::source_fixtures::{
    GAME_UI, GAME_UI_PATH, TEMPLATES, TEMPLATES_PATH, TEMPLATES_WITHOUT_CLOSE,
};

fn in_frame(body: &str) -> String {
    format!(r#"<Desc><Frame type="Frame" name="A">{body}</Frame></Desc>"#)
}

// ============================================================================
// CLEAN DOCUMENTS
// ============================================================================

#[test]
fn test_fixture_workspace_checks_clean() {
    let files = [(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, GAME_UI)];
    for path in [TEMPLATES_PATH, GAME_UI_PATH] {
        let diagnostics = diagnostics_for(&files, path);
        assert!(
            diagnostics.is_empty(),
            "Expected {path} to check clean, got:\n{}",
            format_diagnostics(&diagnostics)
        );
    }
}

#[test]
fn test_empty_root_checks_clean() {
    assert_no_diagnostics("<Desc/>");
}

#[test]
fn test_foreign_root_is_not_checked() {
    assert_no_diagnostics(r#"<Other><Frame name="A"/></Other>"#);
}

// ============================================================================
// SCHEMA CONFORMANCE
// ============================================================================

#[test]
fn test_invalid_frame_type_reported_on_value() {
    let source = r#"<Desc><Frame type="Bogus" name="X"/></Desc>"#;
    let diagnostics = diagnostics_from_layout(source);

    let diagnostic = single(&diagnostics, codes::INVALID_VALUE);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(text_at(source, diagnostic.range), "\"Bogus\"");
    assert!(diagnostic.message.contains("\"type\""), "{}", diagnostic.message);
}

#[test]
fn test_diagnostic_line_and_column() {
    let source = "<Desc>\n    <Frame type=\"Bogus\" name=\"X\"/>\n</Desc>";
    let diagnostics = diagnostics_from_layout(source);
    let diagnostic = single(&diagnostics, codes::INVALID_VALUE);

    let lines = LineIndex::new(source);
    assert_eq!(lines.line_col(diagnostic.range.start()), LineCol::new(1, 16));
    assert_eq!(lines.offset(LineCol::new(1, 16)), Some(diagnostic.range.start()));
}

#[rstest]
#[case(r#"<Height val="12"/>"#, None)]
#[case(r#"<Height val="-1"/>"#, Some(codes::INVALID_VALUE))]
#[case(r#"<Width val="Fill"/>"#, None)]
#[case(r#"<Width val="-20"/>"#, None)]
#[case(r#"<Width val="Half"/>"#, Some(codes::INVALID_VALUE))]
#[case(r#"<Color val=""/>"#, None)]
#[case(r#"<Color val="255,128,0"/>"#, None)]
#[case(r#"<Color val="12,300,0"/>"#, Some(codes::INVALID_VALUE))]
#[case(r#"<Alignment val="Left|Center"/>"#, None)]
#[case(r#"<Alignment val="Left|Top"/>"#, Some(codes::INVALID_VALUE))]
#[case(r#"<Visible val="TRUE"/>"#, None)]
#[case(r#"<Visible val="yes"/>"#, Some(codes::INVALID_VALUE))]
#[case(r#"<Anchor side="Left" relative="$this"/>"#, None)]
#[case(r#"<Anchor side="Middle" relative="$this"/>"#, Some(codes::INVALID_VALUE))]
fn test_property_values(#[case] property: &str, #[case] expected: Option<&str>) {
    let diagnostics = diagnostics_from_layout(&in_frame(property));
    let found: Vec<_> = diagnostics.iter().map(|d| d.code.as_deref()).collect();
    match expected {
        Some(code) => assert_eq!(found, vec![Some(code)], "{property}"),
        None => assert!(found.is_empty(), "{property}:\n{}", format_diagnostics(&diagnostics)),
    }
}

#[rstest]
#[case("DEADBEEF", false)]
#[case("deadbeef", false)]
#[case("DEADBEEF00", true)]
#[case("xyz", true)]
fn test_pattern_typed_attribute(#[case] id: &str, #[case] invalid: bool) {
    let source = format!(r#"<Desc><Frame type="Frame" name="A" id="{id}"/></Desc>"#);
    let diagnostics = diagnostics_from_layout(&source);
    assert_eq!(
        !with_code(&diagnostics, codes::INVALID_VALUE).is_empty(),
        invalid,
        "{id}: {}",
        format_diagnostics(&diagnostics)
    );
}

#[test]
fn test_missing_required_attribute() {
    let source = r#"<Desc><Frame name="A"/></Desc>"#;
    let diagnostics = diagnostics_from_layout(source);

    let diagnostic = single(&diagnostics, codes::MISSING_REQUIRED_ATTRIBUTE);
    assert!(diagnostic.is_error());
    assert_eq!(diagnostic.message.as_ref(), "Missing required attribute \"type\"");
    assert_eq!(text_at(source, diagnostic.range), r#"<Frame name="A"/>"#);
}

#[test]
fn test_missing_required_attributes_each_reported() {
    let diagnostics = diagnostics_from_layout(&in_frame("<Anchor/>"));
    let messages: Vec<_> = with_code(&diagnostics, codes::MISSING_REQUIRED_ATTRIBUTE)
        .iter()
        .map(|d| d.message.to_string())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Missing required attribute \"side\"".to_string(),
            "Missing required attribute \"relative\"".to_string(),
        ]
    );
}

#[test]
fn test_unknown_attribute_is_message() {
    let source = r#"<Desc><Frame type="Frame" name="A" bogus="1"/></Desc>"#;
    let diagnostics = diagnostics_from_layout(source);

    let diagnostic = single(&diagnostics, codes::UNKNOWN_ATTRIBUTE);
    assert_eq!(diagnostic.severity, Severity::Message);
    assert_eq!(text_at(source, diagnostic.range), "bogus");
    assert!(errors_from_layout(source).is_empty());
}

#[test]
fn test_unknown_element_is_message_on_tag_name() {
    let source = r#"<Desc><Frame type="Frame" name="A"><Bogus><Frame type="Frame" name="B"/></Bogus></Frame></Desc>"#;
    let diagnostics = diagnostics_from_layout(source);

    let diagnostic = single(&diagnostics, codes::UNKNOWN_ELEMENT);
    assert_eq!(diagnostic.severity, Severity::Message);
    assert_eq!(text_at(source, diagnostic.range), "Bogus");
    assert_eq!(diagnostic.message.as_ref(), "Unknown element \"Bogus\"");
}

#[test]
fn test_schema_diagnostics_come_first() {
    let source = r#"<Desc><Frame type="Frame" name="A" bogus="1"><Bogus/></Frame></Desc>"#;
    let diagnostics = diagnostics_from_layout(source);

    let found: Vec<_> = diagnostics.iter().filter_map(|d| d.code.as_deref()).collect();
    assert_eq!(found, vec![codes::UNKNOWN_ELEMENT, codes::UNKNOWN_ATTRIBUTE]);
}

// ============================================================================
// WILDCARD ATTRIBUTES
// ============================================================================

#[test]
fn test_wildcard_property_accepted() {
    assert_no_diagnostics(&in_frame(
        r#"<StateGroup name="S"><State name="On"><Action type="SetProperty" Visible="false"/></State></StateGroup>"#,
    ));
}

#[test]
fn test_wildcard_missing_reported() {
    let source = in_frame(r#"<StateGroup name="S"><State name="On"><Action type="SetProperty"/></State></StateGroup>"#);
    let diagnostics = diagnostics_from_layout(&source);

    let diagnostic = single(&diagnostics, codes::MISSING_SPECIAL_ATTRIBUTE);
    assert_eq!(diagnostic.message.as_ref(), "Missing special attribute [propertyName]");
    assert_eq!(text_at(&source, diagnostic.range), r#"<Action type="SetProperty"/>"#);
}

#[test]
fn test_wildcard_unknown_property_name() {
    let source =
        in_frame(r#"<StateGroup name="S"><State name="On"><Action type="SetProperty" Bogus="1"/></State></StateGroup>"#);
    let diagnostics = diagnostics_from_layout(&source);

    let diagnostic = single(&diagnostics, codes::INVALID_ATTRIBUTE_NAME);
    assert_eq!(diagnostic.severity, Severity::Message);
    assert_eq!(diagnostic.message.as_ref(), "Unknown property \"Bogus\"");
    assert_eq!(text_at(&source, diagnostic.range), "Bogus");
}

#[test]
fn test_wildcard_consumes_one_attribute() {
    let source = in_frame(
        r#"<StateGroup name="S"><State name="On"><Action type="SetProperty" Visible="false" Width="2"/></State></StateGroup>"#,
    );
    let diagnostics = diagnostics_from_layout(&source);

    let diagnostic = single(&diagnostics, codes::UNKNOWN_ATTRIBUTE);
    assert_eq!(text_at(&source, diagnostic.range), "Width");
}

// ============================================================================
// CONSTANTS AND HANDLES
// ============================================================================

#[test]
fn test_declared_constant_accepted() {
    assert_no_diagnostics(
        r#"<Desc><Constant name="Size" val="10"/><Frame type="Frame" name="A"><Width val="$Size"/></Frame></Desc>"#,
    );
}

#[test]
fn test_undeclared_constant() {
    let source = in_frame(r#"<Width val="$Missing"/>"#);
    let diagnostics = diagnostics_from_layout(&source);

    let diagnostic = single(&diagnostics, codes::UNDECLARED_CONSTANT);
    assert!(diagnostic.is_error());
    assert_eq!(text_at(&source, diagnostic.range), "\"$Missing\"");
    assert_eq!(diagnostic.message.as_ref(), "Undeclared constant \"$Missing\"");
}

#[test]
fn test_constant_from_other_document() {
    let files = [
        ("UI/Constants.SC2Layout", r#"<Desc><Constant name="Size" val="10"/></Desc>"#),
        (GAME_UI_PATH, r#"<Desc><Frame type="Frame" name="A"><Width val="$Size"/></Frame></Desc>"#),
    ];
    let diagnostics = diagnostics_for(&files, GAME_UI_PATH);
    assert!(diagnostics.is_empty(), "{}", format_diagnostics(&diagnostics));
}

#[rstest]
#[case("Tint", false)]
#[case("Tint_Zerg", false)]
#[case("Tint_Prot", false)]
#[case("Shade", true)]
fn test_racial_constant(#[case] name: &str, #[case] undeclared: bool) {
    let source = format!(
        r##"<Desc>
    <Constant name="Tint_Zerg" val="ff0000"/>
    <Constant name="Tint_Prot" val="0000ff"/>
    <Frame type="Frame" name="A"><Color val="#{name}"/></Frame>
</Desc>"##
    );
    let diagnostics = diagnostics_from_layout(&source);
    assert_eq!(
        !with_code(&diagnostics, codes::UNDECLARED_CONSTANT).is_empty(),
        undeclared,
        "#{name}: {}",
        format_diagnostics(&diagnostics)
    );
}

#[test]
fn test_handle_accepted_as_selector() {
    let source = r#"<Desc>
    <Frame type="Frame" name="Hud"><Handle val="HudHandle"/></Frame>
    <Frame type="Frame" name="B"><Anchor side="Top" relative="$HudHandle"/></Frame>
</Desc>"#;
    assert_no_diagnostics(source);
}

#[test]
fn test_unknown_handle_is_undeclared_constant() {
    let source = in_frame(r#"<Anchor side="Top" relative="$NoSuchHandle"/>"#);
    let diagnostics = diagnostics_from_layout(&source);
    single(&diagnostics, codes::UNDECLARED_CONSTANT);
}

// ============================================================================
// PROPERTY BINDS
// ============================================================================

#[test]
fn test_property_bind_to_known_property() {
    assert_no_diagnostics(&in_frame(r#"<Visible val="$parent.Visible"/>"#));
}

#[test]
fn test_property_bind_unknown_property() {
    let source = in_frame(r#"<Visible val="$parent.Hidden"/>"#);
    let diagnostics = diagnostics_from_layout(&source);

    let diagnostic = single(&diagnostics, codes::UNKNOWN_PROPERTY);
    assert_eq!(diagnostic.severity, Severity::Message);
    assert!(diagnostic.message.contains("\"Hidden\""), "{}", diagnostic.message);
    assert_eq!(text_at(&source, diagnostic.range), "\"$parent.Hidden\"");
}

#[test]
fn test_property_bind_syntax_error_forwarded() {
    let source = in_frame(r#"<Visible val="$parent."/>"#);
    let diagnostics = diagnostics_from_layout(&source);

    let diagnostic = single(&diagnostics, "E0302");
    assert!(diagnostic.is_error());
}

#[test]
fn test_property_bind_on_wildcard_attribute() {
    let source = in_frame(
        r#"<StateGroup name="S"><State name="On"><Action type="SetProperty" Visible="$parent.Hidden"/></State></StateGroup>"#,
    );
    let diagnostics = diagnostics_from_layout(&source);

    let diagnostic = single(&diagnostics, codes::UNKNOWN_PROPERTY);
    assert_eq!(diagnostic.severity, Severity::Message);
    assert_eq!(text_at(&source, diagnostic.range), "\"$parent.Hidden\"");

    assert_no_diagnostics(&in_frame(
        r#"<StateGroup name="S"><State name="On"><Action type="SetProperty" Visible="$parent.Visible"/></State></StateGroup>"#,
    ));
}

#[rstest]
#[case("$parent.Width", None)]
#[case("$parent.Hidden", Some(codes::UNKNOWN_PROPERTY))]
fn test_property_bind_on_any_attribute(#[case] value: &str, #[case] expected: Option<&str>) {
    let source = in_frame(&format!(r#"<Anchor side="Top" relative="{value}"/>"#));
    let diagnostics = diagnostics_from_layout(&source);

    let found: Vec<_> = diagnostics.iter().map(|d| d.code.as_deref()).collect();
    match expected {
        Some(code) => assert_eq!(found, vec![Some(code)], "{value}"),
        None => assert!(diagnostics.is_empty(), "{value}:\n{}", format_diagnostics(&diagnostics)),
    }
}

#[rstest]
#[case("&quot;/$parent/#")]
#[case("$this/&#65;/#")]
#[case("$parent&amp;/#")]
fn test_selector_errors_located_through_entities(#[case] raw: &str) {
    let source = in_frame(&format!(r#"<Anchor side="Top" relative="{raw}"/>"#));
    let diagnostics = diagnostics_from_layout(&source);

    let hash = diagnostics
        .iter()
        .find(|d| d.message.contains("\"#\""))
        .unwrap_or_else(|| panic!("{raw}:\n{}", format_diagnostics(&diagnostics)));
    assert_eq!(text_at(&source, hash.range), "#", "{raw}");
}

// ============================================================================
// TEMPLATES AND FILE LINKS
// ============================================================================

#[rstest]
#[case("Templates/Dialog", None)]
#[case("Templates/Dialog/Close", None)]
#[case("Templates/Nope", Some(codes::TEMPLATE_NOT_FOUND))]
#[case("Templates", Some(codes::FILE_AS_TEMPLATE))]
#[case("", Some(codes::PATH_NOT_SPECIFIED))]
fn test_template_reference(#[case] template: &str, #[case] expected: Option<&str>) {
    let source = format!(r#"<Desc><Frame type="Frame" name="A" template="{template}"/></Desc>"#);
    let files = [(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, source.as_str())];
    let diagnostics = diagnostics_for(&files, GAME_UI_PATH);

    match expected {
        Some(code) => {
            let diagnostic = single(&diagnostics, code);
            assert_eq!(text_at(&source, diagnostic.range), format!("\"{template}\""));
        }
        None => assert!(diagnostics.is_empty(), "{}", format_diagnostics(&diagnostics)),
    }
}

#[test]
fn test_missing_file_desc() {
    let source = r#"<Desc><Frame type="Frame" name="Panel" file="Missing"/></Desc>"#;
    let diagnostics = diagnostics_from_layout(source);

    let diagnostic = single(&diagnostics, codes::FILE_DESC_NOT_FOUND);
    assert_eq!(text_at(source, diagnostic.range), "\"Missing\"");
    assert_eq!(
        diagnostic.message.as_ref(),
        "Failed to locate specified File Desc \"Missing\""
    );
}

#[test]
fn test_desc_missing_from_linked_file() {
    let source = r#"<Desc><Frame type="Frame" name="Other" file="Templates"/></Desc>"#;
    let files = [(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, source)];
    let diagnostics = diagnostics_for(&files, GAME_UI_PATH);

    let diagnostic = single(&diagnostics, codes::DESC_NOT_IN_FILE);
    assert_eq!(text_at(source, diagnostic.range), "\"Other\"");
}

#[test]
fn test_file_link_contributes_children() {
    let source = r#"<Desc><Frame type="Frame" name="Dialog" file="Templates"><DefaultButton val="$this/Close"/></Frame></Desc>"#;
    let files = [(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, source)];
    let diagnostics = diagnostics_for(&files, GAME_UI_PATH);
    assert!(diagnostics.is_empty(), "{}", format_diagnostics(&diagnostics));
}

// ============================================================================
// DESC PATHS
// ============================================================================

#[test]
fn test_rooted_path_through_hierarchy() {
    let hud = r#"<Desc><Frame type="Frame" name="Hud"><Anchor side="Top" relative="$root/GameUI/Main/Panel/Ok"/></Frame></Desc>"#;
    let files = [(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, GAME_UI), ("UI/Hud.SC2Layout", hud)];
    let diagnostics = diagnostics_for(&files, "UI/Hud.SC2Layout");
    assert!(diagnostics.is_empty(), "{}", format_diagnostics(&diagnostics));
}

#[test]
fn test_unresolved_fragment_reported() {
    let hud = r#"<Desc><Frame type="Frame" name="Hud"><Anchor side="Top" relative="$root/GameUI/Nope/Ok"/></Frame></Desc>"#;
    let files = [(GAME_UI_PATH, GAME_UI), ("UI/Hud.SC2Layout", hud)];
    let diagnostics = diagnostics_for(&files, "UI/Hud.SC2Layout");

    let diagnostic = single(&diagnostics, codes::UNRESOLVED_DESC);
    assert_eq!(text_at(hud, diagnostic.range), "Nope");
    assert!(diagnostic.message.contains("$root/GameUI/Nope/Ok"), "{}", diagnostic.message);
}

#[test]
fn test_desc_type_mismatch() {
    let source = r#"<Desc><Frame type="Frame" name="Main" template="Templates/Dialog"><DefaultButton val="$this/Title"/></Frame></Desc>"#;
    let files = [(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, source)];
    let diagnostics = diagnostics_for(&files, GAME_UI_PATH);

    let diagnostic = single(&diagnostics, codes::DESC_TYPE_MISMATCH);
    assert_eq!(
        diagnostic.message.as_ref(),
        "Specified desc of type \"Frame\" is not a descendant of \"CButton\""
    );
    assert_eq!(text_at(source, diagnostic.range), "\"$this/Title\"");
}

// ============================================================================
// REDECLARATION
// ============================================================================

#[test]
fn test_child_redeclared_reported_once() {
    let first = r#"<Frame type="Frame" name="B"/>"#;
    let second = r#"<Frame type="Frame" name="B"><Visible val="true"/></Frame>"#;
    let source = format!(r#"<Desc><Frame type="Frame" name="A">{first}{second}</Frame></Desc>"#);
    let diagnostics = diagnostics_from_layout(&source);

    let diagnostic = single(&diagnostics, codes::CHILD_REDECLARED);
    assert!(diagnostic.message.contains("\"GameUI/A/B\""), "{}", diagnostic.message);
    assert_eq!(text_at(&source, diagnostic.range), r#"<Frame type="Frame" name="B">"#);

    assert_eq!(diagnostic.related.len(), 1);
    assert_eq!(text_at(&source, diagnostic.related[0].range), first);
}

#[test]
fn test_same_name_in_other_documents_is_a_merge() {
    let files = [
        ("UI/A/GameUI.SC2Layout", r#"<Desc><Frame type="Frame" name="Main"/></Desc>"#),
        ("UI/B/GameUI.SC2Layout", r#"<Desc><Frame type="Frame" name="Main"/></Desc>"#),
    ];
    for (path, _) in files {
        let diagnostics = diagnostics_for(&files, path);
        assert!(diagnostics.is_empty(), "{path}: {}", format_diagnostics(&diagnostics));
    }
}

// ============================================================================
// INCREMENTAL UPDATES
// ============================================================================

#[test]
fn test_editing_template_updates_dependents() {
    let mut host = host_with(&[(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, GAME_UI)]);
    assert!(check(&mut host, GAME_UI_PATH).is_empty());

    set_file(&mut host, TEMPLATES_PATH, TEMPLATES_WITHOUT_CLOSE);
    let diagnostics = check(&mut host, GAME_UI_PATH);
    let unresolved = with_code(&diagnostics, codes::UNRESOLVED_DESC);
    assert_eq!(unresolved.len(), 2, "{}", format_diagnostics(&diagnostics));
    assert!(unresolved.iter().all(|d| text_at(GAME_UI, d.range) == "Close"));

    set_file(&mut host, TEMPLATES_PATH, TEMPLATES);
    let diagnostics = check(&mut host, GAME_UI_PATH);
    assert!(diagnostics.is_empty(), "{}", format_diagnostics(&diagnostics));
}

#[test]
fn test_removing_linked_file_reports_missing_file() {
    let source = r#"<Desc><Frame type="Frame" name="Dialog" file="Templates"/></Desc>"#;
    let mut host = host_with(&[(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, source)]);
    assert!(check(&mut host, GAME_UI_PATH).is_empty());

    assert!(host.remove_file(TEMPLATES_PATH));
    let diagnostics = check(&mut host, GAME_UI_PATH);
    single(&diagnostics, codes::FILE_DESC_NOT_FOUND);
}
