//! Effective hierarchy and selector navigation.

use layout_semantics::AnalysisHost;
use layout_semantics::hir::{DescKind, UiNodeData};
use layout_semantics::parser::parse_path_selector;
use rstest::rstest;

use crate::helpers::host_helpers::{desc, host_with, set_file};
use crate::helpers::source_fixtures::{
    GAME_UI, GAME_UI_PATH, TEMPLATES, TEMPLATES_PATH, TEMPLATES_WITHOUT_CLOSE,
};

fn fixture_host() -> AnalysisHost {
    host_with(&[(TEMPLATES_PATH, TEMPLATES), (GAME_UI_PATH, GAME_UI)])
}

/// Names of the effective children of the desc at `fqn`.
fn child_names(host: &mut AnalysisHost, fqn: &str) -> Vec<String> {
    let from = desc(host, fqn);
    let mut analysis = host.analysis();
    let mut nav = analysis.navigator();
    let node = nav
        .builder()
        .build_node_from_desc(from)
        .unwrap_or_else(|| panic!("no node for {fqn}"));
    let children = nav.builder().children(node);
    children.iter().map(|&c| nav.node(c).name.to_string()).collect()
}

/// Evaluate `path` from the node of `from` and return the selected node's
/// main desc path.
fn select(host: &mut AnalysisHost, from: &str, path: &str) -> Option<String> {
    let from = desc(host, from);
    let selector = parse_path_selector(path);
    assert!(!selector.has_errors(), "{path}: {:?}", selector.diagnostics);

    let mut analysis = host.analysis();
    let mut nav = analysis.navigator();
    let node = nav.builder().build_node_from_desc(from)?;
    let target = nav.resolve_selection(node, &selector).target()?;
    let main_desc = nav.node(target).main_desc;
    Some(nav.context().index.desc(main_desc).fqn.clone())
}

// ============================================================================
// CHILDREN
// ============================================================================

#[test]
fn test_template_children_follow_own_children() {
    let mut host = fixture_host();
    assert_eq!(
        child_names(&mut host, "GameUI/Main"),
        vec!["Panel", "Mode", "FadeIn", "Title", "Close"]
    );
}

#[test]
fn test_file_root_lists_frames() {
    let mut host = fixture_host();
    assert_eq!(child_names(&mut host, "GameUI"), vec!["Main"]);
    assert_eq!(child_names(&mut host, "Templates"), vec!["Dialog"]);
}

#[test]
fn test_children_of_kind() {
    let mut host = fixture_host();
    let main = desc(&host, "GameUI/Main");
    let mut analysis = host.analysis();
    let mut nav = analysis.navigator();
    let node = nav.builder().build_node_from_desc(main).expect("main node");

    let frames: Vec<String> = nav
        .children_of_kind(node, DescKind::Frame)
        .iter()
        .map(|&c| nav.node(c).name.to_string())
        .collect();
    assert_eq!(frames, vec!["Panel", "Title", "Close"]);

    let groups = nav.children_of_kind(node, DescKind::StateGroup);
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_template_child_keeps_template_desc() {
    let mut host = fixture_host();
    let main = desc(&host, "GameUI/Main");
    let close = desc(&host, "Templates/Dialog/Close");
    let dialog = desc(&host, "Templates/Dialog");

    let mut analysis = host.analysis();
    let mut nav = analysis.navigator();
    let node = nav.builder().build_node_from_desc(main).expect("main node");
    assert_eq!(nav.node(node).sources(), &[main, dialog]);

    let child = nav.builder().child(node, "Close").expect("close node");
    assert_eq!(nav.node(child).main_desc, close);
    assert_eq!(nav.node(child).parent, Some(node));
    assert_eq!(
        nav.frame_type(child).map(|ft| ft.name.to_string()),
        Some("Button".to_string())
    );
}

#[test]
fn test_file_link_merges_linked_desc() {
    let mut host = host_with(&[
        (TEMPLATES_PATH, TEMPLATES),
        (GAME_UI_PATH, r#"<Desc><Frame type="Frame" name="Dialog" file="Templates"/></Desc>"#),
    ]);
    assert_eq!(child_names(&mut host, "GameUI/Dialog"), vec!["Title", "Close"]);
}

#[test]
fn test_broken_file_link_has_no_node() {
    let mut host = host_with(&[
        (TEMPLATES_PATH, TEMPLATES),
        (GAME_UI_PATH, r#"<Desc><Frame type="Frame" name="Other" file="Templates"/></Desc>"#),
    ]);
    let other = desc(&host, "GameUI/Other");
    let mut analysis = host.analysis();
    let mut nav = analysis.navigator();
    assert_eq!(nav.builder().build_node_from_desc(other), None);
}

#[test]
fn test_template_cycle_terminates() {
    let mut host = host_with(&[(
        GAME_UI_PATH,
        r#"<Desc>
    <Frame type="Frame" name="A" template="GameUI/B"><Frame type="Frame" name="X"/></Frame>
    <Frame type="Frame" name="B" template="GameUI/A"><Frame type="Frame" name="Y"/></Frame>
</Desc>"#,
    )]);
    assert_eq!(child_names(&mut host, "GameUI/A"), vec!["X", "Y"]);
    assert_eq!(child_names(&mut host, "GameUI/B"), vec!["Y", "X"]);
}

// ============================================================================
// NODE DATA
// ============================================================================

#[test]
fn test_state_group_and_animation_data() {
    let mut host = fixture_host();
    let mode = desc(&host, "GameUI/Main/Mode");
    let fade = desc(&host, "GameUI/Main/FadeIn");
    let mut analysis = host.analysis();
    let mut nav = analysis.navigator();

    let node = nav.builder().build_node_from_desc(mode).expect("state group node");
    match &nav.node(node).data {
        UiNodeData::StateGroup { default_state, states } => {
            assert_eq!(default_state.as_deref(), Some("Normal"));
            let names: Vec<&str> = states.keys().map(|k| k.as_str()).collect();
            assert_eq!(names, vec!["Normal", "Hidden"]);
        }
        other => panic!("expected a state group, got {other:?}"),
    }

    let node = nav.builder().build_node_from_desc(fade).expect("animation node");
    match &nav.node(node).data {
        UiNodeData::Animation { events } => {
            assert_eq!(events.keys().map(|k| k.as_str()).collect::<Vec<_>>(), vec!["Show"]);
        }
        other => panic!("expected an animation, got {other:?}"),
    }
}

// ============================================================================
// SELECTORS
// ============================================================================

#[rstest]
#[case("GameUI/Main/Panel/Ok", "$this", Some("GameUI/Main/Panel/Ok"))]
#[case("GameUI/Main/Panel/Ok", "$parent", Some("GameUI/Main/Panel"))]
#[case("GameUI/Main/Panel/Ok", "$parent/$parent", Some("GameUI/Main"))]
#[case("GameUI/Main/Panel/Ok", "$sibling-Cancel", Some("GameUI/Main/Panel/Cancel"))]
#[case("GameUI/Main/Panel/Ok", "$sibling-Ok", None)]
#[case("GameUI/Main/Panel/Ok", "$layer", Some("GameUI/Main"))]
#[case("GameUI/Main/Panel/Ok", "$layer/Close", Some("Templates/Dialog/Close"))]
#[case("GameUI/Main/Panel/Ok", "$ancestor[type=Frame]", Some("GameUI/Main/Panel"))]
#[case("GameUI/Main/Panel/Ok", "$ancestor[name=Main]", Some("GameUI/Main"))]
#[case("GameUI/Main/Panel/Ok", "$ancestor[oftype=CFrame]", Some("GameUI/Main/Panel"))]
#[case("GameUI/Main/Panel/Ok", "$ancestor[oftype=Button]", None)]
#[case("GameUI/Main/Panel/Ok", "$ancestor[type=Frame,name=Main]/Title", Some("Templates/Dialog/Title"))]
#[case("GameUI/Main/Panel/Cancel", "$ancestor[oftype=Frame]", Some("GameUI/Main/Panel"))]
#[case("GameUI/Main/Panel/Ok", "$MainHandle/Close", Some("Templates/Dialog/Close"))]
#[case("GameUI/Main/Panel/Ok", "$root/Templates/Dialog", Some("Templates/Dialog"))]
#[case("GameUI/Main/Panel/Ok", "Missing", None)]
fn test_selector_resolution(#[case] from: &str, #[case] path: &str, #[case] expected: Option<&str>) {
    let mut host = fixture_host();
    assert_eq!(select(&mut host, from, path).as_deref(), expected, "{path} from {from}");
}

#[test]
fn test_partial_selection_keeps_resolved_prefix() {
    let mut host = fixture_host();
    let ok = desc(&host, "GameUI/Main/Panel/Ok");
    let mut analysis = host.analysis();
    let mut nav = analysis.navigator();
    let node = nav.builder().build_node_from_desc(ok).expect("ok node");

    let selection = nav.resolve_selection(node, &parse_path_selector("$parent/Nope/Deeper"));
    assert_eq!(selection.fragment_count, 3);
    assert_eq!(selection.chain.len(), 1);
    assert!(!selection.is_complete());
    assert_eq!(selection.target(), None);
}

#[test]
fn test_resolve_desc_path_selects_merged_descs() {
    let mut host = fixture_host();
    let ok = desc(&host, "GameUI/Main/Panel/Ok");
    let main = desc(&host, "GameUI/Main");
    let title = desc(&host, "Templates/Dialog/Title");
    let mut analysis = host.analysis();

    let selection = analysis.resolve_desc_path(ok, "$root/GameUI/Main/Title");
    assert!(selection.is_valid());
    assert_eq!(selection.items.len(), 4);
    assert_eq!(selection.items[2], vec![main]);
    assert_eq!(selection.first_target(), Some(title));

    let five = analysis.resolve_desc_path(ok, "$root/GameUI/Main/Panel/Cancel");
    assert_eq!(five.fragment_count, 5);
    assert!(five.is_valid());
}

// ============================================================================
// INVALIDATION
// ============================================================================

#[test]
fn test_template_edit_rebuilds_dependents() {
    let mut host = fixture_host();
    let main = desc(&host, "GameUI/Main");

    let stale = {
        let mut analysis = host.analysis();
        let mut nav = analysis.navigator();
        nav.builder().build_node_from_desc(main).expect("main node")
    };

    set_file(&mut host, TEMPLATES_PATH, TEMPLATES_WITHOUT_CLOSE);
    {
        let mut analysis = host.analysis();
        let mut nav = analysis.navigator();
        assert!(nav.builder().tree().get(stale).is_none());
    }
    assert_eq!(
        child_names(&mut host, "GameUI/Main"),
        vec!["Panel", "Mode", "FadeIn", "Title"]
    );
}

#[test]
fn test_unrelated_edit_keeps_nodes() {
    let mut host = host_with(&[
        (TEMPLATES_PATH, TEMPLATES),
        (GAME_UI_PATH, GAME_UI),
        ("UI/Other.SC2Layout", r#"<Desc><Frame type="Frame" name="X"/></Desc>"#),
    ]);
    let main = desc(&host, "GameUI/Main");

    let kept = {
        let mut analysis = host.analysis();
        let mut nav = analysis.navigator();
        nav.builder().build_node_from_desc(main).expect("main node")
    };

    set_file(
        &mut host,
        "UI/Other.SC2Layout",
        r#"<Desc><Frame type="Frame" name="X"><Visible val="false"/></Frame></Desc>"#,
    );
    let mut analysis = host.analysis();
    let mut nav = analysis.navigator();
    assert!(nav.builder().tree().get(kept).is_some());
}
