//! Diagnostic assertion helpers.

use layout_semantics::{Diagnostic, Severity, TextRange};

use crate::helpers::host_helpers::{check, host_with};

/// Diagnostics for `path` after loading all `files`.
pub fn diagnostics_for(files: &[(&str, &str)], path: &str) -> Vec<Diagnostic> {
    let mut host = host_with(files);
    check(&mut host, path)
}

/// Diagnostics of a single document loaded as `UI/GameUI.SC2Layout`.
pub fn diagnostics_from_layout(source: &str) -> Vec<Diagnostic> {
    diagnostics_for(&[("UI/GameUI.SC2Layout", source)], "UI/GameUI.SC2Layout")
}

/// Only error-level diagnostics.
pub fn errors_from_layout(source: &str) -> Vec<Diagnostic> {
    diagnostics_from_layout(source)
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

/// Diagnostics carrying `code`.
pub fn with_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> Vec<&'a Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.code.as_deref() == Some(code))
        .collect()
}

/// The source text a range covers.
pub fn text_at(source: &str, range: TextRange) -> &str {
    &source[range]
}

pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| {
            format!(
                "  {:?} {} {:?}: {}",
                d.severity,
                d.code.as_deref().unwrap_or("-"),
                d.range,
                d.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assert a source checks clean, messages included.
pub fn assert_no_diagnostics(source: &str) {
    let diagnostics = diagnostics_from_layout(source);
    assert!(
        diagnostics.is_empty(),
        "Expected no diagnostics, got {}:\n{}",
        diagnostics.len(),
        format_diagnostics(&diagnostics)
    );
}

/// Assert exactly one diagnostic with `code` and return it.
pub fn single<'a>(diagnostics: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    assert_eq!(
        diagnostics.len(),
        1,
        "Expected exactly one diagnostic ({code}), got:\n{}",
        format_diagnostics(diagnostics)
    );
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code.as_deref(), Some(code), "{diagnostic:?}");
    diagnostic
}
