//! Classification of attribute value text.

use crate::parser::SelectorKind;

/// How an attribute value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrValueKind {
    /// A literal or a path, checked against the attribute's simple type.
    Generic,
    /// `$Name` - reference to a constant.
    Constant,
    /// `#Name` - reference to a constant that may carry a race suffix.
    ConstantRacial,
    /// `$path.Property` - a property bind expression.
    PropertyBind,
}

/// Classify a raw attribute value.
pub fn classify_value(value: &str) -> AttrValueKind {
    if let Some(rest) = value.strip_prefix('#') {
        if is_identifier(rest) {
            return AttrValueKind::ConstantRacial;
        }
        return AttrValueKind::Generic;
    }

    let Some(rest) = value.strip_prefix('$') else {
        return AttrValueKind::Generic;
    };
    if has_unbracketed_dot(value) {
        return AttrValueKind::PropertyBind;
    }
    if is_identifier(rest) && !SelectorKind::is_keyword(rest) {
        return AttrValueKind::Constant;
    }
    AttrValueKind::Generic
}

/// Returns true if `text` is a non-empty identifier (XID continue characters).
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c == '_' || unicode_ident::is_xid_continue(c))
}

fn has_unbracketed_dot(text: &str) -> bool {
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}
