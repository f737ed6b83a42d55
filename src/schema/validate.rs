//! Attribute value validation against simple types.

use thiserror::Error;

use crate::base::SimpleTypeId;

use super::types::{BuiltinType, SimpleTypeKind};
use super::SchemaRegistry;

/// Why a value does not satisfy its simple type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("expected one of {expected}")]
    NotInEnumeration { expected: String },

    #[error("unknown flag \"{flag}\"")]
    UnknownFlag { flag: String },

    #[error("value does not match the required pattern")]
    PatternMismatch,

    #[error("value does not match any of {expected}")]
    NoUnionMember { expected: String },

    #[error("expected {0}")]
    Malformed(&'static str),

    #[error("value out of range [{min}, {max}]")]
    OutOfRange { min: i128, max: i128 },
}

// Unions of unions deeper than this are accepted unchecked.
const MAX_UNION_DEPTH: usize = 8;

impl SchemaRegistry {
    /// Validate raw attribute text against a simple type.
    pub fn validate_value(&self, value: &str, ty: SimpleTypeId) -> Result<(), ValueError> {
        self.validate_value_at(value, ty, 0)
    }

    fn validate_value_at(&self, value: &str, ty: SimpleTypeId, depth: usize) -> Result<(), ValueError> {
        let st = self.simple_type(ty);
        if st.nullable && value.is_empty() {
            return Ok(());
        }

        match st.kind {
            SimpleTypeKind::Enumeration => {
                if st.enum_member(value).is_some() {
                    Ok(())
                } else {
                    Err(ValueError::NotInEnumeration {
                        expected: quoted_list(st.enumeration.values().map(|m| m.name.as_str())),
                    })
                }
            }
            SimpleTypeKind::Flags => {
                for flag in value.split('|').map(str::trim) {
                    if st.enum_member(flag).is_none() {
                        return Err(ValueError::UnknownFlag { flag: flag.to_string() });
                    }
                }
                Ok(())
            }
            SimpleTypeKind::Pattern => {
                if st.patterns.iter().any(|re| re.is_match(value)) {
                    Ok(())
                } else {
                    Err(ValueError::PatternMismatch)
                }
            }
            SimpleTypeKind::Union => {
                if depth >= MAX_UNION_DEPTH
                    || st
                        .union
                        .iter()
                        .any(|&member| self.validate_value_at(value, member, depth + 1).is_ok())
                {
                    Ok(())
                } else {
                    Err(ValueError::NoUnionMember {
                        expected: quoted_list(st.union.iter().map(|&m| self.simple_type(m).name.as_str())),
                    })
                }
            }
            SimpleTypeKind::Default => validate_builtin(value, st.builtin),
        }
    }
}

fn validate_builtin(value: &str, builtin: BuiltinType) -> Result<(), ValueError> {
    if let Some((min, max)) = builtin.int_range() {
        let parsed: i128 = value.trim().parse().map_err(|_| ValueError::Malformed("an integer"))?;
        if parsed < min || parsed > max {
            return Err(ValueError::OutOfRange { min, max });
        }
        return Ok(());
    }

    match builtin {
        BuiltinType::Real32 => value
            .trim()
            .parse::<f32>()
            .map(|_| ())
            .map_err(|_| ValueError::Malformed("a number")),
        BuiltinType::Boolean => {
            if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
                Ok(())
            } else {
                Err(ValueError::Malformed("\"true\" or \"false\""))
            }
        }
        BuiltinType::Color => {
            if is_color(value) {
                Ok(())
            } else {
                Err(ValueError::Malformed("a color (r,g,b[,a] or hex digits)"))
            }
        }
        _ => Ok(()),
    }
}

/// `r,g,b` / `r,g,b,a` with components 0-255, or 6 / 8 hex digits.
fn is_color(value: &str) -> bool {
    let value = value.trim();
    if value.contains(',') {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        return matches!(parts.len(), 3 | 4) && parts.iter().all(|p| p.parse::<u8>().is_ok());
    }
    matches!(value.len(), 6 | 8) && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn quoted_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.map(|i| format!("\"{i}\"")).collect::<Vec<_>>().join(", ")
}
