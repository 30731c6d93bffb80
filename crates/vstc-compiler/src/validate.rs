//! Shape validation of pattern => value mappings
//!
//! Every problem is recorded in the [`DiagnosticsContext`]. A malformed pair is
//! dropped and validation moves on to the next one. Only a value that is not a
//! mapping at all stops the run.

use crate::context::DiagnosticsContext;
use crate::error::CompileError;
use crate::value::{PatternValue, SchemeValue, TokenMap};
use vstc_core::DiagnosticCode;

/// Value slots a token carries
pub const MAX_VALUES: usize = 3;

/// Validate a mapping and convert it into a [`TokenMap`]
///
/// Keys and values may be strings, integers or sequences of those, nested to
/// any depth. Strings and sequences must not be empty, except for the second
/// and third value slots, which may be blank.
pub fn validate(value: &SchemeValue, ctx: &mut DiagnosticsContext) -> Result<TokenMap, CompileError> {
    let pairs = match value {
        SchemeValue::Map(pairs) => pairs,
        other => {
            let err = CompileError::NotAMapping {
                kind: other.kind().to_string(),
            };
            ctx.error(err.code(), err.to_string());
            return Err(err);
        }
    };

    let mut map = TokenMap::new();
    for (key, value) in pairs {
        ctx.set_expression(Some(format!("{} => {}", key, value)));

        let key = validate_key(key, ctx);
        let value = validate_value(value, ctx);
        if let (Some(key), Some(value)) = (key, value) {
            map.push(key, value);
        }

        ctx.set_expression(None);
    }

    Ok(map)
}

fn validate_key(key: &SchemeValue, ctx: &mut DiagnosticsContext) -> Option<PatternValue> {
    let pattern = validate_element(key, ctx)?;
    if pattern.leaves().iter().any(|leaf| leaf.is_empty()) {
        ctx.error(DiagnosticCode::ShapeEmptyValue, "Empty patterns are not allowed");
        return None;
    }
    Some(pattern)
}

fn validate_value(value: &SchemeValue, ctx: &mut DiagnosticsContext) -> Option<PatternValue> {
    let validated = validate_element(value, ctx)?;
    let leaves = validated.leaves();

    if leaves.first().map_or(true, |first| first.is_empty()) {
        ctx.error(DiagnosticCode::ShapeEmptyValue, "Empty values are not allowed");
        return None;
    }

    if leaves.len() > MAX_VALUES {
        ctx.warning(
            DiagnosticCode::ShapeExtraValues,
            format!(
                "{} has more than three elements. Additional elements specified will be ignored",
                value
            ),
        );
    }

    Some(validated)
}

/// Structural check shared by keys and values
fn validate_element(element: &SchemeValue, ctx: &mut DiagnosticsContext) -> Option<PatternValue> {
    match element {
        SchemeValue::Str(s) if s.is_empty() => {
            ctx.error(DiagnosticCode::ShapeEmptyValue, "Empty values are not allowed");
            None
        }
        SchemeValue::Str(s) => Some(PatternValue::Scalar(s.clone())),
        SchemeValue::Int(i) => Some(PatternValue::Scalar(i.to_string())),
        SchemeValue::List(items) if items.is_empty() => {
            ctx.error(DiagnosticCode::ShapeEmptySequence, "An empty sequence won't work out");
            None
        }
        SchemeValue::List(items) => {
            let mut group = Vec::with_capacity(items.len());
            let mut valid = true;
            for item in items {
                match validate_sequence_item(item, ctx) {
                    Some(v) => group.push(v),
                    None => valid = false,
                }
            }
            valid.then_some(PatternValue::Group(group))
        }
        other => {
            ctx.error(
                DiagnosticCode::ShapeInvalidType,
                format!(
                    "{} is not a valid type. Valid types are integer, string and sequence",
                    other.kind()
                ),
            );
            None
        }
    }
}

/// Like [`validate_element`], but blank strings are left to the caller
fn validate_sequence_item(item: &SchemeValue, ctx: &mut DiagnosticsContext) -> Option<PatternValue> {
    match item {
        SchemeValue::Str(s) => Some(PatternValue::Scalar(s.clone())),
        other => validate_element(other, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(value: SchemeValue) -> (Result<TokenMap, CompileError>, DiagnosticsContext) {
        let mut ctx = DiagnosticsContext::new();
        let result = validate(&value, &mut ctx);
        (result, ctx)
    }

    #[test]
    fn scalar_mapping() {
        let (result, ctx) = run(SchemeValue::map(vec![("a", "അ"), ("i", "ഇ")]));
        let map = result.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(ctx.errors(), 0);
    }

    #[test]
    fn integers_are_stringified() {
        let (result, _) = run(SchemeValue::map(vec![(SchemeValue::Int(1), SchemeValue::Int(1))]));
        let map = result.unwrap();
        assert_eq!(map.get(&PatternValue::scalar("1")), Some(&PatternValue::scalar("1")));
    }

    #[test]
    fn non_mapping_aborts_and_records() {
        let (result, ctx) = run(SchemeValue::list(vec!["a"]));
        assert_eq!(
            result.unwrap_err(),
            CompileError::NotAMapping { kind: "sequence".into() }
        );
        assert_eq!(ctx.errors(), 1);
        assert_eq!(ctx.diagnostics()[0].code, DiagnosticCode::ShapeNotAMapping);
    }

    #[test]
    fn empty_mapping_is_fine() {
        let (result, ctx) = run(SchemeValue::empty_map());
        assert!(result.unwrap().is_empty());
        assert_eq!(ctx.errors(), 0);
    }

    #[test]
    fn bad_pairs_are_dropped_and_others_kept() {
        let (result, ctx) = run(SchemeValue::map(vec![
            (SchemeValue::from("ka"), SchemeValue::from("")),
            (SchemeValue::from("kha"), SchemeValue::List(vec![])),
            (SchemeValue::from("ga"), SchemeValue::Bool(true)),
            (SchemeValue::from("gha"), SchemeValue::from("ഘ")),
        ]));

        let map = result.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(ctx.errors(), 3);

        let codes: Vec<_> = ctx.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::ShapeEmptyValue,
                DiagnosticCode::ShapeEmptySequence,
                DiagnosticCode::ShapeInvalidType,
            ]
        );
        assert_eq!(ctx.diagnostics()[0].expression.as_deref(), Some("ka => "));
    }

    #[test]
    fn empty_pattern_inside_group_is_an_error() {
        let (result, ctx) = run(SchemeValue::map(vec![(SchemeValue::list(vec!["a", ""]), SchemeValue::from("x"))]));
        assert!(result.unwrap().is_empty());
        assert_eq!(ctx.errors(), 1);
    }

    #[test]
    fn blank_secondary_values_are_allowed() {
        let (result, ctx) = run(SchemeValue::map(vec![("a", SchemeValue::list(vec!["അ", "", "x"]))]));
        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(ctx.errors(), 0);

        let (result, ctx) = run(SchemeValue::map(vec![("a", SchemeValue::list(vec!["", "x"]))]));
        assert!(result.unwrap().is_empty());
        assert_eq!(ctx.errors(), 1);
    }

    #[test]
    fn extra_values_warn() {
        let (result, ctx) = run(SchemeValue::map(vec![(
            "a",
            SchemeValue::list(vec!["1", "2", "3", "4"]),
        )]));
        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(ctx.warnings(), 1);
        assert_eq!(ctx.errors(), 0);
    }

    #[test]
    fn expression_is_cleared_after_each_pair() {
        let (_, ctx) = run(SchemeValue::map(vec![("a", "അ")]));
        assert!(ctx.current_expression().is_none());
    }
}
