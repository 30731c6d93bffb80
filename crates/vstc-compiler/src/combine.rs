//! Placeholder substitution across a token list
//!
//! A template maps keys containing `*` (the token's pattern) to values
//! containing `*1`, `*2` and `*3` (the token's values). Expanding it over a
//! list of tokens yields one pair per token and template entry. Pairs that
//! expand to the same value are merged into a single key group.

use crate::value::{PatternValue, TokenMap};
use vstc_core::Token;

/// Expand `template` over `tokens`
///
/// Keys produced from a possibility token are wrapped in a group so that
/// building them yields possibility matches. A `*2` or `*3` placeholder is
/// left untouched when the token's slot is blank.
pub fn combine<'a>(tokens: impl IntoIterator<Item = &'a Token>, template: &TokenMap) -> TokenMap {
    let mut grouped: Vec<(PatternValue, PatternValue)> = Vec::new();

    for token in tokens {
        for (key, value) in template.iter() {
            let new_key = substitute_key(key, token);
            let new_value = value.map_leaves(&|leaf: &str| PatternValue::Scalar(substitute_value(leaf, token)));

            match grouped.iter_mut().find(|(v, _)| *v == new_value) {
                Some((_, existing)) => coalesce(existing, new_key),
                None => grouped.push((new_value, new_key)),
            }
        }
    }

    grouped.into_iter().map(|(value, key)| (key, value)).collect()
}

fn substitute_key(key: &PatternValue, token: &Token) -> PatternValue {
    let replace = |leaf: &str| {
        let pattern = PatternValue::Scalar(leaf.replace('*', &token.pattern));
        if token.is_possibility() {
            PatternValue::Group(vec![pattern])
        } else {
            pattern
        }
    };

    match key {
        // [[x]] so the key is a possibility group on its own
        PatternValue::Scalar(s) if token.is_possibility() => PatternValue::Group(vec![replace(s)]),
        other => other.map_leaves(&replace),
    }
}

fn substitute_value(template: &str, token: &Token) -> String {
    let mut value = template.replace("*1", &token.value1);
    if !token.value2.is_empty() {
        value = value.replace("*2", &token.value2);
    }
    if !token.value3.is_empty() {
        value = value.replace("*3", &token.value3);
    }
    value
}

/// Merge `key` into an existing key for the same value
fn coalesce(existing: &mut PatternValue, key: PatternValue) {
    match existing {
        PatternValue::Group(items) => items.push(key),
        PatternValue::Scalar(_) => {
            let first = std::mem::replace(existing, PatternValue::Group(Vec::new()));
            *existing = PatternValue::Group(vec![first, key]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vstc_core::{MatchType, TokenType};

    fn token(pattern: &str, value1: &str) -> Token {
        Token::new(TokenType::Vowel, pattern, value1)
    }

    fn template(pairs: Vec<(PatternValue, PatternValue)>) -> TokenMap {
        pairs.into_iter().collect()
    }

    #[test]
    fn substitutes_pattern_and_value() {
        let tokens = vec![token("a", "A"), token("b", "B")];
        let result = combine(&tokens, &template(vec![("*x".into(), "*1y".into())]));

        let expected: TokenMap = vec![("ax", "Ay"), ("bx", "By")].into_iter().collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn equal_values_coalesce_keys() {
        let tokens = vec![token("a", "A"), token("b", "A"), token("c", "A")];
        let result = combine(&tokens, &template(vec![("*x".into(), "*1".into())]));

        assert_eq!(result.len(), 1);
        let (key, value) = result.iter().next().unwrap();
        assert_eq!(key, &PatternValue::group(vec!["ax", "bx", "cx"]));
        assert_eq!(value, &PatternValue::scalar("A"));
    }

    #[test]
    fn possibility_tokens_wrap_keys() {
        let tokens = vec![token("A", "ആ").with_match_type(MatchType::Possibility)];

        let result = combine(&tokens, &template(vec![("*_".into(), "*1".into())]));
        let (key, _) = result.iter().next().unwrap();
        assert_eq!(
            key,
            &PatternValue::Group(vec![PatternValue::group(vec!["A_"])])
        );

        let result = combine(&tokens, &template(vec![(PatternValue::group(vec!["*_", "*-"]), "*1".into())]));
        let (key, _) = result.iter().next().unwrap();
        assert_eq!(
            key,
            &PatternValue::group(vec![PatternValue::group(vec!["A_"]), PatternValue::group(vec!["A-"])])
        );
    }

    #[test]
    fn blank_slots_leave_placeholders() {
        let tokens = vec![token("i", "ഇ").with_values("ി", "")];
        let result = combine(&tokens, &template(vec![("*".into(), "*2*3".into())]));

        let (_, value) = result.iter().next().unwrap();
        assert_eq!(value, &PatternValue::scalar("ി*3"));
    }

    #[test]
    fn sequence_values_are_substituted_elementwise() {
        let tokens = vec![token("i", "ഇ").with_values("ി", "x")];
        let result = combine(
            &tokens,
            &template(vec![("k*".into(), PatternValue::group(vec!["ക*2", "*3", "*1"]))]),
        );

        let (key, value) = result.iter().next().unwrap();
        assert_eq!(key, &PatternValue::scalar("ki"));
        assert_eq!(value, &PatternValue::group(vec!["കി", "x", "ഇ"]));
    }

    #[test]
    fn source_tokens_are_not_modified() {
        let tokens = vec![token("a", "A")];
        let tmpl = template(vec![("*x".into(), "*1".into())]);
        let first = combine(&tokens, &tmpl);
        let second = combine(&tokens, &tmpl);
        assert_eq!(first, second);
        assert_eq!(tokens[0].pattern, "a");
    }
}
