//! Consonant-vowel compound derivation

use vstc_core::{MatchType, Token, TokenType};

/// Whether `pattern` ends in a single inherent vowel letter (`ka`, not `kaa`)
pub fn has_inherent_vowel(pattern: &str, inherent: char) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    match chars.as_slice() {
        [.., before, last] => *last == inherent && *before != inherent,
        _ => false,
    }
}

/// Compound of one consonant and one vowel
///
/// Returns `None` when the vowel has no combining form (`value2` is blank).
/// The compound's tag is left empty for the caller to fill in.
pub fn consonant_vowel(consonant: &Token, vowel: &Token, inherent: char) -> Option<Token> {
    if vowel.value2.is_empty() {
        return None;
    }

    let pattern = if has_inherent_vowel(&consonant.pattern, inherent) {
        let mut stem = consonant.pattern.clone();
        stem.pop();
        format!("{}{}", stem, vowel.pattern)
    } else {
        format!("{}{}", consonant.pattern, vowel.pattern)
    };

    let match_type = if consonant.is_possibility() || vowel.is_possibility() {
        MatchType::Possibility
    } else {
        MatchType::Exact
    };

    let accept_condition = if vowel.accept_condition.is_all() {
        consonant.accept_condition
    } else {
        vowel.accept_condition
    };

    Some(
        Token::new(
            TokenType::ConsonantVowel,
            pattern,
            format!("{}{}", consonant.value1, vowel.value2),
        )
        .with_match_type(match_type)
        .with_priority(consonant.priority.min(vowel.priority))
        .with_accept_condition(accept_condition),
    )
}

/// Every consonant × vowel compound, consonants outermost
pub fn generate_cv<'a>(
    consonants: impl IntoIterator<Item = &'a Token>,
    vowels: &[&Token],
    inherent: char,
) -> Vec<Token> {
    consonants
        .into_iter()
        .flat_map(move |c| vowels.iter().filter_map(move |v| consonant_vowel(c, v, inherent)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vstc_core::{AcceptCondition, Priority};

    fn vowel(pattern: &str, value1: &str, value2: &str) -> Token {
        Token::new(TokenType::Vowel, pattern, value1).with_values(value2, "")
    }

    fn consonant(pattern: &str, value1: &str) -> Token {
        Token::new(TokenType::Consonant, pattern, value1)
    }

    #[test]
    fn inherent_vowel_detection() {
        assert!(has_inherent_vowel("ka", 'a'));
        assert!(has_inherent_vowel("kha", 'a'));
        assert!(!has_inherent_vowel("kaa", 'a'));
        assert!(!has_inherent_vowel("k", 'a'));
        assert!(!has_inherent_vowel("a", 'a'));
        assert!(has_inherent_vowel("ko", 'o'));
    }

    #[test]
    fn both_paths_converge() {
        let i = vowel("i", "ഇ", "ി");
        let with_inherent = consonant_vowel(&consonant("ka", "ക"), &i, 'a').unwrap();
        let bare = consonant_vowel(&consonant("k", "ക"), &i, 'a').unwrap();

        assert_eq!(with_inherent.pattern, "ki");
        assert_eq!(bare.pattern, "ki");
        assert_eq!(with_inherent.value1, "കി");
        assert_eq!(with_inherent.token_type, TokenType::ConsonantVowel);
    }

    #[test]
    fn vowel_without_sign_is_skipped() {
        assert!(consonant_vowel(&consonant("ka", "ക"), &vowel("a", "അ", ""), 'a').is_none());
    }

    #[test]
    fn match_type_priority_and_accept() {
        let c = consonant("ka", "ക")
            .with_priority(Priority::High)
            .with_accept_condition(AcceptCondition::StartsWith);
        let v = vowel("aa", "ആ", "ാ")
            .with_match_type(MatchType::Possibility)
            .with_priority(Priority::Low);

        let cv = consonant_vowel(&c, &v, 'a').unwrap();
        assert_eq!(cv.pattern, "kaa");
        assert_eq!(cv.match_type, MatchType::Possibility);
        assert_eq!(cv.priority, Priority::Low);
        assert_eq!(cv.accept_condition, AcceptCondition::StartsWith);

        let v = v.with_accept_condition(AcceptCondition::EndsWith);
        let cv = consonant_vowel(&c, &v, 'a').unwrap();
        assert_eq!(cv.accept_condition, AcceptCondition::EndsWith);
    }

    #[test]
    fn cross_product() {
        let consonants = vec![consonant("ka", "ക"), consonant("ga", "ഗ")];
        let vowels = vec![vowel("a", "അ", ""), vowel("aa", "ആ", "ാ"), vowel("i", "ഇ", "ി")];
        let vowel_refs: Vec<&Token> = vowels.iter().collect();

        let patterns: Vec<String> = generate_cv(&consonants, &vowel_refs, 'a')
            .into_iter()
            .map(|t| t.pattern)
            .collect();
        assert_eq!(patterns, vec!["kaa", "ki", "gaa", "gi"]);
    }
}
