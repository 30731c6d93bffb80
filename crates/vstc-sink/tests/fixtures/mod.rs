//! Test fixtures for token sink integration tests
//!
//! A small slice of a Malayalam scheme: enough vowels, consonants and signs to
//! exercise dead consonant inference and table export.

use vstc_core::{MatchType, SchemeDetails, Token, TokenType};

/// Virama (chandrakkala)
pub fn virama() -> Token {
    Token::new(TokenType::Virama, "~", "്")
}

/// Vowels with their dependent vowel signs
pub fn vowels() -> Vec<Token> {
    vec![
        Token::new(TokenType::Vowel, "a", "അ"),
        Token::new(TokenType::Vowel, "aa", "ആ").with_values("ാ", ""),
        Token::new(TokenType::Vowel, "A", "ആ")
            .with_values("ാ", "")
            .with_match_type(MatchType::Possibility),
        Token::new(TokenType::Vowel, "i", "ഇ").with_values("ി", ""),
    ]
}

/// Consonants carrying the inherent vowel
pub fn consonants() -> Vec<Token> {
    vec![
        Token::new(TokenType::Consonant, "ka", "ക"),
        Token::new(TokenType::Consonant, "kha", "ഖ"),
        Token::new(TokenType::Consonant, "ga", "ഗ"),
        Token::new(TokenType::Consonant, "gha", "ഘ"),
    ]
}

pub fn details() -> SchemeDetails {
    SchemeDetails {
        language_code: "ml".to_string(),
        identifier: "ml-unicode".to_string(),
        display_name: "Malayalam".to_string(),
        author: "vstc contributors".to_string(),
        compiled_date: "2026-10-16T00:00:00+00:00".to_string(),
        is_stable: true,
    }
}
