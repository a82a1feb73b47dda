//! logos-based selector tokenizer.
//!
//! Whitespace is a real token here: between two fragments it is the
//! descendant combinator, so it cannot be skipped the way a declaration lexer
//! would skip it.
//!
//! Every fragment part except [`Token::Element`] starts with its own sigil,
//! so no two token patterns compete for the same input.

use logos::Logos;

use crate::error::{Error, Result};

/// Selector token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Run of whitespace. Descendant combinator when it separates fragments.
    #[regex(r"[ \t\n\r\f]+")]
    Whitespace,

    /// Pseudo-class or pseudo-element with an optional argument:
    /// `:hover`, `::before`, `:nth-child(2n+1)`.
    #[regex(r"::?[a-zA-Z_-][a-zA-Z0-9_-]*(\([^)]*\))?")]
    Pseudo,

    /// Attribute selector: `[type=text]`. Recognized, then discarded.
    #[regex(r"\[[^\]]*\]")]
    Attribute,

    /// Id part: `#main`.
    #[regex(r"#[a-zA-Z0-9_-]+")]
    Id,

    /// Class part: `.primary`.
    #[regex(r"\.[a-zA-Z0-9_-]+")]
    Class,

    /// Element name: `table`, `Button`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Element,

    /// Universal element `*`.
    #[token("*")]
    Star,

    /// `,` ends one alternative.
    #[token(",")]
    Comma,

    /// `>` child combinator.
    #[token(">")]
    Greater,

    /// `+` adjacent-sibling combinator.
    #[token("+")]
    Plus,

    /// `~` general-sibling combinator.
    #[token("~")]
    Tilde,
}

impl Token {
    /// Whether this token is part of a selector fragment (as opposed to
    /// whitespace or a combinator symbol).
    pub fn is_fragment_part(&self) -> bool {
        matches!(
            self,
            Token::Pseudo
                | Token::Attribute
                | Token::Id
                | Token::Class
                | Token::Element
                | Token::Star
        )
    }
}

/// Tokenize a selector string into `(Token, &str)` pairs.
///
/// Unlike a declaration lexer, unknown characters are not skipped: a selector
/// with a character the grammar cannot place is rejected as a whole.
pub fn tokenize(input: &str) -> Result<Vec<(Token, &str)>> {
    let mut lexer = Token::lexer(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.slice())),
            Err(()) => {
                return Err(Error::invalid_selector(
                    input,
                    format!(
                        "unexpected '{}' at offset {}",
                        lexer.slice(),
                        lexer.span().start
                    ),
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap_or_else(|e| panic!("tokenize failed: {e}"))
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    // ── Fragment parts ───────────────────────────────────────────────

    #[test]
    fn test_full_fragment() {
        let result = tokenize("div#main.k1.k2:hover").unwrap();
        assert_eq!(
            result,
            vec![
                (Token::Element, "div"),
                (Token::Id, "#main"),
                (Token::Class, ".k1"),
                (Token::Class, ".k2"),
                (Token::Pseudo, ":hover"),
            ]
        );
    }

    #[test]
    fn test_pseudo_element_keeps_both_colons() {
        let result = tokenize("p::before").unwrap();
        assert_eq!(result[1], (Token::Pseudo, "::before"));
    }

    #[test]
    fn test_pseudo_with_argument() {
        let result = tokenize("li:nth-child(2n+1)").unwrap();
        assert_eq!(result[1], (Token::Pseudo, ":nth-child(2n+1)"));
    }

    #[test]
    fn test_attribute() {
        assert_eq!(
            tokens("input[type=text]"),
            vec![Token::Element, Token::Attribute]
        );
    }

    #[test]
    fn test_universal() {
        assert_eq!(tokens("*.x"), vec![Token::Star, Token::Class]);
    }

    // ── Combinators ──────────────────────────────────────────────────

    #[test]
    fn test_combinators() {
        assert_eq!(
            tokens("a > b + c ~ d, e"),
            vec![
                Token::Element,
                Token::Whitespace,
                Token::Greater,
                Token::Whitespace,
                Token::Element,
                Token::Whitespace,
                Token::Plus,
                Token::Whitespace,
                Token::Element,
                Token::Whitespace,
                Token::Tilde,
                Token::Whitespace,
                Token::Element,
                Token::Comma,
                Token::Whitespace,
                Token::Element,
            ]
        );
    }

    #[test]
    fn test_whitespace_kept_between_fragments() {
        assert_eq!(
            tokens("tr  td"),
            vec![Token::Element, Token::Whitespace, Token::Element]
        );
    }

    #[test]
    fn test_is_fragment_part() {
        assert!(Token::Class.is_fragment_part());
        assert!(Token::Star.is_fragment_part());
        assert!(!Token::Whitespace.is_fragment_part());
        assert!(!Token::Comma.is_fragment_part());
    }

    // ── Errors ───────────────────────────────────────────────────────

    #[test]
    fn test_unknown_character_is_error() {
        let err = tokenize("a & b").unwrap_err();
        assert!(err.to_string().contains("unexpected '&'"));
    }

    #[test]
    fn test_lone_hash_is_error() {
        assert!(tokenize("#").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(tokens("").is_empty());
    }
}
