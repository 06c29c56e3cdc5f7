//! Logos-based lexer (C4 front end) for one preprocessed card.
//!
//! The lexer is unit-aware directly: a run of digits (with an optional
//! fractional part) immediately followed by one of the metric suffix
//! letters `tgxkmunpf` is tokenized as a single [`Tok::UnitPostfix`] token
//! by logos's longest-match rule, without needing the preprocessor's
//! defensive spacing around `*`/`)` to disambiguate it from multiplication.

use logos::Logos;

/// One lexical token: its kind, source text, and byte offset within the
/// card being tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: Tok,
    pub text: &'a str,
    pub offset: u32,
}

pub struct Lexer<'a> {
    inner: logos::Lexer<'a, RawTok>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: RawTok::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.inner.next()?;
            let text = self.inner.slice();
            let offset = self.inner.span().start as u32;
            let kind = match raw {
                Ok(t) => Tok::from(t),
                Err(()) => Tok::Error,
            };
            if kind == Tok::Whitespace {
                continue;
            }
            return Some(Token { kind, text, offset });
        }
    }
}

/// Tokenize an entire card into a `Vec`, dropping whitespace.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Public token kind. Mirrors [`RawTok`] plus an `Error` case for bytes
/// logos could not classify (kept out of the derived enum itself, since
/// logos requires every variant to carry a pattern).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok {
    Whitespace,
    Ident,
    String,
    UnitPostfix,
    Scientific,
    Real,
    Integer,
    StarStar,
    EqEq,
    BangEq,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Gt,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Eq,
    Question,
    Colon,
    Semicolon,
    Dot,
    Quote,
    Error,
}

impl From<RawTok> for Tok {
    fn from(raw: RawTok) -> Self {
        match raw {
            RawTok::Whitespace => Tok::Whitespace,
            RawTok::Ident => Tok::Ident,
            RawTok::String => Tok::String,
            RawTok::UnitPostfix => Tok::UnitPostfix,
            RawTok::Scientific => Tok::Scientific,
            RawTok::Real => Tok::Real,
            RawTok::Integer => Tok::Integer,
            RawTok::StarStar => Tok::StarStar,
            RawTok::EqEq => Tok::EqEq,
            RawTok::BangEq => Tok::BangEq,
            RawTok::LtEq => Tok::LtEq,
            RawTok::GtEq => Tok::GtEq,
            RawTok::AmpAmp => Tok::AmpAmp,
            RawTok::PipePipe => Tok::PipePipe,
            RawTok::Plus => Tok::Plus,
            RawTok::Minus => Tok::Minus,
            RawTok::Star => Tok::Star,
            RawTok::Slash => Tok::Slash,
            RawTok::Lt => Tok::Lt,
            RawTok::Gt => Tok::Gt,
            RawTok::LParen => Tok::LParen,
            RawTok::RParen => Tok::RParen,
            RawTok::LBrace => Tok::LBrace,
            RawTok::RBrace => Tok::RBrace,
            RawTok::LBracket => Tok::LBracket,
            RawTok::RBracket => Tok::RBracket,
            RawTok::Comma => Tok::Comma,
            RawTok::Eq => Tok::Eq,
            RawTok::Question => Tok::Question,
            RawTok::Colon => Tok::Colon,
            RawTok::Semicolon => Tok::Semicolon,
            RawTok::Dot => Tok::Dot,
            RawTok::Quote => Tok::Quote,
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTok {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_!]*")]
    Ident,

    #[regex(r#""[^"]*""#)]
    String,

    // Unit-postfix literal: digits, optional fraction, one metric suffix.
    // Declared before the plain numeric kinds so logos' longest-match
    // resolution prefers it whenever the suffix letter is present.
    #[regex(r"[0-9]+(\.[0-9]+)?[tgxkmunpf]")]
    UnitPostfix,

    #[regex(r"[0-9]+(\.[0-9]+)?[eE][+-]?[0-9]+")]
    Scientific,

    #[regex(r"[0-9]+\.[0-9]*")]
    Real,

    #[regex(r"[0-9]+")]
    Integer,

    #[token("**")]
    StarStar,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("\"")]
    Quote,
}

impl Tok {
    /// True for the two-character and one-character binary operators in
    /// the *duo-op* production (§4.4). `**` and the comparison/logical
    /// operators are included alongside the arithmetic ones.
    pub fn is_duo_op(self) -> bool {
        matches!(
            self,
            Tok::Plus
                | Tok::Minus
                | Tok::Star
                | Tok::Slash
                | Tok::Lt
                | Tok::Gt
                | Tok::StarStar
                | Tok::EqEq
                | Tok::BangEq
                | Tok::LtEq
                | Tok::GtEq
                | Tok::AmpAmp
                | Tok::PipePipe
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Tok> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn unit_postfix_literal_is_a_single_token() {
        assert_eq!(kinds("17f"), vec![Tok::UnitPostfix]);
        assert_eq!(kinds("1.5u"), vec![Tok::UnitPostfix]);
    }

    #[test]
    fn multiplication_of_number_and_ident_is_three_tokens() {
        assert_eq!(kinds("17 * f"), vec![Tok::Integer, Tok::Star, Tok::Ident]);
    }

    #[test]
    fn power_operator_is_one_token_not_two_stars() {
        assert_eq!(kinds("a ** 2"), vec![Tok::Ident, Tok::StarStar, Tok::Integer]);
    }

    #[test]
    fn scientific_notation_lexes_as_one_token() {
        assert_eq!(kinds("2e0"), vec![Tok::Scientific]);
        assert_eq!(kinds("2.5e-3"), vec![Tok::Scientific]);
    }

    #[test]
    fn whitespace_is_dropped() {
        assert_eq!(kinds("  a   b "), vec![Tok::Ident, Tok::Ident]);
    }

    #[test]
    fn bang_with_identifier_suffix_is_part_of_the_name() {
        assert_eq!(kinds("vt!"), vec![Tok::Ident]);
    }
}
