//! Token layer for FQL statements

use octofhir_fql_diagnostics::{FqlError, SourceLocation, Span, Spanned, offset_to_line_col};
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::stream::LocatingSlice;
use winnow::token::{one_of, take_while};

pub(crate) type Input<'a> = LocatingSlice<&'a str>;
pub(crate) type PResult<T> = winnow::ModalResult<T>;

/// One lexical token. Keywords are not distinguished here - clause words
/// are ordinary identifiers classified by the statement parser, which is
/// what lets `identifier.where(...)` carry a keyword inside a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Bare word: identifiers, keywords, search parameter names
    Ident(String),
    /// Single-quoted string with `''` escaping
    QuotedString(String),
    /// Integer or decimal number, kept in source form
    Number(String),
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Pipe,
    Colon,
    Dot,
    Star,
    Plus,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Token {
    /// Case-insensitive keyword test for identifier tokens
    pub(crate) fn is_word(&self, word: &str) -> bool {
        matches!(self, Self::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    /// Human-readable token text for error messages
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(s) => s.clone(),
            Self::QuotedString(s) => format!("'{s}'"),
            Self::Number(s) => s.clone(),
            Self::Comma => ",".into(),
            Self::LParen => "(".into(),
            Self::RParen => ")".into(),
            Self::LBracket => "[".into(),
            Self::RBracket => "]".into(),
            Self::Pipe => "|".into(),
            Self::Colon => ":".into(),
            Self::Dot => ".".into(),
            Self::Star => "*".into(),
            Self::Plus => "+".into(),
            Self::Eq => "=".into(),
            Self::Ne => "!=".into(),
            Self::Lt => "<".into(),
            Self::Le => "<=".into(),
            Self::Gt => ">".into(),
            Self::Ge => ">=".into(),
        }
    }
}

/// Identifiers allow `-` after the first character so that native search
/// parameter names like `value-quantity` and `_lastUpdated` lex as one token
fn ident(input: &mut Input<'_>) -> PResult<Token> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    )
        .take()
        .map(|s: &str| Token::Ident(s.to_string()))
        .parse_next(input)
}

fn number(input: &mut Input<'_>) -> PResult<Token> {
    (digit1, opt(('.', digit1)))
        .take()
        .map(|s: &str| Token::Number(s.to_string()))
        .parse_next(input)
}

/// Single-quoted string literal; `''` escapes a quote
fn string_literal(input: &mut Input<'_>) -> PResult<Token> {
    '\''.parse_next(input)?;
    let mut value = String::new();
    loop {
        let chunk: &str = take_while(0.., |c: char| c != '\'').parse_next(input)?;
        value.push_str(chunk);
        '\''.parse_next(input)?;
        if opt('\'').parse_next(input)?.is_some() {
            value.push('\'');
        } else {
            break;
        }
    }
    Ok(Token::QuotedString(value))
}

fn symbol(input: &mut Input<'_>) -> PResult<Token> {
    alt((
        "!=".value(Token::Ne),
        "<=".value(Token::Le),
        ">=".value(Token::Ge),
        '='.value(Token::Eq),
        '<'.value(Token::Lt),
        '>'.value(Token::Gt),
        ','.value(Token::Comma),
        '('.value(Token::LParen),
        ')'.value(Token::RParen),
        '['.value(Token::LBracket),
        ']'.value(Token::RBracket),
        '|'.value(Token::Pipe),
        ':'.value(Token::Colon),
        '.'.value(Token::Dot),
        '*'.value(Token::Star),
        '+'.value(Token::Plus),
    ))
    .parse_next(input)
}

fn token(input: &mut Input<'_>) -> PResult<Spanned<Token>> {
    alt((string_literal, number, ident, symbol))
        .with_span()
        .map(|(token, range)| Spanned::new(token, Span::new(range.start, range.end)))
        .parse_next(input)
}

fn token_stream(input: &mut Input<'_>) -> PResult<Vec<Spanned<Token>>> {
    let mut tokens = Vec::new();
    multispace0.parse_next(input)?;
    while let Some(spanned) = opt(token).parse_next(input)? {
        tokens.push(spanned);
        multispace0.parse_next(input)?;
    }
    Ok(tokens)
}

/// Lex a statement into spanned tokens
pub(crate) fn lex(source: &str) -> Result<Vec<Spanned<Token>>, FqlError> {
    token_stream.parse(LocatingSlice::new(source)).map_err(|err| {
        let offset = err.offset();
        let (line, column) = offset_to_line_col(source, offset);
        FqlError::parse(
            "Unexpected character in statement",
            SourceLocation::point(line, column, offset),
        )
    })
}
