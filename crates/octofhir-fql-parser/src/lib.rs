//! FQL statement parser
//!
//! Parsing runs in two stages: a winnow lexer over a locating slice
//! produces spanned tokens, then a recursive-descent pass over the token
//! stream assembles the statement. Expression text is recovered by slicing
//! the source between token spans, so column names keep their original
//! spelling.

mod lexer;
mod statement;

pub use statement::FqlParser;
