/*!
# Script Language

This Rust module provides lexical analysis and parsing of the script
language: the expression grammar shared by every command, and the
line-oriented command syntax.

*/

/// One-based line number of a script line, if known.
pub type LineNumber = Option<usize>;

#[macro_use]
mod error;
mod lex;
mod line;
mod parse;
mod token;

pub use error::Category;
pub use error::Error;
pub use error::ErrorCode;
pub use lex::lex;
pub use line::{parse_line, split_args, starts_with_keyword, token_after, unescape, unquote};
pub use parse::parse;
pub use token::{Operator, Token, Word};

pub mod ast;
