//! Path-expression queries over Sift document trees.
//!
//! This crate implements the subset of
//! [XPath 1.0](https://www.w3.org/TR/1999/REC-xpath-19991116/) that selector
//! synthesis emits, plus its immediate neighbours:
//!
//! - **Tokenizer** - [`tokenizer::Tokenizer`] turns text into [`token::Token`]s
//! - **Parser** - [`parser::parse_path`] builds a [`parser::Path`]
//! - **Evaluator** - [`eval::select`] returns matching elements in document order
//!
//! Only absolute location paths are accepted; every query is evaluated from
//! the Document node.

pub mod eval;
pub mod parser;
pub mod token;
pub mod tokenizer;

use thiserror::Error;

pub use eval::{Query, select};
pub use parser::{Axis, Expr, Function, NameTest, Path, Step, parse_path};

/// Errors raised while compiling a path expression.
///
/// Offsets are byte offsets into the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A character that cannot start any token.
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Where it was found.
        offset: usize,
    },

    /// A string literal without its closing quote.
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedLiteral {
        /// Offset of the opening quote.
        offset: usize,
    },

    /// A token that does not fit the grammar at this point.
    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken {
        /// Description of the token.
        found: String,
        /// Where it was found.
        offset: usize,
    },

    /// The expression stopped before it was complete.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A function name this engine does not implement.
    #[error("unknown function {name}() at offset {offset}")]
    UnknownFunction {
        /// The function name as written.
        name: String,
        /// Where it was found.
        offset: usize,
    },

    /// A known function called with the wrong number of arguments.
    #[error("{function}() expects {expected} argument(s), got {found}")]
    Arity {
        /// The function.
        function: Function,
        /// Human-readable expected count.
        expected: &'static str,
        /// Number of arguments given.
        found: usize,
    },

    /// The expression was not an absolute location path.
    #[error("only absolute paths are supported")]
    RelativePath,
}
