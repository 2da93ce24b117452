//! Path-expression parser.
//!
//! Recursive descent over the token list, following the productions of
//! [§ 2 Location Paths](https://www.w3.org/TR/1999/REC-xpath-19991116/#location-paths)
//! and [§ 3 Expressions](https://www.w3.org/TR/1999/REC-xpath-19991116/#section-Expressions).

use std::str::FromStr;

use strum_macros::{Display, EnumString};

use crate::QueryError;
use crate::token::{SpannedToken, Token};
use crate::tokenizer::Tokenizer;

/// [§ 2.2 Axes](https://www.w3.org/TR/1999/REC-xpath-19991116/#axes)
///
/// Only the two axes the abbreviated syntax `/` and `//` reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `/name`: "the child axis contains the children of the context node"
    Child,
    /// `//name`: short for `/descendant-or-self::node()/child::name`
    Descendant,
}

/// [§ 2.3 Node Tests](https://www.w3.org/TR/1999/REC-xpath-19991116/#node-tests)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    /// "A node test * is true for any node of the principal node type."
    Any,
    /// A specific element name, compared ASCII case-insensitively.
    Name(String),
}

/// One location step with its predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// How candidates are reached from the context node.
    pub axis: Axis,
    /// Which elements qualify.
    pub test: NameTest,
    /// "A predicate filters a node-set with respect to an axis to produce a
    /// new node-set."
    pub predicates: Vec<Expr>,
}

/// An absolute location path.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Steps from the document root downward.
    pub steps: Vec<Step>,
}

/// [§ 4 Core Function Library](https://www.w3.org/TR/1999/REC-xpath-19991116/#corelib)
///
/// The implemented subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Function {
    /// `boolean true()`
    True,
    /// `boolean false()`
    False,
    /// `boolean not(boolean)`
    Not,
    /// `number position()`
    Position,
    /// `number last()`
    Last,
    /// `boolean contains(string, string)`
    Contains,
    /// `boolean starts-with(string, string)`
    StartsWith,
    /// `string concat(string, string, string*)`
    Concat,
    /// `string normalize-space(string?)`
    NormalizeSpace,
}

impl Function {
    /// Check an argument count, returning the expected count on mismatch.
    const fn check_arity(self, count: usize) -> Result<(), &'static str> {
        let ok = match self {
            Self::True | Self::False | Self::Position | Self::Last => count == 0,
            Self::Not => count == 1,
            Self::Contains | Self::StartsWith => count == 2,
            Self::Concat => count >= 2,
            Self::NormalizeSpace => count <= 1,
        };
        if ok {
            return Ok(());
        }
        Err(match self {
            Self::True | Self::False | Self::Position | Self::Last => "0",
            Self::Not => "1",
            Self::Contains | Self::StartsWith => "2",
            Self::Concat => "at least 2",
            Self::NormalizeSpace => "0 or 1",
        })
    }
}

/// [§ 3 Expressions](https://www.w3.org/TR/1999/REC-xpath-19991116/#section-Expressions)
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `a or b`
    Or(Box<Expr>, Box<Expr>),
    /// `a and b`
    And(Box<Expr>, Box<Expr>),
    /// `a = b`
    Equals(Box<Expr>, Box<Expr>),
    /// `a != b`
    NotEquals(Box<Expr>, Box<Expr>),
    /// A string literal.
    Literal(String),
    /// A number literal. Alone in a predicate it is a position test.
    Number(f64),
    /// `@name`: the attribute of the context element.
    Attribute(String),
    /// `text()`: the text-node children of the context element.
    Text,
    /// `.`: the context element itself.
    ContextNode,
    /// A core-library function call.
    Call(Function, Vec<Expr>),
}

/// Parse an absolute path expression.
///
/// # Errors
///
/// Returns a [`QueryError`] describing the first tokenizer or grammar error.
pub fn parse_path(source: &str) -> Result<Path, QueryError> {
    let tokens = Tokenizer::new(source).run()?;
    let mut parser = Parser { tokens, pos: 0 };
    let path = parser.parse_path()?;
    match parser.peek() {
        None => Ok(path),
        Some(t) => Err(parser.unexpected(t)),
    }
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, token: &SpannedToken) -> QueryError {
        QueryError::UnexpectedToken {
            found: token.token.to_string(),
            offset: token.offset,
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), QueryError> {
        match self.advance() {
            Some(t) if &t.token == expected => Ok(()),
            Some(t) => Err(self.unexpected(&t)),
            None => Err(QueryError::UnexpectedEnd),
        }
    }

    fn next_is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek_token(), Some(Token::Name(n)) if n == keyword)
    }

    /// "AbsoluteLocationPath ::= '/' RelativeLocationPath? | AbbreviatedAbsoluteLocationPath"
    fn parse_path(&mut self) -> Result<Path, QueryError> {
        let mut steps = Vec::new();
        loop {
            let axis = match self.peek_token() {
                Some(Token::Slash) => Axis::Child,
                Some(Token::DoubleSlash) => Axis::Descendant,
                Some(_) if steps.is_empty() => return Err(QueryError::RelativePath),
                _ => break,
            };
            let _ = self.advance();
            steps.push(self.parse_step(axis)?);
        }
        if steps.is_empty() {
            return Err(QueryError::UnexpectedEnd);
        }
        Ok(Path { steps })
    }

    /// "Step ::= NodeTest Predicate*"
    fn parse_step(&mut self, axis: Axis) -> Result<Step, QueryError> {
        let test = match self.advance() {
            Some(SpannedToken {
                token: Token::Star, ..
            }) => NameTest::Any,
            Some(SpannedToken {
                token: Token::Name(name),
                ..
            }) => NameTest::Name(name),
            Some(t) => return Err(self.unexpected(&t)),
            None => return Err(QueryError::UnexpectedEnd),
        };

        let mut predicates = Vec::new();
        while self.peek_token() == Some(&Token::LeftBracket) {
            let _ = self.advance();
            predicates.push(self.parse_or()?);
            self.expect(&Token::RightBracket)?;
        }
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    /// "OrExpr ::= AndExpr | OrExpr 'or' AndExpr"
    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut lhs = self.parse_and()?;
        while self.next_is_keyword("or") {
            let _ = self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// "AndExpr ::= EqualityExpr | AndExpr 'and' EqualityExpr"
    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut lhs = self.parse_equality()?;
        while self.next_is_keyword("and") {
            let _ = self.advance();
            let rhs = self.parse_equality()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// "EqualityExpr ::= RelationalExpr | EqualityExpr '=' RelationalExpr | EqualityExpr '!=' RelationalExpr"
    fn parse_equality(&mut self) -> Result<Expr, QueryError> {
        let mut lhs = self.parse_primary()?;
        loop {
            let negate = match self.peek_token() {
                Some(Token::Equals) => false,
                Some(Token::NotEquals) => true,
                _ => return Ok(lhs),
            };
            let _ = self.advance();
            let rhs = self.parse_primary()?;
            lhs = if negate {
                Expr::NotEquals(Box::new(lhs), Box::new(rhs))
            } else {
                Expr::Equals(Box::new(lhs), Box::new(rhs))
            };
        }
    }

    /// "PrimaryExpr ::= VariableReference | '(' Expr ')' | Literal | Number | FunctionCall"
    ///
    /// Extended with the `@name`, `.` and `text()` location-path forms.
    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        let Some(token) = self.advance() else {
            return Err(QueryError::UnexpectedEnd);
        };
        match token.token {
            Token::Literal(text) => Ok(Expr::Literal(text)),
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Dot => Ok(Expr::ContextNode),
            Token::At => match self.advance() {
                Some(SpannedToken {
                    token: Token::Name(name),
                    ..
                }) => Ok(Expr::Attribute(name)),
                Some(t) => Err(self.unexpected(&t)),
                None => Err(QueryError::UnexpectedEnd),
            },
            Token::LeftParen => {
                let inner = self.parse_or()?;
                self.expect(&Token::RightParen)?;
                Ok(inner)
            }
            Token::Name(name) if self.peek_token() == Some(&Token::LeftParen) => {
                let _ = self.advance();
                let args = self.parse_arguments()?;
                if name == "text" {
                    if !args.is_empty() {
                        return Err(QueryError::UnexpectedToken {
                            found: "arguments to text()".to_string(),
                            offset: token.offset,
                        });
                    }
                    return Ok(Expr::Text);
                }
                let function =
                    Function::from_str(&name).map_err(|_| QueryError::UnknownFunction {
                        name,
                        offset: token.offset,
                    })?;
                function
                    .check_arity(args.len())
                    .map_err(|expected| QueryError::Arity {
                        function,
                        expected,
                        found: args.len(),
                    })?;
                Ok(Expr::Call(function, args))
            }
            _ => Err(self.unexpected(&token)),
        }
    }

    /// Arguments after the opening parenthesis, consuming the closing one.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, QueryError> {
        let mut args = Vec::new();
        if self.peek_token() == Some(&Token::RightParen) {
            let _ = self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            match self.advance() {
                Some(SpannedToken {
                    token: Token::Comma,
                    ..
                }) => {}
                Some(SpannedToken {
                    token: Token::RightParen,
                    ..
                }) => return Ok(args),
                Some(t) => return Err(self.unexpected(&t)),
                None => return Err(QueryError::UnexpectedEnd),
            }
        }
    }
}
