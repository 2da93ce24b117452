//! Path-expression tokenizer.

use crate::QueryError;
use crate::token::{SpannedToken, Token};

/// "NameChar" restricted to what element and attribute names use in practice.
const fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

const fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == '-' || c == ':'
}

/// Converts source text into a flat token list.
pub struct Tokenizer<'a> {
    source: &'a str,
    chars: core::iter::Peekable<core::str::CharIndices<'a>>,
    tokens: Vec<SpannedToken>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnexpectedChar`] or
    /// [`QueryError::UnterminatedLiteral`] on malformed input.
    pub fn run(mut self) -> Result<Vec<SpannedToken>, QueryError> {
        while let Some((offset, c)) = self.chars.next() {
            let token = match c {
                c if c.is_whitespace() => continue,
                '/' => {
                    if self.chars.next_if(|&(_, n)| n == '/').is_some() {
                        Token::DoubleSlash
                    } else {
                        Token::Slash
                    }
                }
                '[' => Token::LeftBracket,
                ']' => Token::RightBracket,
                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                ',' => Token::Comma,
                '@' => Token::At,
                '*' => Token::Star,
                '=' => Token::Equals,
                '!' => {
                    if self.chars.next_if(|&(_, n)| n == '=').is_none() {
                        return Err(QueryError::UnexpectedChar { ch: '!', offset });
                    }
                    Token::NotEquals
                }
                '\'' | '"' => self.consume_literal(c, offset)?,
                '.' if !self.peek_is_digit() => Token::Dot,
                c if c.is_ascii_digit() || c == '.' => self.consume_number(offset),
                c if is_name_start_char(c) => self.consume_name(offset),
                ch => return Err(QueryError::UnexpectedChar { ch, offset }),
            };
            self.tokens.push(SpannedToken { token, offset });
        }
        Ok(self.tokens)
    }

    fn peek_is_digit(&mut self) -> bool {
        self.chars.peek().is_some_and(|&(_, c)| c.is_ascii_digit())
    }

    /// "Literal ::= '"' [^"]* '"' | "'" [^']* "'""
    ///
    /// XPath 1.0 literals have no escape mechanism.
    fn consume_literal(&mut self, quote: char, offset: usize) -> Result<Token, QueryError> {
        let start = offset + quote.len_utf8();
        for (end, c) in self.chars.by_ref() {
            if c == quote {
                return Ok(Token::Literal(self.source[start..end].to_string()));
            }
        }
        Err(QueryError::UnterminatedLiteral { offset })
    }

    /// "Number ::= Digits ('.' Digits?)? | '.' Digits"
    fn consume_number(&mut self, offset: usize) -> Token {
        let mut end = offset + 1;
        let mut seen_dot = self.source[offset..].starts_with('.');
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                seen_dot |= c == '.';
                end = i + 1;
                let _ = self.chars.next();
            } else {
                break;
            }
        }
        // Only digits and at most one dot were consumed.
        Token::Number(self.source[offset..end].parse().unwrap_or(f64::NAN))
    }

    fn consume_name(&mut self, offset: usize) -> Token {
        let mut end = self.source.len();
        while let Some(&(i, c)) = self.chars.peek() {
            if is_name_char(c) {
                let _ = self.chars.next();
            } else {
                end = i;
                break;
            }
        }
        Token::Name(self.source[offset..end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Tokenizer::new(source)
            .run()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_double_slash_is_one_token() {
        assert_eq!(
            kinds("//a/b"),
            vec![
                Token::DoubleSlash,
                Token::Name("a".into()),
                Token::Slash,
                Token::Name("b".into()),
            ]
        );
    }

    #[test]
    fn test_hyphenated_function_name() {
        assert_eq!(
            kinds("normalize-space(@class)"),
            vec![
                Token::Name("normalize-space".into()),
                Token::LeftParen,
                Token::At,
                Token::Name("class".into()),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_literal_keeps_inner_quotes_of_other_kind() {
        assert_eq!(kinds(r#""it's""#), vec![Token::Literal("it's".into())]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("12 .5 3.25"),
            vec![Token::Number(12.0), Token::Number(0.5), Token::Number(3.25)]
        );
    }

    #[test]
    fn test_not_equals_and_dot() {
        assert_eq!(
            kinds(". != 'x'"),
            vec![Token::Dot, Token::NotEquals, Token::Literal("x".into())]
        );
    }

    #[test]
    fn test_unterminated_literal() {
        assert_eq!(
            Tokenizer::new("//a[@id='x]").run(),
            Err(QueryError::UnterminatedLiteral { offset: 8 })
        );
    }

    #[test]
    fn test_bang_without_equals() {
        assert_eq!(
            Tokenizer::new("a!b").run(),
            Err(QueryError::UnexpectedChar { ch: '!', offset: 1 })
        );
    }
}
