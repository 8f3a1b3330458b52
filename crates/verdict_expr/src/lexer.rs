//! Tokenizer for the expression grammar.

use crate::error::ExprError;
use std::fmt;

/// A single token of the expression grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `true` literal
    True,
    /// `false` literal
    False,
    /// Integer literal
    Int(i64),
    /// String literal, quotes and escapes resolved
    Str(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `!`
    Bang,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `in` membership operator
    In,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{:?}", s),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Comma => write!(f, ","),
            Self::AndAnd => write!(f, "&&"),
            Self::OrOr => write!(f, "||"),
            Self::Bang => write!(f, "!"),
            Self::EqEq => write!(f, "=="),
            Self::NotEq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
            Self::In => write!(f, "in"),
        }
    }
}

/// A token paired with its byte offset in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    /// The token
    pub token: Token,
    /// Byte offset of the token's first character
    pub offset: usize,
}

/// Tokenize an expression source string
///
/// # Errors
///
/// Returns an error for characters outside the grammar, unterminated string
/// literals, out-of-range integer literals, and identifiers other than the
/// keywords `true`, `false`, and `in`.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => push_single(&mut chars, &mut tokens, Token::LParen, offset),
            ')' => push_single(&mut chars, &mut tokens, Token::RParen, offset),
            '[' => push_single(&mut chars, &mut tokens, Token::LBracket, offset),
            ']' => push_single(&mut chars, &mut tokens, Token::RBracket, offset),
            ',' => push_single(&mut chars, &mut tokens, Token::Comma, offset),
            '&' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '&')) => {
                        chars.next();
                        tokens.push(Spanned {
                            token: Token::AndAnd,
                            offset,
                        });
                    }
                    _ => return Err(ExprError::UnexpectedChar { ch: '&', offset }),
                }
            }
            '|' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '|')) => {
                        chars.next();
                        tokens.push(Spanned {
                            token: Token::OrOr,
                            offset,
                        });
                    }
                    _ => return Err(ExprError::UnexpectedChar { ch: '|', offset }),
                }
            }
            '!' => {
                chars.next();
                let token = if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    Token::NotEq
                } else {
                    Token::Bang
                };
                tokens.push(Spanned { token, offset });
            }
            '=' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push(Spanned {
                            token: Token::EqEq,
                            offset,
                        });
                    }
                    _ => return Err(ExprError::UnexpectedChar { ch: '=', offset }),
                }
            }
            '<' => {
                chars.next();
                let token = if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    Token::Le
                } else {
                    Token::Lt
                };
                tokens.push(Spanned { token, offset });
            }
            '>' => {
                chars.next();
                let token = if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    Token::Ge
                } else {
                    Token::Gt
                };
                tokens.push(Spanned { token, offset });
            }
            '"' | '\'' => {
                let token = lex_string(&mut chars, offset)?;
                tokens.push(Spanned { token, offset });
            }
            '-' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, c)) if c.is_ascii_digit() => {
                        let token = lex_int(&mut chars, offset, true)?;
                        tokens.push(Spanned { token, offset });
                    }
                    _ => return Err(ExprError::UnexpectedChar { ch: '-', offset }),
                }
            }
            c if c.is_ascii_digit() => {
                let token = lex_int(&mut chars, offset, false)?;
                tokens.push(Spanned { token, offset });
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let token = lex_word(&mut chars)?;
                tokens.push(Spanned { token, offset });
            }
            c => return Err(ExprError::UnexpectedChar { ch: c, offset }),
        }
    }

    Ok(tokens)
}

fn push_single(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    tokens: &mut Vec<Spanned>,
    token: Token,
    offset: usize,
) {
    chars.next();
    tokens.push(Spanned { token, offset });
}

fn lex_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    offset: usize,
) -> Result<Token, ExprError> {
    let Some((_, quote)) = chars.next() else {
        return Err(ExprError::UnterminatedString { offset });
    };
    let mut out = String::new();
    loop {
        match chars.next() {
            Some((_, c)) if c == quote => return Ok(Token::Str(out)),
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, c @ ('\\' | '"' | '\''))) => out.push(c),
                Some((esc_offset, c)) => {
                    return Err(ExprError::UnexpectedChar {
                        ch: c,
                        offset: esc_offset,
                    });
                }
                None => return Err(ExprError::UnterminatedString { offset }),
            },
            Some((_, c)) => out.push(c),
            None => return Err(ExprError::UnterminatedString { offset }),
        }
    }
}

fn lex_int(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    offset: usize,
    negative: bool,
) -> Result<Token, ExprError> {
    let mut digits = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            chars.next();
        } else {
            break;
        }
    }
    let magnitude: i128 = digits
        .parse()
        .map_err(|_| ExprError::IntOutOfRange { offset })?;
    let signed = if negative { -magnitude } else { magnitude };
    let value = i64::try_from(signed).map_err(|_| ExprError::IntOutOfRange { offset })?;
    Ok(Token::Int(value))
}

fn lex_word(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<Token, ExprError> {
    let mut word = String::new();
    while let Some(&(_, c)) = chars.peek() {
        // Dots are part of words so an unsubstituted designator like
        // `subject.role` is reported whole.
        if c.is_alphanumeric() || c == '_' || c == '.' || c == '$' {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }
    match word.as_str() {
        "true" => Ok(Token::True),
        "false" => Ok(Token::False),
        "in" => Ok(Token::In),
        _ => Err(ExprError::UnknownIdentifier { name: word }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_tokenize_literals() {
        assert_eq!(kinds("true false 42 -7"), vec![
            Token::True,
            Token::False,
            Token::Int(42),
            Token::Int(-7),
        ]);
    }

    #[test]
    fn test_tokenize_strings_both_quotes() {
        assert_eq!(kinds("\"abc\" 'def'"), vec![
            Token::Str("abc".to_string()),
            Token::Str("def".to_string()),
        ]);
    }

    #[test]
    fn test_tokenize_string_escapes() {
        assert_eq!(kinds(r#""a\"b\\c""#), vec![Token::Str(
            "a\"b\\c".to_string()
        )]);
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(kinds("== != < <= > >= && || ! in"), vec![
            Token::EqEq,
            Token::NotEq,
            Token::Lt,
            Token::Le,
            Token::Gt,
            Token::Ge,
            Token::AndAnd,
            Token::OrOr,
            Token::Bang,
            Token::In,
        ]);
    }

    #[test]
    fn test_tokenize_brackets() {
        assert_eq!(kinds("([1, 2])"), vec![
            Token::LParen,
            Token::LBracket,
            Token::Int(1),
            Token::Comma,
            Token::Int(2),
            Token::RBracket,
            Token::RParen,
        ]);
    }

    #[test]
    fn test_tokenize_offsets() {
        let tokens = tokenize("  true == false").unwrap();
        assert_eq!(tokens[0].offset, 2);
        assert_eq!(tokens[1].offset, 7);
        assert_eq!(tokens[2].offset, 10);
    }

    #[test]
    fn test_unknown_identifier_is_reported_whole() {
        let err = tokenize("subject.role == \"doctor\"").unwrap_err();
        assert_eq!(err, ExprError::UnknownIdentifier {
            name: "subject.role".to_string(),
        });
    }

    #[test]
    fn test_unsubstituted_designator_is_reported_whole() {
        let err = tokenize("$subject.role == \"doctor\"").unwrap_err();
        assert_eq!(err, ExprError::UnknownIdentifier {
            name: "$subject.role".to_string(),
        });
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("\"abc").unwrap_err();
        assert_eq!(err, ExprError::UnterminatedString { offset: 0 });
    }

    #[test]
    fn test_single_ampersand_rejected() {
        assert!(matches!(tokenize("true & false"), Err(
            ExprError::UnexpectedChar { ch: '&', .. }
        )));
    }

    #[test]
    fn test_single_equals_rejected() {
        assert!(matches!(tokenize("1 = 1"), Err(ExprError::UnexpectedChar {
            ch: '=',
            ..
        })));
    }

    #[test]
    fn test_int_out_of_range() {
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err, ExprError::IntOutOfRange { .. }));
    }

    #[test]
    fn test_bare_minus_rejected() {
        assert!(matches!(tokenize("- 1"), Err(ExprError::UnexpectedChar {
            ch: '-',
            ..
        })));
    }
}
