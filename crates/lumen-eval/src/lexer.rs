//! Tokenizer for console commands.
//!
//! The token set is deliberately small: literals, identifiers, and a fixed
//! operator alphabet. Anything outside it is a parse error, not a blocked
//! command; blocking happens upstream in the security filter.

use crate::errors::{EvalError, EvalResult};

/// One lexical unit of a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Numeric literal.
    Number(f64),
    /// String literal with escapes already resolved.
    Str(String),
    /// Lowercase-leading name, optionally ending in `!` or `?`.
    Ident(String),
    /// Capitalized name; resolves only to registered model types.
    Const(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `nil`
    Nil,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `**`
    StarStar,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `!`
    Not,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `=>`
    HashRocket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
}

/// Split a command into tokens.
pub fn tokenize(src: &str) -> EvalResult<Vec<Token>> {
    let chars: Vec<char> = src.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' => {
                let (token, next) = lex_number(&chars, i)?;
                out.push(token);
                i = next;
            }
            '"' | '\'' => {
                let (token, next) = lex_string(&chars, i)?;
                out.push(token);
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let (token, next) = lex_name(&chars, i);
                out.push(token);
                i = next;
            }
            '+' => {
                out.push(Token::Plus);
                i += 1;
            }
            '-' => {
                out.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    out.push(Token::StarStar);
                    i += 2;
                } else {
                    out.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                out.push(Token::Slash);
                i += 1;
            }
            '%' => {
                out.push(Token::Percent);
                i += 1;
            }
            '=' => match chars.get(i + 1) {
                Some('=') => {
                    out.push(Token::EqEq);
                    i += 2;
                }
                Some('>') => {
                    out.push(Token::HashRocket);
                    i += 2;
                }
                _ => {
                    out.push(Token::Assign);
                    i += 1;
                }
            },
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    out.push(Token::NotEq);
                    i += 2;
                } else {
                    out.push(Token::Not);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    out.push(Token::LtEq);
                    i += 2;
                } else {
                    out.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    out.push(Token::GtEq);
                    i += 2;
                } else {
                    out.push(Token::Gt);
                    i += 1;
                }
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    out.push(Token::AndAnd);
                    i += 2;
                } else {
                    return Err(EvalError::parse("expected `&&`"));
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    out.push(Token::OrOr);
                    i += 2;
                } else {
                    return Err(EvalError::parse("expected `||`"));
                }
            }
            '.' => {
                out.push(Token::Dot);
                i += 1;
            }
            ',' => {
                out.push(Token::Comma);
                i += 1;
            }
            ':' => {
                out.push(Token::Colon);
                i += 1;
            }
            '(' => {
                out.push(Token::LParen);
                i += 1;
            }
            ')' => {
                out.push(Token::RParen);
                i += 1;
            }
            '[' => {
                out.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                out.push(Token::RBracket);
                i += 1;
            }
            '{' => {
                out.push(Token::LBrace);
                i += 1;
            }
            '}' => {
                out.push(Token::RBrace);
                i += 1;
            }
            other => {
                return Err(EvalError::parse(format!("unexpected character `{other}`")));
            }
        }
    }

    Ok(out)
}

fn lex_number(chars: &[char], start: usize) -> EvalResult<(Token, usize)> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    // A dot only belongs to the number when a digit follows; `1.foo` is a
    // method call on the literal.
    if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    let text: String = chars[start..i].iter().collect();
    let value: f64 = text
        .parse()
        .map_err(|_| EvalError::parse(format!("invalid number `{text}`")))?;
    Ok((Token::Number(value), i))
}

fn lex_string(chars: &[char], start: usize) -> EvalResult<(Token, usize)> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or_else(|| EvalError::parse("unterminated string"))?;
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    other => out.push(*other),
                }
                i += 2;
            }
            c if c == quote => return Ok((Token::Str(out), i + 1)),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Err(EvalError::parse("unterminated string"))
}

fn lex_name(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    // `reload!` style names: a trailing `!` joins the name unless it starts
    // `!=`; a trailing `?` always joins.
    if i < chars.len() && chars[i] == '?' {
        i += 1;
    } else if i < chars.len() && chars[i] == '!' && chars.get(i + 1) != Some(&'=') {
        i += 1;
    }
    let text: String = chars[start..i].iter().collect();
    let token = match text.as_str() {
        "true" => Token::True,
        "false" => Token::False,
        "nil" => Token::Nil,
        _ if text.starts_with(char::is_uppercase) => Token::Const(text),
        _ => Token::Ident(text),
    };
    (token, i)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_operators() {
        assert_eq!(
            tokenize("2 + 3.5 ** 2").unwrap(),
            vec![
                Token::Number(2.0),
                Token::Plus,
                Token::Number(3.5),
                Token::StarStar,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn dot_after_integer_is_a_method_call() {
        assert_eq!(
            tokenize("1.size").unwrap(),
            vec![Token::Number(1.0), Token::Dot, Token::Ident("size".into())]
        );
    }

    #[test]
    fn strings_resolve_escapes() {
        assert_eq!(
            tokenize(r#""a\nb" 'c'"#).unwrap(),
            vec![Token::Str("a\nb".into()), Token::Str("c".into())]
        );
        assert!(tokenize("\"open").is_err());
    }

    #[test]
    fn names_keywords_and_constants() {
        assert_eq!(
            tokenize("x = Post.valid?").unwrap(),
            vec![
                Token::Ident("x".into()),
                Token::Assign,
                Token::Const("Post".into()),
                Token::Dot,
                Token::Ident("valid?".into()),
            ]
        );
        assert_eq!(tokenize("nil").unwrap(), vec![Token::Nil]);
        assert_eq!(
            tokenize("reload!").unwrap(),
            vec![Token::Ident("reload!".into())]
        );
    }

    #[test]
    fn bang_does_not_swallow_not_equals() {
        assert_eq!(
            tokenize("a != b").unwrap(),
            vec![
                Token::Ident("a".into()),
                Token::NotEq,
                Token::Ident("b".into()),
            ]
        );
    }

    #[test]
    fn lone_ampersand_is_rejected() {
        assert!(tokenize("a & b").is_err());
        assert!(tokenize("a | b").is_err());
    }
}
