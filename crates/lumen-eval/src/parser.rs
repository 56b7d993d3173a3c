//! Recursive-descent parser for console commands.
//!
//! One command is one expression. Precedence, loosest first:
//! assignment, `||`, `&&`, equality, comparison, additive, multiplicative,
//! `**` (right-associative), prefix `-`/`!`, dotted calls, primaries.

use crate::ast::{ArgList, BinaryOp, Expr, UnaryOp};
use crate::errors::{EvalError, EvalResult};
use crate::lexer::{Token, tokenize};

/// Parse one command into an expression.
pub fn parse(src: &str) -> EvalResult<Expr> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;
    if parser.pos < parser.tokens.len() {
        return Err(EvalError::parse("unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> EvalResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(EvalError::parse(format!("expected {what}")))
        }
    }

    fn expression(&mut self) -> EvalResult<Expr> {
        // Assignment is right-associative and only valid on a bare name.
        if let (Some(Token::Ident(name)), Some(Token::Assign)) = (self.peek(), self.peek_at(1)) {
            let name = name.clone();
            self.pos += 2;
            let value = self.expression()?;
            return Ok(Expr::Assign {
                name,
                value: Box::new(value),
            });
        }
        self.or_expr()
    }

    fn or_expr(&mut self) -> EvalResult<Expr> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::OrOr) {
            let right = self.and_expr()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> EvalResult<Expr> {
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) {
            let right = self.equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn equality(&mut self) -> EvalResult<Expr> {
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                _ => break,
            };
            self.pos += 1;
            let right = self.comparison()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> EvalResult<Expr> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::LtEq) => BinaryOp::LtEq,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::GtEq) => BinaryOp::GtEq,
                _ => break,
            };
            self.pos += 1;
            let right = self.additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn additive(&mut self) -> EvalResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> EvalResult<Expr> {
        let mut left = self.power()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.power()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn power(&mut self) -> EvalResult<Expr> {
        let base = self.unary()?;
        if self.eat(&Token::StarStar) {
            let exponent = self.power()?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> EvalResult<Expr> {
        let op = match self.peek() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Not) => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> EvalResult<Expr> {
        let mut expr = self.primary()?;
        while self.eat(&Token::Dot) {
            let name = match self.advance() {
                Some(Token::Ident(name)) => name,
                _ => return Err(EvalError::parse("expected method name after `.`")),
            };
            let args = if self.peek() == Some(&Token::LParen) {
                self.arg_list()?
            } else {
                ArgList::default()
            };
            expr = Expr::MethodCall {
                receiver: Box::new(expr),
                name,
                args,
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> EvalResult<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Text(s)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Nil) => Ok(Expr::Nil),
            Some(Token::Const(name)) => Ok(Expr::Const(name)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let args = self.arg_list()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(Token::LBracket) => self.array_literal(),
            Some(Token::LBrace) => self.hash_literal(),
            Some(other) => Err(EvalError::parse(format!("unexpected token {other:?}"))),
            None => Err(EvalError::parse("unexpected end of command")),
        }
    }

    fn array_literal(&mut self) -> EvalResult<Expr> {
        let mut items = Vec::new();
        if self.eat(&Token::RBracket) {
            return Ok(Expr::Array(items));
        }
        loop {
            items.push(self.expression()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RBracket, "`]`")?;
            return Ok(Expr::Array(items));
        }
    }

    fn hash_literal(&mut self) -> EvalResult<Expr> {
        let mut pairs = Vec::new();
        if self.eat(&Token::RBrace) {
            return Ok(Expr::Hash(pairs));
        }
        loop {
            let key = match self.advance() {
                // `{name: value}`
                Some(Token::Ident(name)) => {
                    self.expect(&Token::Colon, "`:` after hash key")?;
                    name
                }
                // `{"name" => value}`
                Some(Token::Str(name)) => {
                    self.expect(&Token::HashRocket, "`=>` after hash key")?;
                    name
                }
                _ => return Err(EvalError::parse("expected hash key")),
            };
            let value = self.expression()?;
            pairs.push((key, value));
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RBrace, "`}`")?;
            return Ok(Expr::Hash(pairs));
        }
    }

    fn arg_list(&mut self) -> EvalResult<ArgList> {
        self.expect(&Token::LParen, "`(`")?;
        let mut args = ArgList::default();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            // `key: value` is a named argument; named arguments close the
            // positional section.
            if let (Some(Token::Ident(key)), Some(Token::Colon)) = (self.peek(), self.peek_at(1)) {
                let key = key.clone();
                self.pos += 2;
                let value = self.expression()?;
                args.named.push((key, value));
            } else if args.named.is_empty() {
                args.positional.push(self.expression()?);
            } else {
                return Err(EvalError::parse(
                    "positional argument after named argument",
                ));
            }
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen, "`)`")?;
            return Ok(args);
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_puts_multiplication_inside_addition() {
        let expr = parse("2 + 3 * 4").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => assert!(matches!(
                *right,
                Expr::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            )),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2 ** 3 ** 2").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::Pow,
                left,
                right,
            } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(
                    *right,
                    Expr::Binary {
                        op: BinaryOp::Pow,
                        ..
                    }
                ));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn assignment_binds_the_whole_right_side() {
        let expr = parse("x = 1 + 2").unwrap();
        match expr {
            Expr::Assign { name, value } => {
                assert_eq!(name, "x");
                assert!(matches!(
                    *value,
                    Expr::Binary {
                        op: BinaryOp::Add,
                        ..
                    }
                ));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn equality_on_a_name_is_not_assignment() {
        assert!(matches!(
            parse("x == 1").unwrap(),
            Expr::Binary {
                op: BinaryOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn dotted_calls_chain_left_to_right() {
        let expr = parse("Post.where(views: 3).count").unwrap();
        match expr {
            Expr::MethodCall {
                receiver, name, ..
            } => {
                assert_eq!(name, "count");
                match *receiver {
                    Expr::MethodCall { name, args, .. } => {
                        assert_eq!(name, "where");
                        assert_eq!(args.named.len(), 1);
                        assert_eq!(args.named[0].0, "views");
                    }
                    other => panic!("unexpected receiver: {other:?}"),
                }
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn named_arguments_close_the_positional_section() {
        let expr = parse("find_by(Post, id: 1)").unwrap();
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "find_by");
                assert_eq!(args.positional.len(), 1);
                assert_eq!(args.named.len(), 1);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
        assert!(parse("f(id: 1, 2)").is_err());
    }

    #[test]
    fn collection_literals() {
        assert_eq!(
            parse("[1, 2]").unwrap(),
            Expr::Array(vec![Expr::Number(1.0), Expr::Number(2.0)])
        );
        assert_eq!(
            parse("{a: 1, \"b\" => 2}").unwrap(),
            Expr::Hash(vec![
                ("a".into(), Expr::Number(1.0)),
                ("b".into(), Expr::Number(2.0)),
            ])
        );
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(parse("1 2").is_err());
        assert!(parse("").is_err());
        assert!(parse("(1").is_err());
    }
}
