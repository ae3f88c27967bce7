//! Recursive-descent parser for condition expressions.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or      := and ( ("or" | "||") and )*
//! and     := not ( ("and" | "&&") not )*
//! not     := ("not" | "!") not | compare
//! compare := arith ( cmp_op arith )*
//! arith   := term ( ("+" | "-") term )*
//! term    := unary ( ("*" | "/" | "//" | "%") unary )*
//! unary   := ("-" | "+") unary | primary
//! primary := literal | ident | "(" or ")" | "(" list ")" | "[" list "]"
//! ```
//!
//! Calls, attribute access and subscripts are rejected with a syntax error.

use super::ast::{BinaryOp, CompareOp, Expr, Literal, UnaryOp};
use super::error::ConditionSyntaxError;
use super::lexer::{tokenize, Token, TokenKind};

/// Parse a condition into an AST, rejecting nesting deeper than `max_depth`.
pub fn parse(src: &str, max_depth: usize) -> Result<Expr, ConditionSyntaxError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        max_depth,
    };

    if parser.peek() == &TokenKind::Eof {
        return Err(ConditionSyntaxError::new(0, "empty condition"));
    }

    let expr = parser.parse_or()?;
    let tail = parser.current();
    if tail.kind != TokenKind::Eof {
        return Err(ConditionSyntaxError::new(
            tail.pos,
            format!("unexpected {} after end of expression", describe(&tail.kind)),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        // The token stream always ends with Eof and we never advance past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_next(&self) -> &TokenKind {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ConditionSyntaxError> {
        if self.peek() == &kind {
            self.advance();
            Ok(())
        } else {
            let tok = self.current();
            Err(ConditionSyntaxError::new(
                tok.pos,
                format!("expected {}, found {}", what, describe(&tok.kind)),
            ))
        }
    }

    fn enter(&mut self) -> Result<(), ConditionSyntaxError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ConditionSyntaxError::new(
                self.current().pos,
                format!("expression nested deeper than {} levels", self.max_depth),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Release the levels taken by one operator chain.
    fn leave_chain(&mut self, links: usize) {
        self.depth -= links;
    }

    fn parse_or(&mut self) -> Result<Expr, ConditionSyntaxError> {
        let mut left = self.parse_and()?;
        let mut links = 0;
        while self.peek() == &TokenKind::Or {
            self.advance();
            // Each link nests the chain one level deeper on the left.
            self.enter()?;
            links += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ConditionSyntaxError> {
        let mut left = self.parse_not()?;
        let mut links = 0;
        while self.peek() == &TokenKind::And {
            self.advance();
            self.enter()?;
            links += 1;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ConditionSyntaxError> {
        // `not in` is a comparison operator, never a prefix here.
        if self.peek() == &TokenKind::Not {
            self.advance();
            self.enter()?;
            let inner = self.parse_not()?;
            self.leave();
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.parse_compare()
    }

    fn compare_op(&self) -> Option<(CompareOp, usize)> {
        let op = match self.peek() {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::GtEq => CompareOp::GtEq,
            TokenKind::In => CompareOp::In,
            TokenKind::Not if self.peek_next() == &TokenKind::In => return Some((CompareOp::NotIn, 2)),
            _ => return None,
        };
        Some((op, 1))
    }

    fn parse_compare(&mut self) -> Result<Expr, ConditionSyntaxError> {
        let first = self.parse_arith()?;
        let mut rest = Vec::new();
        while let Some((op, width)) = self.compare_op() {
            for _ in 0..width {
                self.advance();
            }
            rest.push((op, self.parse_arith()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), rest))
        }
    }

    fn parse_arith(&mut self) -> Result<Expr, ConditionSyntaxError> {
        let mut left = self.parse_term()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.enter()?;
            links += 1;
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ConditionSyntaxError> {
        let mut left = self.parse_unary()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::SlashSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            self.enter()?;
            links += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ConditionSyntaxError> {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.parse_postfix(),
        };
        self.advance();
        self.enter()?;
        let inner = self.parse_unary()?;
        self.leave();
        Ok(Expr::Unary(op, Box::new(inner)))
    }

    /// A primary followed by a check that no call/attribute/subscript trails it.
    fn parse_postfix(&mut self) -> Result<Expr, ConditionSyntaxError> {
        let expr = self.parse_primary()?;
        let tok = self.current();
        match tok.kind {
            TokenKind::LParen => Err(ConditionSyntaxError::new(tok.pos, "function calls are not allowed")),
            TokenKind::Dot => Err(ConditionSyntaxError::new(tok.pos, "attribute access is not allowed")),
            TokenKind::LBracket => Err(ConditionSyntaxError::new(tok.pos, "subscripts are not allowed")),
            _ => Ok(expr),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ConditionSyntaxError> {
        let tok = self.advance();
        let expr = match tok.kind {
            TokenKind::Int(v) => Expr::Literal(Literal::Int(v)),
            TokenKind::Float(v) => Expr::Literal(Literal::Float(v)),
            TokenKind::Str(s) => Expr::Literal(Literal::Str(s)),
            TokenKind::True => Expr::Literal(Literal::Bool(true)),
            TokenKind::False => Expr::Literal(Literal::Bool(false)),
            TokenKind::None => Expr::Literal(Literal::None),
            TokenKind::Ident(name) => Expr::Variable(name),
            TokenKind::LParen => {
                self.enter()?;
                let expr = self.parse_group()?;
                self.leave();
                expr
            }
            TokenKind::LBracket => {
                self.enter()?;
                let items = self.parse_items(TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket, "']'")?;
                self.leave();
                Expr::List(items)
            }
            other => {
                return Err(ConditionSyntaxError::new(
                    tok.pos,
                    format!("expected a value, found {}", describe(&other)),
                ))
            }
        };
        Ok(expr)
    }

    /// After `(`: either a parenthesized expression or a tuple literal.
    fn parse_group(&mut self) -> Result<Expr, ConditionSyntaxError> {
        if self.peek() == &TokenKind::RParen {
            self.advance();
            return Ok(Expr::List(Vec::new()));
        }
        let first = self.parse_or()?;
        if self.peek() != &TokenKind::Comma {
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(first);
        }

        let mut items = vec![first];
        while self.peek() == &TokenKind::Comma {
            self.advance();
            if self.peek() == &TokenKind::RParen {
                break;
            }
            items.push(self.parse_or()?);
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Expr::List(items))
    }

    fn parse_items(&mut self, close: TokenKind) -> Result<Vec<Expr>, ConditionSyntaxError> {
        let mut items = Vec::new();
        while self.peek() != &close {
            items.push(self.parse_or()?);
            if self.peek() == &TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        Ok(items)
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Int(v) => format!("number {}", v),
        TokenKind::Float(v) => format!("number {}", v),
        TokenKind::Str(s) => format!("string '{}'", s),
        TokenKind::Ident(name) => format!("identifier '{}'", name),
        TokenKind::Eof => "end of expression".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}
