// File: src/parser.rs
//
// Recursive descent parser for the yy language.
// Transforms a sequence of tokens into an Abstract Syntax Tree (AST).
//
// yy is expression-oriented, so the parser produces a flat list of
// expressions rather than statements. Operator precedence is handled by one
// level of parsing function per tier (precedence climbing), loosest first:
//
//   assignment < << < || < && < equality < comparison < range
//              < additive < multiplicative < unary < postfix < primary
//
// Assignment is right-associative (so `x := y := 0` nests); postfix call,
// index, and slice operators are left-associative and freely chainable.

use crate::ast::{BinaryOp, Expr, StrSegment, UnaryOp};
use crate::errors::{SourceLocation, YyError};
use crate::lexer::{self, TemplatePart, Token, TokenKind};
use std::rc::Rc;

/// Convenience wrapper: tokenize and parse a whole source text
pub fn parse_source(source: &str) -> Result<Vec<Expr>, YyError> {
    let tokens = lexer::tokenize(source)?;
    Parser::new(tokens).parse_program()
}

/// Parser maintains a position in the token stream and provides one method
/// per precedence tier
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parse the entire token stream into an ordered list of expressions
    pub fn parse_program(&mut self) -> Result<Vec<Expr>, YyError> {
        let mut program = Vec::new();
        while !matches!(self.peek(), TokenKind::Eof) {
            program.push(self.parse_expr()?);
        }
        Ok(program)
    }

    fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens.get(self.pos + offset).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn location(&self) -> SourceLocation {
        match self.tokens.get(self.pos.min(self.tokens.len().saturating_sub(1))) {
            Some(t) => SourceLocation::new(t.line, t.column),
            None => SourceLocation::unknown(),
        }
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens.get(self.pos).map(|t| t.kind.clone()).unwrap_or(TokenKind::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn error(&self, expected: &str) -> YyError {
        YyError::parse(expected, &self.peek().describe(), self.location())
    }

    fn check_punct(&self, c: char) -> bool {
        matches!(self.peek(), TokenKind::Punctuation(p) if *p == c)
    }

    fn check_op(&self, op: &str) -> bool {
        matches!(self.peek(), TokenKind::Operator(o) if o == op)
    }

    fn check_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), TokenKind::Keyword(k) if k == kw)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.check_punct(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), YyError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", c)))
        }
    }

    // --- precedence tiers, loosest first ---

    pub fn parse_expr(&mut self) -> Result<Expr, YyError> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Result<Expr, YyError> {
        let target = self.parse_append()?;

        let op = match self.peek() {
            TokenKind::Operator(op)
                if matches!(op.as_str(), ":=" | "=" | "+=" | "-=" | "*=" | "/=") =>
            {
                op.clone()
            }
            _ => return Ok(target),
        };
        let loc = self.location();
        self.advance();
        let value = self.parse_assign()?; // right-associative

        if op == ":=" {
            if !matches!(target, Expr::Identifier(_)) {
                return Err(YyError::parse("identifier before ':='", "expression", loc));
            }
            return Ok(Expr::Assign {
                declare: true,
                op: None,
                target: Box::new(target),
                value: Box::new(value),
            });
        }

        if !target.is_assignable() {
            return Err(YyError::parse("assignable target before '='", "expression", loc));
        }

        let bin_op = match op.as_str() {
            "+=" => Some(BinaryOp::Add),
            "-=" => Some(BinaryOp::Sub),
            "*=" => Some(BinaryOp::Mul),
            "/=" => Some(BinaryOp::Div),
            _ => None,
        };

        Ok(Expr::Assign {
            declare: false,
            op: bin_op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn parse_append(&mut self) -> Result<Expr, YyError> {
        let mut left = self.parse_or()?;
        while self.check_op("<<") {
            self.advance();
            let right = self.parse_or()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Append,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, YyError> {
        let mut left = self.parse_and()?;
        while self.check_op("||") {
            self.advance();
            let right = self.parse_and()?;
            left =
                Expr::Binary { left: Box::new(left), op: BinaryOp::Or, right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, YyError> {
        let mut left = self.parse_equality()?;
        while self.check_op("&&") {
            self.advance();
            let right = self.parse_equality()?;
            left =
                Expr::Binary { left: Box::new(left), op: BinaryOp::And, right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, YyError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = if self.check_op("==") {
                BinaryOp::Eq
            } else if self.check_op("!=") {
                BinaryOp::NotEq
            } else {
                return Ok(left);
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, YyError> {
        let mut left = self.parse_range()?;
        loop {
            let op = if self.check_op("<") {
                BinaryOp::Lt
            } else if self.check_op(">") {
                BinaryOp::Gt
            } else if self.check_op("<=") {
                BinaryOp::LtEq
            } else if self.check_op(">=") {
                BinaryOp::GtEq
            } else {
                return Ok(left);
            };
            self.advance();
            let right = self.parse_range()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
    }

    fn parse_range(&mut self) -> Result<Expr, YyError> {
        let start = self.parse_additive()?;
        if self.check_op("..") {
            self.advance();
            let end = self.parse_additive()?;
            return Ok(Expr::Range { start: Box::new(start), end: Box::new(end) });
        }
        Ok(start)
    }

    fn parse_additive(&mut self) -> Result<Expr, YyError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.check_op("+") {
                BinaryOp::Add
            } else if self.check_op("-") {
                BinaryOp::Sub
            } else {
                return Ok(left);
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, YyError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.check_op("*") {
                BinaryOp::Mul
            } else if self.check_op("/") {
                BinaryOp::Div
            } else if self.check_op("%") {
                BinaryOp::Mod
            } else {
                return Ok(left);
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, YyError> {
        let op = if self.check_op("!") {
            UnaryOp::Not
        } else if self.check_op("-") {
            UnaryOp::Neg
        } else {
            return self.parse_postfix();
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary { op, operand: Box::new(operand) })
    }

    /// Call, index, and slice are left-associative postfix operators and can
    /// be chained freely: `grid[i][j]`, `make_adder(1)(2)`, `f(x)[0..2]`
    fn parse_postfix(&mut self) -> Result<Expr, YyError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check_punct('(') {
                self.advance();
                let args = self.parse_call_args()?;
                expr = Expr::Call { callee: Box::new(expr), args };
            } else if self.check_punct('[') {
                self.advance();
                let index = self.parse_expr()?;
                self.expect_punct(']')?;
                expr = match index {
                    Expr::Range { start, end } => {
                        Expr::Slice { object: Box::new(expr), start, end }
                    }
                    other => Expr::Index { object: Box::new(expr), index: Box::new(other) },
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, YyError> {
        let mut args = Vec::new();
        while !self.check_punct(')') {
            args.push(self.parse_expr()?);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(')')?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, YyError> {
        let loc = self.location();
        match self.advance() {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Str(s) => Ok(Expr::Str(s)),
            TokenKind::TemplateStr(parts) => self.build_template(parts, loc),
            TokenKind::Identifier(name) => Ok(Expr::Identifier(name)),
            TokenKind::Keyword(kw) => match kw.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "null" => Ok(Expr::Null),
                "yif" => self.parse_yif(),
                "yall" => self.parse_yall(),
                "yoyo" => self.parse_yoyo(),
                "yolo" => Ok(Expr::Yolo(self.parse_block()?)),
                "yeet" => self.parse_yeet(),
                "yikes" => self.parse_yikes(),
                other => Err(YyError::parse("expression", &format!("'{}'", other), loc)),
            },
            TokenKind::Punctuation('(') => {
                let expr = self.parse_expr()?;
                self.expect_punct(')')?;
                Ok(expr)
            }
            TokenKind::Punctuation('[') => self.parse_array_literal(),
            TokenKind::Punctuation('\\') => self.parse_function_literal(),
            TokenKind::Operator(op) if op == "%{" => self.parse_map_literal(),
            other => Err(YyError::parse("expression", &other.describe(), loc)),
        }
    }

    /// `{ expr expr ... }`, the body of functions, conditionals and loops
    fn parse_block(&mut self) -> Result<Vec<Expr>, YyError> {
        self.expect_punct('{')?;
        let mut body = Vec::new();
        while !self.check_punct('}') && !matches!(self.peek(), TokenKind::Eof) {
            body.push(self.parse_expr()?);
        }
        self.expect_punct('}')?;
        Ok(body)
    }

    fn parse_yif(&mut self) -> Result<Expr, YyError> {
        let guard = self.parse_expr()?;
        let body = self.parse_block()?;
        let mut arms = vec![(guard, body)];
        let mut yels = None;

        while self.check_keyword("yels") {
            self.advance();
            if self.check_keyword("yif") {
                self.advance();
                let guard = self.parse_expr()?;
                let body = self.parse_block()?;
                arms.push((guard, body));
            } else {
                yels = Some(self.parse_block()?);
                break;
            }
        }

        Ok(Expr::Yif { arms, yels })
    }

    fn parse_yall(&mut self) -> Result<Expr, YyError> {
        // `yall name: iterable { ... }` names the binder explicitly;
        // without it the loop declares the implicit `yt`
        let mut binder = None;
        if let TokenKind::Identifier(name) = self.peek() {
            if matches!(self.peek_at(1), TokenKind::Punctuation(':')) {
                binder = Some(name.clone());
                self.advance();
                self.advance();
            }
        }

        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Expr::Yall { binder, iterable: Box::new(iterable), body })
    }

    fn parse_yoyo(&mut self) -> Result<Expr, YyError> {
        let condition = if self.check_punct('{') {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let body = self.parse_block()?;
        Ok(Expr::Yoyo { condition, body })
    }

    fn parse_yeet(&mut self) -> Result<Expr, YyError> {
        if can_start_expression(self.peek()) {
            let value = self.parse_expr()?;
            Ok(Expr::Yeet(Some(Box::new(value))))
        } else {
            Ok(Expr::Yeet(None))
        }
    }

    fn parse_yikes(&mut self) -> Result<Expr, YyError> {
        self.expect_punct('(')?;
        let args = self.parse_call_args()?;
        Ok(Expr::Yikes(args))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, YyError> {
        let mut elements = Vec::new();
        while !self.check_punct(']') {
            elements.push(self.parse_expr()?);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(']')?;
        Ok(Expr::Array(elements))
    }

    /// `%{ key: value, ... }`; keys are full expressions, stringified at
    /// evaluation time
    fn parse_map_literal(&mut self) -> Result<Expr, YyError> {
        let mut pairs = Vec::new();
        while !self.check_punct('}') {
            let key = self.parse_expr()?;
            self.expect_punct(':')?;
            let value = self.parse_expr()?;
            pairs.push((key, value));
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct('}')?;
        Ok(Expr::Map(pairs))
    }

    /// `\a, b { body }`; `\{ body }` takes no parameters
    fn parse_function_literal(&mut self) -> Result<Expr, YyError> {
        let mut params = Vec::new();
        while let TokenKind::Identifier(name) = self.peek() {
            params.push(name.clone());
            self.advance();
            if !self.eat_punct(',') {
                break;
            }
        }
        let body = self.parse_block()?;
        Ok(Expr::Function { params, body: Rc::new(body) })
    }

    /// Parses one `{expr}` span captured inside a string literal. The span's
    /// own offsets are meaningless outside the string, so errors are pinned
    /// to the string's location.
    fn build_template(
        &mut self,
        parts: Vec<TemplatePart>,
        loc: SourceLocation,
    ) -> Result<Expr, YyError> {
        let mut segments = Vec::new();
        for part in parts {
            match part {
                TemplatePart::Text(text) => segments.push(StrSegment::Text(text)),
                TemplatePart::Expr(src) => {
                    let expr = parse_embedded(&src, loc)?;
                    segments.push(StrSegment::Expr(Box::new(expr)));
                }
            }
        }
        Ok(Expr::TemplateStr(segments))
    }
}

fn parse_embedded(src: &str, loc: SourceLocation) -> Result<Expr, YyError> {
    let reposition = |mut e: YyError| {
        e.location = loc;
        e
    };

    let tokens = lexer::tokenize(src).map_err(reposition)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr().map_err(reposition)?;
    if !matches!(parser.peek(), TokenKind::Eof) {
        return Err(YyError::parse(
            "end of interpolated expression",
            &parser.peek().describe(),
            loc,
        ));
    }
    Ok(expr)
}

fn can_start_expression(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Identifier(_)
        | TokenKind::Number(_)
        | TokenKind::Str(_)
        | TokenKind::TemplateStr(_) => true,
        TokenKind::Keyword(k) => {
            matches!(k.as_str(), "true" | "false" | "null" | "yif" | "yall" | "yoyo" | "yolo" | "yikes")
        }
        TokenKind::Punctuation(c) => matches!(c, '(' | '[' | '\\'),
        TokenKind::Operator(op) => matches!(op.as_str(), "-" | "!" | "%{"),
        _ => false,
    }
}
