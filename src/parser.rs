//! Recursive-descent parser turning a token stream into the typed
//! AST (`crate::ast`).
//!
//! Structured around a `tokens: &[(Span, Token)]` slice plus a cursor, with
//! `pop_token`/`peek_token`/`expect_token` helpers, but as a conventional
//! operator-precedence expression parser instead of an S-expression reader, since
//! Homescript's grammar is infix, not prefix. The precedence chain is
//! followed level-for-level; the grammar outline is explicitly informative, so two
//! small gaps it leaves open are resolved here (and recorded in `DESIGN.md`): a `range`
//! level is inserted between relational and additive so `a..b` parses as a first-class
//! expression (not just inside `for`), and pair literals (`key => value`) are parsed as a
//! thin layer over atoms so they can appear anywhere an atom can, matching their listing
//! alongside identifiers and parenthesized expressions in the literal types.

use crate::ast::*;
use crate::error::Error;
use crate::lexer::{Keyword, Lexer, Token};
use crate::span::Span;

pub struct Parser<'a> {
    tokens: &'a [(Span, Token)],
    pos: usize,
    errors: Vec<Error>,
}

type PResult<T> = Result<T, Error>;

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [(Span, Token)]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parse a whole program: `stmt (';' stmt)*` to EOF, recovering from syntax errors by
    /// skipping to the next statement boundary so one bad statement doesn't hide the
    /// rest; error recovery itself is not specified, so this collects every error it
    /// can rather than stopping at the first.
    pub fn parse_module(mut self, filename: std::rc::Rc<str>) -> (Module, Vec<Error>) {
        let mut stmts = Vec::new();
        while !self.at_eof() {
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.recover();
                }
            }
            self.skip_semicolons();
        }
        (Module { filename, stmts }, self.errors)
    }

    fn recover(&mut self) {
        while !self.at_eof() {
            match self.peek() {
                Token::Semi => {
                    self.advance();
                    break;
                }
                Token::RBrace => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn skip_semicolons(&mut self) {
        while self.check(&Token::Semi) {
            self.advance();
        }
    }

    // --- token stream plumbing -------------------------------------------------

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].1
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].0.clone()
    }

    fn advance(&mut self) -> (Span, Token) {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, tok: &Token) -> bool {
        self.peek() == tok
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.check(tok) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token) -> PResult<Span> {
        if self.check(&tok) {
            Ok(self.advance().0)
        } else {
            Err(self.unexpected(&format!("{:?}", tok)))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::syntax(
            format!("expected {}, found {:?}", expected, self.peek()),
            self.peek_span(),
        )
    }

    fn expect_ident(&mut self) -> PResult<(String, Span)> {
        match self.peek().clone() {
            Token::Ident(name) => {
                let (span, _) = self.advance();
                Ok((name, span))
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    // --- statements --------------------------------------------------------------

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        let start = self.peek_span();
        match self.peek().clone() {
            Token::Keyword(Keyword::Let) => {
                self.advance();
                let (name, _) = self.expect_ident()?;
                self.expect(Token::Eq)?;
                let value = self.parse_expr()?;
                let span = start.merge(&value.span);
                Ok(Stmt::new(span, StmtKind::Let { name, value }))
            }
            Token::Keyword(Keyword::Import) => {
                self.advance();
                let (name, _) = self.expect_ident()?;
                let alias = if self.eat(&Token::Keyword(Keyword::As)) {
                    Some(self.expect_ident()?.0)
                } else {
                    None
                };
                self.expect(Token::Keyword(Keyword::From))?;
                let (from, from_span) = self.expect_ident()?;
                let span = start.merge(&from_span);
                Ok(Stmt::new(span, StmtKind::Import { name, alias, from }))
            }
            Token::Keyword(Keyword::Break) => {
                self.advance();
                let value = self.parse_optional_trailing_expr()?;
                let span = match &value {
                    Some(v) => start.merge(&v.span),
                    None => start,
                };
                Ok(Stmt::new(span, StmtKind::Break(value)))
            }
            Token::Keyword(Keyword::Continue) => {
                self.advance();
                Ok(Stmt::new(start, StmtKind::Continue))
            }
            Token::Keyword(Keyword::Return) => {
                self.advance();
                let value = self.parse_optional_trailing_expr()?;
                let span = match &value {
                    Some(v) => start.merge(&v.span),
                    None => start,
                };
                Ok(Stmt::new(span, StmtKind::Return(value)))
            }
            Token::Keyword(Keyword::Fn) if self.peek_is_named_fn() => {
                let lit = self.parse_fn_literal(true)?;
                let span = start.merge(&lit.body.span);
                Ok(Stmt::new(span, StmtKind::FnDef(lit)))
            }
            _ => {
                let expr = self.parse_expr()?;
                let span = expr.span.clone();
                Ok(Stmt::new(span, StmtKind::Expr(expr)))
            }
        }
    }

    /// `break`/`return` carry an optional expression; stop if we've hit a statement
    /// boundary instead of erroring.
    fn parse_optional_trailing_expr(&mut self) -> PResult<Option<Expr>> {
        match self.peek() {
            Token::Semi | Token::RBrace | Token::Eof => Ok(None),
            _ => Ok(Some(self.parse_expr()?)),
        }
    }

    fn peek_is_named_fn(&self) -> bool {
        matches!(
            self.tokens.get(self.pos + 1).map(|(_, t)| t),
            Some(Token::Ident(_))
        )
    }

    // --- expressions: precedence chain -------------------------------------

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(span, ExprKind::Binary(BinaryOp::Or, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_eq()?;
        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_eq()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(span, ExprKind::Binary(BinaryOp::And, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_eq(&mut self) -> PResult<Expr> {
        let mut left = self.parse_rel()?;
        loop {
            let op = match self.peek() {
                Token::EqEq => BinaryOp::Eq,
                Token::Ne => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_rel()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(span, ExprKind::Binary(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_rel(&mut self) -> PResult<Expr> {
        let mut left = self.parse_range()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinaryOp::Lt,
                Token::Le => BinaryOp::Le,
                Token::Gt => BinaryOp::Gt,
                Token::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_range()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(span, ExprKind::Binary(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    /// Not in the named precedence chain (which only covers the listed binary
    /// operators); inserted here so `a..b` is a first-class expression, not just `for`-loop
    /// syntax (see module doc comment and `DESIGN.md`).
    fn parse_range(&mut self) -> PResult<Expr> {
        let left = self.parse_add()?;
        if self.check(&Token::DotDot) {
            self.advance();
            let right = self.parse_add()?;
            let span = left.span.merge(&right.span);
            Ok(Expr::new(span, ExprKind::Range(Box::new(left), Box::new(right))))
        } else {
            Ok(left)
        }
    }

    fn parse_add(&mut self) -> PResult<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(span, ExprKind::Binary(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> PResult<Expr> {
        let mut left = self.parse_cast()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::SlashSlash => BinaryOp::IntDiv,
                Token::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_cast()?;
            let span = left.span.merge(&right.span);
            left = Expr::new(span, ExprKind::Binary(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_cast(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        while self.check(&Token::Keyword(Keyword::As)) {
            let (as_span, _) = self.advance();
            let target = self.parse_cast_target()?;
            let span = left.span.merge(&as_span);
            left = Expr::new(span, ExprKind::Cast(Box::new(left), target));
        }
        Ok(left)
    }

    fn parse_cast_target(&mut self) -> PResult<CastTarget> {
        match self.peek().clone() {
            Token::Keyword(Keyword::NumType) => {
                self.advance();
                Ok(CastTarget::Number)
            }
            Token::Keyword(Keyword::StrType) => {
                self.advance();
                Ok(CastTarget::String)
            }
            Token::Keyword(Keyword::BoolType) => {
                self.advance();
                Ok(CastTarget::Bool)
            }
            _ => Err(self.unexpected("a cast target (`num`, `str`, or `bool`)")),
        }
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.peek() {
            Token::Plus => Some(UnaryOp::Plus),
            Token::Minus => Some(UnaryOp::Neg),
            Token::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let (start, _) = self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(&operand.span);
            Ok(Expr::new(span, ExprKind::Unary(op, Box::new(operand))))
        } else {
            self.parse_pow()
        }
    }

    /// Right-associative: the exponent is parsed by re-entering `parse_unary`, which
    /// falls through to `parse_pow` again for a bare operand, giving `2 ** 3 ** 2` the
    /// right grouping without any special-casing.
    fn parse_pow(&mut self) -> PResult<Expr> {
        let left = self.parse_assign()?;
        if self.check(&Token::StarStar) {
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.merge(&right.span);
            Ok(Expr::new(span, ExprKind::Binary(BinaryOp::Pow, Box::new(left), Box::new(right))))
        } else {
            Ok(left)
        }
    }

    /// Assignment binds its left-hand side as tightly as a call/member chain
    /// (`assignment` sits just above `call/member chain` in the precedence list), but
    /// its right-hand side re-enters the full expression grammar from the top, so
    /// `a = b || c` and `a = b = c` parse as expected.
    fn parse_assign(&mut self) -> PResult<Expr> {
        let left = self.parse_call()?;
        let op = match self.peek() {
            Token::Eq => Some(AssignOp::Assign),
            Token::PlusEq => Some(AssignOp::AddAssign),
            Token::MinusEq => Some(AssignOp::SubAssign),
            Token::StarEq => Some(AssignOp::MulAssign),
            Token::SlashEq => Some(AssignOp::DivAssign),
            Token::SlashSlashEq => Some(AssignOp::IntDivAssign),
            Token::PercentEq => Some(AssignOp::RemAssign),
            Token::StarStarEq => Some(AssignOp::PowAssign),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let right = self.parse_expr()?;
            let span = left.span.merge(&right.span);
            Ok(Expr::new(span, ExprKind::Assign(Box::new(left), op, Box::new(right))))
        } else {
            Ok(left)
        }
    }

    fn parse_call(&mut self) -> PResult<Expr> {
        let mut left = self.parse_pair_or_atom()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let (name, name_span) = self.expect_ident()?;
                    let span = left.span.merge(&name_span);
                    left = Expr::new(span, ExprKind::Member(Box::new(left), name));
                }
                Token::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.check(&Token::RParen) {
                        args.push(self.parse_call_arg()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    let end = self.expect(Token::RParen)?;
                    let span = left.span.merge(&end);
                    left = Expr::new(span, ExprKind::Call(Box::new(left), args));
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let end = self.expect(Token::RBracket)?;
                    let span = left.span.merge(&end);
                    left = Expr::new(span, ExprKind::Index(Box::new(left), Box::new(index)));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    /// A call argument may be a bare expression or a `name => value` labeled argument
    /// (a "pair", used as a named argument to `exec`/`http`); `parse_pair_or_atom` already
    /// handles the pair form when it's a whole argument on its own.
    fn parse_call_arg(&mut self) -> PResult<Expr> {
        self.parse_expr()
    }

    /// `pair` sits alongside `identifier` and `parenthesized expression` as a
    /// literal atom, so it's parsed as a thin wrapper directly above `parse_atom`:
    /// `ident => expr` or `"string" => expr` (pair keys are restricted to `String`).
    fn parse_pair_or_atom(&mut self) -> PResult<Expr> {
        let base = self.parse_atom()?;
        if self.check(&Token::FatArrow) {
            let key = match &base.node {
                ExprKind::Ident(name) => Expr::new(base.span.clone(), ExprKind::Str(name.clone())),
                ExprKind::Str(_) => base.clone(),
                _ => {
                    return Err(Error::syntax(
                        "pair key must be an identifier or string literal",
                        base.span.clone(),
                    ))
                }
            };
            self.advance();
            let value = self.parse_expr()?;
            let span = base.span.merge(&value.span);
            Ok(Expr::new(span, ExprKind::Pair(Box::new(key), Box::new(value))))
        } else {
            Ok(base)
        }
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        let start = self.peek_span();
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::new(start, ExprKind::Number(n)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::new(start, ExprKind::Str(s)))
            }
            Token::Keyword(Keyword::True) | Token::Keyword(Keyword::On) => {
                self.advance();
                Ok(Expr::new(start, ExprKind::Bool(true)))
            }
            Token::Keyword(Keyword::False) | Token::Keyword(Keyword::Off) => {
                self.advance();
                Ok(Expr::new(start, ExprKind::Bool(false)))
            }
            Token::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::new(start, ExprKind::Null))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::new(start, ExprKind::Ident(name)))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let end = self.expect(Token::RParen)?;
                Ok(Expr::new(start.merge(&end), inner.node))
            }
            Token::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(&Token::RBracket) {
                    items.push(self.parse_expr()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                let end = self.expect(Token::RBracket)?;
                Ok(Expr::new(start.merge(&end), ExprKind::List(items)))
            }
            Token::LBrace if self.peek_is_object_literal() => self.parse_object_literal(start),
            Token::LBrace => {
                let block = self.parse_block()?;
                let span = block.span.clone();
                Ok(Expr::new(span, ExprKind::Block(block)))
            }
            Token::Keyword(Keyword::If) => {
                let if_expr = self.parse_if()?;
                let span = start.merge(&if_expr.then_branch.span);
                Ok(Expr::new(span, ExprKind::If(if_expr)))
            }
            Token::Keyword(Keyword::For) => self.parse_for(start),
            Token::Keyword(Keyword::While) => self.parse_while(start),
            Token::Keyword(Keyword::Loop) => self.parse_loop(start),
            Token::Keyword(Keyword::Try) => self.parse_try(start),
            Token::Keyword(Keyword::Fn) => {
                let lit = self.parse_fn_literal(false)?;
                let span = start.merge(&lit.body.span);
                Ok(Expr::new(span, ExprKind::Fn(lit)))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Disambiguates `{k: v; ...}` object literals from `{ stmt; ... }` blocks (the
    /// display format, `{k: v; k2: v2}`, is the only place the grammar outline implies
    /// this syntax exists — see `DESIGN.md`). Looked ahead by two tokens: an empty `{}`
    /// is a block, and anything else needs `ident|string :` right after the brace.
    fn peek_is_object_literal(&self) -> bool {
        let is_key = matches!(
            self.tokens.get(self.pos + 1).map(|(_, t)| t),
            Some(Token::Ident(_)) | Some(Token::Str(_))
        );
        is_key && matches!(self.tokens.get(self.pos + 2).map(|(_, t)| t), Some(Token::Colon))
    }

    fn parse_object_literal(&mut self, start: Span) -> PResult<Expr> {
        self.advance();
        let mut fields = Vec::new();
        while !self.check(&Token::RBrace) {
            let name = match self.peek().clone() {
                Token::Ident(s) => {
                    self.advance();
                    s
                }
                Token::Str(s) => {
                    self.advance();
                    s
                }
                _ => return Err(self.unexpected("an object field name")),
            };
            self.expect(Token::Colon)?;
            let value = self.parse_expr()?;
            fields.push((name, value));
            if !self.eat(&Token::Semi) && !self.eat(&Token::Comma) {
                break;
            }
        }
        let end = self.expect(Token::RBrace)?;
        Ok(Expr::new(start.merge(&end), ExprKind::Object(fields)))
    }

    fn parse_block(&mut self) -> PResult<Block> {
        let start = self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.at_eof() {
                return Err(Error::syntax("unterminated block", start));
            }
            stmts.push(self.parse_stmt()?);
            self.skip_semicolons();
        }
        let end = self.expect(Token::RBrace)?;
        Ok(Block {
            span: start.merge(&end),
            stmts,
        })
    }

    fn parse_if(&mut self) -> PResult<IfExpr> {
        self.expect(Token::Keyword(Keyword::If))?;
        let cond = self.parse_expr()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.eat(&Token::Keyword(Keyword::Else)) {
            if self.check(&Token::Keyword(Keyword::If)) {
                Some(ElseBranch::If(Box::new(self.parse_if()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };
        Ok(IfExpr {
            cond: Box::new(cond),
            then_branch,
            else_branch,
        })
    }

    fn parse_for(&mut self, start: Span) -> PResult<Expr> {
        self.advance();
        let (var, _) = self.expect_ident()?;
        self.expect(Token::Keyword(Keyword::In))?;
        let range_expr = self.parse_range()?;
        let (lower, upper) = match range_expr.node {
            ExprKind::Range(lower, upper) => (lower, upper),
            _ => {
                return Err(Error::syntax(
                    "expected a range expression `a..b` after `in`",
                    range_expr.span,
                ))
            }
        };
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(Expr::new(span, ExprKind::For { var, lower, upper, body }))
    }

    fn parse_while(&mut self, start: Span) -> PResult<Expr> {
        self.advance();
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(Expr::new(
            span,
            ExprKind::While {
                cond: Box::new(cond),
                body,
            },
        ))
    }

    fn parse_loop(&mut self, start: Span) -> PResult<Expr> {
        self.advance();
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(Expr::new(span, ExprKind::Loop { body }))
    }

    fn parse_try(&mut self, start: Span) -> PResult<Expr> {
        self.advance();
        let try_block = self.parse_block()?;
        self.expect(Token::Keyword(Keyword::Catch))?;
        let (err_name, _) = self.expect_ident()?;
        let catch_block = self.parse_block()?;
        let span = start.merge(&catch_block.span);
        Ok(Expr::new(
            span,
            ExprKind::Try {
                try_block,
                err_name,
                catch_block,
            },
        ))
    }

    fn parse_fn_literal(&mut self, named: bool) -> PResult<FunctionLit> {
        self.expect(Token::Keyword(Keyword::Fn))?;
        let name = if named {
            Some(self.expect_ident()?.0)
        } else if let Token::Ident(_) = self.peek() {
            Some(self.expect_ident()?.0)
        } else {
            None
        };
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        while !self.check(&Token::RParen) {
            let (p, span) = self.expect_ident()?;
            params.push(Spanned::new(span, p));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        Ok(FunctionLit { name, params, body })
    }
}

/// `parse(code, filename)`: lexes then parses, merging lexer and parser errors into
/// a single list (both are `Syntax`-kind by construction).
pub fn parse(code: &str, filename: &str) -> (Module, Vec<Error>) {
    let filename_rc: std::rc::Rc<str> = filename.into();
    let (tokens, mut errors) = Lexer::new(code, filename_rc.clone()).tokenize();
    let parser = Parser::new(&tokens);
    let (module, parse_errors) = parser.parse_module(filename_rc);
    errors.extend(parse_errors);
    (module, errors)
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_ok(src: &str) -> Module {
        let (module, errors) = parse(src, "<test>");
        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
        module
    }

    #[test]
    fn parses_let_and_arithmetic_precedence() {
        let module = parse_ok("let x = 1 + 2 * 3;");
        assert_eq!(module.stmts.len(), 1);
        match &module.stmts[0].node {
            StmtKind::Let { name, value } => {
                assert_eq!(name, "x");
                match &value.node {
                    ExprKind::Binary(BinaryOp::Add, l, r) => {
                        assert!(matches!(l.node, ExprKind::Number(n) if n == 1.0));
                        assert!(matches!(r.node, ExprKind::Binary(BinaryOp::Mul, ..)));
                    }
                    other => panic!("expected addition at the top, got {:?}", other),
                }
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn integer_division_parses_at_the_same_precedence_as_division() {
        let module = parse_ok("1 + 7 // 2;");
        match &module.stmts[0].node {
            StmtKind::Expr(e) => match &e.node {
                ExprKind::Binary(BinaryOp::Add, _, r) => {
                    assert!(matches!(r.node, ExprKind::Binary(BinaryOp::IntDiv, ..)));
                }
                other => panic!("expected addition at the top, got {:?}", other),
            },
            other => panic!("expected expr stmt, got {:?}", other),
        }
    }

    #[test]
    fn exponentiation_is_right_associative() {
        let module = parse_ok("2 ** 3 ** 2;");
        match &module.stmts[0].node {
            StmtKind::Expr(e) => match &e.node {
                ExprKind::Binary(BinaryOp::Pow, _, r) => {
                    assert!(matches!(r.node, ExprKind::Binary(BinaryOp::Pow, ..)));
                }
                other => panic!("expected pow, got {:?}", other),
            },
            other => panic!("expected expr stmt, got {:?}", other),
        }
    }

    #[test]
    fn parses_for_loop_range() {
        let module = parse_ok("for i in 0..3 { print(i); }");
        match &module.stmts[0].node {
            StmtKind::Expr(e) => match &e.node {
                ExprKind::For { var, lower, upper, .. } => {
                    assert_eq!(var, "i");
                    assert!(matches!(lower.node, ExprKind::Number(n) if n == 0.0));
                    assert!(matches!(upper.node, ExprKind::Number(n) if n == 3.0));
                }
                other => panic!("expected for, got {:?}", other),
            },
            other => panic!("expected expr stmt, got {:?}", other),
        }
    }

    #[test]
    fn parses_named_argument_pair() {
        let module = parse_ok(r#"exec("id", timeout => 5);"#);
        match &module.stmts[0].node {
            StmtKind::Expr(e) => match &e.node {
                ExprKind::Call(_, args) => {
                    assert_eq!(args.len(), 2);
                    assert!(matches!(args[1].node, ExprKind::Pair(..)));
                }
                other => panic!("expected call, got {:?}", other),
            },
            other => panic!("expected expr stmt, got {:?}", other),
        }
    }

    #[test]
    fn parses_object_literal_distinct_from_a_block() {
        let module = parse_ok(r#"let o = {a: 1; b: "x"};"#);
        match &module.stmts[0].node {
            StmtKind::Let { value, .. } => match &value.node {
                ExprKind::Object(fields) => {
                    assert_eq!(fields.len(), 2);
                    assert_eq!(fields[0].0, "a");
                    assert_eq!(fields[1].0, "b");
                }
                other => panic!("expected an object literal, got {:?}", other),
            },
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn empty_braces_parse_as_an_empty_block() {
        let module = parse_ok("{}");
        match &module.stmts[0].node {
            StmtKind::Expr(e) => assert!(matches!(e.node, ExprKind::Block(_))),
            other => panic!("expected expr stmt, got {:?}", other),
        }
    }

    #[test]
    fn recovers_after_a_syntax_error() {
        let (module, errors) = parse("let = ; let y = 1;", "<test>");
        assert!(!errors.is_empty());
        assert!(module.stmts.iter().any(|s| matches!(
            &s.node,
            StmtKind::Let { name, .. } if name == "y"
        )));
    }
}
