use std::fmt;
use std::mem;

use crate::Error;
use crate::ast::{
    ArithOp, Block, Branch, ClassDecl, ElseIf, Expr, ExprKind, FuncCall, FunctionDecl,
    GetterDecl, HashMapEntry, Ident, Import, Iterate, LogicOp, MemberAccess, Param, Program,
    PropertyDecl, Receiver, Stmt, StmtKind, VarGroup,
};
use crate::lexer::{LexError, Lexer};
use crate::lexicon::{Keyword, Lexicon};
use crate::token::{Span, Token, TokenKind};

/// Deepest allowed nesting of blocks, brackets, calls and chained
/// assignments.
pub const MAX_NESTING: usize = 32;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Token that does not fit the grammar; `None` means end of input.
    InvalidSyntax { found: Option<String> },
    /// Line indented deeper or shallower than the grammar allows.
    UnexpectedIndent,
    /// Blocks or brackets nested deeper than [`MAX_NESTING`].
    NestingTooDeep,
}

impl ParseErrorKind {
    /// Error-class code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidSyntax { .. } => 0x2201,
            Self::UnexpectedIndent => 0x2202,
            Self::NestingTooDeep => 0x2203,
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSyntax { found: None } => {
                write!(f, "invalid syntax, unexpected end of input")
            }
            Self::InvalidSyntax { found: Some(t) } => {
                write!(f, "invalid syntax near '{t}'")
            }
            Self::UnexpectedIndent => write!(f, "unexpected indentation"),
            Self::NestingTooDeep => {
                write!(f, "nesting deeper than {MAX_NESTING} levels")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Code-point offset of the offending token.
    pub offset: usize,
}

type PResult<T> = Result<T, Error>;

/// Parse decoded source into a [`Program`] using the standard lexicon.
///
/// # Errors
///
/// Returns the first lexical, indentation, or syntax error met.
pub fn parse(source: &[char]) -> Result<Program, Error> {
    let lexicon = Lexicon::standard();
    parse_with(source, &lexicon)
}

/// Parse decoded source with a caller-supplied lexicon.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse_with(source: &[char], lexicon: &Lexicon) -> Result<Program, Error> {
    Parser::new(source, lexicon).parse()
}

/// Recursive-descent parser over a two-token window.
///
/// `current` is the next token to consume and `peek` the one after it.
/// `prev` remembers the kind and last line of the token consumed before
/// `current`, which is all the virtual statement boundary needs.
struct Parser<'a> {
    lexer: Lexer<'a>,
    prev: Option<(TokenKind, usize)>,
    current: Token,
    peek: Token,
    /// Open blocks, brackets and calls around the current token.
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a [char], lexicon: &'a Lexicon) -> Self {
        Self {
            lexer: Lexer::new(source, lexicon),
            prev: None,
            current: placeholder(),
            peek: placeholder(),
            nesting: 0,
        }
    }

    fn parse(mut self) -> PResult<Program> {
        self.current = self.lex()?;
        self.peek = self.lex()?;

        let stmts = self.statements(0)?;
        if !self.current.is_eof() {
            return Err(self.unexpected());
        }

        tracing::debug!(
            stmts = stmts.len(),
            lines = self.lexer.line_index().len(),
            "parsed program"
        );
        Ok(Program { stmts })
    }

    // -----------------------------------------------------------
    // Token window.
    // -----------------------------------------------------------

    /// Next non-comment token from the lexer.
    fn lex(&mut self) -> Result<Token, LexError> {
        loop {
            let token = self.lexer.next_token()?;
            if token.kind != TokenKind::Comment {
                return Ok(token);
            }
        }
    }

    /// Consume and return the current token.
    fn advance(&mut self) -> PResult<Token> {
        let next = self.lex()?;
        let peek = mem::replace(&mut self.peek, next);
        let token = mem::replace(&mut self.current, peek);
        self.prev = Some((token.kind, token.span.end_line));
        Ok(token)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    const fn at_keyword(&self, keyword: Keyword) -> bool {
        self.current.kind.is_keyword(keyword)
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(kind) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> PResult<Token> {
        if self.at_keyword(keyword) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Ident {
            name: token.text,
            line: token.span.line,
        })
    }

    fn unexpected(&self) -> Error {
        let found = (!self.current.is_eof()).then(|| self.current.text.clone());
        ParseError {
            kind: ParseErrorKind::InvalidSyntax { found },
            offset: self.current.span.start,
        }
        .into()
    }

    /// Run `f` one nesting level deeper, failing at the current token once
    /// [`MAX_NESTING`] is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError {
                kind: ParseErrorKind::NestingTooDeep,
                offset: self.current.span.start,
            }
            .into());
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    fn unexpected_indent(&self) -> Error {
        ParseError {
            kind: ParseErrorKind::UnexpectedIndent,
            offset: self.current.span.start,
        }
        .into()
    }

    // -----------------------------------------------------------
    // Lines, blocks and statement boundaries.
    // -----------------------------------------------------------

    /// The current token is the first on its line.
    fn starts_line(&self) -> bool {
        self.prev
            .is_none_or(|(_, line)| self.current.span.line > line)
    }

    /// A line break between the previous and current token ends the
    /// statement, unless the previous token expects more on the next line
    /// or the current one closes a bracket.
    fn at_boundary(&self) -> bool {
        self.prev.is_some_and(|(kind, line)| {
            self.current.span.line > line
                && !kind.continues_line()
                && !self.current.kind.closes_group()
        })
    }

    fn line_depth(&self) -> usize {
        self.lexer.line_index().depth(self.current.span.line)
    }

    fn expect_end(&mut self) -> PResult<()> {
        if self.at(TokenKind::Semicolon) {
            self.advance()?;
            return Ok(());
        }
        if self.current.is_eof() || self.at_boundary() {
            return Ok(());
        }
        Err(self.unexpected())
    }

    /// Check that a block starts on the next line, one level deeper than
    /// `depth`, and return the block's depth.
    fn enter_block(&self, depth: usize) -> PResult<usize> {
        if self.current.is_eof() || !self.starts_line() {
            return Err(self.unexpected());
        }
        if self.line_depth() != depth + 1 {
            return Err(self.unexpected_indent());
        }
        Ok(depth + 1)
    }

    fn block(&mut self, depth: usize) -> PResult<Block> {
        let inner = self.enter_block(depth)?;
        Ok(Block {
            stmts: self.statements(inner)?,
        })
    }

    /// Parse items while lines stay at `depth`.
    ///
    /// Every block below the top level counts as one nesting level.
    fn block_items<T>(
        &mut self,
        depth: usize,
        item: impl FnMut(&mut Self) -> PResult<T>,
    ) -> PResult<Vec<T>> {
        if depth == 0 {
            self.block_lines(depth, item)
        } else {
            self.nested(|p| p.block_lines(depth, item))
        }
    }

    fn block_lines<T>(
        &mut self,
        depth: usize,
        mut item: impl FnMut(&mut Self) -> PResult<T>,
    ) -> PResult<Vec<T>> {
        let mut items = Vec::new();
        while !self.current.is_eof() {
            if self.starts_line() {
                let line_depth = self.line_depth();
                if line_depth < depth {
                    break;
                }
                if line_depth > depth {
                    return Err(self.unexpected_indent());
                }
            }
            items.push(item(self)?);
        }
        Ok(items)
    }

    fn statements(&mut self, depth: usize) -> PResult<Vec<Stmt>> {
        self.block_items(depth, |p| p.statement(depth))
    }

    // -----------------------------------------------------------
    // Statements.
    // -----------------------------------------------------------

    fn statement(&mut self, depth: usize) -> PResult<Stmt> {
        let line = self.current.span.line;
        let kind = match self.current.kind {
            TokenKind::Semicolon => {
                self.advance()?;
                StmtKind::Empty
            }
            TokenKind::Keyword(Keyword::Declare) => self.var_declare(depth)?,
            TokenKind::Keyword(Keyword::Cond) => StmtKind::Branch(self.branch(depth)?),
            TokenKind::Keyword(Keyword::WhileLoop) => {
                self.advance()?;
                let cond = self.expression()?;
                self.expect(TokenKind::Colon)?;
                let body = self.block(depth)?;
                StmtKind::WhileLoop { cond, body }
            }
            TokenKind::Keyword(Keyword::VarOne | Keyword::Iterate) => {
                StmtKind::Iterate(self.iterate(depth)?)
            }
            TokenKind::Keyword(Keyword::FuncDecl) => {
                StmtKind::FunctionDeclare(self.function(depth)?)
            }
            TokenKind::Keyword(Keyword::ClassDefine) => {
                StmtKind::ClassDeclare(self.class(depth)?)
            }
            TokenKind::Keyword(Keyword::Return) => self.return_stmt()?,
            TokenKind::Keyword(Keyword::Import) => StmtKind::Import(self.import()?),
            TokenKind::Keyword(Keyword::Break) => {
                self.advance()?;
                self.expect_end()?;
                StmtKind::Break
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.advance()?;
                self.expect_end()?;
                StmtKind::Continue
            }
            _ => {
                let expr = self.expression()?;
                self.expect_end()?;
                StmtKind::Expression(expr)
            }
        };
        Ok(Stmt { kind, line })
    }

    fn var_declare(&mut self, depth: usize) -> PResult<StmtKind> {
        self.expect_keyword(Keyword::Declare)?;

        if self.at(TokenKind::Colon) {
            self.advance()?;
            let inner = self.enter_block(depth)?;
            let groups = self.block_items(inner, |p| {
                let group = p.var_group()?;
                p.expect_end()?;
                Ok(group)
            })?;
            return Ok(StmtKind::VarDeclare(groups));
        }

        let group = self.var_group()?;
        self.expect_end()?;
        Ok(StmtKind::VarDeclare(vec![group]))
    }

    fn var_group(&mut self) -> PResult<VarGroup> {
        let vars = self.ident_list()?;
        let line = self.current.span.line;
        let (constant, value) = match self.current.kind {
            TokenKind::Keyword(Keyword::LogicYes) => {
                self.advance()?;
                (false, self.expression()?)
            }
            TokenKind::Keyword(Keyword::AssignConst) => {
                self.advance()?;
                (true, self.expression()?)
            }
            TokenKind::Keyword(Keyword::ObjNew) => {
                self.advance()?;
                let class = self.expect_ident()?;
                let params = if self.at(TokenKind::Colon) {
                    self.advance()?;
                    self.expr_list(TokenKind::Comma)?
                } else {
                    Vec::new()
                };
                let value = Expr {
                    kind: ExprKind::ObjNew { class, params },
                    line,
                };
                (false, value)
            }
            _ => return Err(self.unexpected()),
        };
        Ok(VarGroup {
            vars,
            constant,
            value,
        })
    }

    fn branch(&mut self, depth: usize) -> PResult<Branch> {
        self.expect_keyword(Keyword::Cond)?;
        let cond = self.expression()?;
        self.expect(TokenKind::Colon)?;
        let body = self.block(depth)?;

        let mut else_ifs = Vec::new();
        let mut else_body = None;
        // Later arms must sit at the same depth as the `如果` line.
        while !self.current.is_eof() && self.starts_line() && self.line_depth() == depth {
            if self.at_keyword(Keyword::CondElse) {
                let line = self.advance()?.span.line;
                let cond = self.expression()?;
                self.expect(TokenKind::Colon)?;
                let body = self.block(depth)?;
                else_ifs.push(ElseIf { cond, body, line });
            } else if self.at_keyword(Keyword::CondOther) {
                self.advance()?;
                self.expect(TokenKind::Colon)?;
                else_body = Some(self.block(depth)?);
                break;
            } else {
                break;
            }
        }

        Ok(Branch {
            cond,
            body,
            else_ifs,
            else_body,
        })
    }

    fn iterate(&mut self, depth: usize) -> PResult<Iterate> {
        let (key, value) = if self.at_keyword(Keyword::VarOne) {
            self.advance()?;
            let mut vars = self.ident_list()?;
            match vars.len() {
                1 => (None, vars.pop()),
                2 => {
                    let value = vars.pop();
                    (vars.pop(), value)
                }
                _ => return Err(self.unexpected()),
            }
        } else {
            (None, None)
        };

        self.expect_keyword(Keyword::Iterate)?;
        let target = self.expression()?;
        self.expect(TokenKind::Colon)?;
        let body = self.block(depth)?;

        Ok(Iterate {
            target,
            key,
            value,
            body,
        })
    }

    /// `如何 name？` block. A leading `已知` line declares the parameters.
    fn function(&mut self, depth: usize) -> PResult<FunctionDecl> {
        let line = self.expect_keyword(Keyword::FuncDecl)?.span.line;
        let name = self.expect_ident()?;
        self.expect(TokenKind::QuestionMark)?;

        let inner = self.enter_block(depth)?;
        let params = if self.at_keyword(Keyword::ParamClaim) {
            self.advance()?;
            let params = self.param_list()?;
            self.expect_end()?;
            params
        } else {
            Vec::new()
        };
        let stmts = self.statements(inner)?;

        Ok(FunctionDecl {
            name,
            params,
            body: Block { stmts },
            line,
        })
    }

    fn class(&mut self, depth: usize) -> PResult<ClassDecl> {
        self.expect_keyword(Keyword::ClassDefine)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;

        let mut decl = ClassDecl {
            name,
            properties: Vec::new(),
            constructor: Vec::new(),
            methods: Vec::new(),
            getters: Vec::new(),
        };
        let inner = self.enter_block(depth)?;
        self.block_items(inner, |p| p.class_line(inner, &mut decl))?;
        Ok(decl)
    }

    fn class_line(&mut self, depth: usize, decl: &mut ClassDecl) -> PResult<()> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::This) => {
                let line = self.advance()?.span.line;
                let name = self.expect_ident()?;
                self.expect_keyword(Keyword::LogicYes)?;
                let init = self.expression()?;
                self.expect_end()?;
                decl.properties.push(PropertyDecl { name, init, line });
            }
            TokenKind::Keyword(Keyword::Constructor) => {
                self.advance()?;
                let params = self.param_list()?;
                self.expect_end()?;
                decl.constructor.extend(params);
            }
            TokenKind::Keyword(Keyword::FuncDecl) => {
                decl.methods.push(self.function(depth)?);
            }
            TokenKind::Keyword(Keyword::Getter) => {
                let line = self.advance()?.span.line;
                let name = self.expect_ident()?;
                self.expect(TokenKind::QuestionMark)?;
                let body = self.block(depth)?;
                decl.getters.push(GetterDecl { name, body, line });
            }
            _ => return Err(self.unexpected()),
        }
        Ok(())
    }

    fn return_stmt(&mut self) -> PResult<StmtKind> {
        self.expect_keyword(Keyword::Return)?;
        let value = if self.at(TokenKind::Semicolon) || self.current.is_eof() || self.at_boundary()
        {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_end()?;
        Ok(StmtKind::Return(value))
    }

    fn import(&mut self) -> PResult<Import> {
        self.expect_keyword(Keyword::Import)?;
        let module = self.expect(TokenKind::String)?.text;
        let items = if self.at(TokenKind::Colon) {
            self.advance()?;
            self.ident_list()?
        } else {
            Vec::new()
        };
        self.expect_end()?;
        Ok(Import { module, items })
    }

    /// `A、B、C`
    fn ident_list(&mut self) -> PResult<Vec<Ident>> {
        let mut idents = vec![self.expect_ident()?];
        while self.at(TokenKind::PauseComma) {
            self.advance()?;
            idents.push(self.expect_ident()?);
        }
        Ok(idents)
    }

    /// `A、&B`
    fn param_list(&mut self) -> PResult<Vec<Param>> {
        let mut params = vec![self.param()?];
        while self.at(TokenKind::PauseComma) {
            self.advance()?;
            params.push(self.param()?);
        }
        Ok(params)
    }

    fn param(&mut self) -> PResult<Param> {
        let by_ref = self.at(TokenKind::RefMark);
        if by_ref {
            self.advance()?;
        }
        Ok(Param {
            name: self.expect_ident()?,
            by_ref,
        })
    }

    // -----------------------------------------------------------
    // Expressions, lowest precedence first.
    // -----------------------------------------------------------

    fn expression(&mut self) -> PResult<Expr> {
        self.logic_or(true)
    }

    fn expr_list(&mut self, separator: TokenKind) -> PResult<Vec<Expr>> {
        let mut exprs = vec![self.expression()?];
        while self.at(separator) {
            self.advance()?;
            exprs.push(self.expression()?);
        }
        Ok(exprs)
    }

    /// `assign` is false where `=` belongs to an enclosing construct, as in
    /// hashmap keys.
    fn logic_or(&mut self, assign: bool) -> PResult<Expr> {
        let mut left = self.logic_and(assign)?;
        while self.at_keyword(Keyword::Or) && !self.at_boundary() {
            self.advance()?;
            let right = self.logic_and(assign)?;
            left = logic(LogicOp::Or, left, right);
        }
        Ok(left)
    }

    fn logic_and(&mut self, assign: bool) -> PResult<Expr> {
        let mut left = self.comparison(assign)?;
        while self.at_keyword(Keyword::And) && !self.at_boundary() {
            self.advance()?;
            let right = self.comparison(assign)?;
            left = logic(LogicOp::And, left, right);
        }
        Ok(left)
    }

    fn comparison(&mut self, assign: bool) -> PResult<Expr> {
        let mut left = self.assignment(assign)?;
        while let Some(op) = self.comparison_op() {
            if self.at_boundary() {
                break;
            }
            self.advance()?;
            let right = self.assignment(assign)?;
            left = logic(op, left, right);
        }
        Ok(left)
    }

    const fn comparison_op(&self) -> Option<LogicOp> {
        let op = match self.current.kind {
            TokenKind::Equal | TokenKind::Keyword(Keyword::Equal) => LogicOp::Equal,
            TokenKind::NotEqual | TokenKind::Keyword(Keyword::NotEqual) => LogicOp::NotEqual,
            TokenKind::Less | TokenKind::Keyword(Keyword::Less) => LogicOp::Less,
            TokenKind::LessEqual | TokenKind::Keyword(Keyword::LessEqual) => LogicOp::LessEqual,
            TokenKind::Greater | TokenKind::Keyword(Keyword::Greater) => LogicOp::Greater,
            TokenKind::GreaterEqual | TokenKind::Keyword(Keyword::GreaterEqual) => {
                LogicOp::GreaterEqual
            }
            _ => return None,
        };
        Some(op)
    }

    fn assignment(&mut self, assign: bool) -> PResult<Expr> {
        let target = self.additive()?;
        if !assign || !self.at(TokenKind::Assign) || self.at_boundary() {
            return Ok(target);
        }
        if !target.is_assignable() {
            return Err(self.unexpected());
        }
        self.advance()?;
        let by_ref = self.at(TokenKind::RefMark);
        if by_ref {
            self.advance()?;
        }
        let value = self.nested(|p| p.assignment(true))?;
        Ok(Expr {
            line: target.line,
            kind: ExprKind::VarAssign {
                target: Box::new(target),
                value: Box::new(value),
                by_ref,
            },
        })
    }

    fn additive(&mut self) -> PResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            if self.at_boundary() {
                break;
            }
            self.advance()?;
            let right = self.multiplicative()?;
            left = arith(op, left, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.member()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                _ => break,
            };
            if self.at_boundary() {
                break;
            }
            self.advance()?;
            let right = self.member()?;
            left = arith(op, left, right);
        }
        Ok(left)
    }

    /// Postfix `之` property/method and `#` index access.
    fn member(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        while !self.at_boundary() {
            let line = expr.line;
            if self.at_keyword(Keyword::Dot) {
                self.advance()?;
                let root = Receiver::Expr(Box::new(expr));
                let kind = if self.at(TokenKind::LeftParen) {
                    ExprKind::MemberMethod {
                        root,
                        chain: self.call_chain()?,
                    }
                } else {
                    ExprKind::Member {
                        root,
                        access: MemberAccess::Property(self.expect_ident()?),
                    }
                };
                expr = Expr { kind, line };
            } else if self.at(TokenKind::Hash) {
                self.advance()?;
                let index = match self.current.kind {
                    TokenKind::Number | TokenKind::String => self.primary()?,
                    TokenKind::LeftBrace => self.group()?,
                    _ => return Err(self.unexpected()),
                };
                expr = Expr {
                    kind: ExprKind::Member {
                        root: Receiver::Expr(Box::new(expr)),
                        access: MemberAccess::Index(Box::new(index)),
                    },
                    line,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let line = self.current.span.line;
        let kind = match self.current.kind {
            TokenKind::Number => ExprKind::Number(self.advance()?.text),
            TokenKind::String => ExprKind::String(self.advance()?.text),
            TokenKind::Identifier => ExprKind::Identifier(self.advance()?.text),
            TokenKind::LeftBrace => return self.group(),
            TokenKind::LeftBracket => return self.array(),
            TokenKind::LeftParen => ExprKind::FuncCall(self.call()?),
            TokenKind::Keyword(Keyword::This) => {
                self.advance()?;
                if self.at(TokenKind::LeftParen) {
                    ExprKind::MemberMethod {
                        root: Receiver::This,
                        chain: self.call_chain()?,
                    }
                } else {
                    ExprKind::Member {
                        root: Receiver::This,
                        access: MemberAccess::Property(self.expect_ident()?),
                    }
                }
            }
            _ => return Err(self.unexpected()),
        };
        Ok(Expr { kind, line })
    }

    /// `{ expr }`
    fn group(&mut self) -> PResult<Expr> {
        self.nested(|p| {
            p.expect(TokenKind::LeftBrace)?;
            let expr = p.expression()?;
            p.expect(TokenKind::RightBrace)?;
            Ok(expr)
        })
    }

    /// Array or hashmap literal. The token after the first element decides
    /// which: `=` makes it a hashmap for good.
    fn array(&mut self) -> PResult<Expr> {
        self.nested(Self::array_body)
    }

    fn array_body(&mut self) -> PResult<Expr> {
        let line = self.expect(TokenKind::LeftBracket)?.span.line;

        if self.at(TokenKind::RightBracket) {
            self.advance()?;
            return Ok(Expr {
                kind: ExprKind::Array(Vec::new()),
                line,
            });
        }
        if self.at(TokenKind::Assign) && self.peek.kind == TokenKind::RightBracket {
            self.advance()?;
            self.advance()?;
            return Ok(Expr {
                kind: ExprKind::HashMap(Vec::new()),
                line,
            });
        }

        let first = self.logic_or(false)?;
        let kind = if self.at(TokenKind::Assign) {
            self.advance()?;
            let value = self.expression()?;
            let mut entries = vec![HashMapEntry { key: first, value }];
            while self.at(TokenKind::PauseComma) {
                self.advance()?;
                let key = self.logic_or(false)?;
                self.expect(TokenKind::Assign)?;
                let value = self.expression()?;
                entries.push(HashMapEntry { key, value });
            }
            ExprKind::HashMap(entries)
        } else {
            let mut items = vec![first];
            while self.at(TokenKind::PauseComma) {
                self.advance()?;
                items.push(self.logic_or(false)?);
            }
            ExprKind::Array(items)
        };

        self.expect(TokenKind::RightBracket)?;
        Ok(Expr { kind, line })
    }

    /// `（f：1）、（g）`: a call, then more calls while `、` is followed
    /// directly by `（`.
    fn call_chain(&mut self) -> PResult<Vec<FuncCall>> {
        let mut chain = vec![self.call()?];
        while self.at(TokenKind::PauseComma) && self.peek.kind == TokenKind::LeftParen {
            self.advance()?;
            chain.push(self.call()?);
        }
        Ok(chain)
    }

    /// `（name：a，b）` with an optional `得到 R`.
    fn call(&mut self) -> PResult<FuncCall> {
        self.nested(Self::call_body)
    }

    fn call_body(&mut self) -> PResult<FuncCall> {
        self.expect(TokenKind::LeftParen)?;
        let name = self.expect_ident()?;
        let params = if self.at(TokenKind::Colon) {
            self.advance()?;
            self.expr_list(TokenKind::Comma)?
        } else {
            Vec::new()
        };
        self.expect(TokenKind::RightParen)?;

        let yield_to = if self.at_keyword(Keyword::Yield) && !self.at_boundary() {
            self.advance()?;
            Some(self.expect_ident()?)
        } else {
            None
        };

        Ok(FuncCall {
            name,
            params,
            yield_to,
        })
    }
}

const fn placeholder() -> Token {
    Token {
        kind: TokenKind::Eof,
        text: String::new(),
        span: Span {
            start: 0,
            end: 0,
            line: 1,
            end_line: 1,
        },
    }
}

fn logic(op: LogicOp, left: Expr, right: Expr) -> Expr {
    Expr {
        line: left.line,
        kind: ExprKind::Logic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

fn arith(op: ArithOp, left: Expr, right: Expr) -> Expr {
    Expr {
        line: left.line,
        kind: ExprKind::Arith {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> Program {
        let chars: Vec<char> = input.chars().collect();
        parse(&chars).unwrap()
    }

    fn parse_err(input: &str) -> ParseError {
        let chars: Vec<char> = input.chars().collect();
        match parse(&chars) {
            Err(Error::Parse(e)) => e,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    fn only_expr(input: &str) -> Expr {
        let mut program = parse_ok(input);
        assert_eq!(program.stmts.len(), 1);
        match program.stmts.remove(0).kind {
            StmtKind::Expression(e) => e,
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn empty_input() {
        assert!(parse_ok("").stmts.is_empty());
        assert!(parse_ok("\n\n   \n").stmts.is_empty());
    }

    #[test]
    fn comments_are_skipped() {
        let program = parse_ok("注：开头\n令A为1 //结尾\n");
        assert_eq!(program.stmts.len(), 1);
    }

    #[test]
    fn statement_lines() {
        let program = parse_ok("令A为1\n\n令B为2");
        assert_eq!(program.stmts[0].line, 1);
        assert_eq!(program.stmts[1].line, 3);
    }

    #[test]
    fn semicolon_separates_statements() {
        let program = parse_ok("令A为1；令B为2；");
        assert_eq!(program.stmts.len(), 2);
    }

    #[test]
    fn lone_semicolon_is_empty_statement() {
        let program = parse_ok("；");
        assert_eq!(program.stmts[0].kind, StmtKind::Empty);
    }

    #[test]
    fn two_statements_on_one_line_need_separator() {
        let err = parse_err("令A为1 令B为2");
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidSyntax {
                found: Some("令".to_string())
            }
        );
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn multi_variable_group() {
        let program = parse_ok("令A、B恒为3");
        let StmtKind::VarDeclare(groups) = &program.stmts[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(groups[0].vars.len(), 2);
        assert!(groups[0].constant);
    }

    #[test]
    fn block_declaration() {
        let program = parse_ok("令：\n    A为1\n    B成为人：「甲」，2\n令C为3");
        assert_eq!(program.stmts.len(), 2);
        let StmtKind::VarDeclare(groups) = &program.stmts[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(groups.len(), 2);
        let ExprKind::ObjNew { class, params } = &groups[1].value.kind else {
            panic!("expected object construction");
        };
        assert_eq!(class.name, "人");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn missing_declaration_form() {
        let err = parse_err("令A");
        assert_eq!(err.kind, ParseErrorKind::InvalidSyntax { found: None });
    }

    #[test]
    fn arithmetic_precedence() {
        let expr = only_expr("1 + 2 * 3");
        let ExprKind::Arith { op, right, .. } = expr.kind else {
            panic!("expected arithmetic");
        };
        assert_eq!(op, ArithOp::Add);
        assert!(matches!(
            right.kind,
            ExprKind::Arith {
                op: ArithOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn logic_precedence() {
        let expr = only_expr("A大于1且B小于2或C");
        let ExprKind::Logic { op, left, .. } = expr.kind else {
            panic!("expected logic");
        };
        assert_eq!(op, LogicOp::Or);
        assert!(matches!(
            left.kind,
            ExprKind::Logic {
                op: LogicOp::And,
                ..
            }
        ));
    }

    #[test]
    fn ascii_comparison_operators() {
        for (input, expected) in [
            ("A == B", LogicOp::Equal),
            ("A != B", LogicOp::NotEqual),
            ("A < B", LogicOp::Less),
            ("A <= B", LogicOp::LessEqual),
            ("A > B", LogicOp::Greater),
            ("A >= B", LogicOp::GreaterEqual),
            ("A不大于B", LogicOp::LessEqual),
            ("A不小于B", LogicOp::GreaterEqual),
            ("A不等于B", LogicOp::NotEqual),
        ] {
            let expr = only_expr(input);
            assert!(
                matches!(expr.kind, ExprKind::Logic { op, .. } if op == expected),
                "{input}"
            );
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = only_expr("A = B = 1");
        let ExprKind::VarAssign { value, .. } = expr.kind else {
            panic!("expected assignment");
        };
        assert!(matches!(value.kind, ExprKind::VarAssign { .. }));
    }

    #[test]
    fn assignment_needs_assignable_target() {
        let err = parse_err("1 = 2");
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidSyntax {
                found: Some("=".to_string())
            }
        );
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn member_chain() {
        let expr = only_expr("A之B#1#{C}");
        let ExprKind::Member { root, access } = expr.kind else {
            panic!("expected member");
        };
        assert!(matches!(access, MemberAccess::Index(_)));
        let Receiver::Expr(inner) = root else {
            panic!("expected expression root");
        };
        assert!(matches!(
            inner.kind,
            ExprKind::Member {
                access: MemberAccess::Index(_),
                ..
            }
        ));
    }

    #[test]
    fn method_chain() {
        let expr = only_expr("A之（加：1）、（乘：2）得到R");
        let ExprKind::MemberMethod { chain, .. } = expr.kind else {
            panic!("expected method chain");
        };
        assert_eq!(chain.len(), 2);
        assert!(chain[0].yield_to.is_none());
        assert_eq!(chain[1].yield_to.as_ref().map(|i| i.name.as_str()), Some("R"));
    }

    #[test]
    fn multiline_call_arguments() {
        let program = parse_ok("（显示：1，\n2，\n3\n）\n令A为1");
        assert_eq!(program.stmts.len(), 2);
        let StmtKind::Expression(Expr {
            kind: ExprKind::FuncCall(call),
            ..
        }) = &program.stmts[0].kind
        else {
            panic!("expected call");
        };
        assert_eq!(call.params.len(), 3);
    }

    #[test]
    fn multiline_array() {
        let program = parse_ok("令A为【\n    1、\n    2\n】");
        assert_eq!(program.stmts.len(), 1);
    }

    #[test]
    fn line_break_ends_expression() {
        let program = parse_ok("A\n-1");
        assert_eq!(program.stmts.len(), 2);
        assert!(matches!(parse_err("A\n+ B").kind, ParseErrorKind::InvalidSyntax { .. }));
    }

    #[test]
    fn empty_literals() {
        assert_eq!(only_expr("【】").kind, ExprKind::Array(Vec::new()));
        assert_eq!(only_expr("【=】").kind, ExprKind::HashMap(Vec::new()));
    }

    #[test]
    fn hashmap_keeps_mode() {
        let err = parse_err("【A=1、2】");
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidSyntax {
                found: Some("】".to_string())
            }
        );
    }

    #[test]
    fn grouping_braces() {
        let expr = only_expr("{1 + 2} * 3");
        assert!(matches!(
            expr.kind,
            ExprKind::Arith {
                op: ArithOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn else_if_chain() {
        let program = parse_ok("如果A：\n    B\n再如C：\n    D\n再如E：\n    F\n否则：\n    G");
        let StmtKind::Branch(branch) = &program.stmts[0].kind else {
            panic!("expected branch");
        };
        assert_eq!(branch.else_ifs.len(), 2);
        assert_eq!(branch.else_ifs[1].line, 5);
        assert!(branch.else_body.is_some());
    }

    #[test]
    fn nested_branch_else_binds_by_depth() {
        let program = parse_ok("如果A：\n    如果B：\n        C\n否则：\n    D");
        let StmtKind::Branch(outer) = &program.stmts[0].kind else {
            panic!("expected branch");
        };
        assert!(outer.else_body.is_some());
        let StmtKind::Branch(inner) = &outer.body.stmts[0].kind else {
            panic!("expected inner branch");
        };
        assert!(inner.else_body.is_none());
    }

    #[test]
    fn block_must_start_on_next_line() {
        let err = parse_err("每当A：B");
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidSyntax {
                found: Some("B".to_string())
            }
        );
    }

    #[test]
    fn missing_block_at_end() {
        let err = parse_err("每当A：");
        assert_eq!(err.kind, ParseErrorKind::InvalidSyntax { found: None });
    }

    #[test]
    fn block_too_deep() {
        let err = parse_err("每当A：\n        B");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedIndent);
    }

    #[test]
    fn stray_indent_inside_block() {
        let err = parse_err("每当A：\n    B\n        C");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedIndent);
    }

    #[test]
    fn iterate_forms() {
        for (input, key, value) in [
            ("遍历A：\n    B", false, false),
            ("以V遍历A：\n    B", false, true),
            ("以K、V遍历A：\n    B", true, true),
        ] {
            let program = parse_ok(input);
            let StmtKind::Iterate(it) = &program.stmts[0].kind else {
                panic!("expected iterate");
            };
            assert_eq!(it.key.is_some(), key, "{input}");
            assert_eq!(it.value.is_some(), value, "{input}");
        }
    }

    #[test]
    fn iterate_rejects_three_ids() {
        assert!(matches!(
            parse_err("以A、B、C遍历D：\n    E").kind,
            ParseErrorKind::InvalidSyntax { .. }
        ));
    }

    #[test]
    fn function_with_params() {
        let program = parse_ok("如何求和？\n    已知A、&B\n    返回A + B");
        let StmtKind::FunctionDeclare(func) = &program.stmts[0].kind else {
            panic!("expected function");
        };
        assert_eq!(func.name.name, "求和");
        assert_eq!(func.params.len(), 2);
        assert!(!func.params[0].by_ref);
        assert!(func.params[1].by_ref);
        assert_eq!(func.body.stmts.len(), 1);
    }

    #[test]
    fn function_without_params() {
        let program = parse_ok("如何问候？\n    （显示：「你好」）\n    返回");
        let StmtKind::FunctionDeclare(func) = &program.stmts[0].kind else {
            panic!("expected function");
        };
        assert!(func.params.is_empty());
        assert_eq!(func.body.stmts[1].kind, StmtKind::Return(None));
    }

    #[test]
    fn class_body_dispatch() {
        let source = "定义狗：\n    其名为「小黄」\n    是为名\n    是为年龄\n    如何叫？\n        返回「汪」\n    何为描述？\n        返回其名";
        let program = parse_ok(source);
        let StmtKind::ClassDeclare(class) = &program.stmts[0].kind else {
            panic!("expected class");
        };
        assert_eq!(class.properties.len(), 1);
        assert_eq!(class.constructor.len(), 2);
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.getters.len(), 1);
    }

    #[test]
    fn class_rejects_plain_statement() {
        assert!(matches!(
            parse_err("定义狗：\n    令A为1").kind,
            ParseErrorKind::InvalidSyntax { .. }
        ));
    }

    #[test]
    fn import_forms() {
        let program = parse_ok("导入《数学》\n导入《文件》：读、写");
        let StmtKind::Import(first) = &program.stmts[0].kind else {
            panic!("expected import");
        };
        assert_eq!(first.module, "数学");
        assert!(first.items.is_empty());
        let StmtKind::Import(second) = &program.stmts[1].kind else {
            panic!("expected import");
        };
        assert_eq!(second.items.len(), 2);
    }

    #[test]
    fn loop_control() {
        let program = parse_ok("每当A：\n    结束循环\n    继续循环");
        let StmtKind::WhileLoop { body, .. } = &program.stmts[0].kind else {
            panic!("expected loop");
        };
        assert_eq!(body.stmts[0].kind, StmtKind::Break);
        assert_eq!(body.stmts[1].kind, StmtKind::Continue);
    }

    #[test]
    fn lex_errors_pass_through() {
        let chars: Vec<char> = "如果A：\n\t令B为2\n如果B：\n    令C为3".chars().collect();
        assert!(matches!(parse(&chars), Err(Error::Lex(_))));
    }

    #[test]
    fn custom_lexicon() {
        let lexicon = Lexicon::new([("设", Keyword::Declare), ("是", Keyword::LogicYes)]).unwrap();
        let chars: Vec<char> = "设A是1".chars().collect();
        let program = parse_with(&chars, &lexicon).unwrap();
        assert!(matches!(program.stmts[0].kind, StmtKind::VarDeclare(_)));
    }
}
