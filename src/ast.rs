/// Root of a parsed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

/// Statements of one indented block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

/// A statement and the line of its first token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// `令A为1`, or `令：` followed by a block of groups.
    VarDeclare(Vec<VarGroup>),
    Branch(Branch),
    /// `每当 cond：`
    WhileLoop { cond: Expr, body: Block },
    Iterate(Iterate),
    FunctionDeclare(FunctionDecl),
    ClassDeclare(ClassDecl),
    /// `返回 expr`
    Return(Option<Expr>),
    Import(Import),
    /// A lone `；`.
    Empty,
    Break,
    Continue,
    /// An expression evaluated for its effect.
    Expression(Expr),
}

/// One group of a variable declaration: `A、B为1`, `A恒为1`,
/// or `A成为类：参数`.
///
/// The `成为` form stores an [`ExprKind::ObjNew`] as its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarGroup {
    pub vars: Vec<Ident>,
    pub constant: bool,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub cond: Expr,
    pub body: Block,
    /// `再如` arms, in source order.
    pub else_ifs: Vec<ElseIf>,
    /// `否则` arm.
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseIf {
    pub cond: Expr,
    pub body: Block,
    pub line: usize,
}

/// `以K、V遍历 target：`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iterate {
    pub target: Expr,
    /// Bound only in the two-variable form.
    pub key: Option<Ident>,
    pub value: Option<Ident>,
    pub body: Block,
}

/// `如何 name？` with an optional `已知` line opening the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Block,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Ident,
    /// Declared with `&`.
    pub by_ref: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: Ident,
    /// `其名为...` lines.
    pub properties: Vec<PropertyDecl>,
    /// `是为...` lines, concatenated.
    pub constructor: Vec<Param>,
    pub methods: Vec<FunctionDecl>,
    pub getters: Vec<GetterDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: Ident,
    pub init: Expr,
    pub line: usize,
}

/// `何为 name？` computed property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetterDecl {
    pub name: Ident,
    pub body: Block,
    pub line: usize,
}

/// `导入《模块》` with an optional `：A、B` item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub module: String,
    pub items: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub line: usize,
}

/// An expression and the line of its first token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Identifier(String),
    /// Literal text with grouping separators removed.
    Number(String),
    String(String),
    Array(Vec<Expr>),
    HashMap(Vec<HashMapEntry>),
    Logic {
        op: LogicOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `A之B`, `A#1`, `A#{B}`, `其B`.
    Member {
        root: Receiver,
        access: MemberAccess,
    },
    FuncCall(FuncCall),
    /// `A之（f）、（g）`: one or more calls on the same receiver.
    MemberMethod {
        root: Receiver,
        chain: Vec<FuncCall>,
    },
    /// `A = B`, or `A = &B` by reference.
    VarAssign {
        target: Box<Expr>,
        value: Box<Expr>,
        by_ref: bool,
    },
    ObjNew {
        class: Ident,
        params: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashMapEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// What a member access is rooted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// The implicit `其` receiver.
    This,
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberAccess {
    Property(Ident),
    Index(Box<Expr>),
}

/// `（name：a，b）得到R`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncCall {
    pub name: Ident,
    pub params: Vec<Expr>,
    /// Variable bound to the call's result.
    pub yield_to: Option<Ident>,
}

impl Expr {
    /// Identifiers and member accesses may be assigned to.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Identifier(_) | ExprKind::Member { .. }
        )
    }
}

impl LogicOp {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Equal => "eq",
            Self::NotEqual => "neq",
            Self::Less => "lt",
            Self::LessEqual => "lte",
            Self::Greater => "gt",
            Self::GreaterEqual => "gte",
        }
    }
}

impl ArithOp {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
        }
    }
}
