//! Abstract syntax tree.
//!
//! The tree is parameterized by a [`Phase`]. The grammar produces `Stmt<Parsed>` whose variable
//! references only carry a name; the resolver rewrites it into `Stmt<Resolved>` whose variable
//! references carry their scope depth. Only the resolved form can be evaluated.

use std::fmt;
use std::rc::Rc;

use glint_source::Position;

use crate::lexer::TokenKind;

/// A stage of the pipeline the tree belongs to.
pub trait Phase: fmt::Debug + Clone + PartialEq {
    /// A reference to a variable.
    type Var: fmt::Debug + Clone + PartialEq;
}

/// Output of the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {}

/// Output of the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {}

impl Phase for Parsed {
    type Var = VarRef;
}

impl Phase for Resolved {
    type Var = ResolvedVar;
}

/// An identifier (e.g. `foo`) before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub position: Position,
}

/// An identifier annotated with the number of scopes to cross to reach its binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedVar {
    pub name: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Negate,
    /// `!`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Plus,
    Minus,
    Star,
    Slash,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    EqualEqual,
    BangEqual,
    And,
    Or,
}

impl UnaryOp {
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Minus => Some(Self::Negate),
            TokenKind::Bang => Some(Self::Not),
            _ => None,
        }
    }
}

impl BinaryOp {
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => Self::Plus,
            TokenKind::Minus => Self::Minus,
            TokenKind::Star => Self::Star,
            TokenKind::Slash => Self::Slash,
            TokenKind::Greater => Self::Greater,
            TokenKind::GreaterEqual => Self::GreaterEqual,
            TokenKind::Less => Self::Less,
            TokenKind::LessEqual => Self::LessEqual,
            TokenKind::EqualEqual => Self::EqualEqual,
            TokenKind::BangEqual => Self::BangEqual,
            TokenKind::And => Self::And,
            TokenKind::Or => Self::Or,
            _ => return None,
        };
        Some(op)
    }

    /// `and` and `or` only evaluate their right operand when needed.
    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Negate => "-",
            Self::Not => "!",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
            Self::And => "and",
            Self::Or => "or",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<P: Phase> {
    Literal(Literal),
    /// A variable reference (e.g. `foo` or `this`).
    Variable(P::Var),
    /// A prefix expression (e.g. `-x`).
    Unary { op: UnaryOp, arg: Box<Expr<P>> },
    /// A binary expression (e.g. `1+1`).
    Binary {
        lhs: Box<Expr<P>>,
        op: BinaryOp,
        rhs: Box<Expr<P>>,
    },
    Assign {
        target: AssignTarget<P>,
        value: Box<Expr<P>>,
    },
    /// A call expression (e.g. `foo(1, 2)`).
    Call {
        callee: Box<Expr<P>>,
        args: Vec<Expr<P>>,
    },
    /// A member access (e.g. `point.x`).
    Field { object: Box<Expr<P>>, name: String },
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget<P: Phase> {
    Variable(P::Var),
    Field { object: Box<Expr<P>>, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl<P: Phase> {
    pub name: String,
    pub initializer: Option<Expr<P>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<P: Phase> {
    pub name: String,
    pub params: Vec<String>,
    /// Declarations of the body block.
    pub body: Vec<Stmt<P>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl<P: Phase> {
    pub name: String,
    pub fields: Vec<VarDecl<P>>,
    pub methods: Vec<Rc<FunctionDecl<P>>>,
    /// Member functions named after the class. After resolution this holds exactly one entry,
    /// synthesized when the class declares none.
    pub constructors: Vec<Rc<FunctionDecl<P>>>,
}

impl<P: Phase> ClassDecl<P> {
    pub fn constructor(&self) -> Option<&Rc<FunctionDecl<P>>> {
        self.constructors.first()
    }
}

/// Declarations and statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<P: Phase> {
    VarDeclaration(VarDecl<P>),
    FnDeclaration(Rc<FunctionDecl<P>>),
    ClassDeclaration(Rc<ClassDecl<P>>),
    PrintStmt(Expr<P>),
    ExprStmt(Expr<P>),
    Block(Vec<Stmt<P>>),
    If {
        condition: Expr<P>,
        then_branch: Box<Stmt<P>>,
        else_branch: Option<Box<Stmt<P>>>,
    },
    While {
        condition: Expr<P>,
        body: Box<Stmt<P>>,
    },
    /// `initializer`, `condition` and `increment` share one scope enclosing the whole loop.
    For {
        initializer: Option<Box<Stmt<P>>>,
        condition: Option<Expr<P>>,
        increment: Option<Expr<P>>,
        body: Box<Stmt<P>>,
    },
    ReturnStmt(Expr<P>),
}
