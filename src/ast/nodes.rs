//! AST node definitions and constructors.
//!
//! This module contains the three node families — declarations, statements,
//! and expressions — as closed tagged variants. Lowering never invents new
//! syntactic kinds; it only re-selects cases and fills in fields.

use bitflags::bitflags;
use std::cell::Cell;
use thin_vec::ThinVec;

use crate::ast::{DeclRef, ExprRef, StmtRef, Symbol, TypeRef};
use crate::source_manager::SourceSpan;

bitflags! {
    /// Declaration specifiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Specifier: u8 {
        /// Externally linked; the emitter produces a declaration only.
        const FOREIGN = 1 << 0;
    }
}

/// Represents the declaration of a named entity.
///
/// The name is optional: flow entries and extractions are anonymous. The type
/// is optional: namespace-like declarations (modules, records, layouts) have
/// no intrinsic type. The declaring context back-link is set at declare-time
/// and read by global-vs-local queries.
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub name: Option<Symbol>,
    pub ty: Option<TypeRef>,
    pub spec: Specifier,
    pub span: SourceSpan,
    // Set when the declaration is brought into scope; Cell so the binder can
    // annotate without mutable access to the arena.
    pub context: Cell<Option<DeclRef>>,
}

impl Decl {
    /// Create a new declaration with empty specifiers
    pub fn new(kind: DeclKind, name: Option<Symbol>, ty: Option<TypeRef>, span: SourceSpan) -> Self {
        Decl {
            kind,
            name,
            ty,
            spec: Specifier::empty(),
            span,
            context: Cell::new(None),
        }
    }

    /// Create a new declaration with the given specifiers
    pub fn with_spec(
        spec: Specifier,
        kind: DeclKind,
        name: Option<Symbol>,
        ty: Option<TypeRef>,
        span: SourceSpan,
    ) -> Self {
        Decl {
            kind,
            name,
            ty,
            spec,
            span,
            context: Cell::new(None),
        }
    }

    pub fn is_foreign(&self) -> bool {
        self.spec.contains(Specifier::FOREIGN)
    }
}

/// Flow table lookup disciplines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Exact,
    Wildcard,
    Prefix,
    String,
}

/// The closed set of declaration cases.
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// A variable with an initializer expression.
    Variable { init: ExprRef },
    /// A function with parameters and a body statement.
    Function { params: ThinVec<DeclRef>, body: StmtRef },
    /// A function parameter.
    Parameter,
    /// A user-defined record type.
    Record { fields: ThinVec<DeclRef> },
    /// A member of a record or layout.
    Field,
    /// A module: the sequence of top-level declarations.
    Module { decls: ThinVec<DeclRef> },

    // network declarations
    /// A packet header schema. Similar to a record, but objects of a layout
    /// cannot be made; layouts are discarded before code generation.
    Layout { fields: ThinVec<DeclRef> },
    /// A decoder: parses a header and chooses a successor decoder or table.
    Decode {
        header: TypeRef,
        body: StmtRef,
        is_start: bool,
    },
    /// A flow table.
    Table {
        number: i32,
        conditions: ThinVec<ExprRef>,
        flows: ThinVec<DeclRef>,
        kind: TableKind,
        is_start: bool,
    },
    /// An entry within a flow table.
    Flow {
        priority: i32,
        keys: ThinVec<ExprRef>,
        instructions: StmtRef,
    },
    /// Extracts a field of the currently-decoded header into the context.
    Extracts { field: ExprRef },
    /// Extracts a field, additionally binding it under an alias.
    Rebind { field: ExprRef, alias: ExprRef },
    /// Declares the name of a port.
    Port,
}

/// A statement node.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceSpan,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: SourceSpan) -> Self {
        Stmt { kind, span }
    }
}

/// The closed set of statement cases.
#[derive(Debug, Clone)]
pub enum StmtKind {
    Empty,
    Block(ThinVec<StmtRef>),
    IfThen {
        cond: ExprRef,
        body: StmtRef,
    },
    IfElse {
        cond: ExprRef,
        then_branch: StmtRef,
        else_branch: StmtRef,
    },
    Match {
        cond: ExprRef,
        cases: ThinVec<StmtRef>,
    },
    /// A case arm; the label is a literal expression.
    Case {
        label: ExprRef,
        body: StmtRef,
    },
    While {
        cond: ExprRef,
        body: StmtRef,
    },
    Expression(ExprRef),
    Declaration(DeclRef),
    /// Transfer the packet to another decoder.
    Decode {
        target: ExprRef,
    },
    /// Dispatch the packet against a flow table.
    Goto {
        target: ExprRef,
    },
    /// Drop the packet.
    Drop,
    /// Output the packet on a port.
    Output {
        port: ExprRef,
    },
}

/// An expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceSpan,
    // Filled in by the elaborator; Cell so re-typing freshly constructed
    // expressions does not require mutable access to the arena.
    pub ty: Cell<Option<TypeRef>>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: SourceSpan) -> Self {
        Expr {
            kind,
            span,
            ty: Cell::new(None),
        }
    }

    pub fn with_type(kind: ExprKind, span: SourceSpan, ty: Option<TypeRef>) -> Self {
        Expr {
            kind,
            span,
            ty: Cell::new(ty),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

/// The closed set of expression cases.
#[derive(Debug, Clone)]
pub enum ExprKind {
    LiteralInt(i64),
    LiteralBool(bool),
    /// An identifier with its resolved declaration link.
    Id {
        name: Symbol,
        decl: Cell<Option<DeclRef>>,
    },
    Unary {
        op: UnaryOp,
        operand: ExprRef,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprRef,
        rhs: ExprRef,
    },
    Call {
        callee: ExprRef,
        args: ThinVec<ExprRef>,
    },
    /// A logical reference to a field inside a layout, resolved to a dotted
    /// path (e.g. `eth.src`). Eliminated by lowering.
    FieldName {
        segments: ThinVec<Symbol>,
    },
}
