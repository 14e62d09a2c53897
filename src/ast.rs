//! Abstract Syntax Tree (AST) for the flowpath language.
//!
//! This module provides the core AST data structures for representing
//! flowpath programs after parsing and elaboration. The AST is designed as a
//! flattened storage system for efficiency, with index-based references to
//! child nodes and types.
//!
//! Three node families flow through the compiler — declarations, statements,
//! and expressions — each stored in its own contiguous vector:
//!
//! - [`nodes`]: Node definitions and constructors for all three families
//! - [`types`]: Canonical type representation and the interning registry
//! - [`dumper`]: Deterministic textual rendering of AST subtrees
//! - [`utils`]: Declaration and layout queries
//!
//! Reference equality ([`DeclRef`]/[`StmtRef`]/[`ExprRef`] comparison) is the
//! sharing test used by the lowering pass: a pass that changes nothing in a
//! subtree returns the input reference unchanged, so trees may become DAGs.
//! Nodes are read-only once emitted to the next stage; resolved declaration
//! links and type annotations use `Cell` so elaboration can annotate without
//! mutable access to the whole tree.

use std::num::NonZeroU32;

/// Represents an interned string using symbol_table crate.
/// Alias for GlobalSymbol from symbol_table crate with global feature.
pub type Symbol = symbol_table::GlobalSymbol;

pub use crate::source_manager::{SourceId, SourceLoc, SourceSpan};

// Submodules
pub mod dumper;
pub mod nodes;
pub mod types;
pub mod utils;

// Re-export commonly used items for convenience
pub use nodes::*;
pub use types::*;

/// Reference to a declaration in the flattened AST storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclRef(NonZeroU32);

impl DeclRef {
    pub fn new(index: u32) -> Option<Self> {
        NonZeroU32::new(index).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Reference to a statement in the flattened AST storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtRef(NonZeroU32);

impl StmtRef {
    pub fn new(index: u32) -> Option<Self> {
        NonZeroU32::new(index).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Reference to an expression in the flattened AST storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprRef(NonZeroU32);

impl ExprRef {
    pub fn new(index: u32) -> Option<Self> {
        NonZeroU32::new(index).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Reference to a canonical type in the [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef(NonZeroU32);

impl TypeRef {
    pub fn new(index: u32) -> Option<Self> {
        NonZeroU32::new(index).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// The flattened AST storage.
/// Contains all declarations, statements, and expressions in contiguous
/// vectors. The arena owns every node; passes borrow input nodes and allocate
/// new ones into the same arena.
#[derive(Debug, Default)]
pub struct Ast {
    pub decls: Vec<Decl>,
    pub stmts: Vec<Stmt>,
    pub exprs: Vec<Expr>,
    pub root: Option<DeclRef>,
}

impl Ast {
    /// Create a new empty AST
    pub fn new() -> Self {
        Ast {
            decls: Vec::new(),
            stmts: Vec::new(),
            exprs: Vec::new(),
            root: None,
        }
    }

    /// Get the root module of the AST
    pub fn get_root(&self) -> Option<&Decl> {
        self.root.map(|decl_ref| self.get_decl(decl_ref))
    }

    /// Set the root module of the AST
    pub fn set_root(&mut self, decl_ref: DeclRef) {
        self.root = Some(decl_ref);
    }

    /// Add a declaration to the AST and return its reference
    pub fn push_decl(&mut self, decl: Decl) -> DeclRef {
        let index = self.decls.len() as u32 + 1; // Start from 1 for NonZeroU32
        self.decls.push(decl);
        DeclRef::new(index).expect("DeclRef overflow")
    }

    /// Get a declaration by its reference
    pub fn get_decl(&self, index: DeclRef) -> &Decl {
        &self.decls[(index.get() - 1) as usize]
    }

    /// Add a statement to the AST and return its reference
    pub fn push_stmt(&mut self, stmt: Stmt) -> StmtRef {
        let index = self.stmts.len() as u32 + 1;
        self.stmts.push(stmt);
        StmtRef::new(index).expect("StmtRef overflow")
    }

    /// Get a statement by its reference
    pub fn get_stmt(&self, index: StmtRef) -> &Stmt {
        &self.stmts[(index.get() - 1) as usize]
    }

    /// Add an expression to the AST and return its reference
    pub fn push_expr(&mut self, expr: Expr) -> ExprRef {
        let index = self.exprs.len() as u32 + 1;
        self.exprs.push(expr);
        ExprRef::new(index).expect("ExprRef overflow")
    }

    /// Get an expression by its reference
    pub fn get_expr(&self, index: ExprRef) -> &Expr {
        &self.exprs[(index.get() - 1) as usize]
    }
}
