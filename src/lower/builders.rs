//! Thin constructors for lowered nodes.
//!
//! The rebuild constructors implement the sharing contract of the pass: when
//! every child handed back is identical to the input node's child, the input
//! node is returned unchanged. That keeps unchanged subtrees shared and makes
//! lowering idempotent.

use std::cell::Cell;
use thin_vec::ThinVec;

use crate::ast::{Decl, DeclKind, DeclRef, Expr, ExprKind, ExprRef, Stmt, StmtKind, StmtRef};
use crate::lower::{Lowerer, StmtSeq};
use crate::source_manager::SourceSpan;

impl Lowerer<'_> {
    // ---------------------------------------------------------------- fresh

    pub(crate) fn empty_stmt(&mut self, span: SourceSpan) -> StmtRef {
        self.ast.push_stmt(Stmt::new(StmtKind::Empty, span))
    }

    pub(crate) fn block(&mut self, stmts: StmtSeq, span: SourceSpan) -> StmtRef {
        self.ast.push_stmt(Stmt::new(StmtKind::Block(stmts), span))
    }

    pub(crate) fn expr_stmt(&mut self, expr: ExprRef, span: SourceSpan) -> StmtRef {
        self.ast.push_stmt(Stmt::new(StmtKind::Expression(expr), span))
    }

    pub(crate) fn decl_stmt(&mut self, decl: DeclRef, span: SourceSpan) -> StmtRef {
        self.ast.push_stmt(Stmt::new(StmtKind::Declaration(decl), span))
    }

    /// An identifier expression resolved against `decl`, typed from it.
    pub(crate) fn id_expr(&mut self, decl: DeclRef, span: SourceSpan) -> ExprRef {
        let node = self.ast.get_decl(decl);
        let name = node.name.expect("identifier targets are named");
        let ty = node.ty;
        self.ast.push_expr(Expr::with_type(
            ExprKind::Id {
                name,
                decl: Cell::new(Some(decl)),
            },
            span,
            ty,
        ))
    }

    pub(crate) fn int_expr(&mut self, value: i64, span: SourceSpan) -> ExprRef {
        let ty = self.types.type_int;
        self.ast
            .push_expr(Expr::with_type(ExprKind::LiteralInt(value), span, Some(ty)))
    }

    /// Collapse a lowered sequence into the single statement an enclosing
    /// construct expects: empty becomes an empty statement, more than one
    /// gets wrapped in a block.
    pub(crate) fn single(&mut self, mut seq: StmtSeq, span: SourceSpan) -> StmtRef {
        match seq.len() {
            0 => self.empty_stmt(span),
            1 => seq.pop().unwrap(),
            _ => self.block(seq, span),
        }
    }

    // -------------------------------------------------------------- rebuild

    pub(crate) fn rebuild_block(&mut self, s: StmtRef, stmts: StmtSeq) -> StmtRef {
        let span = self.ast.get_stmt(s).span;
        if let StmtKind::Block(old) = &self.ast.get_stmt(s).kind
            && old[..] == stmts[..]
        {
            return s;
        }
        self.ast.push_stmt(Stmt::new(StmtKind::Block(stmts), span))
    }

    pub(crate) fn rebuild_if_then(&mut self, s: StmtRef, cond: ExprRef, body: StmtRef) -> StmtRef {
        let span = self.ast.get_stmt(s).span;
        if let StmtKind::IfThen { cond: c0, body: b0 } = &self.ast.get_stmt(s).kind
            && *c0 == cond
            && *b0 == body
        {
            return s;
        }
        self.ast.push_stmt(Stmt::new(StmtKind::IfThen { cond, body }, span))
    }

    pub(crate) fn rebuild_if_else(
        &mut self,
        s: StmtRef,
        cond: ExprRef,
        then_branch: StmtRef,
        else_branch: StmtRef,
    ) -> StmtRef {
        let span = self.ast.get_stmt(s).span;
        if let StmtKind::IfElse {
            cond: c0,
            then_branch: t0,
            else_branch: e0,
        } = &self.ast.get_stmt(s).kind
            && *c0 == cond
            && *t0 == then_branch
            && *e0 == else_branch
        {
            return s;
        }
        self.ast.push_stmt(Stmt::new(
            StmtKind::IfElse {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    pub(crate) fn rebuild_while(&mut self, s: StmtRef, cond: ExprRef, body: StmtRef) -> StmtRef {
        let span = self.ast.get_stmt(s).span;
        if let StmtKind::While { cond: c0, body: b0 } = &self.ast.get_stmt(s).kind
            && *c0 == cond
            && *b0 == body
        {
            return s;
        }
        self.ast.push_stmt(Stmt::new(StmtKind::While { cond, body }, span))
    }

    pub(crate) fn rebuild_match(&mut self, s: StmtRef, cond: ExprRef, cases: StmtSeq) -> StmtRef {
        let span = self.ast.get_stmt(s).span;
        if let StmtKind::Match { cond: c0, cases: k0 } = &self.ast.get_stmt(s).kind
            && *c0 == cond
            && k0[..] == cases[..]
        {
            return s;
        }
        self.ast.push_stmt(Stmt::new(StmtKind::Match { cond, cases }, span))
    }

    /// Rebuild a case arm; the label is copied verbatim from the input.
    pub(crate) fn rebuild_case(&mut self, s: StmtRef, label: ExprRef, body: StmtRef) -> StmtRef {
        let span = self.ast.get_stmt(s).span;
        if let StmtKind::Case { label: l0, body: b0 } = &self.ast.get_stmt(s).kind
            && *l0 == label
            && *b0 == body
        {
            return s;
        }
        self.ast.push_stmt(Stmt::new(StmtKind::Case { label, body }, span))
    }

    pub(crate) fn rebuild_expr_stmt(&mut self, s: StmtRef, expr: ExprRef) -> StmtRef {
        let span = self.ast.get_stmt(s).span;
        if let StmtKind::Expression(e0) = &self.ast.get_stmt(s).kind
            && *e0 == expr
        {
            return s;
        }
        self.ast.push_stmt(Stmt::new(StmtKind::Expression(expr), span))
    }

    pub(crate) fn rebuild_decl_stmt(&mut self, s: StmtRef, decl: DeclRef) -> StmtRef {
        let span = self.ast.get_stmt(s).span;
        if let StmtKind::Declaration(d0) = &self.ast.get_stmt(s).kind
            && *d0 == decl
        {
            return s;
        }
        self.ast.push_stmt(Stmt::new(StmtKind::Declaration(decl), span))
    }

    pub(crate) fn rebuild_unary(&mut self, e: ExprRef, operand: ExprRef) -> ExprRef {
        let node = self.ast.get_expr(e);
        let (span, ty) = (node.span, node.ty.get());
        let op = match &node.kind {
            ExprKind::Unary { op, operand: o0 } => {
                if *o0 == operand {
                    return e;
                }
                *op
            }
            _ => return e,
        };
        self.ast
            .push_expr(Expr::with_type(ExprKind::Unary { op, operand }, span, ty))
    }

    pub(crate) fn rebuild_binary(&mut self, e: ExprRef, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        let node = self.ast.get_expr(e);
        let (span, ty) = (node.span, node.ty.get());
        let op = match &node.kind {
            ExprKind::Binary { op, lhs: l0, rhs: r0 } => {
                if *l0 == lhs && *r0 == rhs {
                    return e;
                }
                *op
            }
            _ => return e,
        };
        self.ast
            .push_expr(Expr::with_type(ExprKind::Binary { op, lhs, rhs }, span, ty))
    }

    pub(crate) fn rebuild_call(&mut self, e: ExprRef, callee: ExprRef, args: ThinVec<ExprRef>) -> ExprRef {
        let node = self.ast.get_expr(e);
        let (span, ty) = (node.span, node.ty.get());
        if let ExprKind::Call { callee: c0, args: a0 } = &node.kind
            && *c0 == callee
            && a0[..] == args[..]
        {
            return e;
        }
        self.ast
            .push_expr(Expr::with_type(ExprKind::Call { callee, args }, span, ty))
    }

    pub(crate) fn rebuild_module(&mut self, d: DeclRef, decls: ThinVec<DeclRef>) -> DeclRef {
        let node = self.ast.get_decl(d);
        if let DeclKind::Module { decls: old } = &node.kind
            && old[..] == decls[..]
        {
            return d;
        }
        let (name, ty, spec, span) = (node.name, node.ty, node.spec, node.span);
        self.ast
            .push_decl(Decl::with_spec(spec, DeclKind::Module { decls }, name, ty, span))
    }
}
