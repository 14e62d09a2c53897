//! The elaborator interface consumed by lowering.
//!
//! The full type elaborator lives upstream of this crate; lowering only
//! needs two of its capabilities: re-typing freshly constructed call
//! expressions, and the overload-compatibility predicate the name binder
//! consults. [`CallTyper`] is the stock implementation used by the driver
//! and the test suite.

use crate::ast::{Ast, DeclKind, ExprKind, ExprRef, TypeRegistry};
use crate::ast::{DeclRef, TypeRef};

/// The subset of the elaborator's contract that lowering relies on.
pub trait Elaborator {
    /// Re-type a freshly constructed expression. Implementations may return
    /// the input reference (annotating in place) or allocate a replacement.
    fn elaborate(&self, ast: &mut Ast, types: &mut TypeRegistry, expr: ExprRef) -> ExprRef;

    /// Whether `curr` may overload `prev` in the same scope. The two are
    /// known to have different types when this is consulted.
    fn can_overload(&self, ast: &Ast, types: &TypeRegistry, prev: DeclRef, curr: DeclRef) -> bool;
}

/// Stock elaborator: types identifier and call expressions from their
/// resolved declarations, and allows overloading between functions of the
/// same arity whose parameter types differ.
#[derive(Debug, Default)]
pub struct CallTyper;

impl CallTyper {
    pub fn new() -> Self {
        CallTyper
    }

    fn expr_type(&self, ast: &Ast, types: &TypeRegistry, expr: ExprRef) -> Option<TypeRef> {
        let node = ast.get_expr(expr);
        if let Some(ty) = node.ty.get() {
            return Some(ty);
        }
        match &node.kind {
            ExprKind::LiteralInt(_) => Some(types.type_int),
            ExprKind::LiteralBool(_) => Some(types.type_bool),
            ExprKind::Id { decl, .. } => decl.get().and_then(|d| ast.get_decl(d).ty),
            ExprKind::Call { callee, .. } => self
                .expr_type(ast, types, *callee)
                .and_then(|fn_ty| types.return_type(fn_ty)),
            _ => None,
        }
    }
}

impl Elaborator for CallTyper {
    fn elaborate(&self, ast: &mut Ast, types: &mut TypeRegistry, expr: ExprRef) -> ExprRef {
        if let Some(ty) = self.expr_type(ast, types, expr) {
            ast.get_expr(expr).ty.set(Some(ty));
        }
        expr
    }

    fn can_overload(&self, ast: &Ast, types: &TypeRegistry, prev: DeclRef, curr: DeclRef) -> bool {
        let (prev, curr) = (ast.get_decl(prev), ast.get_decl(curr));
        if !matches!(prev.kind, DeclKind::Function { .. }) || !matches!(curr.kind, DeclKind::Function { .. }) {
            return false;
        }
        let (Some(prev_ty), Some(curr_ty)) = (prev.ty, curr.ty) else {
            return false;
        };
        let (Some(prev_params), Some(curr_params)) = (types.param_types(prev_ty), types.param_types(curr_ty)) else {
            return false;
        };
        // Same arity, parameter types different in at least one position.
        prev_params.len() == curr_params.len() && prev_params != curr_params
    }
}
