//! Expression lowering.
//!
//! The default is identity: literals and identifiers are already in the
//! residual language. Field-name expressions are the one transformed case:
//! they become identifier references to the load variable declared when the
//! field was extracted. Sub-expressions of untransformed nodes are still
//! lowered recursively, with reference-equality short-circuits preserving
//! sharing.

use thin_vec::ThinVec;

use crate::ast::{ExprKind, ExprRef, Symbol, utils};
use crate::diagnostic::LowerError;
use crate::lower::{Lowerer, mangle};

impl Lowerer<'_> {
    pub(crate) fn lower_expr(&mut self, e: ExprRef) -> Result<ExprRef, LowerError> {
        let kind = self.ast.get_expr(e).kind.clone();
        match kind {
            ExprKind::FieldName { segments } => self.lower_field_name(e, &segments),
            ExprKind::Unary { operand, .. } => {
                let operand = self.lower_expr(operand)?;
                Ok(self.rebuild_unary(e, operand))
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                let lhs = self.lower_expr(lhs)?;
                let rhs = self.lower_expr(rhs)?;
                Ok(self.rebuild_binary(e, lhs, rhs))
            }
            ExprKind::Call { callee, args } => {
                let callee = self.lower_expr(callee)?;
                let mut lowered = ThinVec::with_capacity(args.len());
                for arg in args {
                    lowered.push(self.lower_expr(arg)?);
                }
                Ok(self.rebuild_call(e, callee, lowered))
            }
            // catch all case: the expression is already residual
            _ => Ok(e),
        }
    }

    /// A field name becomes an identifier whose declaration is the load
    /// variable created by lowering the extraction.
    fn lower_field_name(&mut self, e: ExprRef, segments: &[Symbol]) -> Result<ExprRef, LowerError> {
        let span = self.ast.get_expr(e).span;
        let name = mangle::mangle(segments);
        let decl = self
            .unqualified_lookup(name)
            .and_then(|overload| overload.first().copied());
        let Some(decl) = decl else {
            return Err(LowerError::UnextractedField {
                name: utils::dotted(segments),
                location: span,
            });
        };
        Ok(self.id_expr(decl, span))
    }
}
