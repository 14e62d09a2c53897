//! Statement lowering.
//!
//! Each statement lowers to a sequence of statements, typically one.
//! Control-flow statements preserve their shape; extraction and rebind
//! declaration-statements are the exceptions, expanding into south-bound
//! interface calls plus load-variable bindings. Decode and goto statements
//! lower to the empty sequence and record their targets for the emitter.

use log::debug;
use thin_vec::thin_vec;

use crate::ast::{Decl, DeclKind, DeclRef, ExprRef, StmtKind, StmtRef, Symbol, utils};
use crate::diagnostic::LowerError;
use crate::lower::{Lowerer, StmtSeq, Transfer, TransferKind, builtin, mangle};
use crate::pipeline::FieldBinding;
use crate::source_manager::SourceSpan;

impl Lowerer<'_> {
    pub(crate) fn lower_stmt(&mut self, s: StmtRef) -> Result<StmtSeq, LowerError> {
        let kind = self.ast.get_stmt(s).kind.clone();
        match kind {
            // A block concatenates the lowerings of its children, in order.
            StmtKind::Block(stmts) => {
                let mut lowered = StmtSeq::new();
                for child in stmts {
                    lowered.extend(self.lower_stmt(child)?);
                }
                Ok(thin_vec![self.rebuild_block(s, lowered)])
            }
            StmtKind::IfThen { cond, body } => {
                let cond = self.lower_expr(cond)?;
                let body = self.lower_substmt(body)?;
                Ok(thin_vec![self.rebuild_if_then(s, cond, body)])
            }
            StmtKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.lower_expr(cond)?;
                // both branches lower independently
                let then_branch = self.lower_substmt(then_branch)?;
                let else_branch = self.lower_substmt(else_branch)?;
                Ok(thin_vec![self.rebuild_if_else(s, cond, then_branch, else_branch)])
            }
            StmtKind::Match { cond, cases } => {
                let cond = self.lower_expr(cond)?;
                let mut lowered = StmtSeq::with_capacity(cases.len());
                for case in cases {
                    lowered.push(self.lower_substmt(case)?);
                }
                Ok(thin_vec![self.rebuild_match(s, cond, lowered)])
            }
            // The label is a literal value which does not need lowering.
            StmtKind::Case { label, body } => {
                let body = self.lower_substmt(body)?;
                Ok(thin_vec![self.rebuild_case(s, label, body)])
            }
            StmtKind::While { cond, body } => {
                let cond = self.lower_expr(cond)?;
                let body = self.lower_substmt(body)?;
                Ok(thin_vec![self.rebuild_while(s, cond, body)])
            }
            StmtKind::Expression(expr) => {
                let expr = self.lower_expr(expr)?;
                Ok(thin_vec![self.rebuild_expr_stmt(s, expr)])
            }
            StmtKind::Declaration(decl) => self.lower_declaration_stmt(s, decl),
            // Decode and goto vanish from the statement stream; the emitter
            // turns the recorded targets into the jump to the next stage.
            StmtKind::Decode { target } => {
                self.transfers.push(Transfer {
                    from: self.current_decoder,
                    kind: TransferKind::Decode,
                    target,
                });
                Ok(StmtSeq::new())
            }
            StmtKind::Goto { target } => {
                self.transfers.push(Transfer {
                    from: self.current_decoder,
                    kind: TransferKind::Goto,
                    target,
                });
                Ok(StmtSeq::new())
            }
            // catch all case: already residual statements pass through
            StmtKind::Empty | StmtKind::Drop | StmtKind::Output { .. } => Ok(thin_vec![s]),
        }
    }

    /// Lower a substatement position that expects exactly one statement:
    /// sequences longer than one get wrapped in a block.
    pub(crate) fn lower_substmt(&mut self, s: StmtRef) -> Result<StmtRef, LowerError> {
        let span = self.ast.get_stmt(s).span;
        let seq = self.lower_stmt(s)?;
        Ok(self.single(seq, span))
    }

    /// Declaration-statements dispatch on the declaration kind. Extractions
    /// and rebinds lower into call expressions instead of declarations;
    /// everything else lowers through the declaration lowerer.
    fn lower_declaration_stmt(&mut self, s: StmtRef, d: DeclRef) -> Result<StmtSeq, LowerError> {
        let kind = self.ast.get_decl(d).kind.clone();
        match kind {
            DeclKind::Extracts { field } => self.lower_extracts_decl(d, field),
            DeclKind::Rebind { field, alias } => self.lower_rebind_decl(d, field, alias),
            _ => {
                let lowered = self.lower_decl(d)?;
                Ok(thin_vec![self.rebuild_decl_stmt(s, lowered)])
            }
        }
    }

    /// An extraction becomes two statements:
    ///
    /// 1. `fp_bind_field(__context, id, offset, length);`
    /// 2. `var <mangled>: <field type> = fp_load_field(__context, id);`
    ///
    /// The load variable is the declaration every later field reference
    /// resolves against, so the binding always precedes the first read.
    fn lower_extracts_decl(&mut self, d: DeclRef, field: ExprRef) -> Result<StmtSeq, LowerError> {
        let span = self.ast.get_decl(d).span;
        let segments = mangle::field_segments(self.ast, field).ok_or_else(|| LowerError::UnextractedField {
            name: String::from("<invalid field>"),
            location: span,
        })?;
        debug!("lowering extraction of `{}`", utils::dotted(&segments));

        let cxt = self.context_param(span)?;
        let binding = self.field_binding(d, &segments, span)?;

        let mut stmts = StmtSeq::new();

        let cxt_expr = self.id_expr(cxt, span);
        let id = self.int_expr(binding.id as i64, span);
        let offset = self.int_expr(binding.offset as i64, span);
        let length = self.int_expr(binding.length as i64, span);
        let bind = self
            .builtins
            .call(self.ast, builtin::BIND_FIELD, thin_vec![cxt_expr, id, offset, length])?;
        let bind = self.elaborate(bind);
        stmts.push(self.expr_stmt(bind, span));

        let var = self.load_variable(cxt, binding.id, field, &segments, span)?;
        stmts.push(self.decl_stmt(var, span));

        Ok(stmts)
    }

    /// A rebind extracts a field and additionally binds it under an alias:
    /// one `fp_alias_bind` call pointing both ids at the same byte range,
    /// then a load variable per name.
    fn lower_rebind_decl(&mut self, d: DeclRef, field: ExprRef, alias: ExprRef) -> Result<StmtSeq, LowerError> {
        let span = self.ast.get_decl(d).span;
        let segments = mangle::field_segments(self.ast, field).ok_or_else(|| LowerError::UnextractedField {
            name: String::from("<invalid field>"),
            location: span,
        })?;
        let alias_segments = mangle::field_segments(self.ast, alias).ok_or_else(|| LowerError::UnextractedField {
            name: String::from("<invalid field>"),
            location: span,
        })?;
        debug!(
            "lowering rebind of `{}` as `{}`",
            utils::dotted(&segments),
            utils::dotted(&alias_segments)
        );

        let cxt = self.context_param(span)?;
        let binding = self.field_binding(d, &segments, span)?;
        // The alias id is the number the field would receive under its
        // aliased name.
        let alias_id = binding.alias.ok_or_else(|| LowerError::UnextractedField {
            name: utils::dotted(&alias_segments),
            location: span,
        })?;

        let mut stmts = StmtSeq::new();

        let cxt_expr = self.id_expr(cxt, span);
        let id_true = self.int_expr(binding.id as i64, span);
        let id_alias = self.int_expr(alias_id as i64, span);
        let offset = self.int_expr(binding.offset as i64, span);
        let length = self.int_expr(binding.length as i64, span);
        let bind = self.builtins.call(
            self.ast,
            builtin::ALIAS_BIND,
            thin_vec![cxt_expr, id_true, id_alias, offset, length],
        )?;
        let bind = self.elaborate(bind);
        stmts.push(self.expr_stmt(bind, span));

        let true_var = self.load_variable(cxt, binding.id, field, &segments, span)?;
        stmts.push(self.decl_stmt(true_var, span));
        let alias_var = self.load_variable(cxt, alias_id, field, &alias_segments, span)?;
        stmts.push(self.decl_stmt(alias_var, span));

        Ok(stmts)
    }

    /// Declare the variable holding a loaded field value and return it.
    fn load_variable(
        &mut self,
        cxt: DeclRef,
        id: i32,
        field: ExprRef,
        segments: &[Symbol],
        span: SourceSpan,
    ) -> Result<DeclRef, LowerError> {
        let cxt_expr = self.id_expr(cxt, span);
        let id_expr = self.int_expr(id as i64, span);
        let load = self
            .builtins
            .call(self.ast, builtin::LOAD_FIELD, thin_vec![cxt_expr, id_expr])?;
        let load = self.elaborate(load);

        let name = mangle::mangle(segments);
        let ty = self.ast.get_expr(field).ty.get().unwrap_or(self.types.type_int);
        let var = self
            .ast
            .push_decl(Decl::new(DeclKind::Variable { init: load }, Some(name), Some(ty), span));
        self.declare(var)?;
        Ok(var)
    }

    /// The implicit context parameter of the enclosing decoder.
    fn context_param(&self, span: SourceSpan) -> Result<DeclRef, LowerError> {
        self.unqualified_lookup(self.context_sym)
            .and_then(|overload| overload.first().copied())
            .ok_or(LowerError::MissingContext { location: span })
    }

    /// The pipeline checker's mapping for an extraction declaration.
    fn field_binding(&self, d: DeclRef, segments: &[Symbol], span: SourceSpan) -> Result<FieldBinding, LowerError> {
        self.fields
            .field_mapping(d)
            .copied()
            .ok_or_else(|| LowerError::UnextractedField {
                name: utils::dotted(segments),
                location: span,
            })
    }
}
