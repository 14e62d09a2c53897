//! Declaration lowering.
//!
//! A module lowers in two phases: every top-level symbol (builtins included)
//! is declared into a fresh module scope before any member is lowered, so
//! decoders may reference each other freely; the members are then lowered in
//! source order. Decoders become functions over an implicit context
//! parameter, ports become variables initialized from the runtime, tables
//! are carried through as first-class table objects, and everything else is
//! declared and returned unchanged.

use log::debug;
use thin_vec::{ThinVec, thin_vec};

use crate::ast::{Decl, DeclKind, DeclRef, StmtRef};
use crate::diagnostic::LowerError;
use crate::lower::{Lowerer, builtin};
use crate::source_manager::SourceSpan;

impl Lowerer<'_> {
    pub(crate) fn lower_decl(&mut self, d: DeclRef) -> Result<DeclRef, LowerError> {
        let kind = self.ast.get_decl(d).kind.clone();
        match kind {
            DeclKind::Module { decls } => self.lower_module_decl(d, &decls),
            DeclKind::Decode { body, is_start, .. } => self.lower_decode_decl(d, body, is_start),
            DeclKind::Table { .. } => self.lower_table_decl(d),
            DeclKind::Flow { .. } => self.lower_flow_decl(d),
            DeclKind::Port => self.lower_port_decl(d),
            DeclKind::Record { fields } => self.lower_record_decl(d, &fields),
            // catch all case: declare and return the original declaration
            _ => {
                self.declare(d)?;
                Ok(d)
            }
        }
    }

    fn lower_module_decl(&mut self, d: DeclRef, decls: &[DeclRef]) -> Result<DeclRef, LowerError> {
        debug!("lowering module with {} declarations", decls.len());
        self.scoped(Some(d), |this| {
            // declare all builtins
            let builtins: Vec<DeclRef> = this.builtins.decls().to_vec();
            for b in builtins {
                this.declare(b)?;
            }

            // declare every member before lowering any of them, so decoders
            // may refer to one another
            for &member in decls {
                this.declare(member)?;
            }

            let mut lowered = ThinVec::with_capacity(decls.len());
            for &member in decls {
                lowered.push(this.lower_decl(member)?);
            }

            Ok(this.rebuild_module(d, lowered))
        })
    }

    /// A decoder becomes a function of the same name whose single parameter
    /// is the implicit context, redeclared in the enclosing module scope.
    fn lower_decode_decl(&mut self, d: DeclRef, body: StmtRef, is_start: bool) -> Result<DeclRef, LowerError> {
        let (name, decl_ty, span) = {
            let node = self.ast.get_decl(d);
            (node.name, node.ty, node.span)
        };
        debug!(
            "lowering decoder `{}`",
            name.map(|n| n.as_str()).unwrap_or("<anonymous>")
        );

        let prev_decoder = self.current_decoder.replace(d);
        let result = self.scoped(Some(d), |this| {
            // the implicit context parameter; extractions anywhere in the
            // body find it by unqualified lookup
            let context = this.types.type_context;
            let context_ty = this.types.reference_to(context);
            let param = this.ast.push_decl(Decl::new(
                DeclKind::Parameter,
                Some(this.context_sym),
                Some(context_ty),
                SourceSpan::synthesized(),
            ));
            this.declare(param)?;

            let lowered_body = this.lower_substmt(body)?;

            let fn_ty = match decl_ty {
                Some(ty) => ty,
                None => {
                    let void = this.types.type_void;
                    this.types.function_type(vec![context_ty], void, false)
                }
            };
            Ok(this.ast.push_decl(Decl::new(
                DeclKind::Function {
                    params: thin_vec![param],
                    body: lowered_body,
                },
                name,
                Some(fn_ty),
                span,
            )))
        });
        self.current_decoder = prev_decoder;

        let func = result?;
        self.redeclare(func);
        if is_start {
            self.entry = Some(func);
        }
        Ok(func)
    }

    /// A port becomes a variable initialized by the runtime's port handle.
    fn lower_port_decl(&mut self, d: DeclRef) -> Result<DeclRef, LowerError> {
        let (name, decl_ty, span) = {
            let node = self.ast.get_decl(d);
            (node.name, node.ty, node.span)
        };

        let init = self.builtins.call(self.ast, builtin::GET_PORT, ThinVec::new())?;
        let init = self.elaborate(init);

        let ty = decl_ty.unwrap_or(self.types.type_port);
        let var = self
            .ast
            .push_decl(Decl::new(DeclKind::Variable { init }, name, Some(ty), span));
        self.redeclare(var);
        Ok(var)
    }

    /// Tables are carried into later stages as first-class table objects
    /// referenced by `fp_goto_table` calls.
    fn lower_table_decl(&mut self, d: DeclRef) -> Result<DeclRef, LowerError> {
        self.declare(d)?;
        Ok(d)
    }

    /// Flow entries stay attached to their table.
    fn lower_flow_decl(&mut self, d: DeclRef) -> Result<DeclRef, LowerError> {
        Ok(d)
    }

    /// Record bodies open a scope of their own for the field declarations.
    fn lower_record_decl(&mut self, d: DeclRef, fields: &[DeclRef]) -> Result<DeclRef, LowerError> {
        self.declare(d)?;
        self.scoped(Some(d), |this| {
            for &field in fields {
                this.declare(field)?;
            }
            Ok(())
        })?;
        Ok(d)
    }
}
