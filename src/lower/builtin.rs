//! The builtin catalog: the south-bound interface of the runtime.
//!
//! The compiled program drives the dataplane through a fixed set of
//! externally-linked functions. The catalog synthesizes their declarations
//! once per pass and constructs call expressions against them, so the
//! runtime contract lives in one place. Every entry is marked `foreign`;
//! where a context is applicable it is the first parameter.

use std::cell::Cell;
use thin_vec::ThinVec;

use crate::ast::{Ast, Decl, DeclKind, DeclRef, Expr, ExprKind, ExprRef, Specifier, Stmt, StmtKind, Symbol};
use crate::ast::{TypeRef, TypeRegistry};
use crate::diagnostic::LowerError;
use crate::source_manager::SourceSpan;

// Global names for each builtin function
pub const BIND_HEADER: &str = "fp_bind_header";
pub const BIND_FIELD: &str = "fp_bind_field";
pub const ALIAS_BIND: &str = "fp_alias_bind";
pub const ADVANCE: &str = "fp_advance";
pub const GET_TABLE: &str = "fp_get_table";
pub const ADD_FLOW: &str = "fp_add_flow";
pub const GOTO_TABLE: &str = "fp_goto_table";
pub const LOAD_FIELD: &str = "fp_load_field";
pub const GET_PORT: &str = "fp_get_port";

/// The builtin function declarations, keyed by ABI name.
#[derive(Debug)]
pub struct Builtin {
    builtins: hashbrown::HashMap<Symbol, DeclRef>,
    // Declaration order; kept separate so the module walk is deterministic.
    order: Vec<DeclRef>,
}

impl Builtin {
    pub fn new(ast: &mut Ast, types: &mut TypeRegistry) -> Self {
        let mut catalog = Builtin {
            builtins: hashbrown::HashMap::new(),
            order: Vec::new(),
        };
        catalog.init_builtins(ast, types);
        catalog
    }

    fn init_builtins(&mut self, ast: &mut Ast, types: &mut TypeRegistry) {
        let int = types.type_int;
        let void = types.type_void;
        let port = types.type_port;
        let context = types.type_context;
        let table = types.type_table;
        let cxt = types.reference_to(context);
        let table_ref = types.reference_to(table);

        // void fp_bind_header(id, length)
        // Records that a header of `length` bytes starts at the current
        // cursor; header values are never loaded into memory.
        self.define(ast, types, BIND_HEADER, &[("id", int), ("length", int)], void, false);

        // void fp_bind_field(cxt, id, offset, length)
        // Extract declarations become a call to this followed by a load.
        self.define(
            ast,
            types,
            BIND_FIELD,
            &[("cxt", cxt), ("id", int), ("offset", int), ("length", int)],
            void,
            false,
        );

        // void fp_alias_bind(cxt, id1, id2, offset, length)
        // Two binds pointing at the same byte range; generated for rebind
        // extractions.
        self.define(
            ast,
            types,
            ALIAS_BIND,
            &[
                ("cxt", cxt),
                ("id1", int),
                ("id2", int),
                ("offset", int),
                ("length", int),
            ],
            void,
            false,
        );

        // void fp_advance(cxt, n)
        self.define(ast, types, ADVANCE, &[("cxt", cxt), ("n", int)], void, false);

        // Table* fp_get_table(id, key_size, max_flows, ...)
        self.define(
            ast,
            types,
            GET_TABLE,
            &[("id", int), ("key_size", int), ("max_flows", int)],
            table_ref,
            true,
        );

        // void fp_add_flow(table, ...)
        self.define(ast, types, ADD_FLOW, &[("table", table_ref)], void, true);

        // void fp_goto_table(cxt, table)
        // The runtime gathers the key fields before dispatching.
        self.define(
            ast,
            types,
            GOTO_TABLE,
            &[("cxt", cxt), ("table", table_ref)],
            void,
            false,
        );

        // int fp_load_field(cxt, id)
        self.define(ast, types, LOAD_FIELD, &[("cxt", cxt), ("id", int)], int, false);

        // Port fp_get_port()
        self.define(ast, types, GET_PORT, &[], port, false);
    }

    fn define(
        &mut self,
        ast: &mut Ast,
        types: &mut TypeRegistry,
        name: &str,
        params: &[(&str, TypeRef)],
        ret: TypeRef,
        variadic: bool,
    ) -> DeclRef {
        let mut param_decls = ThinVec::with_capacity(params.len());
        let mut param_types = Vec::with_capacity(params.len());
        for &(param_name, param_ty) in params {
            param_decls.push(ast.push_decl(Decl::new(
                DeclKind::Parameter,
                Some(Symbol::from(param_name)),
                Some(param_ty),
                SourceSpan::synthesized(),
            )));
            param_types.push(param_ty);
        }
        let fn_ty = types.function_type(param_types, ret, variadic);
        let body = ast.push_stmt(Stmt::new(StmtKind::Empty, SourceSpan::synthesized()));
        let decl = ast.push_decl(Decl::with_spec(
            Specifier::FOREIGN,
            DeclKind::Function {
                params: param_decls,
                body,
            },
            Some(Symbol::from(name)),
            Some(fn_ty),
            SourceSpan::synthesized(),
        ));
        self.builtins.insert(Symbol::from(name), decl);
        self.order.push(decl);
        decl
    }

    /// The function declaration for an ABI name.
    pub fn get(&self, name: &str) -> Result<DeclRef, LowerError> {
        self.builtins
            .get(&Symbol::from(name))
            .copied()
            .ok_or_else(|| LowerError::UnknownBuiltin { name: name.to_string() })
    }

    /// Construct a call against an ABI name. Does no argument checking; the
    /// elaborator re-checks synthesized calls.
    pub fn call(&self, ast: &mut Ast, name: &str, args: ThinVec<ExprRef>) -> Result<ExprRef, LowerError> {
        let decl = self.get(name)?;
        let fn_name = ast.get_decl(decl).name.expect("builtins are named");
        let fn_ty = ast.get_decl(decl).ty;
        let callee = ast.push_expr(Expr::with_type(
            ExprKind::Id {
                name: fn_name,
                decl: Cell::new(Some(decl)),
            },
            SourceSpan::synthesized(),
            fn_ty,
        ));
        Ok(ast.push_expr(Expr::new(
            ExprKind::Call { callee, args },
            SourceSpan::synthesized(),
        )))
    }

    /// Every builtin declaration, in catalog order.
    pub fn decls(&self) -> &[DeclRef] {
        &self.order
    }
}
