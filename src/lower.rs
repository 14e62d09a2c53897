//! The lowering pass.
//!
//! Lowering is a tree-to-tree rewrite over the three-sorted AST that
//! eliminates the network-specific syntactic forms in favor of ordinary
//! imperative code plus calls into the runtime's south-bound interface:
//!
//! - Decoders become functions taking an implicit `__context: &Context`
//!   parameter.
//! - Extractions become a `fp_bind_field` call followed by a load variable
//!   initialized from `fp_load_field`; rebinds use `fp_alias_bind` and two
//!   load variables.
//! - Field references become ordinary identifier references to the load
//!   variables.
//! - Ports become variables initialized from `fp_get_port`.
//! - Decode and goto statements vanish from the statement stream; their
//!   targets are recorded in a side table the emitter turns into tail calls.
//!
//! The pass is single-threaded and purely synchronous. It is a pure function
//! of the input AST plus the pipeline checker's field-mapping table: repeated
//! invocation yields structurally identical output, and lowering an
//! already-lowered module returns it unchanged. Unchanged subtrees are shared
//! by reference, so outputs may be DAGs. The first error aborts the
//! translation unit.

use log::debug;
use thin_vec::ThinVec;

use crate::ast::{Ast, DeclRef, ExprRef, StmtRef, Symbol, TypeRegistry};
use crate::diagnostic::LowerError;
use crate::elaborate::Elaborator;
use crate::pipeline::FieldMap;

pub mod builders;
pub mod builtin;
pub mod decl;
pub mod expr;
pub mod mangle;
pub mod scope;
pub mod stmt;

#[cfg(test)]
pub mod tests_scope;

pub use builtin::Builtin;
pub use scope::{Overload, Scope, ScopeStack};

/// The name of the implicit context parameter injected into every decoder.
pub const CONTEXT_PARAM: &str = "__context";

/// A sequence of lowered statements. Sequences concatenate when inlined into
/// enclosing blocks.
pub type StmtSeq = ThinVec<StmtRef>;

/// How control leaves a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Tail call to the next decoder.
    Decode,
    /// Dispatch against a flow table.
    Goto,
}

/// A recorded control transfer. Decode and goto statements lower to the
/// empty sequence; the emitter consumes these records to produce the jump to
/// the next decoder or table.
#[derive(Debug, Clone, Copy)]
pub struct Transfer {
    /// The decoder whose body contained the transfer.
    pub from: Option<DeclRef>,
    pub kind: TransferKind,
    pub target: ExprRef,
}

/// The result of lowering a module.
#[derive(Debug)]
pub struct Lowered {
    /// The lowered module declaration.
    pub module: DeclRef,
    /// The function synthesized from the start decoder, if the module
    /// declared one.
    pub entry: Option<DeclRef>,
    /// Control transfers recorded while lowering decoder bodies, in source
    /// order.
    pub transfers: Vec<Transfer>,
}

/// The lowering pass state.
///
/// Borrows the AST arena and type registry, the pipeline checker's field
/// mappings, and the elaborator; owns the scope stack and the builtin
/// catalog for the duration of the pass.
pub struct Lowerer<'a> {
    pub(crate) ast: &'a mut Ast,
    pub(crate) types: &'a mut TypeRegistry,
    pub(crate) fields: &'a FieldMap,
    pub(crate) elab: &'a dyn Elaborator,
    pub(crate) stack: ScopeStack,
    pub(crate) builtins: Builtin,
    pub(crate) transfers: Vec<Transfer>,
    pub(crate) entry: Option<DeclRef>,
    pub(crate) current_decoder: Option<DeclRef>,
    pub(crate) context_sym: Symbol,
}

impl<'a> Lowerer<'a> {
    pub fn new(
        ast: &'a mut Ast,
        types: &'a mut TypeRegistry,
        fields: &'a FieldMap,
        elab: &'a dyn Elaborator,
    ) -> Self {
        let builtins = Builtin::new(ast, types);
        Lowerer {
            ast,
            types,
            fields,
            elab,
            stack: ScopeStack::new(),
            builtins,
            transfers: Vec::new(),
            entry: None,
            current_decoder: None,
            context_sym: Symbol::from(CONTEXT_PARAM),
        }
    }

    /// Lower a module declaration and collect the side tables the emitter
    /// needs. This is the entry point of the pass.
    pub fn lower_module(&mut self, module: DeclRef) -> Result<Lowered, LowerError> {
        debug!("lowering module");
        let lowered = self.lower_decl(module)?;
        Ok(Lowered {
            module: lowered,
            entry: self.entry.take(),
            transfers: std::mem::take(&mut self.transfers),
        })
    }

    /// The builtin catalog for this pass.
    pub fn builtins(&self) -> &Builtin {
        &self.builtins
    }

    /// Run `f` under a fresh scope owned by `owner`. The scope is popped on
    /// every exit path, including early error returns.
    pub(crate) fn scoped<T>(
        &mut self,
        owner: Option<DeclRef>,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        self.stack.push(owner);
        let result = f(self);
        self.stack.pop();
        result
    }

    /// Re-type a freshly constructed expression through the elaborator.
    pub(crate) fn elaborate(&mut self, expr: ExprRef) -> ExprRef {
        let elab = self.elab;
        elab.elaborate(self.ast, self.types, expr)
    }
}
