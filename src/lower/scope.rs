//! Scope handling and name binding.
//!
//! The binder maintains a stack of scopes. Each scope maps a symbol to an
//! overload set: the ordered list of declarations sharing that name. Two
//! declarations may share a name in one scope only if their types differ and
//! the elaborator's overload predicate accepts the pair; a same-type clash is
//! a redefinition.
//!
//! Scopes exist only while their owning declaration is being lowered:
//! modules, decoders, and record bodies are entered through
//! [`Lowerer::scoped`](super::Lowerer::scoped), which restores the parent
//! scope on all exit paths.

use hashbrown::HashMap;
use log::debug;

use crate::ast::{DeclRef, Symbol};
use crate::diagnostic::LowerError;
use crate::lower::Lowerer;

/// An ordered list of declarations sharing a name in one scope.
pub type Overload = Vec<DeclRef>;

/// One scope: a binding table plus the declaration that owns it.
#[derive(Debug, Default)]
pub struct Scope {
    owner: Option<DeclRef>,
    bindings: HashMap<Symbol, Overload>,
}

impl Scope {
    pub fn new(owner: Option<DeclRef>) -> Self {
        Scope {
            owner,
            bindings: HashMap::new(),
        }
    }

    pub fn owner(&self) -> Option<DeclRef> {
        self.owner
    }

    /// Scope-local lookup.
    pub fn lookup(&self, name: Symbol) -> Option<&Overload> {
        self.bindings.get(&name)
    }

    /// The overload set bound to `name`, created empty on first use.
    pub(crate) fn bind(&mut self, name: Symbol) -> &mut Overload {
        self.bindings.entry(name).or_default()
    }
}

/// The scope stack.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { scopes: Vec::new() }
    }

    pub fn push(&mut self, owner: Option<DeclRef>) {
        self.scopes.push(Scope::new(owner));
        debug!("scope stack: pushed, depth now {}", self.scopes.len());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
        debug!("scope stack: popped, depth now {}", self.scopes.len());
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current(&self) -> &Scope {
        self.scopes.last().expect("scope stack is empty")
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("scope stack is empty")
    }

    /// The innermost declaration owning a scope on the stack.
    pub fn context(&self) -> Option<DeclRef> {
        self.scopes.iter().rev().find_map(|scope| scope.owner)
    }

    /// Innermost-first search across the stack.
    pub fn lookup(&self, name: Symbol) -> Option<&Overload> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }
}

impl Lowerer<'_> {
    /// Create a declarative binding for `d` in the current scope, setting its
    /// declaration context. Declaring the same declaration twice in one scope
    /// is a no-op, which lets the module walk lower the declarations it
    /// pre-declared.
    pub(crate) fn declare(&mut self, d: DeclRef) -> Result<(), LowerError> {
        self.ast.get_decl(d).context.set(self.stack.context());

        let Some(name) = self.ast.get_decl(d).name else {
            // Anonymous declarations (flow entries, extractions) bind nothing.
            return Ok(());
        };
        debug!("declare `{}` at depth {}", name, self.stack.depth());

        if self.stack.current().lookup(name).is_some() {
            return self.overload(name, d);
        }
        self.stack.current_mut().bind(name).push(d);
        Ok(())
    }

    /// Determine whether `curr` can join the overload set already bound to
    /// `name` in the current scope, and append it if so.
    fn overload(&mut self, name: Symbol, curr: DeclRef) -> Result<(), LowerError> {
        let set = self
            .stack
            .current()
            .lookup(name)
            .cloned()
            .expect("overload set exists");
        for prev in set {
            if prev == curr {
                return Ok(());
            }
            // Same type is not overloading, it is redefinition.
            if self.ast.get_decl(prev).ty == self.ast.get_decl(curr).ty {
                return Err(LowerError::Redefinition {
                    name,
                    first_def: self.ast.get_decl(prev).span,
                    second_def: self.ast.get_decl(curr).span,
                });
            }
            if !self.elab.can_overload(self.ast, self.types, prev, curr) {
                return Err(LowerError::BadOverload {
                    name,
                    first_def: self.ast.get_decl(prev).span,
                    second_def: self.ast.get_decl(curr).span,
                });
            }
        }
        self.stack.current_mut().bind(name).push(curr);
        Ok(())
    }

    /// Bring an already-declared entity back into view in the current scope,
    /// skipping the overload check.
    pub(crate) fn redeclare(&mut self, d: DeclRef) {
        let node = self.ast.get_decl(d);
        if node.context.get().is_none() {
            node.context.set(self.stack.context());
        }
        let Some(name) = node.name else {
            return;
        };
        debug!("redeclare `{}` at depth {}", name, self.stack.depth());
        self.stack.current_mut().bind(name).push(d);
    }

    /// Search enclosing scopes for the innermost binding of `name`.
    pub fn unqualified_lookup(&self, name: Symbol) -> Option<&Overload> {
        self.stack.lookup(name)
    }

    /// Search only the given scope for a binding of `name`.
    pub fn qualified_lookup<'s>(scope: &'s Scope, name: Symbol) -> Option<&'s Overload> {
        scope.lookup(name)
    }
}
