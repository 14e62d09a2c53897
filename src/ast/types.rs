//! Canonical type representation and the interning registry.
//!
//! Types are stored in a registry separate from the AST arena and are
//! hash-consed: interning the same structure twice yields the same
//! [`TypeRef`], so reference equality is structural equality for scalars,
//! references, and function types. Records and layouts are keyed by their
//! declaration, which makes their equality identity-based.

use hashbrown::HashMap;

use crate::ast::{DeclRef, TypeRef};

/// The kind of type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Int,
    Bool,
    Void,
    /// Reference to another type.
    Reference(TypeRef),
    Function {
        params: Vec<TypeRef>,
        ret: TypeRef,
        variadic: bool,
    },
    /// A user-defined record, identified by its declaration.
    Record(DeclRef),
    /// A packet header layout, identified by its declaration.
    Layout(DeclRef),
    /// The opaque runtime structure carrying the packet cursor and the
    /// environment of bound fields.
    Context,
    /// An opaque runtime flow table handle.
    Table,
    /// An opaque runtime port handle.
    Port,
}

/// Type storage with hash-consing.
#[derive(Debug)]
pub struct TypeRegistry {
    types: Vec<TypeKind>,
    cache: HashMap<TypeKind, TypeRef>,
    pub type_int: TypeRef,
    pub type_bool: TypeRef,
    pub type_void: TypeRef,
    pub type_context: TypeRef,
    pub type_table: TypeRef,
    pub type_port: TypeRef,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: Vec::new(),
            cache: HashMap::new(),
            type_int: TypeRef::new(1).unwrap(),
            type_bool: TypeRef::new(1).unwrap(),
            type_void: TypeRef::new(1).unwrap(),
            type_context: TypeRef::new(1).unwrap(),
            type_table: TypeRef::new(1).unwrap(),
            type_port: TypeRef::new(1).unwrap(),
        };
        registry.type_int = registry.intern(TypeKind::Int);
        registry.type_bool = registry.intern(TypeKind::Bool);
        registry.type_void = registry.intern(TypeKind::Void);
        registry.type_context = registry.intern(TypeKind::Context);
        registry.type_table = registry.intern(TypeKind::Table);
        registry.type_port = registry.intern(TypeKind::Port);
        registry
    }

    /// Intern a type, returning the canonical reference for its structure.
    pub fn intern(&mut self, kind: TypeKind) -> TypeRef {
        if let Some(&existing) = self.cache.get(&kind) {
            return existing;
        }
        let index = self.types.len() as u32 + 1;
        self.types.push(kind.clone());
        let type_ref = TypeRef::new(index).expect("TypeRef overflow");
        self.cache.insert(kind, type_ref);
        type_ref
    }

    /// Get a type by its reference
    pub fn get(&self, index: TypeRef) -> &TypeKind {
        &self.types[(index.get() - 1) as usize]
    }

    pub fn reference_to(&mut self, target: TypeRef) -> TypeRef {
        self.intern(TypeKind::Reference(target))
    }

    pub fn function_type(&mut self, params: Vec<TypeRef>, ret: TypeRef, variadic: bool) -> TypeRef {
        self.intern(TypeKind::Function { params, ret, variadic })
    }

    pub fn record_type(&mut self, decl: DeclRef) -> TypeRef {
        self.intern(TypeKind::Record(decl))
    }

    pub fn layout_type(&mut self, decl: DeclRef) -> TypeRef {
        self.intern(TypeKind::Layout(decl))
    }

    /// The return type of a function type, or `None` for non-function types.
    pub fn return_type(&self, fn_ty: TypeRef) -> Option<TypeRef> {
        match self.get(fn_ty) {
            TypeKind::Function { ret, .. } => Some(*ret),
            _ => None,
        }
    }

    /// The parameter types of a function type, or `None` for non-function
    /// types.
    pub fn param_types(&self, fn_ty: TypeRef) -> Option<&[TypeRef]> {
        match self.get(fn_ty) {
            TypeKind::Function { params, .. } => Some(params),
            _ => None,
        }
    }
}
