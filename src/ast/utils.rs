//! Declaration and layout queries over the flattened AST.

use crate::ast::{Ast, DeclKind, DeclRef, Symbol};

/// Returns true if `v` is a variable declared at module scope.
pub fn is_global_variable(ast: &Ast, v: DeclRef) -> bool {
    let decl = ast.get_decl(v);
    if !matches!(decl.kind, DeclKind::Variable { .. }) {
        return false;
    }
    match decl.context.get() {
        Some(cxt) => matches!(ast.get_decl(cxt).kind, DeclKind::Module { .. }),
        None => false,
    }
}

/// Returns true if `v` is a variable declared inside a function.
pub fn is_local_variable(ast: &Ast, v: DeclRef) -> bool {
    let decl = ast.get_decl(v);
    if !matches!(decl.kind, DeclKind::Variable { .. }) {
        return false;
    }
    match decl.context.get() {
        Some(cxt) => matches!(
            ast.get_decl(cxt).kind,
            DeclKind::Function { .. } | DeclKind::Decode { .. }
        ),
        None => false,
    }
}

/// Returns true if the declaration defines an object.
pub fn defines_object(ast: &Ast, d: DeclRef) -> bool {
    matches!(
        ast.get_decl(d).kind,
        DeclKind::Variable { .. }
            | DeclKind::Parameter
            | DeclKind::Field
            | DeclKind::Table { .. }
            | DeclKind::Flow { .. }
            | DeclKind::Port
    )
}

/// Returns true if the declaration is a top-level pipeline declaration:
/// a decoder, a layout, or a table.
pub fn is_pipeline_decl(ast: &Ast, d: DeclRef) -> bool {
    matches!(
        ast.get_decl(d).kind,
        DeclKind::Decode { .. } | DeclKind::Layout { .. } | DeclKind::Table { .. }
    )
}

/// Returns the field with the given name within a layout or record, or
/// `None` if no field with that name exists.
pub fn find_field(ast: &Ast, owner: DeclRef, name: Symbol) -> Option<DeclRef> {
    let fields = match &ast.get_decl(owner).kind {
        DeclKind::Layout { fields } => fields,
        DeclKind::Record { fields } => fields,
        _ => return None,
    };
    fields
        .iter()
        .copied()
        .find(|&f| ast.get_decl(f).name == Some(name))
}

/// Returns the index of the field `f` within a layout or record, or `None`
/// if the field is not a member.
pub fn field_index(ast: &Ast, owner: DeclRef, f: DeclRef) -> Option<usize> {
    let fields = match &ast.get_decl(owner).kind {
        DeclKind::Layout { fields } => fields,
        DeclKind::Record { fields } => fields,
        _ => return None,
    };
    fields.iter().position(|&m| m == f)
}

/// Render a field path as its dotted source form, e.g. `eth.src`.
pub fn dotted(segments: &[Symbol]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(segment.as_str());
    }
    out
}
