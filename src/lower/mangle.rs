//! Name mangling for synthesized load variables.
//!
//! Every extraction declares a variable holding the loaded field value; its
//! name is derived from the field's dotted path so that field references can
//! be resolved against it by ordinary scope lookup. The scheme must be
//! stable across runs and yield legal identifiers for the emitter.

use thin_vec::{ThinVec, thin_vec};

use crate::ast::{Ast, ExprKind, ExprRef, Symbol};

/// Mangled variable name for a field path: the segments joined with `_`,
/// e.g. `eth.src` becomes `eth_src`. Distinct (layout, field) pairs map to
/// distinct names as long as segment names avoid underscores; a collision
/// surfaces as a redefinition when the load variable is declared.
pub fn mangle(segments: &[Symbol]) -> Symbol {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('_');
        }
        out.push_str(segment.as_str());
    }
    Symbol::from(out.as_str())
}

/// The path segments of a field-name expression. Plain identifiers are
/// treated as single-segment paths (rebind aliases are often bare names).
pub fn field_segments(ast: &Ast, field: ExprRef) -> Option<ThinVec<Symbol>> {
    match &ast.get_expr(field).kind {
        ExprKind::FieldName { segments } => Some(segments.clone()),
        ExprKind::Id { name, .. } => Some(thin_vec![*name]),
        _ => None,
    }
}
