use thin_vec::ThinVec;

use crate::ast::{Ast, Decl, DeclKind, DeclRef, Expr, ExprKind, Stmt, StmtKind, Symbol, TypeRef, TypeRegistry};
use crate::diagnostic::LowerError;
use crate::elaborate::CallTyper;
use crate::lower::Lowerer;
use crate::pipeline::FieldMap;
use crate::source_manager::SourceSpan;

fn span() -> SourceSpan {
    SourceSpan::synthesized()
}

fn int_var(ast: &mut Ast, types: &TypeRegistry, name: &str) -> DeclRef {
    let init = ast.push_expr(Expr::with_type(
        ExprKind::LiteralInt(0),
        span(),
        Some(types.type_int),
    ));
    ast.push_decl(Decl::new(
        DeclKind::Variable { init },
        Some(Symbol::from(name)),
        Some(types.type_int),
        span(),
    ))
}

fn function(ast: &mut Ast, types: &mut TypeRegistry, name: &str, params: &[TypeRef], ret: TypeRef) -> DeclRef {
    let fn_ty = types.function_type(params.to_vec(), ret, false);
    let body = ast.push_stmt(Stmt::new(StmtKind::Empty, span()));
    ast.push_decl(Decl::new(
        DeclKind::Function {
            params: ThinVec::new(),
            body,
        },
        Some(Symbol::from(name)),
        Some(fn_ty),
        span(),
    ))
}

#[test]
fn test_declare_then_lookup() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let x = int_var(&mut ast, &types, "x");

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(x).unwrap();

    let found = lowerer.unqualified_lookup(Symbol::from("x")).unwrap();
    assert_eq!(found.as_slice(), &[x]);
    assert!(lowerer.unqualified_lookup(Symbol::from("y")).is_none());
}

#[test]
fn test_lookup_is_innermost_first() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let outer = int_var(&mut ast, &types, "x");
    let inner = int_var(&mut ast, &types, "x");

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(outer).unwrap();
    lowerer.stack.push(None);
    lowerer.declare(inner).unwrap();

    let found = lowerer.unqualified_lookup(Symbol::from("x")).unwrap();
    assert_eq!(found.as_slice(), &[inner]);

    lowerer.stack.pop();
    let found = lowerer.unqualified_lookup(Symbol::from("x")).unwrap();
    assert_eq!(found.as_slice(), &[outer]);
}

#[test]
fn test_qualified_lookup_is_scope_local() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let x = int_var(&mut ast, &types, "x");

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(x).unwrap();
    lowerer.stack.push(None);

    // the inner scope has no binding of its own
    assert!(Lowerer::qualified_lookup(lowerer.stack.current(), Symbol::from("x")).is_none());
    assert!(lowerer.unqualified_lookup(Symbol::from("x")).is_some());
}

#[test]
fn test_redefinition_in_one_scope() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let first = int_var(&mut ast, &types, "x");
    let second = int_var(&mut ast, &types, "x");

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(first).unwrap();
    let err = lowerer.declare(second).unwrap_err();
    assert!(matches!(err, LowerError::Redefinition { name, .. } if name.as_str() == "x"));
}

#[test]
fn test_declaring_the_same_decl_twice_is_a_noop() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let x = int_var(&mut ast, &types, "x");

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(x).unwrap();
    lowerer.declare(x).unwrap();

    let found = lowerer.unqualified_lookup(Symbol::from("x")).unwrap();
    assert_eq!(found.as_slice(), &[x]);
}

#[test]
fn test_functions_overload_on_parameter_types() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let int = types.type_int;
    let boolean = types.type_bool;
    let void = types.type_void;
    let f1 = function(&mut ast, &mut types, "f", &[int], void);
    let f2 = function(&mut ast, &mut types, "f", &[boolean], void);

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(f1).unwrap();
    lowerer.declare(f2).unwrap();

    let found = lowerer.unqualified_lookup(Symbol::from("f")).unwrap();
    assert_eq!(found.as_slice(), &[f1, f2]);
}

#[test]
fn test_same_signature_is_redefinition_not_overload() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let int = types.type_int;
    let void = types.type_void;
    let f1 = function(&mut ast, &mut types, "f", &[int], void);
    let f2 = function(&mut ast, &mut types, "f", &[int], void);

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(f1).unwrap();
    let err = lowerer.declare(f2).unwrap_err();
    assert!(matches!(err, LowerError::Redefinition { .. }));
}

#[test]
fn test_overload_denied_for_non_functions() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let int = types.type_int;
    let void = types.type_void;
    let var = int_var(&mut ast, &types, "f");
    let func = function(&mut ast, &mut types, "f", &[int], void);

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(var).unwrap();
    let err = lowerer.declare(func).unwrap_err();
    assert!(matches!(err, LowerError::BadOverload { .. }));
}

#[test]
fn test_redeclare_skips_the_overload_check() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let first = int_var(&mut ast, &types, "x");
    let second = int_var(&mut ast, &types, "x");

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    lowerer.declare(first).unwrap();
    lowerer.redeclare(second);

    let found = lowerer.unqualified_lookup(Symbol::from("x")).unwrap();
    assert_eq!(found.as_slice(), &[first, second]);
}

#[test]
fn test_scope_is_popped_on_error_paths() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(None);
    let depth = lowerer.stack.depth();

    let result: Result<(), LowerError> = lowerer.scoped(None, |_| {
        Err(LowerError::UnknownBuiltin {
            name: String::from("fp_nothing"),
        })
    });
    assert!(result.is_err());
    assert_eq!(lowerer.stack.depth(), depth);
}

#[test]
fn test_declare_sets_the_declaration_context() {
    let mut ast = Ast::new();
    let mut types = TypeRegistry::new();
    let fields = FieldMap::new();
    let typer = CallTyper::new();
    let int = types.type_int;
    let void = types.type_void;
    let owner = function(&mut ast, &mut types, "f", &[int], void);
    let x = int_var(&mut ast, &types, "x");

    let mut lowerer = Lowerer::new(&mut ast, &mut types, &fields, &typer);
    lowerer.stack.push(Some(owner));
    lowerer.declare(x).unwrap();
    assert_eq!(lowerer.ast.get_decl(x).context.get(), Some(owner));
}
