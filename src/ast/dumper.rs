//! Deterministic textual rendering of AST subtrees.
//!
//! The dumper prints declarations, statements, and expressions in a stable
//! surface-like form. It is used by tests to assert the shape of lowered
//! code and by debugging output.

use crate::ast::{Ast, DeclKind, ExprKind, ExprRef, StmtKind, StmtRef, TableKind, TypeKind, TypeRef, TypeRegistry};
use crate::ast::{DeclRef, utils};

/// Render a declaration subtree as text.
pub fn dump_decl(ast: &Ast, types: &TypeRegistry, decl: DeclRef) -> String {
    let mut dumper = Dumper::new(ast, types);
    dumper.write_decl(decl);
    dumper.finish()
}

/// Render a statement subtree as text.
pub fn dump_stmt(ast: &Ast, types: &TypeRegistry, stmt: StmtRef) -> String {
    let mut dumper = Dumper::new(ast, types);
    dumper.write_stmt(stmt);
    dumper.finish()
}

/// Render an expression as text.
pub fn dump_expr(ast: &Ast, types: &TypeRegistry, expr: ExprRef) -> String {
    let dumper = Dumper::new(ast, types);
    dumper.expr_string(expr, false)
}

pub struct Dumper<'a> {
    ast: &'a Ast,
    types: &'a TypeRegistry,
    out: String,
    indent: usize,
}

impl<'a> Dumper<'a> {
    pub fn new(ast: &'a Ast, types: &'a TypeRegistry) -> Self {
        Dumper {
            ast,
            types,
            out: String::new(),
            indent: 0,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn type_string(&self, ty: TypeRef) -> String {
        match self.types.get(ty) {
            TypeKind::Int => "int".to_string(),
            TypeKind::Bool => "bool".to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::Reference(target) => format!("&{}", self.type_string(*target)),
            TypeKind::Function { params, ret, variadic } => {
                let mut parts: Vec<String> = params.iter().map(|&p| self.type_string(p)).collect();
                if *variadic {
                    parts.push("...".to_string());
                }
                format!("({}) -> {}", parts.join(", "), self.type_string(*ret))
            }
            TypeKind::Record(decl) | TypeKind::Layout(decl) => self.decl_name(*decl),
            TypeKind::Context => "Context".to_string(),
            TypeKind::Table => "Table".to_string(),
            TypeKind::Port => "Port".to_string(),
        }
    }

    fn decl_name(&self, decl: DeclRef) -> String {
        match self.ast.get_decl(decl).name {
            Some(name) => name.as_str().to_string(),
            None => "<anonymous>".to_string(),
        }
    }

    pub fn expr_string(&self, expr: ExprRef, nested: bool) -> String {
        match &self.ast.get_expr(expr).kind {
            ExprKind::LiteralInt(value) => value.to_string(),
            ExprKind::LiteralBool(value) => value.to_string(),
            ExprKind::Id { name, .. } => name.as_str().to_string(),
            ExprKind::Unary { op, operand } => {
                format!("{}{}", op.symbol(), self.expr_string(*operand, true))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let text = format!(
                    "{} {} {}",
                    self.expr_string(*lhs, true),
                    op.symbol(),
                    self.expr_string(*rhs, true)
                );
                if nested { format!("({})", text) } else { text }
            }
            ExprKind::Call { callee, args } => {
                let rendered: Vec<String> = args.iter().map(|&a| self.expr_string(a, true)).collect();
                format!("{}({})", self.expr_string(*callee, true), rendered.join(", "))
            }
            ExprKind::FieldName { segments } => utils::dotted(segments),
        }
    }

    /// Write a substatement: blocks open on the current line, anything else
    /// is indented underneath.
    fn write_body(&mut self, header: String, body: StmtRef) {
        if let StmtKind::Block(stmts) = &self.ast.get_stmt(body).kind {
            let stmts = stmts.clone();
            self.line(&format!("{} {{", header));
            self.indent += 1;
            for stmt in stmts {
                self.write_stmt(stmt);
            }
            self.indent -= 1;
            self.line("}");
        } else {
            self.line(&header);
            self.indent += 1;
            self.write_stmt(body);
            self.indent -= 1;
        }
    }

    pub fn write_stmt(&mut self, stmt: StmtRef) {
        let kind = self.ast.get_stmt(stmt).kind.clone();
        match kind {
            StmtKind::Empty => self.line(";"),
            StmtKind::Block(stmts) => {
                self.line("{");
                self.indent += 1;
                for child in stmts {
                    self.write_stmt(child);
                }
                self.indent -= 1;
                self.line("}");
            }
            StmtKind::IfThen { cond, body } => {
                let header = format!("if ({})", self.expr_string(cond, false));
                self.write_body(header, body);
            }
            StmtKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                let header = format!("if ({})", self.expr_string(cond, false));
                self.write_body(header, then_branch);
                self.write_body("else".to_string(), else_branch);
            }
            StmtKind::Match { cond, cases } => {
                let header = format!("match ({}) {{", self.expr_string(cond, false));
                self.line(&header);
                self.indent += 1;
                for case in cases {
                    self.write_stmt(case);
                }
                self.indent -= 1;
                self.line("}");
            }
            StmtKind::Case { label, body } => {
                let header = format!("case {}:", self.expr_string(label, false));
                self.write_body(header, body);
            }
            StmtKind::While { cond, body } => {
                let header = format!("while ({})", self.expr_string(cond, false));
                self.write_body(header, body);
            }
            StmtKind::Expression(expr) => {
                let text = format!("{};", self.expr_string(expr, false));
                self.line(&text);
            }
            StmtKind::Declaration(decl) => self.write_decl(decl),
            StmtKind::Decode { target } => {
                let text = format!("decode {};", self.expr_string(target, false));
                self.line(&text);
            }
            StmtKind::Goto { target } => {
                let text = format!("goto {};", self.expr_string(target, false));
                self.line(&text);
            }
            StmtKind::Drop => self.line("drop;"),
            StmtKind::Output { port } => {
                let text = format!("output {};", self.expr_string(port, false));
                self.line(&text);
            }
        }
    }

    fn param_string(&self, param: DeclRef) -> String {
        let decl = self.ast.get_decl(param);
        let name = self.decl_name(param);
        match decl.ty {
            Some(ty) => format!("{}: {}", name, self.type_string(ty)),
            None => name,
        }
    }

    fn write_fields(&mut self, header: String, fields: &[DeclRef]) {
        self.line(&format!("{} {{", header));
        self.indent += 1;
        for &field in fields {
            let text = match self.ast.get_decl(field).ty {
                Some(ty) => format!("{}: {};", self.decl_name(field), self.type_string(ty)),
                None => format!("{};", self.decl_name(field)),
            };
            self.line(&text);
        }
        self.indent -= 1;
        self.line("}");
    }

    pub fn write_decl(&mut self, decl: DeclRef) {
        let node = self.ast.get_decl(decl);
        let kind = node.kind.clone();
        let ty = node.ty;
        let foreign = node.is_foreign();
        match kind {
            DeclKind::Variable { init } => {
                let text = match ty {
                    Some(ty) => format!(
                        "var {}: {} = {};",
                        self.decl_name(decl),
                        self.type_string(ty),
                        self.expr_string(init, false)
                    ),
                    None => format!("var {} = {};", self.decl_name(decl), self.expr_string(init, false)),
                };
                self.line(&text);
            }
            DeclKind::Function { params, body } => {
                let rendered: Vec<String> = params.iter().map(|&p| self.param_string(p)).collect();
                let ret = ty
                    .and_then(|ty| self.types.return_type(ty))
                    .map(|ret| self.type_string(ret));
                let mut header = format!("fn {}({})", self.decl_name(decl), rendered.join(", "));
                if let Some(ret) = ret
                    && ret != "void"
                {
                    header.push_str(&format!(" -> {}", ret));
                }
                if foreign {
                    self.line(&format!("foreign {};", header));
                } else {
                    self.write_body(header, body);
                }
            }
            DeclKind::Parameter => {
                let text = self.param_string(decl);
                self.line(&text);
            }
            DeclKind::Record { fields } => {
                self.write_fields(format!("record {}", self.decl_name(decl)), &fields);
            }
            DeclKind::Field => {
                let text = format!("{};", self.decl_name(decl));
                self.line(&text);
            }
            DeclKind::Module { decls } => {
                for decl in decls {
                    self.write_decl(decl);
                }
            }
            DeclKind::Layout { fields } => {
                self.write_fields(format!("layout {}", self.decl_name(decl)), &fields);
            }
            DeclKind::Decode { header, body, is_start } => {
                let prefix = if is_start { "start " } else { "" };
                let text = format!("{}decoder {}({})", prefix, self.decl_name(decl), self.type_string(header));
                self.write_body(text, body);
            }
            DeclKind::Table {
                number,
                conditions,
                flows,
                kind,
                is_start,
            } => {
                let prefix = if is_start { "start " } else { "" };
                let kind = match kind {
                    TableKind::Exact => "exact_table",
                    TableKind::Wildcard => "wildcard_table",
                    TableKind::Prefix => "prefix_table",
                    TableKind::String => "string_table",
                };
                let header = format!("{}{} {}({}) {{", prefix, kind, self.decl_name(decl), number);
                self.line(&header);
                self.indent += 1;
                if !conditions.is_empty() {
                    let rendered: Vec<String> = conditions.iter().map(|&c| self.expr_string(c, true)).collect();
                    let text = format!("keys({});", rendered.join(", "));
                    self.line(&text);
                }
                for flow in flows {
                    self.write_decl(flow);
                }
                self.indent -= 1;
                self.line("}");
            }
            DeclKind::Flow {
                priority,
                keys,
                instructions,
            } => {
                let rendered: Vec<String> = keys.iter().map(|&k| self.expr_string(k, true)).collect();
                let header = format!("flow[{}]({})", priority, rendered.join(", "));
                self.write_body(header, instructions);
            }
            DeclKind::Extracts { field } => {
                let text = format!("extract {};", self.expr_string(field, false));
                self.line(&text);
            }
            DeclKind::Rebind { field, alias } => {
                let text = format!(
                    "extract {} as {};",
                    self.expr_string(field, false),
                    self.expr_string(alias, false)
                );
                self.line(&text);
            }
            DeclKind::Port => {
                let text = format!("port {};", self.decl_name(decl));
                self.line(&text);
            }
        }
    }
}
