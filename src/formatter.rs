//! Canonical debug stringification of a parsed [`Program`].
//!
//! Every node prints as `$TAG(field=(...) ...)`; list fields are written
//! `name[]=(a b)` and optional fields are left out when absent. The format is
//! meant for fixtures and the CLI `dump` command, not as a wire format.

use crate::ast::{
    Block, Branch, ClassDecl, Expr, ExprKind, FuncCall, FunctionDecl, GetterDecl, HashMapEntry,
    Ident, Import, Iterate, MemberAccess, Param, Program, PropertyDecl, Receiver, Stmt, StmtKind,
    VarGroup,
};

/// Format a `Program` into its canonical debug string.
#[must_use]
pub fn format(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("$PG(");
    format_list(&mut out, "stmts", &program.stmts, format_stmt);
    out.push(')');
    out
}

fn format_list<T>(out: &mut String, name: &str, items: &[T], each: fn(&mut String, &T)) {
    out.push_str(name);
    out.push_str("[]=(");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        each(out, item);
    }
    out.push(')');
}

/// `name=(` + body + `)`
fn field(out: &mut String, name: &str, body: impl FnOnce(&mut String)) {
    out.push_str(name);
    out.push_str("=(");
    body(out);
    out.push(')');
}

fn text_field(out: &mut String, name: &str, text: &str) {
    field(out, name, |out| out.push_str(text));
}

fn bool_field(out: &mut String, name: &str, value: bool) {
    text_field(out, name, if value { "true" } else { "false" });
}

fn format_block(out: &mut String, block: &Block) {
    out.push_str("$BK(");
    format_list(out, "stmts", &block.stmts, format_stmt);
    out.push(')');
}

fn format_ident(out: &mut String, ident: &Ident) {
    out.push_str("$ID(");
    out.push_str(&ident.name);
    out.push(')');
}

fn format_stmt(out: &mut String, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::VarDeclare(groups) => {
            out.push_str("$VD(");
            format_list(out, "groups", groups, format_var_group);
            out.push(')');
        }
        StmtKind::Branch(branch) => format_branch(out, branch),
        StmtKind::WhileLoop { cond, body } => {
            out.push_str("$WL(");
            field(out, "cond", |out| format_expr(out, cond));
            out.push(' ');
            field(out, "block", |out| format_block(out, body));
            out.push(')');
        }
        StmtKind::Iterate(iterate) => format_iterate(out, iterate),
        StmtKind::FunctionDeclare(func) => format_function(out, func),
        StmtKind::ClassDeclare(class) => format_class(out, class),
        StmtKind::Return(value) => {
            out.push_str("$RT(");
            if let Some(value) = value {
                field(out, "expr", |out| format_expr(out, value));
            }
            out.push(')');
        }
        StmtKind::Import(import) => format_import(out, import),
        StmtKind::Empty => out.push_str("$EM()"),
        StmtKind::Break => out.push_str("$BRK()"),
        StmtKind::Continue => out.push_str("$CTN()"),
        StmtKind::Expression(expr) => format_expr(out, expr),
    }
}

fn format_var_group(out: &mut String, group: &VarGroup) {
    out.push_str("$VG(");
    format_list(out, "vars", &group.vars, format_ident);
    out.push(' ');
    bool_field(out, "const", group.constant);
    out.push(' ');
    field(out, "expr", |out| format_expr(out, &group.value));
    out.push(')');
}

fn format_branch(out: &mut String, branch: &Branch) {
    out.push_str("$IF(");
    field(out, "cond", |out| format_expr(out, &branch.cond));
    out.push(' ');
    field(out, "block", |out| format_block(out, &branch.body));
    out.push(' ');
    format_list(out, "elif", &branch.else_ifs, |out, arm| {
        out.push_str("$EIF(");
        field(out, "cond", |out| format_expr(out, &arm.cond));
        out.push(' ');
        field(out, "block", |out| format_block(out, &arm.body));
        out.push(')');
    });
    if let Some(body) = &branch.else_body {
        out.push(' ');
        field(out, "else", |out| format_block(out, body));
    }
    out.push(')');
}

fn format_iterate(out: &mut String, iterate: &Iterate) {
    out.push_str("$IT(");
    field(out, "target", |out| format_expr(out, &iterate.target));
    if let Some(key) = &iterate.key {
        out.push(' ');
        field(out, "key", |out| format_ident(out, key));
    }
    if let Some(value) = &iterate.value {
        out.push(' ');
        field(out, "value", |out| format_ident(out, value));
    }
    out.push(' ');
    field(out, "block", |out| format_block(out, &iterate.body));
    out.push(')');
}

fn format_param(out: &mut String, param: &Param) {
    out.push_str("$PM(");
    field(out, "id", |out| format_ident(out, &param.name));
    out.push(' ');
    bool_field(out, "ref", param.by_ref);
    out.push(')');
}

fn format_function(out: &mut String, func: &FunctionDecl) {
    out.push_str("$FN(");
    field(out, "name", |out| format_ident(out, &func.name));
    out.push(' ');
    format_list(out, "params", &func.params, format_param);
    out.push(' ');
    field(out, "block", |out| format_block(out, &func.body));
    out.push(')');
}

fn format_class(out: &mut String, class: &ClassDecl) {
    out.push_str("$CLS(");
    field(out, "name", |out| format_ident(out, &class.name));
    out.push(' ');
    format_list(out, "props", &class.properties, format_property);
    out.push(' ');
    format_list(out, "ctor", &class.constructor, format_param);
    out.push(' ');
    format_list(out, "methods", &class.methods, format_function);
    out.push(' ');
    format_list(out, "getters", &class.getters, format_getter);
    out.push(')');
}

fn format_property(out: &mut String, prop: &PropertyDecl) {
    out.push_str("$PD(");
    field(out, "id", |out| format_ident(out, &prop.name));
    out.push(' ');
    field(out, "expr", |out| format_expr(out, &prop.init));
    out.push(')');
}

fn format_getter(out: &mut String, getter: &GetterDecl) {
    out.push_str("$GT(");
    field(out, "name", |out| format_ident(out, &getter.name));
    out.push(' ');
    field(out, "block", |out| format_block(out, &getter.body));
    out.push(')');
}

fn format_import(out: &mut String, import: &Import) {
    out.push_str("$IM(");
    text_field(out, "name", &import.module);
    out.push(' ');
    format_list(out, "items", &import.items, format_ident);
    out.push(')');
}

fn format_expr(out: &mut String, expr: &Expr) {
    match &expr.kind {
        ExprKind::Identifier(name) => {
            out.push_str("$ID(");
            out.push_str(name);
            out.push(')');
        }
        ExprKind::Number(text) => {
            out.push_str("$NUM(");
            out.push_str(text);
            out.push(')');
        }
        ExprKind::String(text) => {
            out.push_str("$STR(");
            out.push_str(text);
            out.push(')');
        }
        ExprKind::Array(items) => {
            out.push_str("$ARR(");
            format_list(out, "items", items, format_expr);
            out.push(')');
        }
        ExprKind::HashMap(entries) => {
            out.push_str("$HM(");
            format_list(out, "entries", entries, format_entry);
            out.push(')');
        }
        ExprKind::Logic { op, left, right } => {
            format_binary(out, "$LGC", op.tag(), left, right);
        }
        ExprKind::Arith { op, left, right } => {
            format_binary(out, "$ARI", op.tag(), left, right);
        }
        ExprKind::Member { root, access } => {
            out.push_str("$MB(");
            format_receiver(out, root);
            out.push(' ');
            match access {
                MemberAccess::Property(id) => {
                    text_field(out, "type", "prop");
                    out.push(' ');
                    field(out, "id", |out| format_ident(out, id));
                }
                MemberAccess::Index(index) => {
                    text_field(out, "type", "index");
                    out.push(' ');
                    field(out, "index", |out| format_expr(out, index));
                }
            }
            out.push(')');
        }
        ExprKind::FuncCall(call) => format_call(out, call),
        ExprKind::MemberMethod { root, chain } => {
            out.push_str("$MM(");
            format_receiver(out, root);
            out.push(' ');
            format_list(out, "chain", chain, format_call);
            out.push(')');
        }
        ExprKind::VarAssign {
            target,
            value,
            by_ref,
        } => {
            out.push_str("$VA(");
            field(out, "target", |out| format_expr(out, target));
            out.push(' ');
            bool_field(out, "ref", *by_ref);
            out.push(' ');
            field(out, "assign", |out| format_expr(out, value));
            out.push(')');
        }
        ExprKind::ObjNew { class, params } => {
            out.push_str("$ON(");
            field(out, "class", |out| format_ident(out, class));
            out.push(' ');
            format_list(out, "params", params, format_expr);
            out.push(')');
        }
    }
}

fn format_binary(out: &mut String, tag: &str, op: &str, left: &Expr, right: &Expr) {
    out.push_str(tag);
    out.push('(');
    text_field(out, "type", op);
    out.push(' ');
    field(out, "left", |out| format_expr(out, left));
    out.push(' ');
    field(out, "right", |out| format_expr(out, right));
    out.push(')');
}

fn format_receiver(out: &mut String, root: &Receiver) {
    field(out, "root", |out| match root {
        Receiver::This => out.push_str("this"),
        Receiver::Expr(expr) => format_expr(out, expr),
    });
}

fn format_entry(out: &mut String, entry: &HashMapEntry) {
    out.push_str("$HMI(");
    field(out, "key", |out| format_expr(out, &entry.key));
    out.push(' ');
    field(out, "value", |out| format_expr(out, &entry.value));
    out.push(')');
}

fn format_call(out: &mut String, call: &FuncCall) {
    out.push_str("$FC(");
    field(out, "name", |out| format_ident(out, &call.name));
    out.push(' ');
    format_list(out, "params", &call.params, format_expr);
    if let Some(target) = &call.yield_to {
        out.push(' ');
        field(out, "yield", |out| format_ident(out, target));
    }
    out.push(')');
}
