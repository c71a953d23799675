use crate::ast::*;

pub fn to_sexp(program: &Program) -> String {
    let mut buf = String::new();
    for statement in &program.statements {
        sexp_node(&mut buf, statement);
        buf.push('\n');
    }
    buf
}

pub fn to_json(program: &Program) -> serde_json::Result<String> {
    serde_json::to_string_pretty(program)
}

fn sexp_body(buf: &mut String, body: &[Node]) {
    buf.push_str("(block");
    for statement in body {
        buf.push(' ');
        sexp_node(buf, statement);
    }
    buf.push(')');
}

fn sexp_param(buf: &mut String, param: &Param) {
    buf.push_str(&param.name);
    if param.ty != TypeTag::Any {
        buf.push(':');
        buf.push_str(&param.ty.to_string());
    }
    if let Some(ref default) = param.default {
        buf.push('=');
        sexp_node(buf, default);
    }
}

fn sexp_condition(buf: &mut String, c: &Condition) {
    buf.push('(');
    buf.push_str(&c.kind.to_string());
    if let Some(ref test) = c.test {
        buf.push(' ');
        sexp_node(buf, test);
    }
    buf.push(' ');
    sexp_body(buf, &c.body);
    if let Some(ref other) = c.other {
        buf.push(' ');
        sexp_condition(buf, other);
    }
    buf.push(')');
}

fn sexp_node(buf: &mut String, node: &Node) {
    match node {
        Node::Literal(l) => match &l.value {
            LiteralValue::Integer(n) => buf.push_str(&n.to_string()),
            LiteralValue::Decimal(n) => buf.push_str(&format!("{n:?}")),
            LiteralValue::String(s) => buf.push_str(&format!("{s:?}")),
            LiteralValue::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
            LiteralValue::Null => buf.push_str("null"),
        },
        Node::VariableRef(v) => match v.scope {
            VariableScope::Local => buf.push_str(&v.name),
            VariableScope::Global => {
                buf.push_str("(global ");
                buf.push_str(&v.name);
                buf.push(')');
            }
        },
        Node::BinaryOperator(b) => {
            buf.push('(');
            buf.push_str(&b.operator.to_string());
            buf.push(' ');
            sexp_node(buf, &b.left);
            buf.push(' ');
            sexp_node(buf, &b.right);
            buf.push(')');
        }
        Node::UnaryOperator(u) => {
            buf.push('(');
            buf.push_str(&u.operator.to_string());
            buf.push(' ');
            sexp_node(buf, &u.operand);
            buf.push(')');
        }
        Node::Assignment(a) => {
            buf.push('(');
            buf.push_str(&a.kind.to_string());
            buf.push(' ');
            sexp_node(buf, &a.target);
            buf.push(' ');
            sexp_node(buf, &a.value);
            buf.push(')');
        }
        Node::Container(c) => {
            buf.push_str("(list");
            for item in &c.items {
                buf.push(' ');
                sexp_node(buf, item);
            }
            buf.push(')');
        }
        Node::FunctionDef(f) => {
            buf.push_str("(funk ");
            buf.push_str(&f.name);
            buf.push_str(" (");
            for (i, param) in f.params.iter().enumerate() {
                if i > 0 {
                    buf.push(' ');
                }
                sexp_param(buf, param);
            }
            buf.push_str(") ");
            sexp_body(buf, &f.body);
            buf.push(')');
        }
        Node::CallExpression(c) => {
            buf.push_str("(call ");
            buf.push_str(&c.callee);
            for arg in &c.arguments {
                buf.push(' ');
                sexp_node(buf, arg);
            }
            buf.push(')');
        }
        Node::Condition(c) => sexp_condition(buf, c),
        Node::WhileLoop(w) => {
            buf.push_str("(while ");
            sexp_node(buf, &w.test);
            buf.push(' ');
            sexp_body(buf, &w.body);
            if let Some(ref other) = w.other {
                buf.push(' ');
                sexp_condition(buf, other);
            }
            buf.push(')');
        }
        Node::Print(p) => {
            buf.push_str("(print ");
            sexp_node(buf, &p.expression);
            buf.push(')');
        }
        Node::Return(r) => {
            buf.push_str("(return");
            if let Some(ref val) = r.value {
                buf.push(' ');
                sexp_node(buf, val);
            }
            buf.push(')');
        }
    }
}
