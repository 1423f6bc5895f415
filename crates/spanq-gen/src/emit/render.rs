use spanq_common::ty::Ty;

use crate::config::EmitConfig;
use crate::ir::{Decl, Expr, ExtensionFn, FnDecl, Param, Place, Stmt, StructDecl, UnaryOp};
use crate::unit::SyntheticUnit;

use super::doc::{concat, delimited, group, hardline, indent, join, line, text, Doc};
use super::printer;

const HEADER: &str = "// Generated by spanq. Do not edit.";

/// Render `unit` as source text.
pub fn render_unit(unit: &SyntheticUnit, config: &EmitConfig) -> String {
    let decls = unit.decls().iter().map(decl);
    let doc = concat(vec![
        text(HEADER),
        hardline(),
        text(format!("unit {} {{", unit.name())),
        block_body(join(decls, || concat(vec![hardline(), hardline()]))),
        hardline(),
        text("}"),
    ]);
    printer::print(&doc, config)
}

fn decl(decl: &Decl) -> Doc {
    match decl {
        Decl::Extension(ext) => extension(ext),
        Decl::Struct(s) => structure(s),
    }
}

fn extension(ext: &ExtensionFn) -> Doc {
    concat(vec![
        text(format!("ext fn {}{}", ext.method.name(), generics(&ext.generics))),
        signature(ext.params.iter().map(param).collect(), &ext.ret),
        block(&ext.body),
    ])
}

fn structure(s: &StructDecl) -> Doc {
    let mut members = Vec::new();
    if !s.fields.is_empty() {
        let fields = s
            .fields
            .iter()
            .map(|f| text(format!("{}: {};", f.name, f.ty)));
        members.push(join(fields, hardline));
    }
    members.extend(s.methods.iter().map(method));
    concat(vec![
        text(format!("struct {}{} {{", s.name, generics(&s.generics))),
        block_body(join(members, || concat(vec![hardline(), hardline()]))),
        hardline(),
        text("}"),
    ])
}

fn method(m: &FnDecl) -> Doc {
    let mut params = vec![text("self")];
    params.extend(m.params.iter().map(param));
    concat(vec![
        text(format!("fn {}", m.name)),
        signature(params, &m.ret),
        block(&m.body),
    ])
}

fn generics(names: &[String]) -> String {
    if names.is_empty() {
        String::new()
    } else {
        format!("<{}>", names.join(", "))
    }
}

fn param(p: &Param) -> Doc {
    text(format!("{}: {}", p.name, p.ty))
}

/// `(params) -> ret `, breaking at the parameters.
fn signature(params: Vec<Doc>, ret: &Ty) -> Doc {
    concat(vec![delimited("(", params, ")"), text(format!(" -> {ret} "))])
}

/// `{ stmts }` with one statement per line.
fn block(stmts: &[Stmt]) -> Doc {
    if stmts.is_empty() {
        return text("{}");
    }
    concat(vec![
        text("{"),
        block_body(join(stmts.iter().map(stmt), hardline)),
        hardline(),
        text("}"),
    ])
}

fn block_body(inner: Doc) -> Doc {
    indent(concat(vec![hardline(), inner]))
}

fn stmt(s: &Stmt) -> Doc {
    match s {
        Stmt::Let { name, value } => concat(vec![
            text(format!("let {name} = ")),
            expr(value),
            text(";"),
        ]),
        Stmt::Assign { place, value } => {
            let target = match place {
                Place::Local(name) => name.clone(),
                Place::Field(name) => format!("self.{name}"),
            };
            concat(vec![text(format!("{target} = ")), expr(value), text(";")])
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let mut parts = vec![text("if "), expr(cond), text(" "), block(then_branch)];
            if !else_branch.is_empty() {
                parts.push(text(" else "));
                parts.push(block(else_branch));
            }
            concat(parts)
        }
        Stmt::While { cond, body } => {
            concat(vec![text("while "), expr(cond), text(" "), block(body)])
        }
        Stmt::ForEach { var, source, body } => concat(vec![
            text(format!("for {var} in ")),
            expr(source),
            text(" "),
            block(body),
        ]),
        Stmt::Return(value) => concat(vec![text("return "), expr(value), text(";")]),
        Stmt::Fail(error) => text(format!("fail {};", error.name())),
        Stmt::Expr(value) => concat(vec![expr(value), text(";")]),
    }
}

fn args(args: &[Expr]) -> Doc {
    delimited("(", args.iter().map(expr).collect(), ")")
}

fn expr(e: &Expr) -> Doc {
    match e {
        Expr::Local(name) => text(name.clone()),
        Expr::SelfRef => text("self"),
        Expr::Field(name) => text(format!("self.{name}")),
        Expr::Int(value) => text(value.to_string()),
        Expr::Bool(value) => text(value.to_string()),
        Expr::Default(ty) => text(format!("default({ty})")),
        Expr::Unary(op, operand) => {
            let inner = match (op, operand.as_ref()) {
                (_, Expr::Binary(..)) => parenthesized(operand),
                // `- -x` would read as a decrement.
                (UnaryOp::Neg, Expr::Unary(UnaryOp::Neg, _)) => parenthesized(operand),
                _ => expr(operand),
            };
            concat(vec![text(op.symbol()), inner])
        }
        Expr::Binary(op, lhs, rhs) => {
            let prec = op.precedence();
            let side = |operand: &Expr, strict: bool| match operand {
                Expr::Binary(inner, ..)
                    if inner.precedence() < prec || (strict && inner.precedence() == prec) =>
                {
                    parenthesized(operand)
                }
                _ => expr(operand),
            };
            group(concat(vec![
                side(lhs, false),
                text(format!(" {op}")),
                line(),
                side(rhs, true),
            ]))
        }
        Expr::Invoke(callee, arguments) => {
            let callee = match callee.as_ref() {
                Expr::Local(name) => text(name.clone()),
                other => parenthesized(other),
            };
            concat(vec![callee, args(arguments)])
        }
        Expr::Call {
            recv,
            method,
            args: arguments,
        } => {
            let recv = match recv.as_ref() {
                Expr::Binary(..) | Expr::Unary(..) => parenthesized(recv),
                other => expr(other),
            };
            concat(vec![recv, text(format!(".{method}")), args(arguments)])
        }
        Expr::Construct { ty, fields } => {
            if fields.is_empty() {
                return text(format!("{ty} {{}}"));
            }
            let fields = fields
                .iter()
                .map(|(name, value)| concat(vec![text(format!("{name}: ")), expr(value)]));
            group(concat(vec![
                text(format!("{ty} {{")),
                indent(concat(vec![
                    line(),
                    join(fields, || concat(vec![text(","), line()])),
                ])),
                line(),
                text("}"),
            ]))
        }
        Expr::NewList { elem, capacity } => {
            let list = Ty::list(elem.clone());
            match capacity {
                Some(n) => concat(vec![
                    text(format!("{list}::with_capacity")),
                    args(std::slice::from_ref(n)),
                ]),
                None => text(format!("{list}::new()")),
            }
        }
        Expr::NewArray { elem, len } => concat(vec![
            text(format!("{}::new", Ty::array(elem.clone()))),
            args(std::slice::from_ref(len)),
        ]),
        Expr::NewDict {
            key,
            value,
            capacity,
            comparer,
        } => {
            let dict = Ty::dictionary(key.clone(), value.clone());
            let (ctor, arguments): (&str, Vec<&Expr>) = match (capacity, comparer) {
                (None, None) => ("new", vec![]),
                (Some(n), None) => ("with_capacity", vec![n]),
                (None, Some(c)) => ("with_comparer", vec![c]),
                (Some(n), Some(c)) => ("with_capacity_and_comparer", vec![n, c]),
            };
            concat(vec![
                text(format!("{dict}::{ctor}")),
                delimited("(", arguments.into_iter().map(expr).collect(), ")"),
            ])
        }
    }
}

fn parenthesized(e: &Expr) -> Doc {
    concat(vec![text("("), expr(e), text(")")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::ir::BinaryOp;
    use crate::method::Method;

    fn local(name: &str) -> Expr {
        Expr::Local(name.to_string())
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    fn render_expr(e: &Expr) -> String {
        printer::print(&expr(e), &EmitConfig::default())
    }

    #[test]
    fn binary_parenthesizes_by_precedence() {
        let sum = binary(BinaryOp::Add, local("a"), local("b"));
        let product = binary(BinaryOp::Mul, sum.clone(), local("c"));
        assert_eq!(render_expr(&product), "(a + b) * c\n");

        let left_nested = binary(BinaryOp::Sub, sum.clone(), local("c"));
        assert_eq!(render_expr(&left_nested), "a + b - c\n");

        let right_nested = binary(BinaryOp::Sub, local("c"), sum);
        assert_eq!(render_expr(&right_nested), "c - (a + b)\n");
    }

    #[test]
    fn invoke_forms() {
        let direct = Expr::Invoke(Box::new(local("predicate")), vec![local("item")]);
        assert_eq!(render_expr(&direct), "predicate(item)\n");
        let field = Expr::Invoke(
            Box::new(Expr::Field("selector".into())),
            vec![local("item")],
        );
        assert_eq!(render_expr(&field), "(self.selector)(item)\n");
    }

    #[test]
    fn constructors() {
        let dict = Expr::NewDict {
            key: Ty::param("TKey"),
            value: Ty::param("T"),
            capacity: Some(Box::new(Expr::Int(4))),
            comparer: Some(Box::new(local("comparer"))),
        };
        assert_eq!(
            render_expr(&dict),
            "Dictionary<TKey, T>::with_capacity_and_comparer(4, comparer)\n"
        );
        let list = Expr::NewList {
            elem: Ty::int(),
            capacity: None,
        };
        assert_eq!(render_expr(&list), "List<Int>::new()\n");
        let construct = Expr::Construct {
            ty: Ty::app("WhereSpan", vec![Ty::param("T")]),
            fields: vec![
                ("source".into(), local("source")),
                ("predicate".into(), local("predicate")),
            ],
        };
        assert_eq!(
            render_expr(&construct),
            "WhereSpan<T> { source: source, predicate: predicate }\n"
        );
    }

    #[test]
    fn small_unit() {
        let ext = ExtensionFn {
            method: Method::First,
            receiver: "ReadOnlySpan".into(),
            generics: vec!["T".into()],
            params: vec![Param::new("source", Ty::read_only_span(Ty::param("T")))],
            ret: Ty::param("T"),
            body: vec![
                Stmt::If {
                    cond: binary(
                        BinaryOp::Eq,
                        Expr::Call {
                            recv: Box::new(local("source")),
                            method: "Length".into(),
                            args: vec![],
                        },
                        Expr::Int(0),
                    ),
                    then_branch: vec![Stmt::Fail(QueryError::NoElements)],
                    else_branch: vec![],
                },
                Stmt::Return(Expr::Call {
                    recv: Box::new(local("source")),
                    method: "Get".into(),
                    args: vec![Expr::Int(0)],
                }),
            ],
        };
        let counter = StructDecl {
            name: "Counter".into(),
            generics: vec![],
            fields: vec![Param::new("count", Ty::int())],
            methods: vec![FnDecl {
                name: "Bump".into(),
                params: vec![Param::new("by", Ty::int())],
                ret: Ty::unit(),
                body: vec![Stmt::Assign {
                    place: Place::Field("count".into()),
                    value: binary(BinaryOp::Add, Expr::Field("count".into()), local("by")),
                }],
            }],
        };
        let unit = SyntheticUnit::new(
            "SpanLinq",
            vec![Decl::Extension(ext), Decl::Struct(counter)],
        );
        insta::assert_snapshot!(render_unit(&unit, &EmitConfig::default()), @r"
        // Generated by spanq. Do not edit.
        unit SpanLinq {
            ext fn First<T>(source: ReadOnlySpan<T>) -> T {
                if source.Length() == 0 {
                    fail NoElements;
                }
                return source.Get(0);
            }

            struct Counter {
                count: Int;

                fn Bump(self, by: Int) -> Unit {
                    self.count = self.count + by;
                }
            }
        }
        ");
    }

    #[test]
    fn long_signatures_break_at_parameters() {
        let ext = ExtensionFn {
            method: Method::ToDictionary,
            receiver: "ReadOnlySpan".into(),
            generics: vec!["T".into(), "TKey".into()],
            params: vec![
                Param::new("source", Ty::read_only_span(Ty::param("T"))),
                Param::new(
                    "key_selector",
                    Ty::fun(vec![Ty::param("T")], Ty::param("TKey")),
                ),
            ],
            ret: Ty::dictionary(Ty::param("TKey"), Ty::param("T")),
            body: vec![],
        };
        let unit = SyntheticUnit::new("SpanLinq", vec![Decl::Extension(ext)]);
        let config = EmitConfig {
            indent_size: 4,
            max_width: 60,
        };
        insta::assert_snapshot!(render_unit(&unit, &config), @r"
        // Generated by spanq. Do not edit.
        unit SpanLinq {
            ext fn ToDictionary<T, TKey>(
                source: ReadOnlySpan<T>,
                key_selector: Fn(T) -> TKey,
            ) -> Dictionary<TKey, T> {}
        }
        ");
    }
}
