//! Type resolution over a parsed script.
//!
//! A single forward pass assigns a type to every expression it can and
//! binds every method call to a builtin member, a method of a synthesized
//! struct, or a synthesized extension, in that order. Types flow inward
//! from annotations and from overload parameters, which is how closure
//! parameters and empty arrays get their types.
//!
//! A call that cannot be bound is an error and has no type. Expressions
//! depending on it are left untyped without further errors.

use rowan::TextRange;
use rustc_hash::FxHashMap;
use spanq_common::ty::{self, Ty};
use spanq_gen::{ArgShape, Symbol, SyntheticUnit};
use spanq_parser::ast::expr::{
    ArrayExpr, BinaryExpr, ClosureExpr, Expr, Literal, MethodCallExpr, UnaryExpr,
};
use spanq_parser::ast::stmt::{LetStmt, Stmt, TypeExpr};
use spanq_parser::{AstNode, Parse, SyntaxKind};

use crate::builtins::{self, Signature};
use crate::env::Scopes;
use crate::error::HostError;

/// Everything the checker learned about a script.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Static type of every typed expression, keyed by its range.
    pub types: FxHashMap<TextRange, Ty>,
    /// Binding of every resolved method call, keyed by the call's range.
    pub calls: FxHashMap<TextRange, Symbol>,
    /// `let` bindings in order, with their types when known.
    pub bindings: Vec<(String, Option<Ty>)>,
    pub errors: Vec<HostError>,
}

/// Resolve `parse` against the builtins plus `unit`.
pub fn check(parse: &Parse, unit: Option<&SyntheticUnit>) -> Analysis {
    let mut checker = Checker {
        unit,
        env: Scopes::new(),
        out: Analysis::default(),
    };
    for stmt in parse.tree().stmts() {
        checker.stmt(&stmt);
    }
    checker.out
}

struct Checker<'a> {
    unit: Option<&'a SyntheticUnit>,
    /// `None` marks a name bound to an expression without a type.
    env: Scopes<Option<Ty>>,
    out: Analysis,
}

/// A candidate overload for a call, with generic bindings already made
/// from the receiver.
struct Candidate {
    symbol: Symbol,
    sig: Signature,
    env: FxHashMap<String, Ty>,
}

fn range_of(expr: &Expr) -> TextRange {
    expr.syntax().text_range()
}

impl<'a> Checker<'a> {
    fn error(&mut self, err: HostError) {
        self.out.errors.push(err);
    }

    fn record(&mut self, range: TextRange, ty: Option<Ty>) -> Option<Ty> {
        if let Some(ty) = &ty {
            self.out.types.insert(range, ty.clone());
        }
        ty
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(let_stmt) => self.let_stmt(let_stmt),
            Stmt::Expr(expr_stmt) => {
                if let Some(expr) = expr_stmt.expr() {
                    self.infer(&expr, None);
                }
            }
        }
    }

    fn let_stmt(&mut self, let_stmt: &LetStmt) {
        let annotation = let_stmt
            .annotation()
            .and_then(|ann| ann.ty())
            .and_then(|ty| self.resolve_type(&ty));
        let init_ty = let_stmt
            .initializer()
            .and_then(|init| {
                let ty = self.infer(&init, annotation.as_ref())?;
                Some((init, ty))
            })
            .and_then(|(init, found)| match &annotation {
                Some(expected) if *expected != found => {
                    self.error(HostError::Mismatch {
                        expected: expected.clone(),
                        found,
                        range: range_of(&init),
                    });
                    None
                }
                _ => Some(found),
            });

        let ty = annotation.or(init_ty);
        if let Some(name) = let_stmt.name().and_then(|n| n.text()) {
            self.env.insert(name.clone(), ty.clone());
            self.out.bindings.push((name, ty));
        }
    }

    /// Resolve a written type. Unknown names are reported.
    fn resolve_type(&mut self, ty: &TypeExpr) -> Option<Ty> {
        match ty {
            TypeExpr::Fn(fn_ty) => {
                let params: Option<Vec<Ty>> =
                    fn_ty.params().map(|p| self.resolve_type(&p)).collect();
                let ret = match fn_ty.ret() {
                    Some(ret) => self.resolve_type(&ret)?,
                    None => Ty::unit(),
                };
                Some(Ty::fun(params?, ret))
            }
            TypeExpr::Path(path) => {
                let name = path.name()?;
                let args: Option<Vec<Ty>> = path
                    .generic_args()
                    .iter()
                    .map(|a| self.resolve_type(a))
                    .collect();
                let args = args?;
                if self.type_arity(&name) != Some(args.len()) {
                    self.error(HostError::UnknownType {
                        name,
                        range: path.syntax().text_range(),
                    });
                    return None;
                }
                Some(Ty::app(name, args))
            }
        }
    }

    fn type_arity(&self, name: &str) -> Option<usize> {
        match name {
            "Int" | "Bool" | "Unit" => Some(0),
            ty::SPAN | ty::READ_ONLY_SPAN | ty::ARRAY | ty::LIST => Some(1),
            ty::DICTIONARY => Some(2),
            _ => self
                .unit
                .and_then(|unit| unit.find_struct(name))
                .map(|s| s.generics.len()),
        }
    }

    fn infer(&mut self, expr: &Expr, expected: Option<&Ty>) -> Option<Ty> {
        let ty = match expr {
            Expr::Literal(lit) => literal(lit),
            Expr::NameRef(name) => {
                let text = name.text()?;
                match self.env.lookup(&text) {
                    Some(ty) => ty.clone(),
                    None => {
                        self.error(HostError::UnknownName {
                            name: text,
                            range: name.syntax().text_range(),
                        });
                        None
                    }
                }
            }
            Expr::ParenExpr(paren) => {
                let inner = paren.inner()?;
                self.infer(&inner, expected)
            }
            Expr::UnaryExpr(unary) => self.unary(unary),
            Expr::BinaryExpr(binary) => self.binary(binary),
            Expr::ArrayExpr(array) => self.array(array, expected),
            Expr::ClosureExpr(closure) => self.closure(closure, expected),
            Expr::MethodCallExpr(call) => self.method_call(call),
        };
        self.record(range_of(expr), ty)
    }

    /// Infer `expr` and report a mismatch against `expected`.
    fn expect(&mut self, expr: &Expr, expected: &Ty) -> bool {
        match self.infer(expr, Some(expected)) {
            Some(found) if found != *expected => {
                self.error(HostError::Mismatch {
                    expected: expected.clone(),
                    found,
                    range: range_of(expr),
                });
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    fn unary(&mut self, unary: &UnaryExpr) -> Option<Ty> {
        let op = unary.op()?.kind();
        let operand = unary.operand()?;
        let ty = if op == SyntaxKind::BANG {
            Ty::bool()
        } else {
            Ty::int()
        };
        self.expect(&operand, &ty).then_some(ty)
    }

    fn binary(&mut self, binary: &BinaryExpr) -> Option<Ty> {
        let op = binary.op()?.kind();
        let lhs = binary.lhs()?;
        let rhs = binary.rhs()?;
        match op {
            SyntaxKind::PLUS
            | SyntaxKind::MINUS
            | SyntaxKind::STAR
            | SyntaxKind::SLASH
            | SyntaxKind::PERCENT => {
                let ok = self.expect(&lhs, &Ty::int()) & self.expect(&rhs, &Ty::int());
                ok.then(Ty::int)
            }
            SyntaxKind::LT | SyntaxKind::LT_EQ | SyntaxKind::GT | SyntaxKind::GT_EQ => {
                let ok = self.expect(&lhs, &Ty::int()) & self.expect(&rhs, &Ty::int());
                ok.then(Ty::bool)
            }
            SyntaxKind::AMP_AMP | SyntaxKind::PIPE_PIPE => {
                let ok = self.expect(&lhs, &Ty::bool()) & self.expect(&rhs, &Ty::bool());
                ok.then(Ty::bool)
            }
            SyntaxKind::EQ_EQ | SyntaxKind::NOT_EQ => {
                let left = self.infer(&lhs, None)?;
                self.expect(&rhs, &left).then(Ty::bool)
            }
            _ => None,
        }
    }

    /// `[a, b]` is an `Array<T>` unless the context asks for a view or a
    /// list of the same elements.
    fn array(&mut self, array: &ArrayExpr, expected: Option<&Ty>) -> Option<Ty> {
        let wanted = expected.filter(|ty| {
            [ty::SPAN, ty::READ_ONLY_SPAN, ty::ARRAY, ty::LIST]
                .iter()
                .any(|name| ty.is(name))
                && ty.args().len() == 1
        });
        let mut elem = wanted.map(|ty| ty.args()[0].clone());
        let mut ok = true;
        for element in array.elements() {
            match &elem {
                Some(expected) => ok &= self.expect(&element, &expected.clone()),
                None => {
                    elem = self.infer(&element, None);
                    ok &= elem.is_some();
                }
            }
        }
        let Some(elem) = elem else {
            if ok {
                self.error(HostError::CannotInferArray {
                    range: array.syntax().text_range(),
                });
            }
            return None;
        };
        if !ok {
            return None;
        }
        match wanted.and_then(|ty| ty.head()) {
            Some(head) => Some(Ty::app(head, vec![elem])),
            None => Some(Ty::array(elem)),
        }
    }

    fn closure(&mut self, closure: &ClosureExpr, expected: Option<&Ty>) -> Option<Ty> {
        let params: Vec<_> = closure
            .param_list()
            .map(|list| list.params().collect())
            .unwrap_or_default();
        let expected_fn = expected.and_then(|ty| match ty {
            Ty::Fun(ps, ret) if ps.len() == params.len() => Some((ps.clone(), ret.clone())),
            _ => None,
        });

        let mut bound = Vec::new();
        for (i, param) in params.iter().enumerate() {
            let annotated = param
                .annotation()
                .and_then(|ann| ann.ty())
                .and_then(|ty| self.resolve_type(&ty));
            let from_context = expected_fn
                .as_ref()
                .map(|(ps, _)| ps[i].clone())
                .filter(|ty| !ty.has_params());
            match (param.name(), annotated.or(from_context)) {
                (Some(name), Some(ty)) => bound.push((name, ty)),
                _ => {
                    self.error(HostError::CannotInferClosure {
                        range: closure.syntax().text_range(),
                    });
                    return None;
                }
            }
        }

        let body = closure.body()?;
        let expected_ret = expected_fn
            .map(|(_, ret)| *ret)
            .filter(|ty| !ty.has_params());
        self.env.push_scope();
        for (name, ty) in &bound {
            self.env.insert(name.clone(), Some(ty.clone()));
        }
        let ret = match &expected_ret {
            Some(ret) => self.expect(&body, ret).then(|| ret.clone()),
            None => self.infer(&body, None),
        };
        self.env.pop_scope();

        Some(Ty::fun(bound.into_iter().map(|(_, ty)| ty).collect(), ret?))
    }

    fn method_call(&mut self, call: &MethodCallExpr) -> Option<Ty> {
        let receiver = call.receiver()?;
        let recv_ty = self.infer(&receiver, None)?;
        let name_token = call.name_token()?;
        let name = name_token.text().to_string();
        let args = call.args();

        // Closures are shaped by their syntax; everything else by its type.
        let mut shapes = Vec::with_capacity(args.len());
        let mut values = Vec::with_capacity(args.len());
        for arg in &args {
            match arg {
                Expr::ClosureExpr(closure) => {
                    let arity = closure
                        .param_list()
                        .map(|list| list.params().count())
                        .unwrap_or(0);
                    shapes.push(ArgShape::Closure(arity));
                    values.push(None);
                }
                _ => {
                    let ty = self.infer(arg, None)?;
                    shapes.push(ArgShape::of_ty(&ty));
                    values.push(Some(ty));
                }
            }
        }

        let Some(mut chosen) = self
            .candidates(&recv_ty, &name)
            .into_iter()
            .find(|c| fits(&c.sig, &shapes))
        else {
            self.error(HostError::UnresolvedMethod {
                receiver: recv_ty,
                name,
                args: args.len(),
                range: name_token.text_range(),
            });
            return None;
        };

        let mut ok = true;
        for ((arg, param), value) in args.iter().zip(&chosen.sig.params).zip(&values) {
            if let Some(found) = value {
                if !Ty::bind(param, found, &mut chosen.env) {
                    self.error(HostError::Mismatch {
                        expected: param.subst(&chosen.env),
                        found: found.clone(),
                        range: range_of(arg),
                    });
                    ok = false;
                }
            }
        }
        for ((arg, param), value) in args.iter().zip(&chosen.sig.params).zip(&values) {
            if value.is_some() {
                continue;
            }
            let expected = param.subst(&chosen.env);
            match self.infer(arg, Some(&expected)) {
                Some(found) if Ty::bind(param, &found, &mut chosen.env) => {}
                Some(found) => {
                    self.error(HostError::Mismatch {
                        expected,
                        found,
                        range: range_of(arg),
                    });
                    ok = false;
                }
                None => ok = false,
            }
        }
        if !ok {
            return None;
        }

        self.out
            .calls
            .insert(call.syntax().text_range(), chosen.symbol);
        Some(chosen.sig.ret.subst(&chosen.env))
    }

    /// Overloads of `name` on `recv`: builtins, then struct methods, then
    /// extensions.
    fn candidates(&self, recv: &Ty, name: &str) -> Vec<Candidate> {
        let Some(head) = recv.head() else {
            return Vec::new();
        };
        let mut out: Vec<Candidate> = builtins::methods(recv, name)
            .into_iter()
            .map(|sig| Candidate {
                symbol: Symbol::Builtin {
                    owner: head.to_string(),
                    name: name.to_string(),
                },
                sig,
                env: FxHashMap::default(),
            })
            .collect();

        let Some(unit) = self.unit else {
            return out;
        };
        if let Some(decl) = unit.find_struct(head) {
            if let Some(method) = decl.method(name) {
                let env: FxHashMap<String, Ty> = decl
                    .generics
                    .iter()
                    .cloned()
                    .zip(recv.args().iter().cloned())
                    .collect();
                out.push(Candidate {
                    symbol: Symbol::StructMethod {
                        owner: head.to_string(),
                        name: name.to_string(),
                    },
                    sig: Signature {
                        params: method.params.iter().map(|p| p.ty.subst(&env)).collect(),
                        ret: method.ret.subst(&env),
                    },
                    env: FxHashMap::default(),
                });
            }
        }
        for ext in unit.overloads(head, name) {
            let Some(source) = ext.params.first() else {
                continue;
            };
            let mut env = FxHashMap::default();
            if !Ty::bind(&source.ty, recv, &mut env) {
                continue;
            }
            out.push(Candidate {
                symbol: Symbol::Extension {
                    receiver: head.to_string(),
                    name: name.to_string(),
                },
                sig: Signature {
                    params: ext.args().iter().map(|p| p.ty.clone()).collect(),
                    ret: ext.ret.clone(),
                },
                env,
            });
        }
        out
    }
}

fn literal(lit: &Literal) -> Option<Ty> {
    match lit.token()?.kind() {
        SyntaxKind::INT_LITERAL => Some(Ty::int()),
        SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => Some(Ty::bool()),
        _ => None,
    }
}

fn fits(sig: &Signature, shapes: &[ArgShape]) -> bool {
    sig.params.len() == shapes.len()
        && sig
            .params
            .iter()
            .zip(shapes)
            .all(|(param, shape)| shape.fits(param))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(source: &str) -> Analysis {
        let parse = spanq_parser::parse(source);
        assert!(parse.ok(), "{:?}", parse.errors());
        check(&parse, None)
    }

    fn binding(analysis: &Analysis, name: &str) -> Option<String> {
        analysis
            .bindings
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, ty)| ty.as_ref().map(|t| t.to_string()))
    }

    #[test]
    fn annotated_array_becomes_a_view() {
        let a = analyze("let xs: ReadOnlySpan<Int> = [1, 2, 3]; let ys = [true];");
        assert!(a.errors.is_empty());
        assert_eq!(binding(&a, "xs").as_deref(), Some("ReadOnlySpan<Int>"));
        assert_eq!(binding(&a, "ys").as_deref(), Some("Array<Bool>"));
    }

    #[test]
    fn empty_array_needs_context() {
        let a = analyze("let xs: Span<Int> = []; let ys = [];");
        assert_eq!(a.errors.len(), 1);
        assert!(matches!(a.errors[0], HostError::CannotInferArray { .. }));
        assert_eq!(binding(&a, "xs").as_deref(), Some("Span<Int>"));
    }

    #[test]
    fn list_operators_resolve_to_builtins() {
        let a = analyze(
            "let xs = [1, 2, 3];
             let n = xs.Where(|x| x > 1).Select(|x| x == 2).ToList();
             let d = xs.ToDictionary(|x| x % 2, |x| x > 1);",
        );
        assert!(a.errors.is_empty(), "{:?}", a.errors);
        assert_eq!(binding(&a, "n").as_deref(), Some("List<Bool>"));
        assert_eq!(binding(&a, "d").as_deref(), Some("Dictionary<Int, Bool>"));
        assert!(a
            .calls
            .values()
            .all(|s| matches!(s, Symbol::Builtin { .. })));
    }

    #[test]
    fn view_operators_are_unresolved_without_a_unit() {
        let a = analyze("let xs: ReadOnlySpan<Int> = [1]; let n = xs.Count();");
        assert_eq!(a.errors.len(), 1);
        assert_eq!(
            a.errors[0].to_string(),
            "no method `Count` taking 0 argument(s) on ReadOnlySpan<Int>"
        );
        assert_eq!(binding(&a, "n"), None);
    }

    #[test]
    fn dependent_calls_do_not_cascade() {
        let a = analyze("let xs: Span<Int> = [1]; xs.Where(|x| x > 0).Select(|x| x).Count();");
        assert_eq!(a.errors.len(), 1);
    }

    #[test]
    fn mismatches_are_reported() {
        let a = analyze("let x: Bool = 1; let y = 1 + true; let z = [1, 2].Where(|x| x + 1);");
        let messages: Vec<String> = a.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "expected Bool, found Int",
                "expected Int, found Bool",
                "expected Bool, found Int",
            ]
        );
    }

    #[test]
    fn unknown_names_and_types() {
        let a = analyze("let x: Foo<Int> = 1; y;");
        let messages: Vec<String> = a.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["unknown type: Foo", "undefined name: y"]);
    }

    #[test]
    fn closure_without_context_needs_annotations() {
        let a = analyze("let f = |x| x; let g = |x: Int| x > 1;");
        assert_eq!(a.errors.len(), 1);
        assert!(matches!(a.errors[0], HostError::CannotInferClosure { .. }));
        assert_eq!(binding(&a, "g").as_deref(), Some("Fn(Int) -> Bool"));
    }

    #[test]
    fn closure_values_select_overloads_by_arity() {
        let a = analyze(
            "let same: Fn(Int, Int) -> Bool = |a, b| a == b;
             let xs = [1, 2];
             let c = xs.Contains(2, same);",
        );
        assert!(a.errors.is_empty(), "{:?}", a.errors);
        assert_eq!(binding(&a, "c").as_deref(), Some("Bool"));
    }
}
