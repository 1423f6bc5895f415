//! Type representation shared by the synthesizer and the reference host.
//!
//! Types are first-order: named constructors, constructor applications,
//! function types and generic parameters. There are no inference variables;
//! generic parameters are bound by structural matching ([`Ty::bind`]) and
//! replaced with [`Ty::subst`].

use std::fmt;

use rustc_hash::FxHashMap;

/// Name of the mutable borrowed view type.
pub const SPAN: &str = "Span";
/// Name of the read-only borrowed view type.
pub const READ_ONLY_SPAN: &str = "ReadOnlySpan";
/// Enumerator of a mutable view.
pub const SPAN_ENUMERATOR: &str = "SpanEnumerator";
/// Enumerator of a read-only view.
pub const READ_ONLY_SPAN_ENUMERATOR: &str = "ReadOnlySpanEnumerator";
pub const LIST: &str = "List";
pub const ARRAY: &str = "Array";
pub const DICTIONARY: &str = "Dictionary";

/// A type constructor, identified by name (`Int`, `ReadOnlySpan`, `WhereSpan`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyCon {
    pub name: String,
}

impl TyCon {
    pub fn new(name: impl Into<String>) -> Self {
        TyCon { name: name.into() }
    }
}

impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// A nullary constructor: `Int`, `Bool`, `Unit`.
    Con(TyCon),
    /// A constructor applied to arguments: `ReadOnlySpan<Int>`.
    App(Box<Ty>, Vec<Ty>),
    /// A function type: `Fn(Int, Int) -> Bool`.
    Fun(Vec<Ty>, Box<Ty>),
    /// A generic parameter in a synthesized declaration: `TSource`.
    Param(String),
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Con(TyCon::new("Int"))
    }

    pub fn bool() -> Ty {
        Ty::Con(TyCon::new("Bool"))
    }

    pub fn unit() -> Ty {
        Ty::Con(TyCon::new("Unit"))
    }

    /// `name<args>`, or a bare constructor when `args` is empty.
    pub fn app(name: impl Into<String>, args: Vec<Ty>) -> Ty {
        if args.is_empty() {
            Ty::Con(TyCon::new(name))
        } else {
            Ty::App(Box::new(Ty::Con(TyCon::new(name))), args)
        }
    }

    pub fn span(elem: Ty) -> Ty {
        Ty::app(SPAN, vec![elem])
    }

    pub fn read_only_span(elem: Ty) -> Ty {
        Ty::app(READ_ONLY_SPAN, vec![elem])
    }

    pub fn list(elem: Ty) -> Ty {
        Ty::app(LIST, vec![elem])
    }

    pub fn array(elem: Ty) -> Ty {
        Ty::app(ARRAY, vec![elem])
    }

    pub fn dictionary(key: Ty, value: Ty) -> Ty {
        Ty::app(DICTIONARY, vec![key, value])
    }

    pub fn fun(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Fun(params, Box::new(ret))
    }

    pub fn param(name: impl Into<String>) -> Ty {
        Ty::Param(name.into())
    }

    /// The constructor name of a `Con` or `App`, if any.
    pub fn head(&self) -> Option<&str> {
        match self {
            Ty::Con(c) => Some(&c.name),
            Ty::App(con, _) => con.head(),
            Ty::Fun(..) | Ty::Param(_) => None,
        }
    }

    /// Constructor arguments; empty for everything but `App`.
    pub fn args(&self) -> &[Ty] {
        match self {
            Ty::App(_, args) => args,
            _ => &[],
        }
    }

    /// Whether the type names constructor `name`, with any arguments.
    pub fn is(&self, name: &str) -> bool {
        self.head() == Some(name)
    }

    /// Number of parameters if this is a function type.
    pub fn fn_arity(&self) -> Option<usize> {
        match self {
            Ty::Fun(params, _) => Some(params.len()),
            _ => None,
        }
    }

    /// Whether any generic parameter occurs in the type.
    pub fn has_params(&self) -> bool {
        match self {
            Ty::Param(_) => true,
            Ty::Con(_) => false,
            Ty::App(con, args) => con.has_params() || args.iter().any(Ty::has_params),
            Ty::Fun(params, ret) => params.iter().any(Ty::has_params) || ret.has_params(),
        }
    }

    /// Replace bound generic parameters. Unbound parameters are kept.
    pub fn subst(&self, env: &FxHashMap<String, Ty>) -> Ty {
        match self {
            Ty::Param(name) => env.get(name).cloned().unwrap_or_else(|| self.clone()),
            Ty::Con(_) => self.clone(),
            Ty::App(con, args) => Ty::App(
                Box::new(con.subst(env)),
                args.iter().map(|a| a.subst(env)).collect(),
            ),
            Ty::Fun(params, ret) => Ty::Fun(
                params.iter().map(|p| p.subst(env)).collect(),
                Box::new(ret.subst(env)),
            ),
        }
    }

    /// Match `pattern` (which may mention generic parameters) against a
    /// concrete `actual`, recording parameter bindings in `env`.
    ///
    /// Returns `false` on a constructor mismatch or a conflicting binding.
    /// A parameter already bound is compared against its binding.
    pub fn bind(pattern: &Ty, actual: &Ty, env: &mut FxHashMap<String, Ty>) -> bool {
        match (pattern, actual) {
            (Ty::Param(name), _) => match env.get(name) {
                Some(bound) => bound == actual,
                None => {
                    env.insert(name.clone(), actual.clone());
                    true
                }
            },
            (Ty::Con(a), Ty::Con(b)) => a == b,
            (Ty::App(pc, pargs), Ty::App(ac, aargs)) => {
                pargs.len() == aargs.len()
                    && Ty::bind(pc, ac, env)
                    && pargs
                        .iter()
                        .zip(aargs)
                        .all(|(p, a)| Ty::bind(p, a, env))
            }
            (Ty::Fun(pp, pr), Ty::Fun(ap, ar)) => {
                pp.len() == ap.len()
                    && pp.iter().zip(ap).all(|(p, a)| Ty::bind(p, a, env))
                    && Ty::bind(pr, ar, env)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Con(c) => write!(f, "{}", c),
            Ty::Param(name) => write!(f, "{}", name),
            Ty::App(con, args) => {
                write!(f, "{}<", con)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ">")
            }
            Ty::Fun(params, ret) => {
                write!(f, "Fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Ty::read_only_span(Ty::int()).to_string(), "ReadOnlySpan<Int>");
        assert_eq!(
            Ty::fun(vec![Ty::param("T"), Ty::param("T")], Ty::bool()).to_string(),
            "Fn(T, T) -> Bool"
        );
        assert_eq!(
            Ty::dictionary(Ty::int(), Ty::list(Ty::bool())).to_string(),
            "Dictionary<Int, List<Bool>>"
        );
    }

    #[test]
    fn app_without_args_is_con() {
        assert_eq!(Ty::app("Int", vec![]), Ty::int());
    }

    #[test]
    fn head_and_args() {
        let ty = Ty::app("SelectSpan", vec![Ty::int(), Ty::bool()]);
        assert_eq!(ty.head(), Some("SelectSpan"));
        assert_eq!(ty.args(), &[Ty::int(), Ty::bool()]);
        assert!(ty.is("SelectSpan"));
        assert_eq!(Ty::param("T").head(), None);
    }

    #[test]
    fn bind_then_subst() {
        let pattern = Ty::fun(vec![Ty::param("TSource")], Ty::param("TResult"));
        let actual = Ty::fun(vec![Ty::int()], Ty::bool());
        let mut env = FxHashMap::default();
        assert!(Ty::bind(&pattern, &actual, &mut env));
        let ret = Ty::list(Ty::param("TResult")).subst(&env);
        assert_eq!(ret, Ty::list(Ty::bool()));
    }

    #[test]
    fn bind_rejects_conflicts() {
        let pattern = Ty::fun(vec![Ty::param("T"), Ty::param("T")], Ty::bool());
        let actual = Ty::fun(vec![Ty::int(), Ty::bool()], Ty::bool());
        let mut env = FxHashMap::default();
        assert!(!Ty::bind(&pattern, &actual, &mut env));
    }

    #[test]
    fn bind_rejects_constructor_mismatch() {
        let mut env = FxHashMap::default();
        assert!(!Ty::bind(
            &Ty::read_only_span(Ty::param("T")),
            &Ty::span(Ty::int()),
            &mut env
        ));
    }

    #[test]
    fn has_params() {
        assert!(Ty::list(Ty::param("T")).has_params());
        assert!(!Ty::list(Ty::int()).has_params());
    }
}
