//! The declaration arena and the frozen units handed to the host.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::Serialize;
use spanq_common::ty::Ty;

use crate::config::EmitConfig;
use crate::emit;
use crate::ir::{Decl, ExtensionFn, StructDecl};
use crate::method::Method;

/// Append-only arena of declarations for one generation pass, plus the
/// set of `(shape name, operator)` pairs already synthesized.
#[derive(Debug, Default)]
pub struct Assembly {
    decls: Vec<Decl>,
    generated: FxHashSet<(String, Method)>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a pair for synthesis. `false` if it was claimed before.
    pub fn begin(&mut self, key: (String, Method)) -> bool {
        self.generated.insert(key)
    }

    pub fn contains(&self, receiver: &str, method: Method) -> bool {
        self.generated.contains(&(receiver.to_string(), method))
    }

    pub fn extend(&mut self, decls: impl IntoIterator<Item = Decl>) {
        self.decls.extend(decls);
    }

    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Number of distinct pairs synthesized, read-only counterparts included.
    pub fn pair_count(&self) -> usize {
        self.generated.len()
    }

    /// Freeze the current contents.
    pub fn snapshot(&self, name: &str) -> SyntheticUnit {
        SyntheticUnit::new(name, self.decls.clone())
    }
}

/// The shape of an argument at a call site, enough to pick an overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgShape {
    /// A non-function value.
    Value,
    /// A function value taking this many parameters.
    Closure(usize),
}

impl ArgShape {
    pub fn of_ty(ty: &Ty) -> ArgShape {
        match ty.fn_arity() {
            Some(arity) => ArgShape::Closure(arity),
            None => ArgShape::Value,
        }
    }

    /// Whether an argument of this shape can bind to a parameter of type
    /// `param`.
    pub fn fits(self, param: &Ty) -> bool {
        match (self, param.fn_arity()) {
            (ArgShape::Value, None) => true,
            (ArgShape::Closure(n), Some(m)) => n == m,
            // A generic parameter accepts anything.
            (ArgShape::Closure(_), None) => matches!(param, Ty::Param(_)),
            (ArgShape::Value, Some(_)) => false,
        }
    }
}

/// An immutable, cheaply cloned set of synthesized declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticUnit {
    name: String,
    decls: Arc<[Decl]>,
}

impl SyntheticUnit {
    pub fn new(name: impl Into<String>, decls: Vec<Decl>) -> Self {
        Self {
            name: name.into(),
            decls: decls.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &ExtensionFn> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Extension(ext) => Some(ext),
            Decl::Struct(_) => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Struct(s) => Some(s),
            Decl::Extension(_) => None,
        })
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructDecl> {
        self.structs().find(|s| s.name == name)
    }

    /// Every overload of `method` extending the `receiver` shape.
    pub fn overloads<'a>(
        &'a self,
        receiver: &'a str,
        method: &'a str,
    ) -> impl Iterator<Item = &'a ExtensionFn> + 'a {
        self.extensions()
            .filter(move |ext| ext.receiver == receiver && ext.method.name() == method)
    }

    /// The overload of `method` on `receiver` matching the argument count
    /// and closure arities.
    pub fn find_extension(
        &self,
        receiver: &str,
        method: &str,
        args: &[ArgShape],
    ) -> Option<&ExtensionFn> {
        self.extensions().find(|ext| {
            ext.receiver == receiver
                && ext.method.name() == method
                && ext.args().len() == args.len()
                && ext
                    .args()
                    .iter()
                    .zip(args)
                    .all(|(param, arg)| arg.fits(&param.ty))
        })
    }

    /// Render the unit as source text.
    pub fn render(&self, config: &EmitConfig) -> String {
        emit::render_unit(self, config)
    }
}

/// Counters describing one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Resolution rounds executed.
    pub rounds: usize,
    /// Candidate call sites found by the scanner.
    pub scanned: usize,
    /// Candidates still pending when the driver stopped.
    pub pending: usize,
    /// Distinct `(shape, operator)` pairs synthesized.
    pub synthesized: usize,
}

/// The artifact of a generation pass that needed synthesis.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub unit: SyntheticUnit,
    pub text: String,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SynthesisRequest;
    use crate::shape::Shape;
    use crate::synth;

    fn unit_for(methods: &[Method]) -> SyntheticUnit {
        let mut assembly = Assembly::new();
        for &method in methods {
            synth::generate(
                &mut assembly,
                &SynthesisRequest::new(Shape::read_only_span(), method),
            );
        }
        assembly.snapshot("SpanLinq")
    }

    #[test]
    fn begin_claims_once() {
        let mut assembly = Assembly::new();
        assert!(assembly.begin(("ReadOnlySpan".into(), Method::Count)));
        assert!(!assembly.begin(("ReadOnlySpan".into(), Method::Count)));
        assert!(assembly.begin(("Span".into(), Method::Count)));
        assert_eq!(assembly.pair_count(), 2);
    }

    #[test]
    fn overloads_are_told_apart_by_closure_arity() {
        let unit = unit_for(&[Method::ToDictionary]);
        let with_comparer = unit
            .find_extension(
                "ReadOnlySpan",
                "ToDictionary",
                &[ArgShape::Closure(1), ArgShape::Closure(2)],
            )
            .unwrap();
        assert_eq!(with_comparer.args()[1].name, "comparer");

        let with_element = unit
            .find_extension(
                "ReadOnlySpan",
                "ToDictionary",
                &[ArgShape::Closure(1), ArgShape::Closure(1)],
            )
            .unwrap();
        assert_eq!(with_element.args()[1].name, "element_selector");
    }

    #[test]
    fn overloads_are_told_apart_by_count() {
        let unit = unit_for(&[Method::First]);
        assert!(unit.find_extension("ReadOnlySpan", "First", &[]).is_some());
        assert!(unit
            .find_extension("ReadOnlySpan", "First", &[ArgShape::Closure(1)])
            .is_some());
        assert!(unit
            .find_extension("ReadOnlySpan", "First", &[ArgShape::Value])
            .is_none());
        assert!(unit.find_extension("Span", "First", &[]).is_none());
    }

    #[test]
    fn contains_value_may_be_a_closure() {
        let unit = unit_for(&[Method::Contains]);
        let ext = unit
            .find_extension("ReadOnlySpan", "Contains", &[ArgShape::Closure(1)])
            .unwrap();
        assert_eq!(ext.args().len(), 1);
    }

    #[test]
    fn snapshot_is_frozen() {
        let mut assembly = Assembly::new();
        synth::generate(
            &mut assembly,
            &SynthesisRequest::new(Shape::read_only_span(), Method::Where),
        );
        let unit = assembly.snapshot("SpanLinq");
        let before = unit.decls().len();
        synth::generate(
            &mut assembly,
            &SynthesisRequest::new(Shape::read_only_span(), Method::Count),
        );
        assert_eq!(unit.decls().len(), before);
        assert!(unit.find_struct("WhereSpan").is_some());
        assert!(unit.find_struct("WhereSpanEnumerator").is_some());
    }

    #[test]
    fn arg_shape_of_types() {
        assert_eq!(ArgShape::of_ty(&Ty::int()), ArgShape::Value);
        assert_eq!(
            ArgShape::of_ty(&Ty::fun(vec![Ty::int()], Ty::bool())),
            ArgShape::Closure(1)
        );
    }
}
