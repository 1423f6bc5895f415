//! The operator synthesizer.
//!
//! [`declarations`] is a pure function from a [`SynthesisRequest`] to the
//! records implementing it. Dispatch goes through a table keyed on the
//! operator and on whether the receiver has a known length.
//! [`generate`] adds memoization and the read-only detour for mutable
//! views, appending to an [`Assembly`].

mod builder;
mod slicing;
mod terminal;
mod wrappers;

use spanq_common::ty::{self, Ty};
use tracing::{debug, trace};

use crate::ir::{Decl, ExtensionFn, Param, Stmt};
use crate::method::Method;
use crate::request::SynthesisRequest;
use crate::shape::Shape;
use crate::unit::Assembly;

use builder::{call, local, ret};

/// Which family of templates applies to a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `Length()` and `Get(i)` are available: slice in place, count in
    /// O(1), scan backwards.
    Indexed,
    /// Only single-pass enumeration is available.
    Sequential,
}

impl Strategy {
    pub fn for_shape(shape: &Shape) -> Strategy {
        if shape.has_length {
            Strategy::Indexed
        } else {
            Strategy::Sequential
        }
    }
}

type Rule = fn(&SynthesisRequest) -> Vec<Decl>;

fn rule(method: Method, strategy: Strategy) -> Rule {
    use Method::*;
    use Strategy::*;

    match (method, strategy) {
        (Select, _) => wrappers::select,
        (Where, _) => wrappers::filter,
        (Reverse, _) => wrappers::reverse,
        (Take, Indexed) => slicing::take,
        (Take, Sequential) => wrappers::take,
        (Skip, Indexed) => slicing::skip,
        (Skip, Sequential) => wrappers::skip,
        (ToList, _) => terminal::to_list,
        (ToArray, _) => terminal::to_array,
        (ToDictionary, _) => terminal::to_dictionary,
        (Count, _) => terminal::count,
        (Any, _) => terminal::any,
        (All, _) => terminal::all,
        (First, _) => terminal::first,
        (FirstOrDefault, _) => terminal::first_or_default,
        (Single, _) => terminal::single,
        (SingleOrDefault, _) => terminal::single_or_default,
        (Last, _) => terminal::last,
        (LastOrDefault, _) => terminal::last_or_default,
        (Contains, _) => terminal::contains,
    }
}

/// Declarations implementing `request`, without memoization.
pub fn declarations(request: &SynthesisRequest) -> Vec<Decl> {
    let strategy = Strategy::for_shape(request.receiver());
    rule(request.method(), strategy)(request)
}

/// Synthesize `request` into `assembly` unless its `(shape, operator)`
/// pair was generated before. Returns whether anything was appended.
///
/// A mutable view gets its in-place slicing directly. Every other
/// operator is generated for the read-only view first and then forwarded
/// through `AsReadOnly()`.
pub fn generate(assembly: &mut Assembly, request: &SynthesisRequest) -> bool {
    let (receiver, method) = request.key();
    if !assembly.begin(request.key()) {
        trace!(target: "spanq::synth", %receiver, %method, "already generated");
        return false;
    }

    let decls = if request.receiver().is_span && !method.is_slice() {
        let counterpart = SynthesisRequest::new(read_only_counterpart(request.receiver()), method);
        generate(assembly, &counterpart);
        forwarders(request, &counterpart)
    } else {
        declarations(request)
    };

    debug!(
        target: "spanq::synth",
        %receiver,
        %method,
        decls = decls.len(),
        result = request.result_shape().map(|s| s.name.as_str()).unwrap_or("-"),
        "synthesized"
    );
    assembly.extend(decls);
    true
}

fn read_only_counterpart(shape: &Shape) -> Shape {
    Shape {
        name: ty::READ_ONLY_SPAN.to_string(),
        is_span: false,
        is_read_only_span: true,
        ..shape.clone()
    }
}

/// One forwarding overload per overload of the read-only counterpart:
/// `return source.AsReadOnly().Op(args...)`.
fn forwarders(request: &SynthesisRequest, counterpart: &SynthesisRequest) -> Vec<Decl> {
    let source_ty = request.source_ty();
    declarations(counterpart)
        .into_iter()
        .filter_map(|decl| match decl {
            Decl::Extension(ext) => Some(ext),
            Decl::Struct(_) => None,
        })
        .map(|ext| {
            let args = ext.args().iter().map(|p| local(&p.name)).collect();
            let body = vec![ret(call(
                call(local("source"), "AsReadOnly", vec![]),
                ext.method.name(),
                args,
            ))];
            let mut params = vec![Param::new("source", source_ty.clone())];
            params.extend(ext.args().iter().cloned());
            Decl::Extension(ExtensionFn {
                method: ext.method,
                receiver: request.receiver().name.clone(),
                generics: ext.generics,
                params,
                ret: ext.ret,
                body,
            })
        })
        .collect()
}

/// An extension overload for `request` with extra generics after the
/// source parameters.
pub(crate) fn extension(
    request: &SynthesisRequest,
    extra_generics: &[&str],
    args: Vec<Param>,
    ret: Ty,
    body: Vec<Stmt>,
) -> Decl {
    let mut generics = request.source_type_params().to_vec();
    generics.extend(extra_generics.iter().map(|g| g.to_string()));
    let mut params = vec![Param::new("source", request.source_ty())];
    params.extend(args);
    Decl::Extension(ExtensionFn {
        method: request.method(),
        receiver: request.receiver().name.clone(),
        generics,
        params,
        ret,
        body,
    })
}

/// `Fn(elem) -> Bool`.
pub(crate) fn predicate_ty(elem: &Ty) -> Ty {
    Ty::fun(vec![elem.clone()], Ty::bool())
}
