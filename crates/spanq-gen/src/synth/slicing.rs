//! In-place Skip and Take for length-known shapes: the result is the
//! receiver's own type, re-sliced.

use spanq_common::ty::Ty;

use super::builder::{binary, call, if_then, int, length_of, local, ret};
use super::extension;
use crate::ir::{BinaryOp, Decl, Expr, Param};
use crate::request::SynthesisRequest;

fn slice(start: Expr, length: Expr) -> Expr {
    call(local("source"), "Slice", vec![start, length])
}

fn count_param() -> Vec<Param> {
    vec![Param::new("count", Ty::int())]
}

/// A negative count takes nothing.
pub(super) fn take(request: &SynthesisRequest) -> Vec<Decl> {
    let body = vec![
        if_then(
            binary(BinaryOp::Lt, local("count"), length_of(local("source"))),
            vec![
                if_then(
                    binary(BinaryOp::Lt, local("count"), int(0)),
                    vec![ret(slice(int(0), int(0)))],
                ),
                ret(slice(int(0), local("count"))),
            ],
        ),
        ret(local("source")),
    ];
    vec![extension(
        request,
        &[],
        count_param(),
        request.source_ty(),
        body,
    )]
}

/// A negative count skips nothing.
pub(super) fn skip(request: &SynthesisRequest) -> Vec<Decl> {
    let body = vec![
        if_then(
            binary(BinaryOp::Le, local("count"), int(0)),
            vec![ret(local("source"))],
        ),
        if_then(
            binary(BinaryOp::Lt, local("count"), length_of(local("source"))),
            vec![ret(slice(
                local("count"),
                binary(BinaryOp::Sub, length_of(local("source")), local("count")),
            ))],
        ),
        ret(slice(int(0), int(0))),
    ];
    vec![extension(
        request,
        &[],
        count_param(),
        request.source_ty(),
        body,
    )]
}
