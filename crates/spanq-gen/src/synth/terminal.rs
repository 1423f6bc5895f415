//! Materializing and aggregating operators. None of them produce a new
//! shape; most come in a plain and a predicated overload.

use spanq_common::ty::Ty;

use super::builder::{
    assign, binary, boolean, call, default_of, expr, fail, for_each, get, if_then, int, invoke,
    length_of, let_, local, not, ret, while_,
};
use super::{extension, predicate_ty};
use crate::error::QueryError;
use crate::ir::{BinaryOp, Decl, Expr, Param, Stmt};
use crate::request::SynthesisRequest;

fn source() -> Expr {
    local("source")
}

fn has_length(request: &SynthesisRequest) -> bool {
    request.receiver().has_length
}

fn predicate(request: &SynthesisRequest) -> Param {
    Param::new("predicate", predicate_ty(&request.element_ty()))
}

fn matches(item: &str) -> Expr {
    invoke(local("predicate"), vec![local(item)])
}

fn capacity(request: &SynthesisRequest) -> Option<Box<Expr>> {
    has_length(request).then(|| Box::new(length_of(source())))
}

pub(super) fn to_list(request: &SynthesisRequest) -> Vec<Decl> {
    let elem = request.element_ty();
    let body = vec![
        let_(
            "list",
            Expr::NewList {
                elem: elem.clone(),
                capacity: capacity(request),
            },
        ),
        for_each(
            "item",
            source(),
            vec![expr(call(local("list"), "Push", vec![local("item")]))],
        ),
        ret(local("list")),
    ];
    vec![extension(request, &[], vec![], Ty::list(elem), body)]
}

/// Sized up front when the length is known, otherwise collected into a
/// List and converted.
pub(super) fn to_array(request: &SynthesisRequest) -> Vec<Decl> {
    let elem = request.element_ty();
    let body = if has_length(request) {
        vec![
            let_(
                "array",
                Expr::NewArray {
                    elem: elem.clone(),
                    len: Box::new(length_of(source())),
                },
            ),
            let_("i", int(0)),
            for_each(
                "item",
                source(),
                vec![
                    expr(call(local("array"), "Set", vec![local("i"), local("item")])),
                    assign("i", binary(BinaryOp::Add, local("i"), int(1))),
                ],
            ),
            ret(local("array")),
        ]
    } else {
        vec![
            let_(
                "list",
                Expr::NewList {
                    elem: elem.clone(),
                    capacity: None,
                },
            ),
            for_each(
                "item",
                source(),
                vec![expr(call(local("list"), "Push", vec![local("item")]))],
            ),
            ret(call(local("list"), "ToArray", vec![])),
        ]
    };
    vec![extension(request, &[], vec![], Ty::array(elem), body)]
}

/// Four overloads: with or without an element selector, with or without
/// a key comparer. A repeated key fails instead of overwriting.
pub(super) fn to_dictionary(request: &SynthesisRequest) -> Vec<Decl> {
    let elem = request.element_ty();
    let key = Ty::param("TKey");
    let element = Ty::param("TElement");
    let key_selector = Param::new("key_selector", Ty::fun(vec![elem.clone()], key.clone()));
    let element_selector = Param::new(
        "element_selector",
        Ty::fun(vec![elem.clone()], element.clone()),
    );
    let comparer = Param::new(
        "comparer",
        Ty::fun(vec![key.clone(), key.clone()], Ty::bool()),
    );

    let overload = |with_element: bool, with_comparer: bool| {
        let value_ty = if with_element { element.clone() } else { elem.clone() };
        let value = if with_element {
            invoke(local("element_selector"), vec![local("item")])
        } else {
            local("item")
        };
        let body = vec![
            let_(
                "dict",
                Expr::NewDict {
                    key: key.clone(),
                    value: value_ty.clone(),
                    capacity: capacity(request),
                    comparer: with_comparer.then(|| Box::new(local("comparer"))),
                },
            ),
            for_each(
                "item",
                source(),
                vec![
                    let_("key", invoke(local("key_selector"), vec![local("item")])),
                    if_then(
                        call(local("dict"), "ContainsKey", vec![local("key")]),
                        vec![fail(QueryError::DuplicateKey)],
                    ),
                    expr(call(local("dict"), "Insert", vec![local("key"), value])),
                ],
            ),
            ret(local("dict")),
        ];
        let mut generics = vec!["TKey"];
        let mut args = vec![key_selector.clone()];
        if with_element {
            generics.push("TElement");
            args.push(element_selector.clone());
        }
        if with_comparer {
            args.push(comparer.clone());
        }
        extension(
            request,
            &generics,
            args,
            Ty::dictionary(key.clone(), value_ty),
            body,
        )
    };

    vec![
        overload(false, false),
        overload(false, true),
        overload(true, false),
        overload(true, true),
    ]
}

pub(super) fn count(request: &SynthesisRequest) -> Vec<Decl> {
    let body = if has_length(request) {
        vec![ret(length_of(source()))]
    } else {
        vec![
            let_("count", int(0)),
            for_each(
                "item",
                source(),
                vec![assign("count", binary(BinaryOp::Add, local("count"), int(1)))],
            ),
            ret(local("count")),
        ]
    };
    vec![extension(request, &[], vec![], Ty::int(), body)]
}

pub(super) fn any(request: &SynthesisRequest) -> Vec<Decl> {
    let plain = if has_length(request) {
        vec![ret(binary(BinaryOp::Ne, length_of(source()), int(0)))]
    } else {
        vec![
            for_each("item", source(), vec![ret(boolean(true))]),
            ret(boolean(false)),
        ]
    };
    let predicated = vec![
        for_each(
            "item",
            source(),
            vec![if_then(matches("item"), vec![ret(boolean(true))])],
        ),
        ret(boolean(false)),
    ];
    vec![
        extension(request, &[], vec![], Ty::bool(), plain),
        extension(request, &[], vec![predicate(request)], Ty::bool(), predicated),
    ]
}

/// True on an empty source.
pub(super) fn all(request: &SynthesisRequest) -> Vec<Decl> {
    let body = vec![
        for_each(
            "item",
            source(),
            vec![if_then(not(matches("item")), vec![ret(boolean(false))])],
        ),
        ret(boolean(true)),
    ];
    vec![extension(request, &[], vec![predicate(request)], Ty::bool(), body)]
}

/// What a search does when nothing is found.
#[derive(Clone, Copy)]
enum Absent {
    Fail,
    Default,
}

impl Absent {
    fn stmt(self, request: &SynthesisRequest, error: QueryError) -> Stmt {
        match self {
            Absent::Fail => fail(error),
            Absent::Default => ret(default_of(request.element_ty())),
        }
    }
}

fn first_like(request: &SynthesisRequest, absent: Absent) -> Vec<Decl> {
    let elem = request.element_ty();
    let plain = vec![
        for_each("item", source(), vec![ret(local("item"))]),
        absent.stmt(request, QueryError::NoElements),
    ];
    let predicated = vec![
        for_each(
            "item",
            source(),
            vec![if_then(matches("item"), vec![ret(local("item"))])],
        ),
        absent.stmt(request, QueryError::NoMatch),
    ];
    vec![
        extension(request, &[], vec![], elem.clone(), plain),
        extension(request, &[], vec![predicate(request)], elem, predicated),
    ]
}

pub(super) fn first(request: &SynthesisRequest) -> Vec<Decl> {
    first_like(request, Absent::Fail)
}

pub(super) fn first_or_default(request: &SynthesisRequest) -> Vec<Decl> {
    first_like(request, Absent::Default)
}

fn single_like(request: &SynthesisRequest, absent: Absent) -> Vec<Decl> {
    let elem = request.element_ty();
    let plain = if has_length(request) {
        vec![
            let_("length", length_of(source())),
            if_then(
                binary(BinaryOp::Eq, local("length"), int(0)),
                vec![absent.stmt(request, QueryError::NoElements)],
            ),
            if_then(
                binary(BinaryOp::Eq, local("length"), int(1)),
                vec![ret(get(source(), int(0)))],
            ),
            fail(QueryError::MoreThanOneElement),
        ]
    } else {
        let step = || call(local("enumerator"), "Advance", vec![]);
        vec![
            let_("enumerator", call(source(), "Iter", vec![])),
            if_then(
                not(step()),
                vec![absent.stmt(request, QueryError::NoElements)],
            ),
            let_("result", call(local("enumerator"), "Current", vec![])),
            if_then(not(step()), vec![ret(local("result"))]),
            fail(QueryError::MoreThanOneElement),
        ]
    };
    let predicated = vec![
        let_("found", boolean(false)),
        let_("result", default_of(elem.clone())),
        for_each(
            "item",
            source(),
            vec![if_then(
                matches("item"),
                vec![
                    if_then(local("found"), vec![fail(QueryError::MoreThanOneElement)]),
                    assign("found", boolean(true)),
                    assign("result", local("item")),
                ],
            )],
        ),
        if_then(
            not(local("found")),
            vec![absent.stmt(request, QueryError::NoMatch)],
        ),
        ret(local("result")),
    ];
    vec![
        extension(request, &[], vec![], elem.clone(), plain),
        extension(request, &[], vec![predicate(request)], elem, predicated),
    ]
}

pub(super) fn single(request: &SynthesisRequest) -> Vec<Decl> {
    single_like(request, Absent::Fail)
}

pub(super) fn single_or_default(request: &SynthesisRequest) -> Vec<Decl> {
    single_like(request, Absent::Default)
}

/// Backwards over indices when the length is known, otherwise one forward
/// pass remembering the last (matching) element.
fn last_like(request: &SynthesisRequest, absent: Absent) -> Vec<Decl> {
    let elem = request.element_ty();
    let (plain, predicated) = if has_length(request) {
        let plain = vec![
            let_("length", length_of(source())),
            if_then(
                binary(BinaryOp::Eq, local("length"), int(0)),
                vec![absent.stmt(request, QueryError::NoElements)],
            ),
            ret(get(
                source(),
                binary(BinaryOp::Sub, local("length"), int(1)),
            )),
        ];
        let predicated = vec![
            let_("i", binary(BinaryOp::Sub, length_of(source()), int(1))),
            while_(
                binary(BinaryOp::Ge, local("i"), int(0)),
                vec![
                    let_("item", get(source(), local("i"))),
                    if_then(matches("item"), vec![ret(local("item"))]),
                    assign("i", binary(BinaryOp::Sub, local("i"), int(1))),
                ],
            ),
            absent.stmt(request, QueryError::NoMatch),
        ];
        (plain, predicated)
    } else {
        let scan = |predicated: bool, error: QueryError| {
            let remember = vec![
                assign("last", local("item")),
                assign("found", boolean(true)),
            ];
            let body = if predicated {
                vec![if_then(matches("item"), remember)]
            } else {
                remember
            };
            vec![
                let_("last", default_of(elem.clone())),
                let_("found", boolean(false)),
                for_each("item", source(), body),
                if_then(not(local("found")), vec![absent.stmt(request, error)]),
                ret(local("last")),
            ]
        };
        (
            scan(false, QueryError::NoElements),
            scan(true, QueryError::NoMatch),
        )
    };
    vec![
        extension(request, &[], vec![], elem.clone(), plain),
        extension(request, &[], vec![predicate(request)], elem, predicated),
    ]
}

pub(super) fn last(request: &SynthesisRequest) -> Vec<Decl> {
    last_like(request, Absent::Fail)
}

pub(super) fn last_or_default(request: &SynthesisRequest) -> Vec<Decl> {
    last_like(request, Absent::Default)
}

/// Linear scan with `==`, or with a caller-supplied comparer.
pub(super) fn contains(request: &SynthesisRequest) -> Vec<Decl> {
    let elem = request.element_ty();
    let value = Param::new("value", elem.clone());
    let comparer = Param::new(
        "comparer",
        Ty::fun(vec![elem.clone(), elem], Ty::bool()),
    );
    let scan = |test: Expr| {
        vec![
            for_each(
                "item",
                source(),
                vec![if_then(test, vec![ret(boolean(true))])],
            ),
            ret(boolean(false)),
        ]
    };
    vec![
        extension(
            request,
            &[],
            vec![value.clone()],
            Ty::bool(),
            scan(binary(BinaryOp::Eq, local("item"), local("value"))),
        ),
        extension(
            request,
            &[],
            vec![value, comparer],
            Ty::bool(),
            scan(invoke(
                local("comparer"),
                vec![local("item"), local("value")],
            )),
        ),
    ]
}
