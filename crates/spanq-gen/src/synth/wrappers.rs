//! Lazy wrapper templates: a wrapper struct holding the source and the
//! operator's argument, plus a single-pass enumerator over it.

use spanq_common::ty::Ty;

use super::builder::{
    assign_field, binary, boolean, call, construct, default_of, expr, field, for_each, get,
    if_then, int, invoke, length_of, let_, local, not, ret, while_,
};
use super::{extension, predicate_ty};
use crate::ir::{BinaryOp, Decl, Expr, FnDecl, Param, Stmt, StructDecl};
use crate::request::SynthesisRequest;
use crate::shape::{enumerator_name, Shape};

/// Pieces shared by every wrapper template.
struct Wrapper<'a> {
    request: &'a SynthesisRequest,
    shape: &'a Shape,
}

impl<'a> Wrapper<'a> {
    fn new(request: &'a SynthesisRequest) -> Option<Self> {
        let shape = request.result_shape()?;
        Some(Self { request, shape })
    }

    fn ty(&self) -> Ty {
        self.shape.ty()
    }

    fn enumerator_ty(&self) -> Ty {
        self.shape.enumerator_ty_with(&self.shape.type_params)
    }

    /// `return Wrapper { source: source, <arg>: <arg> }` as the extension.
    fn extension(&self, extra_generics: &[&str], args: Vec<Param>) -> Decl {
        let mut fields = vec![("source", local("source"))];
        fields.extend(args.iter().map(|p| (p.name.as_str(), local(&p.name))));
        let body = vec![ret(construct(self.ty(), fields))];
        extension(self.request, extra_generics, args, self.ty(), body)
    }

    fn wrapper(&self, fields: Vec<Param>, methods: Vec<FnDecl>) -> Decl {
        let mut all = vec![Param::new("source", self.request.source_ty())];
        all.extend(fields);
        Decl::Struct(StructDecl {
            name: self.shape.name.clone(),
            generics: self.shape.type_params.clone(),
            fields: all,
            methods,
        })
    }

    fn enumerator(&self, fields: Vec<Param>, advance: Vec<Stmt>, current: Expr) -> Decl {
        let elem = self.element_ty();
        Decl::Struct(StructDecl {
            name: enumerator_name(&self.shape.name),
            generics: self.shape.type_params.clone(),
            fields,
            methods: vec![
                method("Advance", vec![], Ty::bool(), advance),
                method("Current", vec![], elem, vec![ret(current)]),
            ],
        })
    }

    fn element_ty(&self) -> Ty {
        Ty::param(self.shape.element_param())
    }

    /// `Iter()` constructing the enumerator from `fields`.
    fn iter(&self, fields: Vec<(&str, Expr)>) -> FnDecl {
        method(
            "Iter",
            vec![],
            self.enumerator_ty(),
            vec![ret(construct(self.enumerator_ty(), fields))],
        )
    }

    /// `Length()` forwarding to the source.
    fn length(&self) -> FnDecl {
        method("Length", vec![], Ty::int(), vec![ret(length_of(field("source")))])
    }

    /// `Slice(start, length)` rebuilding the wrapper over a sliced source.
    fn slice(&self, sliced_source: Expr, carried: &[&str]) -> FnDecl {
        let mut fields = vec![("source", sliced_source)];
        fields.extend(carried.iter().map(|name| (*name, field(name))));
        method(
            "Slice",
            vec![Param::new("start", Ty::int()), Param::new("length", Ty::int())],
            self.ty(),
            vec![ret(construct(self.ty(), fields))],
        )
    }
}

fn method(name: &str, params: Vec<Param>, ret: Ty, body: Vec<Stmt>) -> FnDecl {
    FnDecl {
        name: name.to_string(),
        params,
        ret,
        body,
    }
}

fn inner_advance() -> Expr {
    call(field("inner"), "Advance", vec![])
}

fn inner_current() -> Expr {
    call(field("inner"), "Current", vec![])
}

fn source_iter() -> Expr {
    call(field("source"), "Iter", vec![])
}

pub(super) fn select(request: &SynthesisRequest) -> Vec<Decl> {
    let Some(w) = Wrapper::new(request) else {
        return Vec::new();
    };
    let result = Ty::param("TResult");
    let selector_ty = Ty::fun(vec![request.element_ty()], result.clone());
    let selector = Param::new("selector", selector_ty.clone());

    let mut methods = Vec::new();
    if w.shape.has_length {
        methods.push(w.length());
        methods.push(method(
            "Get",
            vec![Param::new("index", Ty::int())],
            result.clone(),
            vec![ret(invoke(
                field("selector"),
                vec![get(field("source"), local("index"))],
            ))],
        ));
        methods.push(w.slice(
            call(field("source"), "Slice", vec![local("start"), local("length")]),
            &["selector"],
        ));
    }
    methods.push(w.iter(vec![
        ("inner", source_iter()),
        ("selector", field("selector")),
        ("current", default_of(result.clone())),
    ]));

    vec![
        w.extension(&["TResult"], vec![selector.clone()]),
        w.wrapper(vec![selector], methods),
        w.enumerator(
            vec![
                Param::new("inner", request.source_enumerator_ty()),
                Param::new("selector", selector_ty),
                Param::new("current", result),
            ],
            vec![
                if_then(not(inner_advance()), vec![ret(boolean(false))]),
                assign_field("current", invoke(field("selector"), vec![inner_current()])),
                ret(boolean(true)),
            ],
            field("current"),
        ),
    ]
}

/// Where: the enumerator skips elements failing the predicate.
pub(super) fn filter(request: &SynthesisRequest) -> Vec<Decl> {
    let Some(w) = Wrapper::new(request) else {
        return Vec::new();
    };
    let predicate_ty = predicate_ty(&request.element_ty());
    let predicate = Param::new("predicate", predicate_ty.clone());

    vec![
        w.extension(&[], vec![predicate.clone()]),
        w.wrapper(
            vec![predicate],
            vec![w.iter(vec![
                ("inner", source_iter()),
                ("predicate", field("predicate")),
            ])],
        ),
        w.enumerator(
            vec![
                Param::new("inner", request.source_enumerator_ty()),
                Param::new("predicate", predicate_ty),
            ],
            vec![
                while_(
                    inner_advance(),
                    vec![if_then(
                        invoke(field("predicate"), vec![inner_current()]),
                        vec![ret(boolean(true))],
                    )],
                ),
                ret(boolean(false)),
            ],
            inner_current(),
        ),
    ]
}

/// Take over a length-unknown source: stop after `count` elements.
pub(super) fn take(request: &SynthesisRequest) -> Vec<Decl> {
    counted(
        request,
        vec![
            if_then(
                binary(BinaryOp::Le, field("remaining"), int(0)),
                vec![ret(boolean(false))],
            ),
            assign_field(
                "remaining",
                binary(BinaryOp::Sub, field("remaining"), int(1)),
            ),
            ret(inner_advance()),
        ],
    )
}

/// Skip over a length-unknown source: consume `count` elements first.
pub(super) fn skip(request: &SynthesisRequest) -> Vec<Decl> {
    counted(
        request,
        vec![
            while_(
                binary(BinaryOp::Gt, field("remaining"), int(0)),
                vec![
                    if_then(not(inner_advance()), vec![ret(boolean(false))]),
                    assign_field(
                        "remaining",
                        binary(BinaryOp::Sub, field("remaining"), int(1)),
                    ),
                ],
            ),
            ret(inner_advance()),
        ],
    )
}

fn counted(request: &SynthesisRequest, advance: Vec<Stmt>) -> Vec<Decl> {
    let Some(w) = Wrapper::new(request) else {
        return Vec::new();
    };
    let count = Param::new("count", Ty::int());
    vec![
        w.extension(&[], vec![count.clone()]),
        w.wrapper(
            vec![count],
            vec![w.iter(vec![
                ("inner", source_iter()),
                ("remaining", field("count")),
            ])],
        ),
        w.enumerator(
            vec![
                Param::new("inner", request.source_enumerator_ty()),
                Param::new("remaining", Ty::int()),
            ],
            advance,
            inner_current(),
        ),
    ]
}

/// Reverse: indexed backwards when the source has a length, otherwise
/// buffered into a List when enumeration starts.
pub(super) fn reverse(request: &SynthesisRequest) -> Vec<Decl> {
    let Some(w) = Wrapper::new(request) else {
        return Vec::new();
    };
    let elem = request.element_ty();
    let last_index = |of: Expr| binary(BinaryOp::Sub, length_of(of), int(1));

    let mut methods = Vec::new();
    let (store, store_ty) = if w.shape.has_length {
        methods.push(w.length());
        methods.push(method(
            "Get",
            vec![Param::new("index", Ty::int())],
            elem.clone(),
            vec![ret(get(
                field("source"),
                binary(
                    BinaryOp::Sub,
                    binary(BinaryOp::Sub, length_of(field("source")), local("index")),
                    int(1),
                ),
            ))],
        ));
        let window_start = binary(
            BinaryOp::Sub,
            binary(BinaryOp::Sub, length_of(field("source")), local("start")),
            local("length"),
        );
        methods.push(w.slice(
            call(field("source"), "Slice", vec![window_start, local("length")]),
            &[],
        ));
        methods.push(w.iter(vec![
            ("source", field("source")),
            ("index", last_index(field("source"))),
            ("current", default_of(elem.clone())),
        ]));
        ("source", request.source_ty())
    } else {
        methods.push(method(
            "Iter",
            vec![],
            w.enumerator_ty(),
            vec![
                let_(
                    "buffer",
                    Expr::NewList {
                        elem: elem.clone(),
                        capacity: None,
                    },
                ),
                for_each(
                    "item",
                    field("source"),
                    vec![expr(call(local("buffer"), "Push", vec![local("item")]))],
                ),
                ret(construct(
                    w.enumerator_ty(),
                    vec![
                        ("buffer", local("buffer")),
                        ("index", last_index(local("buffer"))),
                        ("current", default_of(elem.clone())),
                    ],
                )),
            ],
        ));
        ("buffer", Ty::list(elem.clone()))
    };

    vec![
        w.extension(&[], vec![]),
        w.wrapper(vec![], methods),
        w.enumerator(
            vec![
                Param::new(store, store_ty),
                Param::new("index", Ty::int()),
                Param::new("current", elem),
            ],
            vec![
                if_then(
                    binary(BinaryOp::Lt, field("index"), int(0)),
                    vec![ret(boolean(false))],
                ),
                assign_field("current", get(field(store), field("index"))),
                assign_field("index", binary(BinaryOp::Sub, field("index"), int(1))),
                ret(boolean(true)),
            ],
            field("current"),
        ),
    ]
}
