//! Signatures of the members the host provides itself.
//!
//! Views offer only indexed access. Arrays and lists additionally carry the
//! whole operator catalog, evaluated eagerly; they are the ordinary
//! processing the synthesized operators are compared against.

use spanq_common::ty::{self, Ty};
use spanq_gen::Method;

/// One overload: parameter types after the receiver, and the return type.
/// Generic parameters left in either are bound from the arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Ty>,
    pub ret: Ty,
}

impl Signature {
    fn new(params: Vec<Ty>, ret: Ty) -> Self {
        Signature { params, ret }
    }
}

/// Every builtin overload of `name` on a concrete `receiver` type.
pub fn methods(receiver: &Ty, name: &str) -> Vec<Signature> {
    let Some(head) = receiver.head() else {
        return Vec::new();
    };
    let args = receiver.args();
    match (head, args) {
        (ty::SPAN | ty::READ_ONLY_SPAN, [elem]) => view(head, elem, name),
        (ty::ARRAY | ty::LIST, [elem]) => {
            let mut sigs = indexed(elem, name);
            if let Some(method) = Method::from_name(name) {
                sigs.extend(catalog(elem, method));
            }
            sigs
        }
        (ty::DICTIONARY, [key, value]) => dictionary(key, value, name),
        _ => Vec::new(),
    }
}

fn view(head: &str, elem: &Ty, name: &str) -> Vec<Signature> {
    match name {
        "Slice" => vec![Signature::new(
            vec![Ty::int(), Ty::int()],
            Ty::app(head, vec![elem.clone()]),
        )],
        "AsReadOnly" if head == ty::SPAN => {
            vec![Signature::new(vec![], Ty::read_only_span(elem.clone()))]
        }
        _ => indexed(elem, name),
    }
}

fn indexed(elem: &Ty, name: &str) -> Vec<Signature> {
    match name {
        "Length" => vec![Signature::new(vec![], Ty::int())],
        "Get" => vec![Signature::new(vec![Ty::int()], elem.clone())],
        _ => Vec::new(),
    }
}

fn dictionary(key: &Ty, value: &Ty, name: &str) -> Vec<Signature> {
    match name {
        "Count" => vec![Signature::new(vec![], Ty::int())],
        "Get" => vec![Signature::new(vec![key.clone()], value.clone())],
        "ContainsKey" => vec![Signature::new(vec![key.clone()], Ty::bool())],
        _ => Vec::new(),
    }
}

fn catalog(elem: &Ty, method: Method) -> Vec<Signature> {
    let e = || elem.clone();
    let predicate = || Ty::fun(vec![e()], Ty::bool());
    let list = |t: Ty| Ty::list(t);
    let plain_and_predicated = |ret: Ty| {
        vec![
            Signature::new(vec![], ret.clone()),
            Signature::new(vec![predicate()], ret),
        ]
    };

    match method {
        Method::Select => vec![Signature::new(
            vec![Ty::fun(vec![e()], Ty::param("TResult"))],
            list(Ty::param("TResult")),
        )],
        Method::Where => vec![Signature::new(vec![predicate()], list(e()))],
        Method::Skip | Method::Take => vec![Signature::new(vec![Ty::int()], list(e()))],
        Method::Reverse | Method::ToList => vec![Signature::new(vec![], list(e()))],
        Method::ToArray => vec![Signature::new(vec![], Ty::array(e()))],
        Method::ToDictionary => {
            let key = || Ty::param("TKey");
            let key_selector = || Ty::fun(vec![e()], key());
            let element_selector = || Ty::fun(vec![e()], Ty::param("TElement"));
            let comparer = || Ty::fun(vec![key(), key()], Ty::bool());
            vec![
                Signature::new(vec![key_selector()], Ty::dictionary(key(), e())),
                Signature::new(
                    vec![key_selector(), comparer()],
                    Ty::dictionary(key(), e()),
                ),
                Signature::new(
                    vec![key_selector(), element_selector()],
                    Ty::dictionary(key(), Ty::param("TElement")),
                ),
                Signature::new(
                    vec![key_selector(), element_selector(), comparer()],
                    Ty::dictionary(key(), Ty::param("TElement")),
                ),
            ]
        }
        Method::Count => vec![Signature::new(vec![], Ty::int())],
        Method::Any => plain_and_predicated(Ty::bool()),
        Method::All => vec![Signature::new(vec![predicate()], Ty::bool())],
        Method::First
        | Method::FirstOrDefault
        | Method::Single
        | Method::SingleOrDefault
        | Method::Last
        | Method::LastOrDefault => plain_and_predicated(e()),
        Method::Contains => vec![
            Signature::new(vec![e()], Ty::bool()),
            Signature::new(vec![e(), Ty::fun(vec![e(), e()], Ty::bool())], Ty::bool()),
        ],
    }
}
