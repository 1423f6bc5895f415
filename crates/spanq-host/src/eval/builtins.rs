//! Members the host implements natively.
//!
//! Arrays and lists evaluate the operator catalog eagerly, with the same
//! results and failures as the synthesized operators.

use spanq_common::ty::{self, Ty};
use spanq_gen::{Method, QueryError};

use super::{EvalResult, Interpreter};
use crate::error::EvalError;
use crate::value::{
    default_value, shared, values_equal, Dict, IterSource, Seq, Shared, Value, View,
};

/// Run a builtin member, or `None` if `recv` has no builtin `name`.
pub(super) fn call(
    interp: &mut Interpreter<'_>,
    recv: &Value,
    name: &str,
    args: &[Value],
) -> Option<EvalResult> {
    match recv {
        Value::View(view) => view_member(view, name, args),
        Value::Array(seq) | Value::List(seq) => {
            let is_list = matches!(recv, Value::List(_));
            match seq_member(seq, is_list, name, args) {
                Some(result) => Some(result),
                None => {
                    let method = Method::from_name(name)?;
                    Some(catalog(interp, seq.snapshot(), &seq.elem, method, args))
                }
            }
        }
        Value::Dict(dict) => dict_member(interp, dict, name, args),
        Value::Iter(iter) => match name {
            "Advance" => Some(Ok(Value::Bool(iter.borrow_mut().advance()))),
            "Current" => Some(
                iter.borrow()
                    .current()
                    .cloned()
                    .ok_or_else(|| QueryError::NoElements.into()),
            ),
            _ => None,
        },
        _ => None,
    }
}

fn int_arg(args: &[Value], i: usize) -> Result<i64, EvalError> {
    args.get(i)
        .and_then(Value::as_int)
        .ok_or_else(|| EvalError::Unsupported(format!("argument {} is not an Int", i + 1)))
}

fn index(args: &[Value], length: usize) -> Result<usize, EvalError> {
    let index = int_arg(args, 0)?;
    usize::try_from(index)
        .ok()
        .filter(|&i| i < length)
        .ok_or(EvalError::IndexOutOfRange { index, length })
}

fn enumerator(head: &str, source: IterSource, elem: &Ty) -> Value {
    Value::iter(
        source,
        Ty::app(format!("{}Enumerator", head), vec![elem.clone()]),
    )
}

fn view_member(view: &View, name: &str, args: &[Value]) -> Option<EvalResult> {
    let head = if view.read_only {
        ty::READ_ONLY_SPAN
    } else {
        ty::SPAN
    };
    let result = match name {
        "Length" => Ok(Value::Int(view.len as i64)),
        "Get" => index(args, view.len).map(|i| view.items()[i].clone()),
        "Slice" => slice(view, args).map(Value::view),
        "AsReadOnly" if !view.read_only => Ok(Value::view(View {
            read_only: true,
            ..view.clone()
        })),
        "Iter" => Ok(enumerator(head, IterSource::Window(view.clone()), &view.elem)),
        _ => return None,
    };
    Some(result.map_err(Into::into))
}

fn slice(view: &View, args: &[Value]) -> Result<View, EvalError> {
    let (start, length) = (int_arg(args, 0)?, int_arg(args, 1)?);
    let out_of_range = EvalError::SliceOutOfRange {
        start,
        length,
        available: view.len,
    };
    let (Ok(s), Ok(l)) = (usize::try_from(start), usize::try_from(length)) else {
        return Err(out_of_range);
    };
    if s.checked_add(l).map_or(true, |end| end > view.len) {
        return Err(out_of_range);
    }
    Ok(View {
        start: view.start + s,
        len: l,
        ..view.clone()
    })
}

fn seq_member(seq: &Seq, is_list: bool, name: &str, args: &[Value]) -> Option<EvalResult> {
    let head = if is_list { ty::LIST } else { ty::ARRAY };
    let result = match name {
        "Length" => Ok(Value::Int(seq.len() as i64)),
        "Get" => index(args, seq.len()).map(|i| seq.items.borrow()[i].clone()),
        "Set" if !is_list => index(args, seq.len()).map(|i| {
            let value = args.get(1).cloned().unwrap_or(Value::Unit);
            seq.items.borrow_mut()[i] = value;
            Value::Unit
        }),
        "Push" if is_list => {
            let value = args.first().cloned().unwrap_or(Value::Unit);
            seq.items.borrow_mut().push(value);
            Ok(Value::Unit)
        }
        "Iter" => Ok(enumerator(
            head,
            IterSource::Snapshot(seq.snapshot()),
            &seq.elem,
        )),
        _ => return None,
    };
    Some(result.map_err(Into::into))
}

fn dict_member(
    interp: &mut Interpreter<'_>,
    dict: &Shared<Dict>,
    name: &str,
    args: &[Value],
) -> Option<EvalResult> {
    let key = args.first().cloned().unwrap_or(Value::Unit);
    let result = match name {
        "Count" => Ok(Value::Int(dict.borrow().entries.len() as i64)),
        "Get" => find_key(interp, dict, &key).and_then(|slot| match slot {
            Some(i) => Ok(dict.borrow().entries[i].1.clone()),
            None => Err(EvalError::KeyNotFound.into()),
        }),
        "ContainsKey" => find_key(interp, dict, &key).map(|slot| Value::Bool(slot.is_some())),
        "Insert" => find_key(interp, dict, &key).map(|slot| {
            let value = args.get(1).cloned().unwrap_or(Value::Unit);
            let mut dict = dict.borrow_mut();
            match slot {
                Some(i) => dict.entries[i].1 = value,
                None => dict.entries.push((key, value)),
            }
            Value::Unit
        }),
        _ => return None,
    };
    Some(result)
}

/// Position of `key`, compared with the dictionary's comparer if it has one.
fn find_key(
    interp: &mut Interpreter<'_>,
    dict: &Shared<Dict>,
    key: &Value,
) -> EvalResult<Option<usize>> {
    let (keys, comparer) = {
        let dict = dict.borrow();
        let keys: Vec<Value> = dict.entries.iter().map(|(k, _)| k.clone()).collect();
        (keys, dict.comparer.clone())
    };
    for (i, existing) in keys.into_iter().enumerate() {
        let same = match &comparer {
            Some(comparer) => interp.apply_bool(comparer, vec![existing, key.clone()])?,
            None => values_equal(&existing, key),
        };
        if same {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

/// Result element type of a closure argument, or `fallback`.
fn closure_ret(value: Option<&Value>, fallback: &Ty) -> Ty {
    match value.map(Value::ty) {
        Some(Ty::Fun(_, ret)) => *ret,
        _ => fallback.clone(),
    }
}

/// The eager operator catalog over a snapshot of `items`.
fn catalog(
    interp: &mut Interpreter<'_>,
    items: Vec<Value>,
    elem: &Ty,
    method: Method,
    args: &[Value],
) -> EvalResult {
    let predicate = args.first();
    let list = |items: Vec<Value>| Value::list(items, elem.clone());

    match method {
        Method::Select => {
            let selector = predicate.cloned().unwrap_or(Value::Unit);
            let out = items
                .into_iter()
                .map(|item| interp.apply(&selector, vec![item]))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(Value::list(out, closure_ret(predicate, elem)))
        }
        Method::Where => Ok(list(filter(interp, items, predicate)?)),
        Method::Skip => {
            let count = int_arg(args, 0)?;
            let skip = usize::try_from(count).unwrap_or(0);
            Ok(list(items.into_iter().skip(skip).collect()))
        }
        Method::Take => {
            let count = int_arg(args, 0)?;
            let take = usize::try_from(count).unwrap_or(0);
            Ok(list(items.into_iter().take(take).collect()))
        }
        Method::Reverse => Ok(list(items.into_iter().rev().collect())),
        Method::ToList => Ok(list(items)),
        Method::ToArray => Ok(Value::array(items, elem.clone())),
        Method::ToDictionary => to_dictionary(interp, items, elem, args),
        Method::Count => Ok(Value::Int(items.len() as i64)),
        Method::Any => match predicate {
            Some(_) => Ok(Value::Bool(!filter(interp, items, predicate)?.is_empty())),
            None => Ok(Value::Bool(!items.is_empty())),
        },
        Method::All => {
            let predicate = predicate.cloned().unwrap_or(Value::Unit);
            for item in items {
                if !interp.apply_bool(&predicate, vec![item])? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        Method::First | Method::FirstOrDefault => {
            let found = filter(interp, items, predicate)?.into_iter().next();
            absent_or(found, method == Method::FirstOrDefault, predicate, elem)
        }
        Method::Last | Method::LastOrDefault => {
            let found = filter(interp, items, predicate)?.pop();
            absent_or(found, method == Method::LastOrDefault, predicate, elem)
        }
        Method::Single | Method::SingleOrDefault => {
            let mut matched = filter(interp, items, predicate)?;
            if matched.len() > 1 {
                return Err(QueryError::MoreThanOneElement.into());
            }
            absent_or(matched.pop(), method == Method::SingleOrDefault, predicate, elem)
        }
        Method::Contains => {
            let value = args.first().cloned().unwrap_or(Value::Unit);
            for item in items {
                let same = match args.get(1) {
                    Some(comparer) => interp.apply_bool(comparer, vec![item, value.clone()])?,
                    None => values_equal(&item, &value),
                };
                if same {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
    }
}

/// Items satisfying `predicate`, or all of them without one.
fn filter(
    interp: &mut Interpreter<'_>,
    items: Vec<Value>,
    predicate: Option<&Value>,
) -> EvalResult<Vec<Value>> {
    let Some(predicate) = predicate else {
        return Ok(items);
    };
    let mut out = Vec::new();
    for item in items {
        if interp.apply_bool(predicate, vec![item.clone()])? {
            out.push(item);
        }
    }
    Ok(out)
}

fn absent_or(
    found: Option<Value>,
    or_default: bool,
    predicate: Option<&Value>,
    elem: &Ty,
) -> EvalResult {
    match found {
        Some(value) => Ok(value),
        None if or_default => Ok(default_value(elem)),
        None if predicate.is_some() => Err(QueryError::NoMatch.into()),
        None => Err(QueryError::NoElements.into()),
    }
}

fn to_dictionary(
    interp: &mut Interpreter<'_>,
    items: Vec<Value>,
    elem: &Ty,
    args: &[Value],
) -> EvalResult {
    let key_selector = args.first().cloned().unwrap_or(Value::Unit);
    let (element_selector, comparer) = match args {
        [_, second] if second.ty().fn_arity() == Some(2) => (None, Some(second.clone())),
        [_, second] => (Some(second.clone()), None),
        [_, second, third] => (Some(second.clone()), Some(third.clone())),
        _ => (None, None),
    };
    let dict = Dict {
        entries: Vec::new(),
        comparer,
        key: closure_ret(Some(&key_selector), elem),
        value: closure_ret(element_selector.as_ref(), elem),
    };
    let dict = shared(dict);
    for item in items {
        let key = interp.apply(&key_selector, vec![item.clone()])?;
        let value = match &element_selector {
            Some(selector) => interp.apply(selector, vec![item])?,
            None => item,
        };
        if find_key(interp, &dict, &key)?.is_some() {
            return Err(QueryError::DuplicateKey.into());
        }
        dict.borrow_mut().entries.push((key, value));
    }
    Ok(Value::Dict(dict))
}
