//! Runtime values of the reference host.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use spanq_common::ty::{self, Ty};
use spanq_gen::ArgShape;
use spanq_parser::ast::expr::Expr;

use crate::env::Scopes;

pub type Shared<T> = Rc<RefCell<T>>;

pub(crate) fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Unit,
    /// The default value of a type that has no zero.
    Null,
    View(View),
    Array(Seq),
    List(Seq),
    Dict(Shared<Dict>),
    Closure(Rc<Closure>),
    /// An instance of a synthesized struct.
    Struct(Shared<StructValue>),
    /// A builtin enumerator.
    Iter(Shared<SeqIter>),
}

/// A borrowed window over a fixed buffer.
#[derive(Debug, Clone)]
pub struct View {
    pub buffer: Rc<[Value]>,
    pub start: usize,
    pub len: usize,
    pub read_only: bool,
    pub elem: Ty,
}

impl View {
    pub fn new(items: Vec<Value>, read_only: bool, elem: Ty) -> Self {
        let len = items.len();
        View {
            buffer: items.into(),
            start: 0,
            len,
            read_only,
            elem,
        }
    }

    pub fn items(&self) -> &[Value] {
        &self.buffer[self.start..self.start + self.len]
    }
}

/// An owned, growable sequence (arrays never grow).
#[derive(Debug, Clone)]
pub struct Seq {
    pub items: Shared<Vec<Value>>,
    pub elem: Ty,
}

impl Seq {
    pub fn new(items: Vec<Value>, elem: Ty) -> Self {
        Seq {
            items: shared(items),
            elem,
        }
    }

    pub fn snapshot(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered map with an optional key comparer closure.
#[derive(Debug, Clone)]
pub struct Dict {
    pub entries: Vec<(Value, Value)>,
    pub comparer: Option<Value>,
    pub key: Ty,
    pub value: Ty,
}

#[derive(Debug)]
pub struct Closure {
    pub params: Vec<String>,
    pub body: Expr,
    pub captured: Scopes<Value>,
    pub ty: Ty,
}

#[derive(Debug, Clone)]
pub struct StructValue {
    pub ty: Ty,
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn name(&self) -> &str {
        self.ty.head().unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == field).map(|(_, v)| v)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        match self.fields.iter_mut().find(|(n, _)| n == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }
}

/// What a builtin enumerator walks.
#[derive(Debug, Clone)]
pub enum IterSource {
    /// The window of a view, read in place.
    Window(View),
    /// A copy of an array or list taken when enumeration started.
    Snapshot(Vec<Value>),
}

/// Cursor over a builtin sequence.
#[derive(Debug, Clone)]
pub struct SeqIter {
    pub source: IterSource,
    /// Index of the current element; `None` before the first `Advance()`.
    pub index: Option<usize>,
    pub ty: Ty,
}

impl SeqIter {
    pub fn len(&self) -> usize {
        match &self.source {
            IterSource::Window(view) => view.len,
            IterSource::Snapshot(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        match &self.source {
            IterSource::Window(view) => view.items().get(index),
            IterSource::Snapshot(items) => items.get(index),
        }
    }

    /// Step to the next element. Returns whether one is available.
    pub fn advance(&mut self) -> bool {
        let next = self.index.map_or(0, |i| i + 1);
        self.index = Some(next.min(self.len()));
        next < self.len()
    }

    pub fn current(&self) -> Option<&Value> {
        self.index.and_then(|i| self.get(i))
    }
}

impl Value {
    pub fn view(view: View) -> Value {
        Value::View(view)
    }

    pub fn array(items: Vec<Value>, elem: Ty) -> Value {
        Value::Array(Seq::new(items, elem))
    }

    pub fn list(items: Vec<Value>, elem: Ty) -> Value {
        Value::List(Seq::new(items, elem))
    }

    pub fn dict(dict: Dict) -> Value {
        Value::Dict(shared(dict))
    }

    pub fn structure(ty: Ty, fields: Vec<(String, Value)>) -> Value {
        Value::Struct(shared(StructValue { ty, fields }))
    }

    pub fn iter(source: IterSource, ty: Ty) -> Value {
        Value::Iter(shared(SeqIter {
            source,
            index: None,
            ty,
        }))
    }

    /// The value's runtime type. Generic parameters of synthesized code are
    /// bound against it.
    pub fn ty(&self) -> Ty {
        match self {
            Value::Int(_) => Ty::int(),
            Value::Bool(_) => Ty::bool(),
            Value::Unit | Value::Null => Ty::unit(),
            Value::View(view) if view.read_only => Ty::read_only_span(view.elem.clone()),
            Value::View(view) => Ty::span(view.elem.clone()),
            Value::Array(seq) => Ty::array(seq.elem.clone()),
            Value::List(seq) => Ty::list(seq.elem.clone()),
            Value::Dict(dict) => {
                let dict = dict.borrow();
                Ty::dictionary(dict.key.clone(), dict.value.clone())
            }
            Value::Closure(closure) => closure.ty.clone(),
            Value::Struct(s) => s.borrow().ty.clone(),
            Value::Iter(it) => it.borrow().ty.clone(),
        }
    }

    pub fn arg_shape(&self) -> ArgShape {
        ArgShape::of_ty(&self.ty())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Elements of a builtin sequence, in order.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::View(view) => Some(view.items().to_vec()),
            Value::Array(seq) | Value::List(seq) => Some(seq.snapshot()),
            _ => None,
        }
    }
}

/// `0`, `false`, the unit value, or [`Value::Null`].
pub fn default_value(ty: &Ty) -> Value {
    match ty.head() {
        Some("Int") => Value::Int(0),
        Some("Bool") => Value::Bool(false),
        Some("Unit") => Value::Unit,
        _ => Value::Null,
    }
}

/// `==` on values: scalars and builtin sequences compare by content,
/// everything else by identity.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Unit, Value::Unit) | (Value::Null, Value::Null) => true,
        (Value::Dict(x), Value::Dict(y)) => Rc::ptr_eq(x, y),
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Struct(x), Value::Struct(y)) => Rc::ptr_eq(x, y),
        (Value::Iter(x), Value::Iter(y)) => Rc::ptr_eq(x, y),
        _ => match (a.elements(), b.elements()) {
            (Some(xs), Some(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(&ys).all(|(x, y)| values_equal(x, y))
            }
            _ => false,
        },
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Unit => write!(f, "()"),
            Value::Null => write!(f, "null"),
            Value::View(view) => write_items(f, view.items()),
            Value::Array(seq) | Value::List(seq) => write_items(f, &seq.items.borrow()),
            Value::Dict(dict) => {
                write!(f, "{{")?;
                for (i, (k, v)) in dict.borrow().entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Closure(closure) => write!(f, "<{}>", closure.ty),
            Value::Struct(_) | Value::Iter(_) => write!(f, "<{}>", self.ty()),
        }
    }
}

/// Whether `ty` names one of the borrowed views.
pub fn is_view_ty(t: &Ty) -> bool {
    t.is(ty::SPAN) || t.is(ty::READ_ONLY_SPAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let view = Value::view(View::new(vec![Value::Int(1), Value::Int(2)], true, Ty::int()));
        assert_eq!(view.to_string(), "[1, 2]");
        assert_eq!(view.ty().to_string(), "ReadOnlySpan<Int>");
        let dict = Value::dict(Dict {
            entries: vec![(Value::Int(1), Value::Bool(true))],
            comparer: None,
            key: Ty::int(),
            value: Ty::bool(),
        });
        assert_eq!(dict.to_string(), "{1: true}");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn sequences_compare_by_content() {
        let a = Value::list(vec![Value::Int(1)], Ty::int());
        let b = Value::array(vec![Value::Int(1)], Ty::int());
        let c = Value::list(vec![Value::Int(2)], Ty::int());
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
        assert!(!values_equal(&a, &Value::Int(1)));
    }

    #[test]
    fn defaults() {
        assert!(matches!(default_value(&Ty::int()), Value::Int(0)));
        assert!(matches!(default_value(&Ty::bool()), Value::Bool(false)));
        assert!(matches!(default_value(&Ty::list(Ty::int())), Value::Null));
    }

    #[test]
    fn struct_fields() {
        let mut s = StructValue {
            ty: Ty::app("WhereSpan", vec![Ty::int()]),
            fields: vec![("index".into(), Value::Int(0))],
        };
        s.set("index", Value::Int(3));
        assert!(matches!(s.get("index"), Some(Value::Int(3))));
        assert_eq!(s.name(), "WhereSpan");
    }

    #[test]
    fn window_enumeration_reads_the_shared_buffer() {
        let whole = View::new((1..=5).map(Value::Int).collect(), true, Ty::int());
        let window = View {
            start: 1,
            len: 3,
            ..whole.clone()
        };
        let mut iter = SeqIter {
            source: IterSource::Window(window),
            index: None,
            ty: Ty::int(),
        };
        if let IterSource::Window(w) = &iter.source {
            assert!(Rc::ptr_eq(&w.buffer, &whole.buffer));
        }
        assert!(iter.current().is_none());
        let mut seen = Vec::new();
        while iter.advance() {
            seen.push(iter.current().and_then(Value::as_int));
        }
        assert_eq!(seen, vec![Some(2), Some(3), Some(4)]);
        assert!(!iter.advance());
        assert!(iter.current().is_none());
    }
}
