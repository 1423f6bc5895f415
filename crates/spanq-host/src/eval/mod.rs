//! Evaluation of scripts and of synthesized declarations.
//!
//! Script expressions are evaluated from the syntax tree. Synthesized code
//! is executed straight from the declaration records of the installed unit;
//! the rendered text is never consulted. Both share one method dispatch:
//! builtin members first, then methods of synthesized structs, then
//! synthesized extensions chosen by the runtime types of the arguments.

mod builtins;
mod ir;
mod script;

use rowan::TextRange;
use rustc_hash::FxHashMap;
use spanq_common::ty::Ty;
use spanq_gen::{ArgShape, QueryError, SyntheticUnit};
use tracing::trace;

use crate::error::{EvalError, RuntimeError};
use crate::value::Value;

pub use script::evaluate;

/// The bindings and final value of an evaluated script.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// `let` bindings in order.
    pub bindings: Vec<(String, Value)>,
    /// Value of the last statement.
    pub result: Option<Value>,
}

impl Outcome {
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// An evaluation error, located at the innermost script expression that
/// saw it.
#[derive(Debug, Clone)]
pub(crate) struct Fault {
    error: EvalError,
    range: Option<TextRange>,
}

impl Fault {
    /// Attribute the fault to `range` unless it already has a location.
    fn or_at(mut self, range: TextRange) -> Fault {
        self.range.get_or_insert(range);
        self
    }

    fn into_runtime(self, fallback: TextRange) -> RuntimeError {
        RuntimeError {
            error: self.error,
            range: self.range.unwrap_or(fallback),
        }
    }
}

impl From<EvalError> for Fault {
    fn from(error: EvalError) -> Self {
        Fault { error, range: None }
    }
}

impl From<QueryError> for Fault {
    fn from(error: QueryError) -> Self {
        EvalError::Query(error).into()
    }
}

type EvalResult<T = Value> = Result<T, Fault>;

pub(crate) struct Interpreter<'a> {
    unit: Option<&'a SyntheticUnit>,
    /// Static types from the checker, for array literals and closures.
    types: &'a FxHashMap<TextRange, Ty>,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(
        unit: Option<&'a SyntheticUnit>,
        types: &'a FxHashMap<TextRange, Ty>,
    ) -> Self {
        Interpreter { unit, types }
    }

    /// Invoke `name` on `recv`.
    fn call_method(&mut self, recv: Value, name: &str, args: Vec<Value>) -> EvalResult {
        if let Some(result) = builtins::call(self, &recv, name, &args) {
            return result;
        }

        if let (Some(unit), Value::Struct(target)) = (self.unit, &recv) {
            let struct_name = target.borrow().name().to_string();
            if let Some(decl) = unit.find_struct(&struct_name) {
                if let Some(method) = decl.method(name) {
                    return self.exec_method(decl, method, target.clone(), args);
                }
            }
        }

        let recv_ty = recv.ty();
        if let (Some(unit), Some(head)) = (self.unit, recv_ty.head()) {
            let shapes: Vec<ArgShape> = args.iter().map(Value::arg_shape).collect();
            if let Some(ext) = unit.find_extension(head, name, &shapes) {
                trace!(target: "spanq::eval", receiver = head, method = name, "extension");
                return self.exec_extension(ext, recv, args);
            }
        }

        Err(EvalError::NoMethod {
            receiver: recv_ty.to_string(),
            name: name.to_string(),
        }
        .into())
    }

    /// Call a closure value.
    fn apply(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        let Value::Closure(closure) = callee else {
            return Err(EvalError::NotCallable(callee.ty().to_string()).into());
        };
        let mut env = closure.captured.clone();
        env.push_scope();
        for (param, arg) in closure.params.iter().zip(args) {
            env.insert(param.clone(), arg);
        }
        self.eval_expr(&mut env, &closure.body)
    }

    fn apply_bool(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult<bool> {
        let value = self.apply(callee, args)?;
        value
            .as_bool()
            .ok_or_else(|| EvalError::Unsupported(format!("{} used as Bool", value.ty())).into())
    }
}
