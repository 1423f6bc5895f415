//! Static and runtime errors of the reference host.

use std::fmt;

use rowan::TextRange;
use spanq_common::ty::Ty;
use spanq_gen::QueryError;

/// A problem found while resolving a script, with the range it refers to.
#[derive(Clone, Debug, PartialEq)]
pub enum HostError {
    /// A name used but never bound.
    UnknownName { name: String, range: TextRange },
    /// No builtin, synthesized method or extension matches the call.
    UnresolvedMethod {
        receiver: Ty,
        name: String,
        args: usize,
        range: TextRange,
    },
    /// An expression's type differs from what its context requires.
    Mismatch {
        expected: Ty,
        found: Ty,
        range: TextRange,
    },
    /// A closure whose parameter types cannot be determined.
    CannotInferClosure { range: TextRange },
    /// An empty array literal without an annotation.
    CannotInferArray { range: TextRange },
    /// A type name that does not exist or has the wrong number of arguments.
    UnknownType { name: String, range: TextRange },
}

impl HostError {
    pub fn range(&self) -> TextRange {
        match self {
            HostError::UnknownName { range, .. }
            | HostError::UnresolvedMethod { range, .. }
            | HostError::Mismatch { range, .. }
            | HostError::CannotInferClosure { range }
            | HostError::CannotInferArray { range }
            | HostError::UnknownType { range, .. } => *range,
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::UnknownName { name, .. } => write!(f, "undefined name: {}", name),
            HostError::UnresolvedMethod {
                receiver,
                name,
                args,
                ..
            } => write!(
                f,
                "no method `{}` taking {} argument(s) on {}",
                name, args, receiver
            ),
            HostError::Mismatch {
                expected, found, ..
            } => write!(f, "expected {}, found {}", expected, found),
            HostError::CannotInferClosure { .. } => {
                write!(f, "cannot infer closure parameter types")
            }
            HostError::CannotInferArray { .. } => {
                write!(f, "cannot infer the element type of an empty array")
            }
            HostError::UnknownType { name, .. } => write!(f, "unknown type: {}", name),
        }
    }
}

impl std::error::Error for HostError {}

/// A failure while evaluating a script or synthesized code.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// A failure signalled by a query operator.
    Query(QueryError),
    IndexOutOfRange { index: i64, length: usize },
    SliceOutOfRange {
        start: i64,
        length: i64,
        available: usize,
    },
    KeyNotFound,
    DivisionByZero,
    Overflow,
    /// A method no value of that type offers.
    NoMethod { receiver: String, name: String },
    UnboundName(String),
    NotCallable(String),
    /// A value of the wrong kind reached an operation.
    Unsupported(String),
}

impl From<QueryError> for EvalError {
    fn from(err: QueryError) -> Self {
        EvalError::Query(err)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Query(err) => write!(f, "{}", err),
            EvalError::IndexOutOfRange { index, length } => {
                write!(f, "index {} out of range for length {}", index, length)
            }
            EvalError::SliceOutOfRange {
                start,
                length,
                available,
            } => write!(
                f,
                "slice {}..{} out of range for length {}",
                start,
                start.saturating_add(*length),
                available
            ),
            EvalError::KeyNotFound => write!(f, "key not found"),
            EvalError::DivisionByZero => write!(f, "division by zero"),
            EvalError::Overflow => write!(f, "integer overflow"),
            EvalError::NoMethod { receiver, name } => {
                write!(f, "no method `{}` on {}", name, receiver)
            }
            EvalError::UnboundName(name) => write!(f, "unbound name: {}", name),
            EvalError::NotCallable(what) => write!(f, "{} is not callable", what),
            EvalError::Unsupported(what) => write!(f, "unsupported operation: {}", what),
        }
    }
}

impl std::error::Error for EvalError {}

/// An [`EvalError`] attributed to the script expression that raised it.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeError {
    pub error: EvalError,
    pub range: TextRange,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for RuntimeError {}
