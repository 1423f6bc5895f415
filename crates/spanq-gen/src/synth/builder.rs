//! Shorthand constructors for declaration bodies.

use spanq_common::ty::Ty;

use crate::error::QueryError;
use crate::ir::{BinaryOp, Expr, Place, Stmt, UnaryOp};

pub(crate) fn local(name: &str) -> Expr {
    Expr::Local(name.to_string())
}

pub(crate) fn field(name: &str) -> Expr {
    Expr::Field(name.to_string())
}

pub(crate) fn int(value: i64) -> Expr {
    Expr::Int(value)
}

pub(crate) fn boolean(value: bool) -> Expr {
    Expr::Bool(value)
}

pub(crate) fn default_of(ty: Ty) -> Expr {
    Expr::Default(ty)
}

pub(crate) fn not(operand: Expr) -> Expr {
    Expr::Unary(UnaryOp::Not, Box::new(operand))
}

pub(crate) fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(op, Box::new(lhs), Box::new(rhs))
}

pub(crate) fn invoke(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Invoke(Box::new(callee), args)
}

pub(crate) fn call(recv: Expr, method: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        recv: Box::new(recv),
        method: method.to_string(),
        args,
    }
}

pub(crate) fn construct(ty: Ty, fields: Vec<(&str, Expr)>) -> Expr {
    Expr::Construct {
        ty,
        fields: fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    }
}

pub(crate) fn let_(name: &str, value: Expr) -> Stmt {
    Stmt::Let {
        name: name.to_string(),
        value,
    }
}

pub(crate) fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        place: Place::Local(name.to_string()),
        value,
    }
}

pub(crate) fn assign_field(name: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        place: Place::Field(name.to_string()),
        value,
    }
}

pub(crate) fn if_then(cond: Expr, then_branch: Vec<Stmt>) -> Stmt {
    Stmt::If {
        cond,
        then_branch,
        else_branch: Vec::new(),
    }
}

pub(crate) fn while_(cond: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While { cond, body }
}

pub(crate) fn for_each(var: &str, source: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::ForEach {
        var: var.to_string(),
        source,
        body,
    }
}

pub(crate) fn ret(value: Expr) -> Stmt {
    Stmt::Return(value)
}

pub(crate) fn fail(error: QueryError) -> Stmt {
    Stmt::Fail(error)
}

pub(crate) fn expr(value: Expr) -> Stmt {
    Stmt::Expr(value)
}

/// `source.Length()`.
pub(crate) fn length_of(recv: Expr) -> Expr {
    call(recv, "Length", vec![])
}

/// `recv.Get(index)`.
pub(crate) fn get(recv: Expr, index: Expr) -> Expr {
    call(recv, "Get", vec![index])
}
