//! Declaration records appended during synthesis.
//!
//! The records are the single source of truth for a synthesized unit:
//! `emit` renders them to text and a host can interpret them directly.
//!
//! Conventions shared by every record:
//!
//! - Extension methods take the receiver as their first parameter, named
//!   `source`.
//! - Struct methods receive `self` implicitly; fields are read with
//!   [`Expr::Field`] and written with [`Place::Field`].
//! - Sequences expose `Iter()` returning an enumerator with `Advance()`
//!   (step, `Bool`) and `Current()` (the element after a successful step).
//!   Length-known shapes also expose `Length()`, `Get(i)` and
//!   `Slice(start, length)`.
//! - Owned collections use `Push`/`ToArray` (List), `Set` (Array) and
//!   `ContainsKey`/`Insert` (Dictionary).

use std::fmt;

use spanq_common::ty::Ty;

use crate::error::QueryError;
use crate::method::Method;

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Extension(ExtensionFn),
    Struct(StructDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Extension(ext) => ext.method.name(),
            Decl::Struct(s) => &s.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// `Method<generics>(source: Receiver, params...) -> ret { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionFn {
    pub method: Method,
    /// Name of the receiver shape this overload extends.
    pub receiver: String,
    pub generics: Vec<String>,
    /// All parameters, `source` first.
    pub params: Vec<Param>,
    pub ret: Ty,
    pub body: Vec<Stmt>,
}

impl ExtensionFn {
    /// Parameters after `source`.
    pub fn args(&self) -> &[Param] {
        self.params.get(1..).unwrap_or(&[])
    }
}

/// A wrapper or enumerator type.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub fields: Vec<Param>,
    pub methods: Vec<FnDecl>,
}

impl StructDecl {
    pub fn method(&self, name: &str) -> Option<&FnDecl> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Param> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The declared type over its own generics.
    pub fn ty(&self) -> Ty {
        Ty::app(self.name.clone(), self.generics.iter().map(Ty::param).collect())
    }
}

/// A struct method; `self` is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Ty,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        name: String,
        value: Expr,
    },
    Assign {
        place: Place,
        value: Expr,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    /// Drive `source.Iter()` to exhaustion, binding each element to `var`.
    ForEach {
        var: String,
        source: Expr,
        body: Vec<Stmt>,
    },
    Return(Expr),
    Fail(QueryError),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Local(String),
    /// A field of `self`.
    Field(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Local(String),
    SelfRef,
    /// A field of `self`.
    Field(String),
    Int(i64),
    Bool(bool),
    /// The default value of a type (`0`, `false`, or the unit value).
    Default(Ty),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Call a closure value.
    Invoke(Box<Expr>, Vec<Expr>),
    /// Member call, resolved against builtins, struct methods and
    /// extensions in that order.
    Call {
        recv: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Construct {
        ty: Ty,
        fields: Vec<(String, Expr)>,
    },
    NewList {
        elem: Ty,
        capacity: Option<Box<Expr>>,
    },
    /// An array of `len` default values.
    NewArray {
        elem: Ty,
        len: Box<Expr>,
    },
    NewDict {
        key: Ty,
        value: Ty,
        capacity: Option<Box<Expr>>,
        comparer: Option<Box<Expr>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        })
    }

    /// Binding strength, higher binds tighter. All operators are
    /// left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
