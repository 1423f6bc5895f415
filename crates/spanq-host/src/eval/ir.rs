//! Execution of synthesized declaration records.

use rustc_hash::FxHashMap;
use spanq_common::ty::Ty;
use spanq_gen::ir::{Expr, ExtensionFn, FnDecl, Place, Stmt, StructDecl, UnaryOp};

use super::script::{binary_op, short_circuit};
use super::{EvalResult, Interpreter};
use crate::error::EvalError;
use crate::value::{default_value, Dict, Shared, StructValue, Value};

/// Locals, `self`, and generic bindings of one call.
struct Frame {
    locals: FxHashMap<String, Value>,
    this: Option<Shared<StructValue>>,
    tyenv: FxHashMap<String, Ty>,
}

impl Frame {
    fn this(&self) -> Result<&Shared<StructValue>, EvalError> {
        self.this
            .as_ref()
            .ok_or_else(|| EvalError::Unsupported("`self` outside a method".into()))
    }
}

enum Flow {
    Normal,
    Return(Value),
}

impl Interpreter<'_> {
    /// Run an extension. Generic parameters are bound from the runtime
    /// types of the arguments, `source` included.
    pub(super) fn exec_extension(
        &mut self,
        ext: &ExtensionFn,
        recv: Value,
        args: Vec<Value>,
    ) -> EvalResult {
        let mut frame = Frame {
            locals: FxHashMap::default(),
            this: None,
            tyenv: FxHashMap::default(),
        };
        let values = std::iter::once(recv).chain(args);
        for (param, value) in ext.params.iter().zip(values) {
            // Null defaults carry no element type; a failed match just
            // leaves the parameter unbound.
            let _ = Ty::bind(&param.ty, &value.ty(), &mut frame.tyenv);
            frame.locals.insert(param.name.clone(), value);
        }
        self.run_body(&mut frame, &ext.body)
    }

    /// Run a method of a synthesized struct on `target`.
    pub(super) fn exec_method(
        &mut self,
        decl: &StructDecl,
        method: &FnDecl,
        target: Shared<StructValue>,
        args: Vec<Value>,
    ) -> EvalResult {
        let tyenv = {
            let ty = &target.borrow().ty;
            decl.generics
                .iter()
                .cloned()
                .zip(ty.args().iter().cloned())
                .collect()
        };
        let mut frame = Frame {
            locals: method
                .params
                .iter()
                .map(|p| p.name.clone())
                .zip(args)
                .collect(),
            this: Some(target),
            tyenv,
        };
        self.run_body(&mut frame, &method.body)
    }

    fn run_body(&mut self, frame: &mut Frame, body: &[Stmt]) -> EvalResult {
        match self.exec_block(frame, body)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Unit),
        }
    }

    fn exec_block(&mut self, frame: &mut Frame, stmts: &[Stmt]) -> EvalResult<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(frame, stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, frame: &mut Frame, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::Let { name, value } | Stmt::Assign { place: Place::Local(name), value } => {
                let value = self.eval_ir(frame, value)?;
                frame.locals.insert(name.clone(), value);
            }
            Stmt::Assign { place: Place::Field(field), value } => {
                let value = self.eval_ir(frame, value)?;
                frame.this()?.borrow_mut().set(field, value);
            }
            Stmt::If { cond, then_branch, else_branch } => {
                let branch = if self.eval_bool(frame, cond)? {
                    then_branch
                } else {
                    else_branch
                };
                return self.exec_block(frame, branch);
            }
            Stmt::While { cond, body } => {
                while self.eval_bool(frame, cond)? {
                    if let Flow::Return(value) = self.exec_block(frame, body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::ForEach { var, source, body } => {
                let source = self.eval_ir(frame, source)?;
                let iter = self.call_method(source, "Iter", vec![])?;
                loop {
                    let step = self.call_method(iter.clone(), "Advance", vec![])?;
                    if step.as_bool() != Some(true) {
                        break;
                    }
                    let current = self.call_method(iter.clone(), "Current", vec![])?;
                    frame.locals.insert(var.clone(), current);
                    if let Flow::Return(value) = self.exec_block(frame, body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::Return(expr) => return Ok(Flow::Return(self.eval_ir(frame, expr)?)),
            Stmt::Fail(error) => return Err(EvalError::Query(error.clone()).into()),
            Stmt::Expr(expr) => {
                self.eval_ir(frame, expr)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_bool(&mut self, frame: &mut Frame, expr: &Expr) -> EvalResult<bool> {
        let value = self.eval_ir(frame, expr)?;
        value
            .as_bool()
            .ok_or_else(|| EvalError::Unsupported(format!("{} used as Bool", value.ty())).into())
    }

    fn eval_int(&mut self, frame: &mut Frame, expr: &Expr) -> EvalResult<i64> {
        let value = self.eval_ir(frame, expr)?;
        value
            .as_int()
            .ok_or_else(|| EvalError::Unsupported(format!("{} used as Int", value.ty())).into())
    }

    fn eval_ir(&mut self, frame: &mut Frame, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Local(name) => frame
                .locals
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundName(name.clone()).into()),
            Expr::SelfRef => Ok(Value::Struct(frame.this()?.clone())),
            Expr::Field(field) => frame
                .this()?
                .borrow()
                .get(field)
                .cloned()
                .ok_or_else(|| EvalError::UnboundName(format!("self.{}", field)).into()),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Default(ty) => Ok(default_value(&ty.subst(&frame.tyenv))),
            Expr::Unary(op, operand) => match (op, self.eval_ir(frame, operand)?) {
                (UnaryOp::Neg, Value::Int(n)) => {
                    n.checked_neg().map(Value::Int).ok_or_else(|| EvalError::Overflow.into())
                }
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (op, other) => Err(EvalError::Unsupported(format!(
                    "`{}` on {}",
                    op.symbol(),
                    other.ty()
                ))
                .into()),
            },
            Expr::Binary(op, lhs, rhs) => {
                let left = self.eval_ir(frame, lhs)?;
                if op.is_logical() {
                    if let Some(done) = short_circuit(*op, &left) {
                        return Ok(done);
                    }
                }
                let right = self.eval_ir(frame, rhs)?;
                Ok(binary_op(*op, &left, &right)?)
            }
            Expr::Invoke(callee, args) => {
                let callee = self.eval_ir(frame, callee)?;
                let args = self.eval_args(frame, args)?;
                self.apply(&callee, args)
            }
            Expr::Call { recv, method, args } => {
                let recv = self.eval_ir(frame, recv)?;
                let args = self.eval_args(frame, args)?;
                self.call_method(recv, method, args)
            }
            Expr::Construct { ty, fields } => {
                let fields = fields
                    .iter()
                    .map(|(name, e)| Ok((name.clone(), self.eval_ir(frame, e)?)))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::structure(ty.subst(&frame.tyenv), fields))
            }
            Expr::NewList { elem, capacity } => {
                if let Some(capacity) = capacity {
                    self.eval_int(frame, capacity)?;
                }
                Ok(Value::list(Vec::new(), elem.subst(&frame.tyenv)))
            }
            Expr::NewArray { elem, len } => {
                let len = self.eval_int(frame, len)?;
                let len = usize::try_from(len).map_err(|_| EvalError::Overflow)?;
                let elem = elem.subst(&frame.tyenv);
                Ok(Value::array(vec![default_value(&elem); len], elem))
            }
            Expr::NewDict { key, value, capacity, comparer } => {
                if let Some(capacity) = capacity {
                    self.eval_int(frame, capacity)?;
                }
                let comparer = match comparer {
                    Some(c) => Some(self.eval_ir(frame, c)?),
                    None => None,
                };
                Ok(Value::dict(Dict {
                    entries: Vec::new(),
                    comparer,
                    key: key.subst(&frame.tyenv),
                    value: value.subst(&frame.tyenv),
                }))
            }
        }
    }

    fn eval_args(&mut self, frame: &mut Frame, args: &[Expr]) -> EvalResult<Vec<Value>> {
        args.iter().map(|a| self.eval_ir(frame, a)).collect()
    }
}
