//! Evaluation of script syntax.

use std::rc::Rc;

use rowan::{TextRange, TextSize};
use spanq_common::ty::{self, Ty};
use spanq_gen::ir::BinaryOp;
use spanq_parser::ast::expr::{BinaryExpr, Expr, Literal};
use spanq_parser::ast::stmt::Stmt;
use spanq_parser::SyntaxKind;

use super::{EvalResult, Interpreter, Outcome};
use crate::env::Scopes;
use crate::error::{EvalError, RuntimeError};
use crate::program::HostProgram;
use crate::value::{Closure, Value, View};

/// Evaluate every statement of `program` in order.
///
/// Synthesized operators run from the program's installed unit. The first
/// failure stops evaluation.
pub fn evaluate(program: &HostProgram) -> Result<Outcome, RuntimeError> {
    let analysis = program.analysis();
    let mut interp = Interpreter::new(program.unit(), &analysis.types);
    let mut env = Scopes::new();
    let mut outcome = Outcome::default();
    let whole = TextRange::new(
        TextSize::from(0),
        TextSize::of(program.source()),
    );

    for stmt in program.parse().tree().stmts() {
        let range = stmt.syntax().text_range();
        match stmt {
            Stmt::Let(let_stmt) => {
                let (Some(name), Some(init)) =
                    (let_stmt.name().and_then(|n| n.text()), let_stmt.initializer())
                else {
                    continue;
                };
                let value = interp
                    .eval_expr(&mut env, &init)
                    .map_err(|f| f.or_at(range).into_runtime(whole))?;
                env.insert(name.clone(), value.clone());
                outcome.bindings.push((name, value.clone()));
                outcome.result = Some(value);
            }
            Stmt::Expr(expr_stmt) => {
                let Some(expr) = expr_stmt.expr() else {
                    continue;
                };
                let value = interp
                    .eval_expr(&mut env, &expr)
                    .map_err(|f| f.or_at(range).into_runtime(whole))?;
                outcome.result = Some(value);
            }
        }
    }
    Ok(outcome)
}

impl Interpreter<'_> {
    pub(super) fn eval_expr(&mut self, env: &mut Scopes<Value>, expr: &Expr) -> EvalResult {
        let range = expr.syntax().text_range();
        let value = match expr {
            Expr::Literal(lit) => literal(lit),
            Expr::NameRef(name) => {
                let text = name.text().unwrap_or_default();
                env.lookup(&text)
                    .cloned()
                    .ok_or_else(|| EvalError::UnboundName(text).into())
            }
            Expr::ParenExpr(paren) => match paren.inner() {
                Some(inner) => self.eval_expr(env, &inner),
                None => Ok(Value::Unit),
            },
            Expr::UnaryExpr(unary) => {
                let operand = match unary.operand() {
                    Some(operand) => self.eval_expr(env, &operand)?,
                    None => Value::Unit,
                };
                let op = unary.op().map(|t| t.kind());
                match (op, operand) {
                    (Some(SyntaxKind::MINUS), Value::Int(n)) => n
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| EvalError::Overflow.into()),
                    (Some(SyntaxKind::BANG), Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (_, other) => Err(EvalError::Unsupported(format!(
                        "unary operator on {}",
                        other.ty()
                    ))
                    .into()),
                }
            }
            Expr::BinaryExpr(binary) => self.eval_binary(env, binary),
            Expr::ArrayExpr(array) => {
                let items = array
                    .elements()
                    .map(|e| self.eval_expr(env, &e))
                    .collect::<EvalResult<Vec<Value>>>()?;
                Ok(self.array_value(range, items))
            }
            Expr::ClosureExpr(closure) => {
                let ty = self.types.get(&range).cloned().ok_or_else(|| {
                    EvalError::Unsupported("closure without a type".to_string())
                })?;
                let params = closure
                    .param_list()
                    .map(|list| list.params().filter_map(|p| p.name()).collect())
                    .unwrap_or_default();
                match closure.body() {
                    Some(body) => Ok(Value::Closure(Rc::new(Closure {
                        params,
                        body,
                        captured: env.clone(),
                        ty,
                    }))),
                    None => Err(EvalError::Unsupported("closure without a body".into()).into()),
                }
            }
            Expr::MethodCallExpr(call) => {
                let recv = match call.receiver() {
                    Some(recv) => self.eval_expr(env, &recv)?,
                    None => Value::Unit,
                };
                let args = call
                    .args()
                    .iter()
                    .map(|a| self.eval_expr(env, a))
                    .collect::<EvalResult<Vec<Value>>>()?;
                let name = call.name().unwrap_or_default();
                self.call_method(recv, &name, args)
            }
        };
        value.map_err(|f| f.or_at(range))
    }

    fn eval_binary(&mut self, env: &mut Scopes<Value>, binary: &BinaryExpr) -> EvalResult {
        let op = binary
            .op()
            .and_then(|t| BinaryOp::from_symbol(t.text()))
            .ok_or_else(|| EvalError::Unsupported("malformed binary expression".into()))?;
        let (Some(lhs), Some(rhs)) = (binary.lhs(), binary.rhs()) else {
            return Err(EvalError::Unsupported("malformed binary expression".into()).into());
        };
        let left = self.eval_expr(env, &lhs)?;
        if op.is_logical() {
            if let Some(done) = short_circuit(op, &left) {
                return Ok(done);
            }
        }
        let right = self.eval_expr(env, &rhs)?;
        Ok(binary_op(op, &left, &right)?)
    }

    /// An array literal, as the checker typed it: a view, a list, or an
    /// array.
    fn array_value(&self, range: TextRange, items: Vec<Value>) -> Value {
        let static_ty = self.types.get(&range);
        let elem = static_ty
            .and_then(|t| t.args().first().cloned())
            .or_else(|| items.first().map(Value::ty))
            .unwrap_or_else(Ty::int);
        match static_ty.and_then(|t| t.head()) {
            Some(ty::SPAN) => Value::view(View::new(items, false, elem)),
            Some(ty::READ_ONLY_SPAN) => Value::view(View::new(items, true, elem)),
            Some(ty::LIST) => Value::list(items, elem),
            _ => Value::array(items, elem),
        }
    }
}

fn literal(lit: &Literal) -> EvalResult {
    let token = lit
        .token()
        .ok_or_else(|| EvalError::Unsupported("empty literal".into()))?;
    match token.kind() {
        SyntaxKind::TRUE_KW => Ok(Value::Bool(true)),
        SyntaxKind::FALSE_KW => Ok(Value::Bool(false)),
        _ => token
            .text()
            .replace('_', "")
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| EvalError::Overflow.into()),
    }
}

/// The result of `&&`/`||` when the left operand decides it.
pub(super) fn short_circuit(op: BinaryOp, left: &Value) -> Option<Value> {
    match (op, left) {
        (BinaryOp::And, Value::Bool(false)) => Some(Value::Bool(false)),
        (BinaryOp::Or, Value::Bool(true)) => Some(Value::Bool(true)),
        _ => None,
    }
}

pub(super) fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    use crate::value::values_equal;

    match op {
        BinaryOp::Eq => return Ok(Value::Bool(values_equal(left, right))),
        BinaryOp::Ne => return Ok(Value::Bool(!values_equal(left, right))),
        BinaryOp::And | BinaryOp::Or => {
            return match (left, right) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinaryOp::And {
                    *a && *b
                } else {
                    *a || *b
                })),
                _ => Err(EvalError::Unsupported(format!("`{}` on non-Bool", op))),
            };
        }
        _ => {}
    }

    let (Value::Int(a), Value::Int(b)) = (left, right) else {
        return Err(EvalError::Unsupported(format!(
            "`{}` on {} and {}",
            op,
            left.ty(),
            right.ty()
        )));
    };
    let (a, b) = (*a, *b);
    let arithmetic = |result: Option<i64>| result.map(Value::Int).ok_or(EvalError::Overflow);
    match op {
        BinaryOp::Add => arithmetic(a.checked_add(b)),
        BinaryOp::Sub => arithmetic(a.checked_sub(b)),
        BinaryOp::Mul => arithmetic(a.checked_mul(b)),
        BinaryOp::Div | BinaryOp::Rem if b == 0 => Err(EvalError::DivisionByZero),
        BinaryOp::Div => arithmetic(a.checked_div(b)),
        BinaryOp::Rem => arithmetic(a.checked_rem(b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::Le => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::Ge => Ok(Value::Bool(a >= b)),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::And | BinaryOp::Or => {
            Err(EvalError::Unsupported(format!("`{}`", op)))
        }
    }
}
