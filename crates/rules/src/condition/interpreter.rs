//! Budgeted tree walker.

use std::time::{Duration, Instant};

use super::ast::{BinaryOp, CompareOp, Expr, Literal, UnaryOp};
use super::error::ConditionEvaluationError;
use super::value::Value;

/// How often (in node visits) the wall clock is consulted.
const CLOCK_CHECK_INTERVAL: usize = 64;

/// Per-evaluation resource limits.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_ops: usize,
    pub timeout: Duration,
}

struct Budget {
    ops: usize,
    max_ops: usize,
    started: Instant,
    timeout: Duration,
}

impl Budget {
    fn tick(&mut self) -> Result<(), ConditionEvaluationError> {
        self.ops += 1;
        if self.ops > self.max_ops {
            return Err(ConditionEvaluationError::BudgetExceeded(self.max_ops));
        }
        if self.ops % CLOCK_CHECK_INTERVAL == 0 && self.started.elapsed() > self.timeout {
            return Err(ConditionEvaluationError::Timeout(self.timeout.as_millis() as u64));
        }
        Ok(())
    }
}

/// Evaluate `expr`, resolving variables through `lookup`.
pub fn eval<F>(expr: &Expr, limits: Limits, lookup: &mut F) -> Result<Value, ConditionEvaluationError>
where
    F: FnMut(&str) -> Value,
{
    let mut budget = Budget {
        ops: 0,
        max_ops: limits.max_ops,
        started: Instant::now(),
        timeout: limits.timeout,
    };
    let value = walk(expr, &mut budget, lookup)?;
    if budget.started.elapsed() > budget.timeout {
        return Err(ConditionEvaluationError::Timeout(limits.timeout.as_millis() as u64));
    }
    Ok(value)
}

fn walk<F>(expr: &Expr, budget: &mut Budget, lookup: &mut F) -> Result<Value, ConditionEvaluationError>
where
    F: FnMut(&str) -> Value,
{
    budget.tick()?;
    match expr {
        Expr::Literal(lit) => Ok(match lit {
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::Str(s) => Value::Str(s.clone()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::None => Value::None,
        }),
        Expr::Variable(name) => Ok(lookup(name)),
        Expr::List(items) => items
            .iter()
            .map(|item| walk(item, budget, lookup))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::Unary(op, inner) => {
            let v = walk(inner, budget, lookup)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!v.truthy())),
                UnaryOp::Neg => v.neg(),
                UnaryOp::Pos => v.pos(),
            }
        }
        Expr::Binary(op, left, right) => {
            let l = walk(left, budget, lookup)?;
            let r = walk(right, budget, lookup)?;
            match op {
                BinaryOp::Add => l.add(&r),
                BinaryOp::Sub => l.sub(&r),
                BinaryOp::Mul => l.mul(&r),
                BinaryOp::Div => l.div(&r),
                BinaryOp::FloorDiv => l.floor_div(&r),
                BinaryOp::Mod => l.rem(&r),
            }
        }
        // `and`/`or` yield one of their operands, short-circuiting.
        Expr::And(left, right) => {
            let l = walk(left, budget, lookup)?;
            if !l.truthy() {
                return Ok(l);
            }
            walk(right, budget, lookup)
        }
        Expr::Or(left, right) => {
            let l = walk(left, budget, lookup)?;
            if l.truthy() {
                return Ok(l);
            }
            walk(right, budget, lookup)
        }
        Expr::Compare(first, rest) => {
            let mut left = walk(first, budget, lookup)?;
            for (op, next) in rest {
                let right = walk(next, budget, lookup)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, ConditionEvaluationError> {
    use std::cmp::Ordering::*;
    Ok(match op {
        CompareOp::Eq => left.loose_eq(right),
        CompareOp::NotEq => !left.loose_eq(right),
        CompareOp::Lt => left.compare(right)? == Less,
        CompareOp::LtEq => left.compare(right)? != Greater,
        CompareOp::Gt => left.compare(right)? == Greater,
        CompareOp::GtEq => left.compare(right)? != Less,
        CompareOp::In => left.contained_in(right)?,
        CompareOp::NotIn => !left.contained_in(right)?,
    })
}
