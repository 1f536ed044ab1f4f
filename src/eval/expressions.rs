use crate::ast::expressions::{BinaryOp, Expr, UnaryOp};
use crate::ast::functions::normalize_name;
use crate::ast::{Site, Value};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::parser::expressions::parse_expression;

/// Evaluates expression source text in `context`; `site` is used for diagnostics.
pub fn evaluate(source: &str, context: &Context, site: &Site) -> Result<Value> {
    let expr = parse_expression(source, site)?;
    eval_expr(&expr, context, site)
}

pub fn eval_expr(expr: &Expr, context: &Context, site: &Site) -> Result<Value> {
    match expr {
        Expr::Number(n, unit) => Ok(Value::with_unit(*n, unit.clone())),
        Expr::String(text, quoted) => Ok(Value::String {
            text: text.clone(),
            quoted: *quoted,
        }),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::Variable(name) => {
            context
                .variable(name)
                .cloned()
                .ok_or_else(|| Error::UndefinedVariable {
                    site: site.clone(),
                    name: name.clone(),
                })
        }
        Expr::Call(name, arguments) => {
            let function = context.function(&normalize_name(name)).ok_or_else(|| {
                Error::UndefinedFunction {
                    site: site.clone(),
                    name: name.clone(),
                }
            })?;
            function.invoke(context, arguments, site)
        }
        Expr::Unary(op, operand) => {
            let value = eval_expr(operand, context, site)?;
            match op {
                UnaryOp::Negate => value.neg().map_err(|e| Error::operation(site, e)),
                UnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
            }
        }
        Expr::Binary(BinaryOp::And, lhs, rhs) => {
            let lhs = eval_expr(lhs, context, site)?;
            if lhs.is_truthy() {
                eval_expr(rhs, context, site)
            } else {
                Ok(lhs)
            }
        }
        Expr::Binary(BinaryOp::Or, lhs, rhs) => {
            let lhs = eval_expr(lhs, context, site)?;
            if lhs.is_truthy() {
                Ok(lhs)
            } else {
                eval_expr(rhs, context, site)
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval_expr(lhs, context, site)?;
            let rhs = eval_expr(rhs, context, site)?;
            let result = match op {
                BinaryOp::Eq => Ok(Value::Boolean(lhs == rhs)),
                BinaryOp::NotEq => Ok(Value::Boolean(lhs != rhs)),
                BinaryOp::Lt => lhs.compare(&rhs, "<", |a, b| a < b),
                BinaryOp::LtEq => lhs.compare(&rhs, "<=", |a, b| a <= b),
                BinaryOp::Gt => lhs.compare(&rhs, ">", |a, b| a > b),
                BinaryOp::GtEq => lhs.compare(&rhs, ">=", |a, b| a >= b),
                BinaryOp::Add => lhs.add(&rhs),
                BinaryOp::Sub => lhs.sub(&rhs),
                BinaryOp::Mul => lhs.mul(&rhs),
                BinaryOp::Div => lhs.div(&rhs),
                BinaryOp::Rem => lhs.rem(&rhs),
                BinaryOp::And | BinaryOp::Or => unreachable!(),
            };
            result.map_err(|e| Error::operation(site, e))
        }
    }
}
