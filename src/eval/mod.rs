use std::fmt;
use std::rc::Rc;

use crate::ast::{OutputKind, Site, Statement, Value};
use crate::context::Context;
use crate::error::{Error, Result};

pub mod expressions;

use expressions::evaluate;

/// A message produced by `@debug` or `@warn`.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub kind: OutputKind,
    pub site: Site,
    pub message: String,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OutputKind::Debug => write!(f, "{} DEBUG: {}", self.site, self.message),
            OutputKind::Warn => write!(
                f,
                "WARNING: {}\n    on line {} of {}",
                self.message, self.site.line, self.site.filename
            ),
        }
    }
}

/// Result of executing a statement.
#[derive(Debug, PartialEq)]
pub enum Flow {
    /// Carry on with the next statement.
    Continue,
    /// `@return` was reached; unwinds up to the enclosing function call.
    Return(Value),
}

impl Statement {
    pub fn execute(&self, context: &mut Context) -> Result<Flow> {
        match self {
            Statement::Function(definition) => {
                Rc::clone(definition).register(context);
                Ok(Flow::Continue)
            }
            Statement::Return(r) => Ok(Flow::Return(evaluate(
                &r.expression,
                context,
                &r.token.site,
            )?)),
            Statement::Assign(a) => {
                let keep = a.default && context.variable(&a.name).map_or(false, |v| !v.is_null());
                if !keep {
                    let value = evaluate(&a.expression, context, &a.token.site)?;
                    context.set_variable(&a.name, value);
                }
                Ok(Flow::Continue)
            }
            Statement::If(c) => {
                for branch in &c.branches {
                    if evaluate(&branch.condition, context, &branch.site)?.is_truthy() {
                        return execute_block(&branch.body, context);
                    }
                }
                match &c.otherwise {
                    Some(body) => execute_block(body, context),
                    None => Ok(Flow::Continue),
                }
            }
            Statement::Output(o) => {
                let message = match evaluate(&o.expression, context, &o.token.site)? {
                    Value::String { text, .. } => text,
                    other => other.to_string(),
                };
                match o.kind {
                    OutputKind::Debug => tracing::info!(site = %o.token.site, "@debug {}", message),
                    OutputKind::Warn => tracing::warn!(site = %o.token.site, "@warn {}", message),
                }
                context.emit(Output {
                    kind: o.kind,
                    site: o.token.site.clone(),
                    message,
                });
                Ok(Flow::Continue)
            }
        }
    }
}

/// Executes `statements` in order, stopping at the first `@return`.
pub fn execute_block(statements: &[Statement], context: &mut Context) -> Result<Flow> {
    for statement in statements {
        if let flow @ Flow::Return(_) = statement.execute(context)? {
            return Ok(flow);
        }
    }
    Ok(Flow::Continue)
}

/// Runs top-level statements in a fresh root scope and collects their output,
/// including output emitted inside function bodies.
pub fn run(statements: &[Statement]) -> Result<Vec<Output>> {
    let mut root = Context::new();
    for statement in statements {
        match statement.execute(&mut root)? {
            Flow::Continue => {}
            Flow::Return(_) => {
                return Err(Error::ReturnOutsideFunction {
                    site: statement.token().site.clone(),
                })
            }
        }
    }
    Ok(root.take_outputs())
}
