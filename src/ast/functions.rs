use std::rc::Rc;

use crate::ast::{Site, Statement, Token, Value};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::eval::{execute_block, expressions::evaluate, Flow};
use crate::parser::signature::Signature;

/// Lowercases `name` and replaces everything outside `[a-z0-9_]` with `_`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            _ => '_',
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Unevaluated default expression; `None` marks a required parameter.
    pub default: Option<String>,
}

/// A user-defined `@function`.
#[derive(Debug, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Statement>,
    pub token: Token,
}

impl FunctionDefinition {
    pub fn new(signature: Signature, body: Vec<Statement>, token: Token) -> FunctionDefinition {
        FunctionDefinition {
            name: signature.name,
            parameters: signature.parameters,
            body,
            token,
        }
    }

    pub fn site(&self) -> &Site {
        &self.token.site
    }

    /// Makes the function callable from `context` and its descendants.
    /// A later declaration with the same name replaces this one.
    pub fn register(self: Rc<Self>, context: &mut Context) {
        tracing::debug!(
            function = %self.name,
            site = %self.token.site,
            depth = context.depth(),
            "registering function"
        );
        context.add_function(self.name.clone(), self);
    }

    /// Calls the function with raw argument expressions.
    ///
    /// Arguments and defaults are evaluated in the new scope, in declaration
    /// order, so a default may refer to any parameter bound before it.
    /// Arguments beyond the parameter list are ignored. Without a `@return`
    /// the call yields `false`.
    #[tracing::instrument(level = "debug", skip_all, fields(function = %self.name))]
    pub fn invoke(&self, caller: &Context, arguments: &[String], call_site: &Site) -> Result<Value> {
        let mut scope = Context::with_parent(caller);

        let mut arguments = arguments.iter();
        for parameter in &self.parameters {
            let value = match (arguments.next(), &parameter.default) {
                (Some(argument), _) => evaluate(argument, &scope, call_site)?,
                (None, Some(default)) => evaluate(default, &scope, self.site())?,
                (None, None) => {
                    return Err(Error::MissingRequiredArgument {
                        function: self.name.clone(),
                        parameter: parameter.name.clone(),
                        declared: self.site().clone(),
                        called: call_site.clone(),
                    })
                }
            };
            tracing::trace!(parameter = %parameter.name, %value, "bound");
            scope.set_variable(&parameter.name, value);
        }

        match execute_block(&self.body, &mut scope)? {
            Flow::Return(value) => {
                tracing::trace!(%value, "returned");
                Ok(value)
            }
            Flow::Continue => Ok(Value::Boolean(false)),
        }
    }
}
