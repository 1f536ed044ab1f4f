use std::rc::Rc;

pub mod expressions;
pub mod functions;
pub mod token;
pub mod types;

pub use functions::{FunctionDefinition, Parameter};
pub use token::{Site, Token};
pub use types::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputKind {
    Debug,
    Warn,
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    Function(Rc<FunctionDefinition>),
    Return(Return),
    Assign(Assignment),
    If(Conditional),
    Output(OutputStatement),
}

/// `@return <expr>`
#[derive(Debug, PartialEq)]
pub struct Return {
    pub expression: String,
    pub token: Token,
}

/// `$name: <expr>` (or `!name = <expr>` in the legacy syntax), optionally `!default`.
#[derive(Debug, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub expression: String,
    pub default: bool,
    pub token: Token,
}

/// One `@if` or `@else if` arm; `site` is where its condition was written.
#[derive(Debug, PartialEq)]
pub struct Branch {
    pub condition: String,
    pub site: Site,
    pub body: Vec<Statement>,
}

/// `@if` with any number of `@else if` branches and an optional `@else`.
#[derive(Debug, PartialEq)]
pub struct Conditional {
    pub branches: Vec<Branch>,
    pub otherwise: Option<Vec<Statement>>,
    pub token: Token,
}

/// `@debug <expr>` or `@warn <expr>`
#[derive(Debug, PartialEq)]
pub struct OutputStatement {
    pub kind: OutputKind,
    pub expression: String,
    pub token: Token,
}

impl Statement {
    pub fn token(&self) -> &Token {
        match self {
            Statement::Function(f) => &f.token,
            Statement::Return(r) => &r.token,
            Statement::Assign(a) => &a.token,
            Statement::If(c) => &c.token,
            Statement::Output(o) => &o.token,
        }
    }
}
