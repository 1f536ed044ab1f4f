use nom::error::VerboseError;
use thiserror::Error;

use crate::ast::types::OperationError;
use crate::ast::{Site, Token};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{site}: invalid function declaration `{text}`")]
    InvalidDeclaration { site: Site, text: String },

    #[error("{declared}: function {function}: parameter ${parameter} is declared twice")]
    DuplicateParameter {
        function: String,
        parameter: String,
        declared: Site,
    },

    #[error(
        "{called}: function {function}: required argument ${parameter} not given \
         (function declared at {declared})"
    )]
    MissingRequiredArgument {
        function: String,
        parameter: String,
        declared: Site,
        called: Site,
    },

    #[error("{site}: {message}")]
    Syntax { site: Site, message: String },

    #[error("{site}: undefined variable ${name}")]
    UndefinedVariable { site: Site, name: String },

    #[error("{site}: undefined function {name}()")]
    UndefinedFunction { site: Site, name: String },

    #[error("{site}: {source}")]
    Operation {
        site: Site,
        #[source]
        source: OperationError,
    },

    #[error("{site}: @return may only be used within a function")]
    ReturnOutsideFunction { site: Site },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_declaration(token: &Token) -> Error {
        Error::InvalidDeclaration {
            site: token.site.clone(),
            text: token.source.trim().to_string(),
        }
    }

    pub fn syntax(site: &Site, message: impl Into<String>) -> Error {
        Error::Syntax {
            site: site.clone(),
            message: message.into(),
        }
    }

    pub fn operation(site: &Site, source: OperationError) -> Error {
        Error::Operation {
            site: site.clone(),
            source,
        }
    }

    /// Turns a nom failure on `data` into a syntax error located at `site`,
    /// quoting the line where the innermost parser gave up.
    pub fn from_nom(site: &Site, data: &str, e: nom::Err<VerboseError<&str>>) -> Error {
        let at = match e {
            nom::Err::Incomplete(_) => "",
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                e.errors.first().map_or(data, |(i, _)| *i)
            }
        };
        match at.lines().next().map(str::trim) {
            Some(near) if !near.is_empty() => {
                Error::syntax(site, format!("unexpected `{}`", near))
            }
            _ => Error::syntax(site, "unexpected end of input"),
        }
    }
}
