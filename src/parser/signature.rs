use std::collections::HashSet;

use nom::bytes::complete::*;
use nom::character::complete::*;
use nom::combinator::*;
use nom::error::{ErrorKind, ParseError};
use nom::sequence::*;
use nom::IResult;

use super::common::p_identifier;
use super::Syntax;
use crate::ast::functions::{normalize_name, Parameter};
use crate::ast::Token;
use crate::error::{Error, Result};

/// A validated function signature.
#[derive(Debug, PartialEq)]
pub struct Signature {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

// matches function names: letters, digits, _ and -
fn p_function_name<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, &'a str, E> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(i)
}

// matches everything between the opening parenthesis and the last closing one
fn p_parameter_list<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, &'a str, E> {
    let (i, _) = char('(')(i)?;
    let trimmed = i.trim_end();
    if trimmed.ends_with(')') {
        Ok((&i[trimmed.len()..], &trimmed[..trimmed.len() - 1]))
    } else {
        Err(nom::Err::Error(E::from_error_kind(i, ErrorKind::Char)))
    }
}

// matches function declarations: @function <name>(<params>)?
fn p_signature<'a, E: ParseError<&'a str>>(
    i: &'a str,
) -> IResult<&'a str, (&'a str, Option<&'a str>), E> {
    all_consuming(delimited(
        tuple((multispace0, tag("@function"), multispace1)),
        tuple((p_function_name, preceded(multispace0, opt(p_parameter_list)))),
        multispace0,
    ))(i)
}

// matches a parameter name with its sigil: $name or !name
fn p_parameter_name<'a, E: ParseError<&'a str>>(
    sigil: char,
) -> impl Fn(&'a str) -> IResult<&'a str, &'a str, E> {
    move |i: &'a str| all_consuming(preceded(char(sigil), p_identifier))(i)
}

/// Splits `blob` on `separator`, ignoring separators nested in parentheses or quotes.
fn split_top_level(blob: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (idx, c) in blob.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&blob[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&blob[start..]);
    parts
}

fn parse_parameter(text: &str, syntax: Syntax, token: &Token) -> Result<Parameter> {
    let text = text.trim();
    let (name, default) = match text.find(syntax.separator()) {
        Some(at) => (text[..at].trim_end(), Some(text[at + 1..].trim())),
        None => (text, None),
    };

    let (_, name) = p_parameter_name::<(&str, ErrorKind)>(syntax.sigil())(name)
        .map_err(|_| Error::invalid_declaration(token))?;
    match default {
        Some("") => Err(Error::invalid_declaration(token)),
        default => Ok(Parameter {
            name: name.to_string(),
            default: default.map(str::to_string),
        }),
    }
}

/// Parses the `@function` header held by `token`.
pub fn parse_signature(token: &Token, syntax: Syntax) -> Result<Signature> {
    let (_, (name, list)) = p_signature::<(&str, ErrorKind)>(&token.source)
        .map_err(|_| Error::invalid_declaration(token))?;
    let name = normalize_name(name);

    let mut parameters = Vec::new();
    if let Some(list) = list.filter(|l| !l.trim().is_empty()) {
        let mut seen = HashSet::new();
        for text in split_top_level(list, ',') {
            let parameter = parse_parameter(text, syntax, token)?;
            if !seen.insert(parameter.name.replace('-', "_")) {
                return Err(Error::DuplicateParameter {
                    function: name,
                    parameter: parameter.name,
                    declared: token.site.clone(),
                });
            }
            parameters.push(parameter);
        }
    }

    Ok(Signature { name, parameters })
}
