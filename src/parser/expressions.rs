use nom::branch::*;
use nom::bytes::complete::*;
use nom::character::complete::*;
use nom::combinator::*;
use nom::error::{ParseError, VerboseError};
use nom::multi::*;
use nom::sequence::*;
use nom::IResult;

use super::common::{keyword, p_identifier, p_number};
use crate::ast::expressions::{BinaryOp, Expr, UnaryOp};
use crate::ast::Site;
use crate::error::{Error, Result};

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(op, Box::new(lhs), Box::new(rhs))
}

// matches quoted strings, either "..." or '...'
fn p_string<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    map(
        alt((
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        )),
        |s: &str| Expr::String(s.to_string(), true),
    )(i)
}

// matches $name, and !name for stylesheets written in the legacy syntax
fn p_variable<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    map(
        preceded(alt((char('$'), char('!'))), p_identifier),
        |s: &str| Expr::Variable(s.to_string()),
    )(i)
}

fn p_literal<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    alt((
        map(keyword("true"), |_| Expr::Boolean(true)),
        map(keyword("false"), |_| Expr::Boolean(false)),
        map(keyword("null"), |_| Expr::Null),
    ))(i)
}

// matches a single call argument, kept as source text
fn p_argument<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, String, E> {
    map(preceded(multispace0, recognize(p_expr)), |s: &str| {
        s.to_string()
    })(i)
}

// matches function calls: name(<expr>, <expr>, ...)
fn p_call<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    map(
        tuple((
            p_identifier,
            char('('),
            separated_list(preceded(multispace0, char(',')), p_argument),
            preceded(multispace0, char(')')),
        )),
        |(name, _, args, _)| Expr::Call(name.to_string(), args),
    )(i)
}

fn p_parenthesized<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    delimited(char('('), p_expr, preceded(multispace0, char(')')))(i)
}

// matches all atoms; a bare identifier is an unquoted string (`bold`, `solid`)
fn p_atom<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    preceded(
        multispace0,
        alt((
            map(p_number, |(n, unit)| Expr::Number(n, unit.to_string())),
            p_string,
            p_variable,
            p_parenthesized,
            p_literal,
            p_call,
            map(p_identifier, |s: &str| Expr::String(s.to_string(), false)),
        )),
    )(i)
}

fn p_unary<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    alt((
        map(preceded(tuple((multispace0, char('-'))), p_unary), |e| {
            Expr::Unary(UnaryOp::Negate, Box::new(e))
        }),
        map(preceded(tuple((multispace0, keyword("not"))), p_unary), |e| {
            Expr::Unary(UnaryOp::Not, Box::new(e))
        }),
        p_atom,
    ))(i)
}

fn p_product<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    let (i, first) = p_unary(i)?;
    fold_many0(
        pair(
            preceded(
                multispace0,
                alt((
                    map(char('*'), |_| BinaryOp::Mul),
                    map(char('/'), |_| BinaryOp::Div),
                    map(char('%'), |_| BinaryOp::Rem),
                )),
            ),
            p_unary,
        ),
        first,
        |lhs, (op, rhs)| binary(op, lhs, rhs),
    )(i)
}

fn p_sum<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    let (i, first) = p_product(i)?;
    fold_many0(
        pair(
            preceded(
                multispace0,
                alt((
                    map(char('+'), |_| BinaryOp::Add),
                    map(char('-'), |_| BinaryOp::Sub),
                )),
            ),
            p_product,
        ),
        first,
        |lhs, (op, rhs)| binary(op, lhs, rhs),
    )(i)
}

fn p_comparison<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    let (i, lhs) = p_sum(i)?;
    let (i, rhs) = opt(pair(
        preceded(
            multispace0,
            alt((
                map(tag("=="), |_| BinaryOp::Eq),
                map(tag("!="), |_| BinaryOp::NotEq),
                map(tag("<="), |_| BinaryOp::LtEq),
                map(tag(">="), |_| BinaryOp::GtEq),
                map(tag("<"), |_| BinaryOp::Lt),
                map(tag(">"), |_| BinaryOp::Gt),
            )),
        ),
        p_sum,
    ))(i)?;
    Ok(match rhs {
        Some((op, rhs)) => (i, binary(op, lhs, rhs)),
        None => (i, lhs),
    })
}

fn p_and<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    let (i, first) = p_comparison(i)?;
    fold_many0(
        preceded(tuple((multispace0, keyword("and"))), p_comparison),
        first,
        |lhs, rhs| binary(BinaryOp::And, lhs, rhs),
    )(i)
}

// root: matches a whole expression, leading white-space included
pub fn p_expr<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, Expr, E> {
    let (i, first) = p_and(i)?;
    fold_many0(
        preceded(tuple((multispace0, keyword("or"))), p_and),
        first,
        |lhs, rhs| binary(BinaryOp::Or, lhs, rhs),
    )(i)
}

/// Parses a complete expression; anything left over is an error.
pub fn parse_expression(source: &str, site: &Site) -> Result<Expr> {
    all_consuming(terminated(p_expr::<VerboseError<&str>>, multispace0))(source)
        .map(|(_, expr)| expr)
        .map_err(|e| Error::from_nom(site, source, e))
}
