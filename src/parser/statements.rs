use std::rc::Rc;

use nom::character::complete::*;
use nom::combinator::*;
use nom::error::{ErrorKind, VerboseError};
use nom::sequence::*;

use super::common::{keyword, line_of, p_identifier, p_trivia};
use super::expressions::p_expr;
use super::signature::parse_signature;
use super::Syntax;
use crate::ast::{
    Assignment, Branch, Conditional, FunctionDefinition, OutputKind, OutputStatement, Return, Site,
    Statement, Token,
};
use crate::error::{Error, Result};

type Parsed<'s, T> = Result<(&'s str, T)>;

fn starts_with_keyword<'a>(i: &'a str, word: &'static str) -> Option<&'a str> {
    keyword::<(&str, ErrorKind)>(word)(i)
        .ok()
        .map(|(rest, _)| rest)
}

// offset of the first `{`, `;` or `}` outside a quoted string
fn header_end(i: &str) -> usize {
    let mut quote = None;
    for (idx, c) in i.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '{') | (None, ';') | (None, '}') => return idx,
            _ => {}
        }
    }
    i.len()
}

/// Turns stylesheet source into a statement tree.
///
/// Statements end with `;` (optional before `}` and at the end of input),
/// blocks are delimited with braces.
pub struct StatementParser<'s> {
    source: &'s str,
    filename: Rc<str>,
    syntax: Syntax,
}

impl<'s> StatementParser<'s> {
    pub fn new(source: &'s str, filename: impl Into<Rc<str>>, syntax: Syntax) -> Self {
        StatementParser {
            source,
            filename: filename.into(),
            syntax,
        }
    }

    pub fn parse(&self) -> Result<Vec<Statement>> {
        let (rest, statements) = self.block_items(self.source)?;
        if !rest.is_empty() {
            return Err(Error::syntax(&self.site(rest), "unexpected `}`"));
        }
        Ok(statements)
    }

    fn site(&self, at: &str) -> Site {
        Site::new(self.filename.clone(), line_of(self.source, at))
    }

    // the text between `start` and `end`, both suffixes of the source
    fn token(&self, start: &'s str, end: &'s str) -> Token {
        Token::new(start[..start.len() - end.len()].trim(), self.site(start))
    }

    fn skip_trivia(&self, i: &'s str) -> &'s str {
        p_trivia::<(&str, ErrorKind)>(i)
            .map(|(rest, _)| rest)
            .unwrap_or(i)
    }

    fn block_items(&self, i: &'s str) -> Parsed<'s, Vec<Statement>> {
        let mut statements = Vec::new();
        let mut i = i;
        loop {
            i = self.skip_trivia(i);
            if i.is_empty() || i.starts_with('}') {
                return Ok((i, statements));
            }
            if i.starts_with(';') {
                i = &i[1..];
                continue;
            }
            let (rest, statement) = self.statement(i)?;
            statements.push(statement);
            i = rest;
        }
    }

    fn block(&self, i: &'s str) -> Parsed<'s, Vec<Statement>> {
        let i = self.skip_trivia(i);
        if !i.starts_with('{') {
            return Err(Error::syntax(&self.site(i), "expected `{`"));
        }
        let (rest, statements) = self.block_items(&i[1..])?;
        if !rest.starts_with('}') {
            return Err(Error::syntax(&self.site(rest), "expected `}`"));
        }
        Ok((&rest[1..], statements))
    }

    fn expression(&self, i: &'s str) -> Parsed<'s, String> {
        preceded(multispace0, recognize(p_expr::<VerboseError<&'s str>>))(i)
            .map(|(rest, text)| (rest, text.to_string()))
            .map_err(|e| Error::from_nom(&self.site(i), i, e))
    }

    fn end_of_statement(&self, i: &'s str) -> Result<&'s str> {
        let i = self.skip_trivia(i);
        if i.starts_with(';') {
            Ok(&i[1..])
        } else if i.is_empty() || i.starts_with('}') {
            Ok(i)
        } else {
            Err(Error::syntax(&self.site(i), "expected `;`"))
        }
    }

    fn statement(&self, i: &'s str) -> Parsed<'s, Statement> {
        if let Some(rest) = starts_with_keyword(i, "@function") {
            self.function(i, rest)
        } else if let Some(rest) = starts_with_keyword(i, "@return") {
            let (rest, expression) = self.expression(rest)?;
            let token = self.token(i, rest);
            let rest = self.end_of_statement(rest)?;
            Ok((rest, Statement::Return(Return { expression, token })))
        } else if let Some(rest) = starts_with_keyword(i, "@if") {
            self.conditional(i, rest)
        } else if let Some(rest) = starts_with_keyword(i, "@debug") {
            self.output(OutputKind::Debug, i, rest)
        } else if let Some(rest) = starts_with_keyword(i, "@warn") {
            self.output(OutputKind::Warn, i, rest)
        } else if i.starts_with(self.syntax.sigil()) {
            self.assignment(i)
        } else {
            Err(Error::syntax(&self.site(i), "expected a statement"))
        }
    }

    // @function <signature> { <body> }
    fn function(&self, start: &'s str, rest: &'s str) -> Parsed<'s, Statement> {
        let header_end = header_end(rest);
        let token = self.token(start, &rest[header_end..]);
        let signature = parse_signature(&token, self.syntax)?;

        let rest = &rest[header_end..];
        let (rest, body) = if rest.starts_with('{') {
            self.block(rest)?
        } else {
            (self.end_of_statement(rest)?, Vec::new())
        };
        let definition = FunctionDefinition::new(signature, body, token);
        Ok((rest, Statement::Function(Rc::new(definition))))
    }

    // @if <expr> { } @else if <expr> { } @else { }
    fn conditional(&self, start: &'s str, rest: &'s str) -> Parsed<'s, Statement> {
        let (rest, condition) = self.expression(rest)?;
        let token = self.token(start, rest);
        let (mut rest, body) = self.block(rest)?;

        let mut branches = vec![Branch {
            condition,
            site: token.site.clone(),
            body,
        }];
        let mut otherwise = None;
        loop {
            let after = self.skip_trivia(rest);
            let after_else = match starts_with_keyword(after, "@else") {
                Some(r) => self.skip_trivia(r),
                None => break,
            };
            if let Some(r) = starts_with_keyword(after_else, "if") {
                let (r, condition) = self.expression(r)?;
                let (r, body) = self.block(r)?;
                branches.push(Branch {
                    condition,
                    site: self.site(after_else),
                    body,
                });
                rest = r;
            } else {
                let (r, body) = self.block(after_else)?;
                otherwise = Some(body);
                rest = r;
                break;
            }
        }

        Ok((
            rest,
            Statement::If(Conditional {
                branches,
                otherwise,
                token,
            }),
        ))
    }

    // @debug <expr> / @warn <expr>
    fn output(&self, kind: OutputKind, start: &'s str, rest: &'s str) -> Parsed<'s, Statement> {
        let (rest, expression) = self.expression(rest)?;
        let token = self.token(start, rest);
        let rest = self.end_of_statement(rest)?;
        Ok((
            rest,
            Statement::Output(OutputStatement {
                kind,
                expression,
                token,
            }),
        ))
    }

    // $name: <expr> [!default], or !name = <expr> [!default]
    fn assignment(&self, start: &'s str) -> Parsed<'s, Statement> {
        let (rest, name) = terminated(
            preceded(
                char(self.syntax.sigil()),
                p_identifier::<VerboseError<&'s str>>,
            ),
            tuple((multispace0, char(self.syntax.separator()))),
        )(start)
        .map_err(|e| Error::from_nom(&self.site(start), start, e))?;

        let (rest, expression) = self.expression(rest)?;
        let (rest, default) = match preceded(
            multispace0,
            keyword::<(&str, ErrorKind)>("!default"),
        )(rest)
        {
            Ok((r, _)) => (r, true),
            Err(_) => (rest, false),
        };
        let token = self.token(start, rest);
        let rest = self.end_of_statement(rest)?;

        Ok((
            rest,
            Statement::Assign(Assignment {
                name: name.to_string(),
                expression,
                default,
                token,
            }),
        ))
    }
}

/// Parses a whole stylesheet.
pub fn parse(source: &str, filename: &str, syntax: Syntax) -> Result<Vec<Statement>> {
    StatementParser::new(source, filename, syntax).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Parameter;
    use pretty_assertions::assert_eq;

    fn parse_scss(source: &str) -> Result<Vec<Statement>> {
        parse(source, "style.scss", Syntax::Scss)
    }

    #[test]
    fn parse_function_with_body() {
        let statements = parse_scss(
            "// helpers\n@function add($a, $b: 2) {\n  @return $a + $b;\n}\n",
        )
        .unwrap();
        assert_eq!(statements.len(), 1);

        let function = match &statements[0] {
            Statement::Function(f) => f,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(function.name, "add");
        assert_eq!(function.token.source, "@function add($a, $b: 2)");
        assert_eq!(function.token.site.line, 2);
        assert_eq!(
            function.parameters,
            vec![
                Parameter {
                    name: "a".to_string(),
                    default: None
                },
                Parameter {
                    name: "b".to_string(),
                    default: Some("2".to_string())
                },
            ]
        );
        match &function.body[..] {
            [Statement::Return(r)] => {
                assert_eq!(r.expression, "$a + $b");
                assert_eq!(r.token.site.line, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_bare_declaration() {
        let statements = parse_scss("@function nothing;").unwrap();
        match &statements[..] {
            [Statement::Function(f)] => {
                assert_eq!(f.name, "nothing");
                assert!(f.parameters.is_empty());
                assert!(f.body.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_assignments() {
        let statements = parse_scss("$width: 10px;\n$gap : $width / 2 !default\n").unwrap();
        assert_eq!(
            statements,
            vec![
                Statement::Assign(Assignment {
                    name: "width".to_string(),
                    expression: "10px".to_string(),
                    default: false,
                    token: Token::new("$width: 10px", Site::new("style.scss", 1)),
                }),
                Statement::Assign(Assignment {
                    name: "gap".to_string(),
                    expression: "$width / 2".to_string(),
                    default: true,
                    token: Token::new("$gap : $width / 2 !default", Site::new("style.scss", 2)),
                }),
            ]
        );
    }

    #[test]
    fn parse_legacy_assignment() {
        let statements = parse("!size = 3em", "old.sass", Syntax::Legacy).unwrap();
        match &statements[..] {
            [Statement::Assign(a)] => {
                assert_eq!(a.name, "size");
                assert_eq!(a.expression, "3em");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_conditional_chain() {
        let statements = parse_scss(
            "@if $n <= 1 { @return 1; } @else if $n == 2 { @return 2 } @else { @debug $n; }",
        )
        .unwrap();
        match &statements[..] {
            [Statement::If(c)] => {
                assert_eq!(c.branches.len(), 2);
                assert_eq!(c.branches[0].condition, "$n <= 1");
                assert_eq!(c.branches[1].condition, "$n == 2");
                assert_eq!(c.otherwise.as_ref().map(Vec::len), Some(1));
                assert_eq!(c.token.source, "@if $n <= 1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn branches_keep_their_own_line() {
        let statements = parse_scss("@if $a {\n  @return 1;\n} @else if $b {\n  @return 2;\n}").unwrap();
        match &statements[..] {
            [Statement::If(c)] => {
                assert_eq!(c.branches[0].site, Site::new("style.scss", 1));
                assert_eq!(c.branches[1].site, Site::new("style.scss", 3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn braces_in_quoted_defaults() {
        let statements = parse_scss("@function wrap($open: '{', $close: \"}\") { @return $open; }").unwrap();
        match &statements[..] {
            [Statement::Function(f)] => {
                assert_eq!(f.token.source, "@function wrap($open: '{', $close: \"}\")");
                assert_eq!(f.parameters[0].default.as_deref(), Some("'{'"));
                assert_eq!(f.parameters[1].default.as_deref(), Some("\"}\""));
                assert_eq!(f.body.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_output_statements() {
        let statements = parse_scss("@debug 1 + 1;\n@warn \"careful\";").unwrap();
        match &statements[..] {
            [Statement::Output(d), Statement::Output(w)] => {
                assert_eq!(d.kind, OutputKind::Debug);
                assert_eq!(w.kind, OutputKind::Warn);
                assert_eq!(w.expression, "\"careful\"");
                assert_eq!(w.token.site.line, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn invalid_signature_is_reported_with_its_line() {
        match parse_scss("\n\n@function ($a) { @return 1; }") {
            Err(Error::InvalidDeclaration { site, text }) => {
                assert_eq!(site.line, 3);
                assert_eq!(text, "@function ($a)");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn syntax_errors() {
        for source in &[
            "@function f() { @return 1;",
            "@return 1 2;",
            "}",
            "width: 10px;",
            "$a 1;",
            "@if true @return 1;",
        ] {
            assert!(
                matches!(parse_scss(source), Err(Error::Syntax { .. })),
                "{:?} should not parse",
                source
            );
        }
    }
}
