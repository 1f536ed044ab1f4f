use nom::branch::*;
use nom::bytes::complete::*;
use nom::character::complete::*;
use nom::combinator::*;
use nom::error::ParseError;
use nom::multi::*;
use nom::sequence::*;
use nom::IResult;

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

// matches identifiers: starts with a letter or _, then letters, digits, _ and -
pub fn p_identifier<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(tuple((
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_identifier_char),
    )))(i)
}

// matches a whole word, so that `and` does not match the start of `android`
pub fn keyword<'a, E: ParseError<&'a str>>(
    word: &'static str,
) -> impl Fn(&'a str) -> IResult<&'a str, &'a str, E> {
    move |i: &'a str| {
        terminated(
            tag(word),
            not(peek(take_while_m_n(1, 1, is_identifier_char))),
        )(i)
    }
}

// white-space and comments, newlines included
pub fn p_trivia<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(many0_count(alt((
        multispace1,
        recognize(tuple((tag("//"), take_while(|c: char| c != '\n')))),
        recognize(tuple((tag("/*"), take_until("*/"), tag("*/")))),
    ))))(i)
}

// matches numbers with an optional unit: 10, 1.5em, .5, 50%
pub fn p_number<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, (f64, &'a str), E> {
    tuple((
        map_res(
            alt((
                recognize(tuple((digit1, opt(tuple((char('.'), digit1)))))),
                recognize(tuple((char('.'), digit1))),
            )),
            |s: &str| s.parse::<f64>(),
        ),
        map(opt(alt((tag("%"), alpha1))), |u| u.unwrap_or("")),
    ))(i)
}

/// 1-based line of `rest` inside `source`; `rest` must be a suffix of `source`.
pub fn line_of(source: &str, rest: &str) -> usize {
    let offset = source.len() - rest.len();
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::error::ErrorKind;

    #[test]
    fn parse_identifier() {
        assert_eq!(
            p_identifier::<(&str, ErrorKind)>("abcdef xxx"),
            Ok((" xxx", "abcdef"))
        );
        assert_eq!(
            p_identifier::<(&str, ErrorKind)>("under_score xxx"),
            Ok((" xxx", "under_score"))
        );
        assert_eq!(
            p_identifier::<(&str, ErrorKind)>("with-dash(xxx"),
            Ok(("(xxx", "with-dash"))
        );
    }

    #[test]
    #[should_panic]
    fn parse_identifier_panic_when_starts_with_digit() {
        p_identifier::<(&str, ErrorKind)>("1abc xxx").unwrap();
    }

    #[test]
    fn keyword_needs_word_boundary() {
        assert_eq!(
            keyword::<(&str, ErrorKind)>("and")("and $b"),
            Ok((" $b", "and"))
        );
        assert!(keyword::<(&str, ErrorKind)>("and")("android").is_err());
    }

    #[test]
    fn parse_trivia() {
        assert_eq!(
            p_trivia::<(&str, ErrorKind)>("  // line\n /* block\n */ x"),
            Ok(("x", "  // line\n /* block\n */ "))
        );
        assert_eq!(p_trivia::<(&str, ErrorKind)>("x"), Ok(("x", "")));
    }

    #[test]
    fn parse_number() {
        assert_eq!(
            p_number::<(&str, ErrorKind)>("10 xxx"),
            Ok((" xxx", (10.0, "")))
        );
        assert_eq!(
            p_number::<(&str, ErrorKind)>("1.5em;"),
            Ok((";", (1.5, "em")))
        );
        assert_eq!(p_number::<(&str, ErrorKind)>(".5"), Ok(("", (0.5, ""))));
        assert_eq!(p_number::<(&str, ErrorKind)>("50%"), Ok(("", (50.0, "%"))));
    }

    #[test]
    fn computes_lines() {
        let source = "a\nb\nc";
        assert_eq!(line_of(source, source), 1);
        assert_eq!(line_of(source, &source[4..]), 3);
    }
}
