use std::fmt;
use std::rc::Rc;

/// Where a statement came from: file name and 1-based line.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub filename: Rc<str>,
    pub line: usize,
}

impl Site {
    pub fn new(filename: impl Into<Rc<str>>, line: usize) -> Site {
        Site {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

/// Raw source of a single statement together with its site.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub source: String,
    pub site: Site,
}

impl Token {
    pub fn new(source: impl Into<String>, site: Site) -> Token {
        Token {
            source: source.into(),
            site,
        }
    }
}
