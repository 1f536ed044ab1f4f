pub mod common;
pub mod expressions;
pub mod signature;
pub mod statements;

/// Convention used to write parameters and assignments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Syntax {
    /// `$name: value`
    Scss,
    /// `!name = value`
    Legacy,
}

impl Syntax {
    pub fn sigil(self) -> char {
        match self {
            Syntax::Scss => '$',
            Syntax::Legacy => '!',
        }
    }

    pub fn separator(self) -> char {
        match self {
            Syntax::Scss => ':',
            Syntax::Legacy => '=',
        }
    }
}

impl Default for Syntax {
    fn default() -> Syntax {
        Syntax::Scss
    }
}

pub use statements::parse;
