pub mod ast;
pub mod context;
pub mod error;
pub mod eval;
pub mod parser;

use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use error::{Error, Result};
pub use eval::Output;
pub use parser::Syntax;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub syntax: Syntax,
}

fn read_content(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    Ok(contents)
}

/// Parses and runs `source`, returning what its `@debug` and `@warn` statements printed.
pub fn compile(source: &str, filename: &str, options: &Options) -> Result<Vec<Output>> {
    let statements = parser::parse(source, filename, options.syntax)?;
    tracing::debug!(filename, statements = statements.len(), "parsed");
    eval::run(&statements)
}

pub fn compile_file(path: &Path, options: &Options) -> Result<Vec<Output>> {
    let source = read_content(path)?;
    compile(&source, &path.to_string_lossy(), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{OutputKind, Site};
    use pretty_assertions::assert_eq;

    fn messages(source: &str) -> Vec<String> {
        compile(source, "main.scss", &Options::default())
            .unwrap()
            .into_iter()
            .map(|o| o.message)
            .collect()
    }

    #[test]
    fn add_with_default() {
        assert_eq!(
            messages(
                "@function add($a, $b: 2) {\n  @return $a + $b;\n}\n@debug add(3);\n@debug add(3, 4);"
            ),
            vec!["5", "7"]
        );
    }

    #[test]
    fn recursion() {
        assert_eq!(
            messages(
                "@function fact($n) {\n\
                   @if $n <= 1 { @return 1; }\n\
                   @return $n * fact($n - 1);\n\
                 }\n\
                 @debug fact(5);"
            ),
            vec!["120"]
        );
    }

    #[test]
    fn inner_return_does_not_end_the_outer_call() {
        assert_eq!(
            messages(
                "@function inner() { @return 1; }\n\
                 @function outer() { $x: inner(); $y: $x + 1; @return $y * 10; }\n\
                 @debug outer();"
            ),
            vec!["20"]
        );
    }

    #[test]
    fn functions_see_caller_scope_and_redeclarations() {
        assert_eq!(
            messages(
                "$base: 4px;\n\
                 @function gap() { @return $base * 2; }\n\
                 @debug gap();\n\
                 @function Gap() { @return $base * 3; }\n\
                 @debug gap();"
            ),
            vec!["8px", "12px"]
        );
    }

    #[test]
    fn function_declared_inside_a_function_stays_local() {
        let source = "@function outer() {\n\
                        @function helper() { @return 2; }\n\
                        @return helper();\n\
                      }\n\
                      @debug outer();\n\
                      @debug helper();";
        match compile(source, "main.scss", &Options::default()) {
            Err(Error::UndefinedFunction { name, site }) => {
                assert_eq!(name, "helper");
                assert_eq!(site.line, 6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn warnings_keep_their_site() {
        let outputs = compile("\n@warn 'deprecated';", "w.scss", &Options::default()).unwrap();
        assert_eq!(
            outputs,
            vec![Output {
                kind: OutputKind::Warn,
                site: Site::new("w.scss", 2),
                message: "deprecated".to_string(),
            }]
        );
        assert_eq!(
            outputs[0].to_string(),
            "WARNING: deprecated\n    on line 2 of w.scss"
        );
    }

    #[test]
    fn legacy_syntax() {
        let options = Options {
            syntax: Syntax::Legacy,
        };
        let outputs = compile(
            "!unit = 3px;\n@function scale(!n, !by = !unit) { @return !n * !by; }\n@debug scale(2);",
            "old.sass",
            &options,
        )
        .unwrap();
        assert_eq!(outputs[0].message, "6px");
    }

    #[test]
    fn missing_argument_reports_both_sites() {
        let err = compile(
            "@function f($a) { @return $a; }\n\n@debug f();",
            "main.scss",
            &Options::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "main.scss:3: function f: required argument $a not given \
             (function declared at main.scss:1)"
        );
    }

    #[test]
    fn output_inside_functions_is_kept_in_order() {
        assert_eq!(
            messages(
                "@debug before;\n\
                 @function f() { @warn 'inside'; @return 1; }\n\
                 @debug f();"
            ),
            vec!["before", "inside", "1"]
        );
    }

    #[test]
    fn else_if_errors_point_at_their_own_line() {
        let source = "@if false {\n  @debug a;\n} @else if $missing {\n  @debug b;\n}";
        match compile(source, "main.scss", &Options::default()) {
            Err(Error::UndefinedVariable { name, site }) => {
                assert_eq!(name, "missing");
                assert_eq!(site, Site::new("main.scss", 3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn quoted_brace_default() {
        assert_eq!(
            messages("@function f($a: '{') { @return $a; }\n@debug f();"),
            vec!["{"]
        );
    }

    #[test]
    fn return_outside_function() {
        assert!(matches!(
            compile("@return 1;", "main.scss", &Options::default()),
            Err(Error::ReturnOutsideFunction { .. })
        ));
    }
}
