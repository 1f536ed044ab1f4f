use std::path::Path;
use std::process;

use sassfn::{Options, Syntax};

// logs go to stderr, and only when RUST_LOG is set
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    init_tracing();

    let args: Vec<_> = std::env::args().skip(1).collect();
    let legacy = args.iter().any(|a| a == "--legacy");
    let inputs: Vec<_> = args.iter().filter(|a| !a.starts_with("--")).collect();

    if inputs.len() != 1 {
        eprintln!("Usage: sassfn [--legacy] <input>");
        process::exit(2);
    }

    let options = Options {
        syntax: if legacy { Syntax::Legacy } else { Syntax::Scss },
    };

    match sassfn::compile_file(Path::new(inputs[0]), &options) {
        Ok(outputs) => {
            for output in outputs {
                eprintln!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
