//! Monkey command-line.
//!
//! When called without arguments it drops into an interactive
//! read-evaluate-print loop.
//!
//! When called with arguments, it interprets the corresponding files in a
//! single interpreter session (so code and data sharing is possible).

mod repl;

use std::cell::RefCell;
use std::env;
use std::fs;
use std::rc::Rc;

use anyhow::{bail, Context};

use monkey_interpreter::{Environment, Evaluator};
use monkey_parser::{lexer::Lexer, parser::Parser};

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if !args.is_empty() {
        run_all_files(args)?;
    } else {
        repl::repl();
    }
    Ok(())
}

fn run_all_files(paths: Vec<String>) -> Result<(), anyhow::Error> {
    let env = Rc::new(RefCell::new(Environment::new()));

    for path in &paths {
        let source =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
        run_source(&source, &env).with_context(|| format!("failed to run {}", path))?;
    }

    Ok(())
}

fn run_source(source: &str, env: &Rc<RefCell<Environment>>) -> Result<(), anyhow::Error> {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);

    match parser.parse_program() {
        Ok(program) => {
            let mut evaluator = Evaluator::new_with_env(Rc::clone(env));
            let result = evaluator.eval(&program);

            if result.is_error() {
                bail!("{}", result);
            }

            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("parser error: {}", error);
            }
            bail!("{} parse error(s)", errors.len());
        }
    }
}
