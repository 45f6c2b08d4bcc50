use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::{debug, LevelFilter};
use lox::vm::VM;
use lox::InterpretError;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(about = "Bytecode interpreter for the Lox language")]
struct Args {
    /// Script to run. Starts a REPL if omitted.
    #[arg(short, long)]
    file: Option<PathBuf>,
    #[arg(conflicts_with = "file", value_name = "SCRIPT")]
    script: Option<PathBuf>,
    /// -v for debug output, -vv to trace every instruction.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    match args.file.or(args.script) {
        Some(path) => run_file(&path),
        None => match repl() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e:#}");
                ExitCode::from(74)
            }
        },
    }
}

fn repl() -> Result<()> {
    let mut stdout = std::io::stdout();
    let mut vm = VM::new(&mut stdout);
    prompt()?;
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.is_empty() {
            break;
        }
        if let Err(e) = vm.interpret(&line) {
            eprintln!("{e}");
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

fn run_file(path: &Path) -> ExitCode {
    let contents = match std::fs::read_to_string(path)
        .with_context(|| format!("Could not read file \"{}\"", path.display()))
    {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(74);
        }
    };
    debug!("Running {}", path.display());

    let mut stdout = std::io::stdout();
    let mut vm = VM::new(&mut stdout);
    match vm.interpret(&contents) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{e}");
            match e {
                InterpretError::CompileErrors(errors) => {
                    if let Some(first) = errors.errors().first() {
                        debug!("Compilation stopped, first error on line {}", first.line());
                    }
                    ExitCode::from(65)
                }
                InterpretError::RuntimeError(_) => {
                    eprintln!();
                    ExitCode::from(70)
                }
            }
        }
    }
}

/// Warnings by default, raised by each `-v`. `RUST_LOG` still wins.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init()
}
