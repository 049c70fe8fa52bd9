use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use env_logger::Builder;
use log::{debug, info};

use fend::ast_printer::AstPrinter;
use fend::scanner::Scanner;
use fend::{Report, Session};

const BANNER: &str = "\nFend REPL: Enter a line of fend to begin.\n";

#[derive(ClapParser, Debug)]
#[command(version, about = "Fend language interpreter", long_about = None)]
pub struct Cli {
    /// Script to run; starts the interactive prompt when omitted
    script: Option<PathBuf>,

    /// Print an intermediate form of the script instead of running it
    #[arg(long, value_enum, requires = "script")]
    emit: Option<Emit>,

    /// Enable logging to fend.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Emit {
    /// One `TYPE lexeme literal` line per token
    Tokens,

    /// Parenthesized syntax tree
    Ast,

    /// Syntax tree as JSON
    Json,
}

/// Reads the whole script into a String
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Could not read file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Could not read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("fend.log").context("Failed to create fend.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'fend::' from module path
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("fend::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to fend.log");
    Ok(())
}

/// Print every diagnostic of one run plus the summary notices.
fn report(outcome: &Report) {
    for error in &outcome.errors {
        eprintln!("{}", error);
    }

    if let Some(error) = &outcome.runtime_error {
        eprintln!("{}", error);
    }

    if outcome.had_error() {
        eprintln!("Errors found in file.");
    }

    if outcome.had_runtime_error() {
        eprintln!("Error occurred at runtime.");
    }
}

fn run_file(path: &Path) -> Result<()> {
    let source = read_file(path)?;
    let mut session = Session::new();

    let outcome = session.run(&source);
    report(&outcome);

    if outcome.had_error() {
        debug!("Static errors, exiting with code 65");
        std::process::exit(65);
    }

    if outcome.had_runtime_error() {
        debug!("Runtime error, exiting with code 70");
        std::process::exit(70);
    }

    Ok(())
}

fn emit(path: &Path, form: Emit) -> Result<()> {
    let source = read_file(path)?;

    match form {
        Emit::Tokens => {
            let mut clean = true;

            for token in Scanner::new(&source) {
                match token {
                    Ok(token) => println!("{}", token),
                    Err(e) => {
                        clean = false;
                        eprintln!("{}", e);
                    }
                }
            }

            if !clean {
                std::process::exit(65);
            }
        }

        Emit::Ast | Emit::Json => {
            let mut session = Session::new();

            match session.parse(&source) {
                Ok(statements) => {
                    if let Emit::Json = form {
                        let json = serde_json::to_string_pretty(&statements)
                            .context("Failed to serialize syntax tree")?;
                        println!("{}", json);
                    } else {
                        println!("{}", AstPrinter.print_program(&statements));
                    }
                }
                Err(errors) => {
                    for e in errors {
                        eprintln!("{}", e);
                    }
                    std::process::exit(65);
                }
            }
        }
    }

    Ok(())
}

fn run_prompt() -> Result<()> {
    let mut session = Session::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{}", BANNER);

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;

        if line.is_empty() {
            break;
        }

        match line.trim() {
            "cls" => {
                // ANSI: clear screen, cursor home
                print!("\x1B[2J\x1B[1;1H");
                println!("{}\n", BANNER);
            }

            "env" => {
                for (name, value) in session.globals() {
                    println!("{} : {}", name, value);
                }
                println!();
            }

            _ => report(&session.run(&line)),
        }

        stdout.flush()?;
    }

    info!("Prompt closed");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match (&args.script, args.emit) {
        (Some(path), Some(form)) => emit(path, form),
        (Some(path), None) => run_file(path),
        (None, _) => run_prompt(),
    }
}
