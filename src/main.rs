use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context as _};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as ReplResult};
use tracing_subscriber::EnvFilter;

use minipl::{run, run_in, Context, StdIo};

const USAGE: &str = "Usage: minipl <file> | minipl --interactive";

fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [flag] if flag == "-i" || flag == "--interactive" => match run_repl() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::from(2)
            }
        },
        [path] => run_script(path),
        _ => {
            eprintln!("Invalid number of arguments: expected one\n{USAGE}");
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MINIPL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_script(path: &str) -> ExitCode {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::from(2);
        }
    };
    match run(&source, &mut StdIo) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

fn read_source(path: &str) -> anyhow::Result<String> {
    if !Path::new(path).is_file() {
        bail!("Invalid argument: {path} not found. No such file or directory.");
    }
    std::fs::read_to_string(path).with_context(|| format!("Reading {path}"))
}

/// Reads lines until they form a complete program, runs it, and keeps the
/// variables around for the next one.
fn run_repl() -> ReplResult<()> {
    let mut rl = DefaultEditor::new()?;
    #[cfg(feature = "with-file-history")]
    if rl.load_history("history.txt").is_err() {
        println!("No previous history.");
    }
    let mut io = StdIo;
    let mut context = Context::new(&mut io);
    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { ">> " } else { ".. " };
        match rl.readline(prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                buffer.push_str(&line);
                buffer.push('\n');
                match run_in(&buffer, &mut context) {
                    Err(err) if err.is_incomplete() => continue,
                    Err(err) => eprintln!("{err}"),
                    Ok(()) => {}
                }
                buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    #[cfg(feature = "with-file-history")]
    let _ = rl.save_history("history.txt");
    Ok(())
}
