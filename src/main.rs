// File: src/main.rs
//
// Command-line entry point for the yy interpreter.
// Dispatches to the appropriate subcommand (run or repl).

use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use yy::repl::Repl;

#[derive(ClapParser)]
#[command(
    name = "yy",
    about = "yy: a tiny expression-oriented scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a yy script file
    Run {
        /// Path to the .yy file
        file: PathBuf,
    },

    /// Launch the interactive shell
    Repl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file } => {
            let source = match fs::read_to_string(&file) {
                Ok(source) => source,
                Err(err) => {
                    eprintln!("error: cannot read {}: {}", file.display(), err);
                    return ExitCode::FAILURE;
                }
            };
            if let Err(err) = yy::execute(&source, |text| print!("{}", text)) {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }

        Commands::Repl => {
            let mut repl = match Repl::new() {
                Ok(repl) => repl,
                Err(err) => {
                    eprintln!("error: cannot start the shell: {}", err);
                    return ExitCode::FAILURE;
                }
            };
            if let Err(err) = repl.run() {
                eprintln!("error: {}", err);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
    }
}
