//! The Dosato command-line driver: read a script, optionally dump the
//! lexer/parser output, then run it.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dosato::{Ast, Process};

#[derive(Parser)]
#[command(
    name = "dosato",
    version,
    about = "The Dosato scripting language interpreter"
)]
struct Cli {
    /// The script file to run.
    file: PathBuf,

    /// Print the source, the token table and the JSON-shaped AST before
    /// running.
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn to_exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!(
                "Could not open file (reading: {}): {}",
                cli.file.display(),
                error
            );
            return ExitCode::from(1);
        }
    };
    if source.is_empty() {
        return ExitCode::SUCCESS;
    }

    let ast = match Ast::compile(source) {
        Ok(ast) => ast,
        Err(error) => {
            eprintln!("{}", error);
            return to_exit_code(error.code());
        }
    };

    if cli.debug {
        println!("CONTENTS ({}):\n", cli.file.display());
        println!("{}", ast.source());
        println!("\nTOKENS:\n");
        print!("{}", ast.dump_tokens());
        println!("\nAST:\n");
        if let Ok(dump) = serde_json::to_string_pretty(&ast.dump_json()) {
            println!("{}", dump);
        }
        println!("\nRUNNING PROGRAM:\n");
    }

    let mut process = Process::new(ast);
    let code = process.run();
    if let Some(report) = process.error_report() {
        eprintln!("{}", report);
    }
    if cli.debug {
        println!("\nFinished with exit code {}", code);
    }
    to_exit_code(code)
}
