#![forbid(unsafe_code)]

//! sizechecker CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    match cli_app::run(&args) {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("sizechecker: {e}");
            if e.is_usage() {
                eprintln!("{}", cli_app::usage());
            }
            std::process::exit(e.exit_code());
        }
    }
}
