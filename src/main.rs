use anyhow::Context;
use clap::{CommandFactory, Parser};
use hydroprofile::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // No subcommand: show help and exit cleanly
    if args.command.is_none() {
        let _ = Args::command().print_help();
        println!();
        process::exit(0);
    }

    if let Err(error) = run(&args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    commands::setup_logging(args).context("logging setup failed")?;
    commands::run(args).map_err(|e| {
        let category = e.category();
        anyhow::Error::new(e).context(format!("hydroprofile {} failure", category))
    })
}
