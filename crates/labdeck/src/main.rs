mod app;
mod capture;
mod chrome;
mod cli;
mod commands;
mod config;
mod controller;
mod deck;
mod draw;
mod keymap;
mod logging;
mod parser;
mod pdf;
mod progress;
mod render;
mod search;
mod theme;

use clap::Parser;
use colored::Colorize;

fn main() {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    logging::init(cli.verbose, cli.quiet, cli.no_color);

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}
