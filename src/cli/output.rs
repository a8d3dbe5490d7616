use super::Cli;
use clap::CommandFactory;

pub fn print_error(message: &str) {
    eprintln!("Error: {}", message);
}

pub fn print_usage() {
    eprintln!("{}", Cli::command().render_help());
}
