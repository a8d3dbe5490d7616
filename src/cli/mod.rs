mod app;
mod output;

pub use app::Cli;
pub use output::{print_error, print_usage};
