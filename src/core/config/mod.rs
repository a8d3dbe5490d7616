mod path;
mod settings;

pub use path::*;
