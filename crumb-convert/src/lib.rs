pub mod cli;
pub mod fetch;
pub mod load_config;

pub use cli::{run, Cli, Commands};
