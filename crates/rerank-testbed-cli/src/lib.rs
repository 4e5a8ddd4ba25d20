pub mod app;
pub mod cli;
pub mod display;
pub mod items_file;

pub use app::run;
pub use cli::{Cli, Command, ConfigCommand};
