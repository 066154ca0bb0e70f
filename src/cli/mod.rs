pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DetectArgs, OutputFormatArg, RootArgs};
pub use output::{OutputFormat, OutputFormatter};
