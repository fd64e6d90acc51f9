pub mod application;
pub mod infrastructure;

pub use application::{describe_event, parse_command, run_demo, Command, DemoReport};
pub use infrastructure::{CliError, LogConfig, Result};
