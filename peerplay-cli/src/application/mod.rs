mod command;
mod demo;
mod presenter;

pub use command::{parse_command, Command, HELP};
pub use demo::{run_demo, DemoReport};
pub use presenter::{describe_event, render_directory, render_game};
