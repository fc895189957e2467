mod args;
mod chat;
mod commands;
mod config_cmd;
mod output;
mod run;
mod util;

pub use args::Cli;
