use anyhow::Result;
use tracing::Level;

use agents_sdk_models::telemetry;

use super::args::{Cli, Command};
use super::chat;
use super::config_cmd;
use super::run;

pub(crate) async fn run(cli: Cli) -> Result<()> {
    if cli.verbose {
        telemetry::enable_console_tracing(Level::DEBUG);
    }

    match cli.command {
        Command::Run(args) => run::handle_run(args).await,
        Command::Chat(args) => chat::handle_chat(args).await,
        Command::Config(args) => config_cmd::handle_config(args),
    }
}
