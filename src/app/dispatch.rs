use anyhow::Result;

use super::logging::Logging;
use super::run::run;
use crate::cli::commands::{Cli, Commands, ConfigCommands};
use urltitel::config::Config;
use urltitel::host::ConsoleHost;
use urltitel::links::IncomingMessage;
use urltitel::pipeline::Pipeline;

/// Nick the console host answers to for self-originated lines.
const CONSOLE_NICK: &str = "urltitel";

pub async fn dispatch(cli: Cli, config: Config, logging: Logging) -> Result<()> {
    match cli.command {
        Commands::Run => run(config, logging).await,
        Commands::Check {
            text,
            server,
            channel,
            nick,
        } => check(&config, IncomingMessage::new(server, channel, nick, text)).await,
        Commands::Config { config_command } => handle_config_command(config, config_command),
    }
}

async fn check(config: &Config, message: IncomingMessage) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let host = ConsoleHost::new(CONSOLE_NICK, config.url_buffer_file());

    let titles = pipeline.handle(&host, config, &message).await;
    if titles.is_empty() {
        println!("no URLs handled");
    }
    pipeline.url_buffer().close();
    Ok(())
}

fn handle_config_command(mut config: Config, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::List => {
            for (name, value, description) in config.options.describe() {
                println!("{name} = {value:?}");
                println!("    {description}");
            }
            println!("torrent_api = {:?}", config.torrent_api);
            println!("parallel_fetches = {}", config.parallel_fetches);
        }
        ConfigCommands::Get { name } => {
            println!("{}", config.options.get(&name)?);
        }
        ConfigCommands::Set { name, value } => {
            config.options.set(&name, &value)?;
            config.validate()?;
            config.save()?;
            println!("{name} = {:?}", config.options.get(&name)?);
        }
    }
    Ok(())
}
