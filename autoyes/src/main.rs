//! `autoyes` - answer yes/no prompts of interactive CLI tools automatically.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let code = commands::dispatch(cli.command).await;
    std::process::exit(code);
}
