use clap::{Parser, Subcommand};
use rediscart::{config::AppConfig, context::AppContext, logging};

mod cart;
mod output;
mod sweep;

#[derive(Debug, Parser)]
#[command(name = "rediscart", about = "Rediscart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Cart(cart::CartCommand),
    Sweep(sweep::SweepCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        logging::init(&self.config.logging).map_err(|error| error.to_string())?;

        let context = AppContext::from_redis_url(
            &self.config.store.redis_url,
            self.config.index.index_options(),
        )
        .await
        .map_err(|error| format!("failed to initialise: {error}"))?;

        match self.command {
            Commands::Cart(command) => cart::run(&context, command).await,
            Commands::Sweep(command) => sweep::run(&context, command).await,
        }
    }
}
