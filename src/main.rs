//! Rediscart CLI

use std::process::ExitCode;

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    rediscart::config::load_dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = cli.run().await {
        #[expect(
            clippy::print_stderr,
            reason = "logging may not be initialised when the command fails"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
