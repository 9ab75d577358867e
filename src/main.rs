//! itersearch CLI entry point.

use clap::Parser;

use itersearch::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => {
            itersearch::cli::commands::run::execute(args, cli.config.as_deref(), cli.json).await
        }
        Commands::Network(args) => itersearch::cli::commands::network::execute(&args, cli.json),
    };

    if let Err(err) = result {
        itersearch::cli::handle_error(err, cli.json);
    }
}
