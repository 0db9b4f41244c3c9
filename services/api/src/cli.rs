use crate::demo::{run_demo, run_queue, DemoArgs, QueueArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use marketplace_admin::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Marketplace Admin Console",
    about = "Serve and exercise the marketplace business verification console",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the merged verification queue from the seeded in-memory marketplace
    Queue(QueueArgs),
    /// Walk through queue review, bulk decisions, reset and catalog actions
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Queue(args) => run_queue(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
