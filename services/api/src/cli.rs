use crate::commands::{run_county, run_rankings, run_score, CountyArgs, RankingsArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use unhealth::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UnHealth Score",
    about = "Score U.S. counties on survey health measures and serve the rankings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the latest snapshot over HTTP (default command)
    Serve(ServeArgs),
    /// Run the scoring pipeline over an extract and publish a snapshot
    Score(ScoreArgs),
    /// Print one county's score breakdown from the snapshot
    County(CountyArgs),
    /// Print the least and most healthy counties from the snapshot
    Rankings(RankingsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Snapshot directory to serve (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::County(args) => run_county(args),
        Command::Rankings(args) => run_rankings(args),
    }
}
