use std::io;
use std::process;

use bedpipe::commands::embed::{self, EmbedArgs};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bembed",
    about = "Generate a text embedding with an embedding model",
    disable_version_flag = true
)]
struct Cli {
    #[command(flatten)]
    embed: EmbedArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = embed::run(cli.embed).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
