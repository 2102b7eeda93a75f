use std::io;
use std::process;

use bedpipe::commands::config::{self, ConfigArgs};
use bedpipe::commands::describe::{self, DescribeArgs};
use bedpipe::commands::embed::{self, EmbedArgs};
use bedpipe::commands::stream::{self, StreamArgs};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use tracing_subscriber::EnvFilter;

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  bedpipe embed \"What are the different services that you offer?\"\n  bedpipe describe --image photo.jpeg \"What's in this image?\"\n  echo \"write an essay for living on mars in 1000 words\" | bedpipe stream\n  bedpipe completion bash > ~/.local/share/bash-completion/completions/bedpipe";

const EMBED_HELP_EXAMPLES: &str = "Examples:\n  bedpipe embed \"What are the different services that you offer?\"\n  echo \"hello\" | bedpipe embed --json\n  bedpipe embed --model amazon.titan-embed-text-v1 --dry-run \"hello\"";

const STREAM_HELP_EXAMPLES: &str = "Examples:\n  bedpipe stream \"write an essay for living on mars in 1000 words\"\n  echo \"write a haiku about basalt\" | bedpipe stream --max-tokens 200";

#[derive(Debug, Parser)]
#[command(
    name = "bedpipe",
    about = "Single-shot Bedrock runtime CLI tools",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(
        about = "Generate a text embedding with an embedding model",
        after_help = EMBED_HELP_EXAMPLES
    )]
    Embed(EmbedArgs),
    #[command(about = "Send a text prompt and an image to a multimodal model")]
    Describe(DescribeArgs),
    #[command(
        about = "Stream a text completion as it is generated",
        after_help = STREAM_HELP_EXAMPLES
    )]
    Stream(StreamArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "bedpipe", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "bedpipe", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "bedpipe", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Embed(args) => embed::run(args).await,
        Commands::Describe(args) => describe::run(args).await,
        Commands::Stream(args) => stream::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
