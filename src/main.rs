use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use healbrowser_cli::config::AppConfig;
use healbrowser_cli::demo;
use locator_memory::LocatorMemory;

#[derive(Parser)]
#[command(
    name = "healbrowser",
    version,
    about = "Self-healing element resolution for browser automation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the login-page healing demo against the built-in fixture page
    Demo(DemoArgs),

    /// Inspect or clear the learned-locator store
    Memory(MemoryArgs),
}

#[derive(Args)]
struct DemoArgs {
    /// Override the durable memory store location
    #[arg(long)]
    memory_path: Option<PathBuf>,

    /// Enable the LLM suggestion tier (needs OPENAI_API_KEY)
    #[arg(long)]
    suggestions: bool,
}

#[derive(Args)]
struct MemoryArgs {
    #[command(subcommand)]
    command: MemoryCommand,

    /// Override the durable memory store location
    #[arg(long)]
    memory_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum MemoryCommand {
    /// List every learned locator
    List,

    /// Delete all learned locators
    Reset,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Demo(args) => {
            let mut config = AppConfig::from_env();
            if let Some(path) = args.memory_path {
                config.memory_path = path;
            }
            if args.suggestions {
                config.suggestions_enabled = true;
            }
            demo::run_demo(&config).await
        }
        Commands::Memory(args) => {
            let mut config = AppConfig::from_env();
            if let Some(path) = args.memory_path {
                config.memory_path = path;
            }
            let memory = LocatorMemory::with_persistence(&config.memory_path);
            match args.command {
                MemoryCommand::List => {
                    let records = memory.snapshot();
                    if records.is_empty() {
                        println!("no learned locators in {}", config.memory_path.display());
                    }
                    for (key, record) in records {
                        println!(
                            "{key}  {}  (last success: {})",
                            record.locator, record.last_success
                        );
                    }
                }
                MemoryCommand::Reset => {
                    memory.reset()?;
                    println!("cleared {}", config.memory_path.display());
                }
            }
            Ok(())
        }
    }
}
