use clap::{Parser as ClapParser, Subcommand};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tokensync::cli::{self, CliError, PlanOptions, SyncOptions};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "tokensync")]
#[command(about = "Synchronize a resolved design-token tree into a variable store snapshot")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize tokens into a store snapshot and print the report
    Sync {
        /// Token tree JSON file (reads from stdin if not provided)
        #[arg(short, long)]
        tokens: Option<PathBuf>,

        /// Store snapshot JSON file
        #[arg(short, long)]
        store: PathBuf,

        /// Config JSON file (built-in rules if not provided)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the updated snapshot back to the store file
        #[arg(short, long)]
        write: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Show how every token would be synchronized, without a store
    Plan {
        /// Token tree JSON file (reads from stdin if not provided)
        #[arg(short, long)]
        tokens: Option<PathBuf>,

        /// Config JSON file (built-in rules if not provided)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Sync {
            tokens,
            store,
            config,
            write,
            pretty,
        } => run_sync(tokens, store, config, write, pretty),
        Commands::Plan {
            tokens,
            config,
            pretty,
        } => run_plan(tokens, config, pretty),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_tokens(path: Option<PathBuf>) -> Result<Option<String>, CliError> {
    match path {
        Some(path) => Ok(Some(fs::read_to_string(path)?)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn read_optional(path: Option<PathBuf>) -> Result<Option<String>, CliError> {
    path.map(fs::read_to_string).transpose().map_err(CliError::Io)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}

fn run_sync(
    tokens: Option<PathBuf>,
    store: PathBuf,
    config: Option<PathBuf>,
    write: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let options = SyncOptions {
        tokens: read_tokens(tokens)?,
        store: fs::read_to_string(&store)?,
        config: read_optional(config)?,
    };

    let outcome = cli::execute_sync(&options)?;
    if write {
        fs::write(&store, serde_json::to_string_pretty(&outcome.store)?)?;
    }
    print_json(&outcome.report, pretty)?;

    if !outcome.report.is_clean() {
        std::process::exit(2);
    }
    Ok(())
}

fn run_plan(tokens: Option<PathBuf>, config: Option<PathBuf>, pretty: bool) -> Result<(), CliError> {
    let options = PlanOptions {
        tokens: read_tokens(tokens)?,
        config: read_optional(config)?,
    };
    print_json(&cli::execute_plan(&options)?, pretty)
}
