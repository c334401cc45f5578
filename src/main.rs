use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use mappack::cli::{Cli, Commands};
use mappack::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let printer = if cli.quiet {
        Printer::quiet()
    } else {
        Printer::new()
    };

    match cli.command {
        Commands::Pack(args) => {
            mappack::cli::pack::run(args, &printer)?;
        }
        Commands::Scan(args) => mappack::cli::scan::run(args, &printer)?,
        Commands::Init(args) => mappack::cli::init::run(args, &printer)?,
        Commands::Completions(args) => mappack::cli::completions::run(args)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` selects debug and `-vv` trace.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "mappack=debug",
        _ => "mappack=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
