pub mod completions;
pub mod init;
pub mod pack;
pub mod scan;

use clap::{ArgAction, Parser, Subcommand};

/// mappack - Pack a map with the textures and skybox it uses
#[derive(Parser, Debug)]
#[command(name = "mappack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress status output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pack a map, its bsp and referenced assets into an archive
    Pack(pack::PackArgs),

    /// List the textures and skybox a map references
    Scan(scan::ScanArgs),

    /// Initialize a project (generates mappack.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
