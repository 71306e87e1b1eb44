use crate::config::Overrides;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "alt-art-swap")]
#[command(about = "Replace card images with alternate artwork, converting everything to PNG")]
pub struct CliArgs {
    /// Directory containing the game's card images
    #[arg(long)]
    pub cards_dir: Option<PathBuf>,

    /// Game install directory; cards are read from OPTCGSim_Data/StreamingAssets/Cards
    #[arg(long, conflicts_with = "cards_dir")]
    pub game_dir: Option<PathBuf>,

    /// Staging directory holding the alternate art images
    #[arg(long)]
    pub alt_dir: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File remembering the last used cards directory
    #[arg(long)]
    pub last_dir_file: Option<PathBuf>,

    /// Downscale images whose longest side exceeds this many pixels
    #[arg(long)]
    pub max_dimension: Option<u32>,

    /// Keep the original image size
    #[arg(long, conflicts_with = "max_dimension")]
    pub no_downscale: bool,

    /// Dry run - show what would be replaced without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Log CPU and memory usage while processing
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            cards_dir: self.cards_dir.clone(),
            game_dir: self.game_dir.clone(),
            alt_dir: self.alt_dir.clone(),
            last_dir_file: self.last_dir_file.clone(),
            max_dimension: self.max_dimension,
            no_downscale: self.no_downscale,
            dry_run: self.dry_run,
            monitor: self.monitor,
            json_report: self.json,
        }
    }
}
