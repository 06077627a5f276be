use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use engine_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "playtally", version, about = "Tally logged plays by player count")]
pub struct Cli {
    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal, global = true)]
    pub log: LogTarget,

    /// Log debug output, including every request and checkpoint.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding one checkpoint file per item.
    #[arg(
        long,
        env = "PLAYTALLY_STORE_DIR",
        default_value = "playtally_store",
        global = true
    )]
    pub store_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Harvest every play of an item, resuming from its checkpoint if any.
    Harvest(HarvestArgs),
    /// Print or write the tally for a stored item.
    Report {
        item_id: u64,
        /// Write JSON to this file instead of printing.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete an item's checkpoint so it can be harvested from page 1.
    Reset { item_id: u64 },
    /// List stored items and their progress.
    List,
}

#[derive(Debug, clap::Args)]
pub struct HarvestArgs {
    /// Item page URL (e.g. https://boardgamegeek.com/boardgame/13/catan) or bare id.
    pub location: String,

    /// Display name for the item.
    #[arg(long, conflicts_with = "title")]
    pub name: Option<String>,

    /// Page title to take the display name from ("Catan | Board Game | ...").
    #[arg(long)]
    pub title: Option<String>,

    /// Delay before every request, in milliseconds.
    #[arg(long, env = "PLAYTALLY_DELAY_MS", default_value_t = 1750)]
    pub delay_ms: u64,

    /// API root; pages are requested from `<base-url>/plays`.
    #[arg(long, env = "PLAYTALLY_BASE_URL", default_value = playtally_engine::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Upper bound on a single page request, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
