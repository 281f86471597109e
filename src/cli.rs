use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "scout_desk backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// List players matching the given filters
    Players(PlayerFilterArgs),
    /// List the distinct competitions of scouted players
    Competitions,
    /// Import a JSON array of players; a single bad record rejects the file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Generate an AI scouting report for a player
    Report {
        /// Player id
        player_id: String,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct PlayerFilterArgs {
    /// Substring of name or club
    #[arg(short, long)]
    pub search: Option<String>,
    /// Position codes, e.g. ATA,MEI
    #[arg(long = "position")]
    pub positions: Vec<String>,
    #[arg(long)]
    pub min_age: Option<u32>,
    #[arg(long)]
    pub max_age: Option<u32>,
    /// elite, likely_starter, monitoring, development
    #[arg(long = "recommendation")]
    pub recommendations: Vec<String>,
    #[arg(long = "competition")]
    pub competitions: Vec<String>,
    #[arg(long = "scout-year")]
    pub scout_years: Vec<String>,
    /// right, left, both
    #[arg(long = "foot")]
    pub feet: Vec<String>,
}
