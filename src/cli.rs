use analysis_engine::DEFAULT_TOP_POSTS;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "painpoint",
    version,
    about = "Mine Reddit for recurring pain points and rank them"
)]
pub struct Cli {
    /// Pipeline settings file (TOML). Defaults to ./painpoint.toml when present
    #[arg(long, global = true, env = "PAINPOINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for generated tables and reports
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape, clean, tag, prioritize and report in one go
    Run {
        /// Hot posts to fetch per subreddit
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Fetch keyword-matching posts from the configured subreddits
    Scrape {
        #[arg(long)]
        limit: Option<u32>,

        /// Raw posts table to write
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Deduplicate, drop incomplete posts and apply engagement thresholds
    Clean {
        /// Raw posts table
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Tag cleaned posts with the pain-point keywords they mention
    Extract {
        /// Cleaned posts table
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Rank keywords by post count and engagement
    Prioritize {
        /// Tagged posts table
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: Option<PathBuf>,

        /// Also print the top posts for this keyword
        #[arg(long)]
        keyword: Option<String>,

        /// How many posts to print for --keyword
        #[arg(long, default_value_t = DEFAULT_TOP_POSTS)]
        top: usize,
    },

    /// Render the pain point report
    Report {
        /// Priority summary table
        #[arg(long)]
        priority: PathBuf,

        /// Tagged posts table
        #[arg(long)]
        posts: PathBuf,

        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
    },

    /// Print an overview of a cleaned dataset
    Stats {
        /// Cleaned posts table
        #[arg(long)]
        input: PathBuf,

        /// How many frequent words to list
        #[arg(long, default_value_t = 20)]
        top_words: usize,
    },
}

impl Command {
    /// Commands that talk to Reddit and so need credentials up front.
    pub fn needs_credentials(&self) -> bool {
        matches!(self, Command::Run { .. } | Command::Scrape { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}
