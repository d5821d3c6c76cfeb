use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Send YouTube videos to the Minomize backend and follow their processing.
#[derive(Debug, Parser)]
#[command(name = "minomize", version, about)]
pub struct Cli {
    /// Config file (RON). Defaults to <config dir>/minomize/config.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the processing API.
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Directory for the job history and the log file.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level and mirror the log to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Press the page button on a video and follow the job until it finishes.
    Watch {
        /// Watch page URL, e.g. https://www.youtube.com/watch?v=...
        page_url: String,
        /// Open the result page once processing completes.
        #[arg(long)]
        open: bool,
    },
    /// Start processing from the popup and record the job in the history.
    Submit {
        /// URL of the active tab.
        tab_url: String,
        /// Title of the active tab.
        #[arg(long)]
        title: Option<String>,
    },
    /// Refresh and show the most recent jobs.
    History {
        /// Keep refreshing until no job is running.
        #[arg(long)]
        follow: bool,
    },
    /// Check one job once.
    Status { job_id: String },
    /// Open the result page of a job.
    Open { job_id: String },
}
