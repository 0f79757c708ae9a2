use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidforge_common::AspectRatio;

#[derive(Parser)]
#[command(name = "vidforge")]
#[command(author, version, about = "Video generation job submission tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a missing integer column to a database table
    FixDb {
        /// SQLite database file (defaults to database.path from config)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Table to repair
        #[arg(long, default_value = "t_video")]
        table: String,

        /// Column to add as a nullable INTEGER
        #[arg(long, default_value = "time")]
        column: String,
    },

    /// Submit a video generation job and wait for the result
    Generate {
        /// Text prompt describing the video
        #[arg(short, long, required = true)]
        prompt: String,

        /// Reference image; switches to image-to-video
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Video length in seconds
        #[arg(short, long, default_value = "10")]
        duration: u32,

        /// Output aspect ratio (16:9 or 9:16)
        #[arg(short, long, default_value = "16:9")]
        aspect_ratio: AspectRatio,

        /// Model to use (defaults to provider.model from config)
        #[arg(short, long)]
        model: Option<String>,

        /// Submit only and print the task id without waiting
        #[arg(long)]
        no_wait: bool,

        /// Record the job in this SQLite database
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the status of a submitted task once
    Status {
        /// Task id returned at submission
        #[arg(required = true)]
        task_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the models the provider adapter knows about
    Models,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        #[arg(value_name = "CONFIG")]
        file: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
