//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Serve a single-page-app shell with per-page SEO metadata
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root; config and relative paths are resolved against it
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file name (default: site.toml)
    #[arg(short = 'C', long, default_value = "site.toml", global = true)]
    pub config: PathBuf,

    /// Shell (index.html) to use ahead of the configured candidates
    #[arg(short, long, global = true)]
    pub template: Option<PathBuf>,

    /// Log every request and shell reload
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the site with metadata injected into every HTML response
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Render a single URL path to stdout
    Render {
        /// Path as a browser would request it, e.g. `/blog/launch-week`
        path: String,
    },

    /// Show which shell is picked up and how much content is loaded
    Check,
}
