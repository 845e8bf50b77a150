//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// clipbind - copy text through pluggable clipboard drivers
#[derive(Parser, Debug)]
#[command(name = "clipbind")]
#[command(version)]
#[command(about = "Copy text to the clipboard through pluggable, self-healing drivers")]
#[command(long_about = None)]
pub struct Cli {
    /// Text to copy (reads stdin when omitted)
    pub text: Option<String>,

    /// Driver to try first (native, command, or a custom name)
    #[arg(short = 'd', long, value_name = "NAME")]
    pub driver: Option<String>,

    /// External tool for the command driver (e.g. wl-copy, xclip, pbcopy)
    #[arg(short = 't', long, value_name = "TOOL")]
    pub tool: Option<String>,

    /// Settings file (defaults to the XDG location)
    #[arg(long, value_name = "PATH", env = "CLIPBIND_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered drivers and their support status
    Drivers,
}
