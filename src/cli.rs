// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Terminal host for the codepad practice workbench.
///
/// `config.yaml` is the primary source of truth.
/// CLI flags only override config values.
#[derive(Parser, Debug)]
#[command(name = "codepad", version, disable_help_subcommand = true)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Override the execution server base URL
    ///
    /// Example:
    /// --server http://127.0.0.1:5000
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a solution and print the verdict.
    ///
    /// Without --file the saved draft (or the starter code) is submitted.
    /// Exits non-zero unless every test case passed.
    Run {
        /// Problem id, as used in /problem/<id>
        problem: String,

        /// Solution source file; its content becomes the draft
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Re-run whenever --file changes
        #[arg(long, requires = "file")]
        watch: bool,
    },

    /// Discard the saved draft for a problem.
    Reset { problem: String },

    /// Show solved problems per section and the current streak.
    Progress,

    /// Switch the active track on the server.
    SwitchTrack { track: String },

    /// Print the anonymous user id and its cookie.
    Whoami,

    /// Create a starter config.yaml.
    Init,
}
