//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::Action;

/// Progressively expandable Sankey hierarchies: expand, collapse and project visible flows
#[derive(Parser, Debug)]
#[command(name = "sankey-tree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the full hierarchy as built from the data file
    Tree {
        /// Data file (.json or .toml); defaults to `data_file` from settings
        #[arg(value_hint = ValueHint::FilePath)]
        data: Option<PathBuf>,
    },

    /// Apply expand/collapse actions and show the visible snapshot
    View {
        /// Data file (.json or .toml); defaults to `data_file` from settings
        #[arg(value_hint = ValueHint::FilePath)]
        data: Option<PathBuf>,

        /// Action to apply after the initial render, in order (expand:NAME, collapse:NAME, toggle:NAME)
        #[arg(short, long = "action")]
        actions: Vec<Action>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply actions and print the positioned geometry as JSON
    Layout {
        /// Data file (.json or .toml); defaults to `data_file` from settings
        #[arg(value_hint = ValueHint::FilePath)]
        data: Option<PathBuf>,

        /// Action to apply after the initial render, in order
        #[arg(short, long = "action")]
        actions: Vec<Action>,

        /// Override layout width
        #[arg(long)]
        width: Option<f64>,

        /// Override layout height
        #[arg(long)]
        height: Option<f64>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a commented template
    Template,
    /// Show the global config file location
    Path,
}
