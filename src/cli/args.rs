//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::RawSettings;

/// Live playground for fenced html/css/js/ts blocks in markdown documents
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Settings file path
    #[arg(short = 'C', long, global = true, default_value = "fenceplay.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Delay after a change before re-rendering, in milliseconds (100-2000)
    #[arg(long, global = true, value_name = "MS", allow_negative_numbers = true)]
    pub debounce: Option<i64>,

    /// Wall-clock budget per loop before it is aborted, in milliseconds (50-1000)
    #[arg(long = "loop-guard", global = true, value_name = "MS", allow_negative_numbers = true)]
    pub loop_guard: Option<i64>,

    /// Render only when the document is saved, without debounce
    #[arg(long = "save-only", global = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub save_only: Option<bool>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings given on the command line, layered over the settings file.
    pub fn overrides(&self) -> RawSettings {
        RawSettings {
            debounce_milliseconds: self.debounce,
            loop_guard_milliseconds: self.loop_guard,
            update_on_save_only: self.save_only,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render a document once
    #[command(visible_alias = "r")]
    Render {
        /// Markdown document containing fenced blocks
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Write the document here instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Print the fenced blocks found in a document, grouped by channel
    #[command(visible_alias = "x")]
    Extract {
        /// Markdown document containing fenced blocks
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-render into a directory whenever the document changes
    #[command(visible_alias = "w")]
    Watch {
        /// Markdown document containing fenced blocks
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Directory receiving preview-<n>.html
        #[arg(short, long, default_value = "preview", value_hint = clap::ValueHint::DirPath)]
        output: PathBuf,
    },

    /// Serve a live, sandboxed preview over HTTP
    #[command(visible_alias = "s")]
    Serve {
        /// Markdown document containing fenced blocks
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long, default_value = "127.0.0.1")]
        interface: IpAddr,

        /// Port number to listen on
        #[arg(short, long, default_value_t = super::serve::DEFAULT_PORT)]
        port: u16,
    },
}
