//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Kiln front-end asset build orchestrator
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kiln.toml)
    #[arg(short = 'C', long, global = true, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands (default: watch)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Clean the output tree and run the production transforms once
    #[command(visible_alias = "b")]
    Build,

    /// Build with development transforms, then serve, watch and live-reload
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        args: WatchArgs,
    },

    /// Convert every `.otf` font under the source fonts directory to `.ttf`
    Ttf,
}

/// Options for the resident watch session.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<std::net::IpAddr>,

    /// Port number for the dev server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Watch and rebuild without starting the dev server
    #[arg(long)]
    pub no_serve: bool,
}

impl Cli {
    /// Subcommand to run; a bare `kiln` means `kiln watch`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Watch {
            args: WatchArgs::default(),
        })
    }
}
