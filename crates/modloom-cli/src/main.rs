use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod boot;
mod commands;
mod logging;

/// Modloom mod loader.
///
/// Discovers the mods of a host application, orders them by their
/// dependencies and serves the host's assets with every mod override and
/// patch applied.
///
/// EXAMPLES:
///     modloom order                         Show the load order
///     modloom resolve data/items.json       Show which file serves a path
///     modloom load data/items.json          Print the patched document
///     modloom disable better-swords         Turn a mod off
///
/// ENVIRONMENT VARIABLES:
///     MODLOOM_CONFIG            Path to modloom.toml
///     MODLOOM_HOST_ASSETS_DIR   Override [loader] host-assets-dir
///     MODLOOM_MODS_DIRS         Override [loader] mods-dirs (':'-separated)
///     MODLOOM_HOST_VERSION      Override [host] version
///     MODLOOM_SETTINGS_FILE     Override [loader] settings-file
///     RUST_LOG                  Log filter (default: info)
#[derive(Parser)]
#[command(name = "modloom")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to modloom.toml (default: searched upwards from the working directory)
    #[arg(long, short = 'c', global = true, env = "MODLOOM_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the load order and the mods that were left out
    ///
    /// EXAMPLES:
    ///     modloom order            Human-readable listing
    ///     modloom order --json     Machine-readable output
    #[command(visible_alias = "o")]
    Order {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the concrete file a logical asset path resolves to
    ///
    /// EXAMPLES:
    ///     modloom resolve media/icon.png
    ///     modloom resolve mod://better-swords/mod.json
    ///     modloom resolve media/icon.png --no-overrides
    Resolve {
        /// Logical asset path or package-scheme path
        path: String,
        /// Ignore asset overrides of mods
        #[arg(long)]
        no_overrides: bool,
    },

    /// Load a JSON document with all patches applied and print it
    ///
    /// EXAMPLES:
    ///     modloom load data/items.json
    ///     modloom load data/lang/sc/gui.de_DE.json --compact
    Load {
        /// Logical asset path or package-scheme path
        path: String,
        /// Ignore asset overrides of mods
        #[arg(long)]
        no_overrides: bool,
        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Enable a mod in the settings file
    Enable {
        /// Mod id
        id: String,
    },

    /// Disable a mod in the settings file
    Disable {
        /// Mod id
        id: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = boot::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Order { json } => commands::order::run(config, json),
        Commands::Resolve { path, no_overrides } => {
            commands::resolve::run(config, &path, no_overrides)
        }
        Commands::Load {
            path,
            no_overrides,
            compact,
        } => commands::load::run(config, &path, no_overrides, compact).await,
        Commands::Enable { id } => commands::toggle::run(config, &id, true),
        Commands::Disable { id } => commands::toggle::run(config, &id, false),
    }
}
