//! sprite-export - PNG sprite to RGB565 header tool
//!
//! Converts folders of PNG sprites into C/C++ headers (`.h`) holding
//! `uint16_t` RGB565 arrays. Transparent pixels become the color key
//! (magenta by default).

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use sprite_export::config::{default_config_toml, ConfigFile, DEFAULT_CONFIG_FILE};
use sprite_export::{batch, ConfigOverrides, ExportConfig, NamingMode};

#[derive(Parser)]
#[command(name = "sprite-export")]
#[command(about = "Convert PNG sprites to RGB565 C headers")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert `<Name>_<Frame>.png` files using the animation table
    Mapped(BatchArgs),

    /// Convert every PNG using its file name
    Generic(BatchArgs),

    /// Convert a single PNG file
    Convert {
        /// Input PNG file
        input: PathBuf,

        /// Output .h file (default: <Name>.h next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Logical name used for identifiers (default: from file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Path to sprite-export.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate configuration without converting
    Check {
        /// Path to sprite-export.toml
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Write a default sprite-export.toml
    Init {
        /// Where to write the config
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments shared by the batch commands
#[derive(Args)]
struct BatchArgs {
    /// Path to sprite-export.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input directory (overrides config)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Convert files in parallel
    #[arg(long)]
    parallel: bool,

    /// Exit with an error if any file failed or was skipped
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Mapped(args) => run(args, NamingMode::Mapped),
        Commands::Generic(args) => run(args, NamingMode::Generic),

        Commands::Convert {
            input,
            output,
            name,
            config,
        } => {
            let config = ExportConfig::resolve(config.as_deref(), ConfigOverrides::default())?;
            tracing::info!("Converting {:?}", input);
            let written =
                batch::convert_single(&input, output.as_deref(), name.as_deref(), &config.header)?;
            tracing::info!("Wrote {:?}", written);
            Ok(())
        }

        Commands::Check { config } => check(&config),

        Commands::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            std::fs::write(&path, default_config_toml())
                .with_context(|| format!("Failed to write config: {}", path.display()))?;
            tracing::info!("Created {}", path.display());
            Ok(())
        }
    }
}

fn run(args: BatchArgs, mode: NamingMode) -> Result<()> {
    let overrides = ConfigOverrides {
        input_dir: args.input,
        output_dir: args.output,
    };
    let config = ExportConfig::resolve(args.config.as_deref(), overrides)?;
    let summary = batch::run_batch(&config, mode, args.parallel)?;

    if args.strict && summary.errors() > 0 {
        anyhow::bail!(
            "{} of {} files failed or were skipped",
            summary.errors(),
            summary.items.len()
        );
    }

    Ok(())
}

fn check(path: &Path) -> Result<()> {
    tracing::info!("Checking config {:?}", path);
    let file = ConfigFile::load(path)?;
    file.validate()?;

    let map = file.animation_map()?;
    for (frame, action) in map.iter() {
        tracing::info!("  frame {} -> {} #{}", frame, action.action, action.index);
    }
    tracing::info!(
        "Color key: ({}, {}, {}) = 0x{:04X}, alpha threshold: {}",
        file.color_key.r,
        file.color_key.g,
        file.color_key.b,
        file.color_key.packed(),
        file.alpha_threshold
    );
    tracing::info!("Config is valid!");
    Ok(())
}
