//! clipsync - align footage from two cameras by capture time.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use clipsync_core::config::{ConfigManager, DEFAULT_CONFIG_PATH};
use clipsync_core::logging::{init_tracing_with_file, LogLevel};
use clipsync_core::models::MaterializeMode;

#[derive(Parser)]
#[command(name = "clipsync")]
#[command(version, about = "Align clips from two camera angles on a shared timeline", long_about = None)]
struct Cli {
    /// Config file (created with defaults if missing)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one folder's clips on its synchronized timeline
    Scan {
        /// Folder holding the clips
        dir: PathBuf,

        /// Scan index (file name order) of the reference clip
        #[arg(long, default_value_t = 0)]
        reference: usize,

        /// Seconds into the reference clip of the shared event
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Pair both angles and write them as index-aligned folders
    Match {
        #[command(flatten)]
        angles: AngleArgs,

        /// Rename clips in place or copy them into the output subfolder
        #[arg(long, value_enum, default_value_t = ModeArg::Copy)]
        mode: ModeArg,

        /// Placeholder clip for unmatched slots
        #[arg(long)]
        blank: Option<PathBuf>,

        /// Print the pairing without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Cut the secondary angle along the base angle's clip boundaries
    Recut {
        #[command(flatten)]
        angles: AngleArgs,

        /// Placeholder clip for base clips with no secondary coverage
        #[arg(long)]
        blank: Option<PathBuf>,

        /// Print the cut plan without running ffmpeg
        #[arg(long)]
        dry_run: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// The two angle folders and their reference points.
#[derive(Args)]
struct AngleArgs {
    /// Base angle folder
    base: PathBuf,

    /// Secondary angle folder
    secondary: PathBuf,

    /// Reference clip index in the base folder
    #[arg(long, default_value_t = 0)]
    base_ref: usize,

    /// Seconds into the base reference clip of the shared event
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    base_offset: i64,

    /// Reference clip index in the secondary folder
    #[arg(long, default_value_t = 0)]
    secondary_ref: usize,

    /// Seconds into the secondary reference clip of the shared event
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    secondary_offset: i64,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Rename,
    Copy,
}

impl From<ModeArg> for MaterializeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Rename => MaterializeMode::RenameAndPad,
            ModeArg::Copy => MaterializeMode::Copy,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    config
        .ensure_dirs_exist()
        .context("creating logs folder")?;

    if cli.verbose {
        // In memory only; runs never write the logging section back.
        let logging = &mut config.settings_mut().logging;
        logging.level = LogLevel::Debug;
        logging.compact = false;
    }
    let _guard = init_tracing_with_file(config.settings().logging.level, &config.logs_folder());

    tracing::debug!("Using config {}", config.path().display());

    match cli.command {
        Commands::Scan {
            dir,
            reference,
            offset,
            json,
        } => commands::scan(&config, &dir, reference, offset, json),
        Commands::Match {
            angles,
            mode,
            blank,
            dry_run,
            json,
        } => commands::run_match(&mut config, &angles, mode.into(), blank, dry_run, json),
        Commands::Recut {
            angles,
            blank,
            dry_run,
            json,
        } => commands::run_recut(&mut config, &angles, blank, dry_run, json),
    }
}
