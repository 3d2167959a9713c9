use clap::Parser;
use std::path::PathBuf;

/// Archive listed when no `FILE` is given.
pub const DEFAULT_ARCHIVE: &str = r"d:\kuper\app\src\main\assets\wallpapers\Rate_UI_v17.klwp.zip";

/// Directory listed when the archive is missing.
pub const DEFAULT_FALLBACK_DIR: &str = r"d:\kuper\app\src\main\assets\wallpapers";

#[derive(Parser, Debug)]
#[command(name = "zipls")]
#[command(version)]
#[command(about = "List the entries of a ZIP archive", long_about = None)]
#[command(after_help = "If FILE does not exist, the fallback directory is listed instead.")]
pub struct Cli {
    /// ZIP file path
    #[arg(value_name = "FILE", default_value = DEFAULT_ARCHIVE)]
    pub file: PathBuf,

    /// Directory to list when FILE is missing
    #[arg(long, value_name = "DIR", default_value = DEFAULT_FALLBACK_DIR)]
    pub fallback_dir: PathBuf,

    /// Log more diagnostics to stderr (-vv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
