//! # BioSynth Storefront Entry Point
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (logging)
//! 3. Load configuration (defaults → TOML file → `BIOSYNTH_*` environment)
//! 4. Open client storage and restore the requisition and favorites
//! 5. Run the shell until `quit` or end of input
//! 6. Flush pending writes

use clap::Parser;
use std::path::PathBuf;

/// BioSynth research catalog and requisition builder.
#[derive(Debug, Parser)]
#[command(name = "biosynth", version, about)]
struct Args {
    /// Configuration file (TOML). Defaults to the platform config directory.
    #[arg(short, long, env = "BIOSYNTH_CONFIG")]
    config: Option<PathBuf>,

    /// Client storage file. Defaults to the platform data directory.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    biosynth_storefront::run(args.config.as_deref(), args.db_path).await
}
