//! # BioSynth Storefront Library
//!
//! The application layer of the research catalog: configuration, stores,
//! commands and the interactive shell. The `biosynth` binary is a thin
//! wrapper around [`run`].
//!
//! ## Module Organization
//! ```text
//! biosynth_storefront/
//! ├── lib.rs          ◄─── You are here (logging, paths, run)
//! ├── app.rs          ◄─── Composition root (owns every store)
//! ├── shell.rs        ◄─── stdin/stdout front-end
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── TOML + environment configuration
//! │   ├── cart.rs     ◄─── Requisition store
//! │   ├── favorites.rs◄─── Saved products store
//! │   ├── persist.rs  ◄─── Background writer
//! │   ├── toast.rs    ◄─── Notification slot
//! │   └── checkout.rs ◄─── Checkout session + deferred hand-off
//! ├── commands/       ◄─── One module per page / concern
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────────┐ ┌────────────────┐ ┌──────────┐ ┌─────────────────┐  │
//! │  │  CartStore   │ │ FavoritesStore │ │ Notifier │ │ CheckoutSession │  │
//! │  │              │ │                │ │          │ │                 │  │
//! │  │ • lines      │ │ • saved SKUs   │ │ • toast  │ │ • flow + form   │  │
//! │  │ • persisted  │ │ • persisted    │ │ • timer  │ │ • coupon        │  │
//! │  └──────────────┘ └────────────────┘ └──────────┘ └─────────────────┘  │
//! │                                                                         │
//! │  Each store is independent; commands borrow only what they touch.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod commands;
pub mod error;
pub mod shell;
pub mod state;

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use state::StorefrontConfig;

/// Loads configuration, starts the app and runs the shell until it quits.
pub async fn run(
    config_path: Option<&Path>,
    db_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting BioSynth storefront");

    let config = StorefrontConfig::load(config_path).map_err(|e| {
        tracing::error!(error = %e, "Configuration rejected");
        e
    })?;

    let mut app = App::start(config, db_path).await?;
    let result = shell::run(&mut app).await;
    app.shutdown().await;

    result.map_err(Into::into)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=biosynth=trace` - Show trace for biosynth crates only
/// - Default: INFO, debug for biosynth crates
///
/// Logs go to stderr so they never mix with shell output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,biosynth=debug,sqlx=warn"));

    // a second init (tests, embedding) is not an error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Determines the client storage file.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.biosynth.requisition/biosynth.db`
/// - **Windows**: `%APPDATA%\biosynth\requisition\data\biosynth.db`
/// - **Linux**: `~/.local/share/requisition/biosynth.db`
///
/// ## Development Override
/// Set `BIOSYNTH_DB_PATH` to use a custom path.
pub fn default_database_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BIOSYNTH_DB_PATH") {
        return Some(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "biosynth", "requisition")?;
    Some(proj_dirs.data_dir().join("biosynth.db"))
}
