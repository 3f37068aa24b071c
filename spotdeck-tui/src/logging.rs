//! Log initialisation.
//!
//! The terminal belongs to the UI, so events go to the configured log file.
//! The filter comes from `SPOTDECK_LOG`, then `RUST_LOG`, then a default.
//! `SPOTDECK_LOG_FORMAT=json` switches to one JSON object per line.

use crate::error::TuiError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "spotdeck_engine=info,spotdeck_storage=info,spotdeck_tui=info,warn";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("SPOTDECK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init(path: &Path) -> Result<(), TuiError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = matches!(std::env::var("SPOTDECK_LOG_FORMAT").as_deref(), Ok("json"));

    let (plain, structured) = if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(Mutex::new(file));
        (None, Some(layer))
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        (Some(layer), None)
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(plain)
        .with(structured)
        .try_init()
        .map_err(|e| TuiError::Log(e.to_string()))?;

    tracing::info!(log_path = %path.display(), json, "logging initialised");
    Ok(())
}
