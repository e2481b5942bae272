use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "flower_safety_core=info,flower_safety_tui=info";

/// Send tracing output to `<cache_dir>/flower-safety/flower-safety.log`.
///
/// The TUI owns stderr, so if the log file can't be opened logging stays off.
pub fn init() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("flower-safety");
    fs::create_dir_all(&dir).ok()?;

    let path = dir.join("flower-safety.log");
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()?;

    Some(path)
}
