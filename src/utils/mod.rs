pub mod build_info;

use dirs::home_dir;
use std::{env, path::PathBuf, sync::Once};

const DEFAULT_DIR_NAME: &str = ".expense_tracker";
const CONFIG_FILE: &str = "config.json";
const SQLITE_FILE: &str = "expenses.db";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber, writing to stderr so reports on
/// stdout stay clean. `RUST_LOG` overrides the default `expense_tracker=warn`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("expense_tracker=warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Returns the application data directory, defaulting to `~/.expense_tracker`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("EXPENSES_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Default SQLite database file when none is configured.
pub fn default_sqlite_file_in(base: &std::path::Path) -> PathBuf {
    base.join(SQLITE_FILE)
}
