//! Logger initialisation for the command-line adapter.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `RUST_LOG` takes precedence. Otherwise `verbose` selects debug output and
/// the default shows info level and above.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // `try_init` only fails if a logger was already set.
    let _ = builder.try_init();
}
