use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;

/// Max log level for a count of `-v` flags.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install a compact stderr subscriber as the global default.
pub fn install_logger(verbosity: u8) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(level_for(verbosity))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
