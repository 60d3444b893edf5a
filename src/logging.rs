use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;


/// Default filter for the number of `-v` flags given.

pub fn default_directive(verbosity: u8) -> &'static str {
  match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  }
}

/// Install panic reporting and a compact stderr subscriber.
/// `RUST_LOG` takes precedence over `verbosity` when set.

pub fn init_logging(verbosity: u8) -> Result<(), SetGlobalDefaultError> {
  // Better Panic. Only enabled when debugging.
  #[cfg(debug_assertions)]
  {
    better_panic::Settings::debug()
      .most_recent_first(false)
      .lineno_suffix(true)
      .verbosity(better_panic::Verbosity::Full)
      .install();
  }

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)) );

  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .finish();

  tracing::subscriber::set_global_default(subscriber)
}
