use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Registry, fmt, reload};

/// Handle on the global subscriber's level, so the `debug` option can be
/// flipped while running.
#[derive(Clone)]
pub struct Logging {
    handle: reload::Handle<LevelFilter, Registry>,
    verbose: bool,
}

/// `--verbose` or `debug = on` log at debug level, otherwise info.
pub fn level_for(verbose: bool, debug: bool) -> LevelFilter {
    if verbose || debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

impl Logging {
    /// Install the global subscriber.
    pub fn init(verbose: bool, debug: bool) -> Self {
        let (filter, handle) = reload::Layer::new(level_for(verbose, debug));
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        Self { handle, verbose }
    }

    pub fn set_debug(&self, debug: bool) {
        let level = level_for(self.verbose, debug);
        match self.handle.reload(level) {
            Ok(()) => tracing::info!(%level, "log level changed"),
            Err(e) => tracing::warn!(error = %e, "cannot change log level"),
        }
    }
}
