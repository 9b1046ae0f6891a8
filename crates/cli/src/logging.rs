//! Tracing setup for the command-line tool.
//!
//! Diagnostics go to stderr so reports printed on stdout stay clean. The
//! level comes from `IMAGEPACK_LOG` (e.g. `IMAGEPACK_LOG=imagepack_core=debug`)
//! and defaults to `warn`; `--debug` forces `debug`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "IMAGEPACK_LOG";

pub fn init(debug: bool) {
    let env_filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    tracing::debug!("logging initialized");
}
