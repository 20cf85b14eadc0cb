//! Log setup for `xs-tool`.
//!
//! Every command prints its result on stdout (a signature, a canonical
//! string, parsed JSON), so diagnostics must stay off it. Events go to
//! stderr, filtered by `RUST_LOG` when set.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shape of the stderr log lines, chosen with `--log-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    /// One JSON object per event, for CI logs.
    Json,
}

/// Installs the global subscriber. Must run once, before any command.
///
/// `default_level` applies only when `RUST_LOG` is unset. To trace the
/// signing and verification steps of the library:
///
/// ```text
/// RUST_LOG=express_statement=debug xs-tool verify ...
/// ```
pub fn init_logging(default_level: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).without_time())
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}
