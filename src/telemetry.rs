//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingSettings};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "SOCIALSYNC_LOG";

/// Pick the filter directive: env vars win, then `-v`, then the config level.
pub fn filter_directive(settings: &LoggingSettings, verbose: bool) -> String {
    let from_env = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|d| !d.trim().is_empty());
    if let Some(directive) = from_env {
        return directive;
    }
    if verbose {
        "debug".to_string()
    } else {
        settings.level.clone()
    }
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays clean. Calling this twice is harmless.
pub fn init(settings: &LoggingSettings, verbose: bool) {
    let directive = filter_directive(settings, verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match settings.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level_without_env() {
        if std::env::var(LOG_ENV).is_ok() || std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let settings = LoggingSettings::default();
        assert_eq!(filter_directive(&settings, false), "info");
        assert_eq!(filter_directive(&settings, true), "debug");
    }

    #[test]
    fn init_twice_does_not_panic() {
        let settings = LoggingSettings::default();
        init(&settings, false);
        init(&settings, true);
    }
}
