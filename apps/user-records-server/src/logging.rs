use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

/// Third-party targets kept at `warn` unless `RUST_LOG` says otherwise.
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("sqlx", "warn"),
    ("sea_orm", "warn"),
    ("sea_orm_migration", "warn"),
    ("hyper", "warn"),
    ("h2", "warn"),
];

/// Base level: `-v` flags override the configured level.
fn base_level(cfg: &LoggingConfig, verbose: u8) -> &str {
    match verbose {
        0 => cfg.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(cfg: &LoggingConfig, verbose: u8) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = vec![base_level(cfg, verbose).to_owned()];
    for (target, level) in NOISY_TARGETS {
        directives.push(format!("{target}={level}"));
    }

    let filter = directives.join(",");
    EnvFilter::try_new(&filter).with_context(|| format!("invalid tracing filter '{filter}'"))
}

/// Install the global subscriber. Logs go to stderr so `--print-config`
/// output stays machine-readable.
///
/// # Errors
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init(cfg: &LoggingConfig, verbose: u8) -> Result<()> {
    let filter = build_env_filter(cfg, verbose)?;

    let fmt_layer = match cfg.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(true)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .context("failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_configured_level() {
        let cfg = LoggingConfig {
            level: "warn".to_owned(),
            format: LogFormat::Text,
        };

        assert_eq!(base_level(&cfg, 0), "warn");
        assert_eq!(base_level(&cfg, 1), "info");
        assert_eq!(base_level(&cfg, 2), "debug");
        assert_eq!(base_level(&cfg, 5), "trace");
    }

    #[test]
    fn invalid_level_is_reported() {
        let cfg = LoggingConfig {
            level: "user_records=loud".to_owned(),
            format: LogFormat::Text,
        };

        if std::env::var_os("RUST_LOG").is_none() {
            assert!(build_env_filter(&cfg, 0).is_err());
        }
    }
}
