use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    /// One JSON object per line, for log shippers.
    Json,
}

/// `RUST_LOG` always wins over the level chosen here.
fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Library and binary crates whose events pass the default filter.
pub const LOG_TARGETS: [&str; 2] = ["odp_recommender", "toml_recommender"];

/// Default directive enabling `level` for every crate in [`LOG_TARGETS`].
pub fn default_directive(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn init_cli_logger(verbose: bool) {
    let directive = if verbose {
        format!("{},info", default_directive("debug"))
    } else {
        default_directive("info")
    };
    init_logger(&directive, LogFormat::Compact);
}

/// 以指定層級 (例如 "debug") 初始化日誌
pub fn init_logger_with_level(level: &str, format: LogFormat) {
    init_logger(&default_directive(level), format);
}

fn init_logger(directive: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(env_filter(directive));
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_directive_names_every_target() {
        assert_eq!(
            default_directive("debug"),
            "odp_recommender=debug,toml_recommender=debug"
        );
    }

    #[test]
    fn test_default_directive_enables_binary_events() {
        let filter = EnvFilter::new(default_directive("info"));
        let subscriber = tracing_subscriber::registry().with(filter);

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::event_enabled!(target: "toml_recommender", Level::INFO));
            assert!(tracing::event_enabled!(target: "odp_recommender::core", Level::INFO));
            assert!(!tracing::event_enabled!(target: "toml_recommender", Level::DEBUG));
            assert!(!tracing::event_enabled!(target: "zip", Level::INFO));
        });
    }
}
