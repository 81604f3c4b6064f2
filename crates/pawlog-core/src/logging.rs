//! Tracing subscriber setup for host apps.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber.
///
/// The filter is taken from `filter`, then `RUST_LOG`, then defaults to
/// `info`. Returns false if a global subscriber was already installed.
pub fn init_logging(filter: Option<&str>) -> bool {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let _ = init_logging(Some("pawlog_core=debug"));
        assert!(!init_logging(Some("info")));
    }
}
