use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_ENV: &str = "MODLEDGER_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn parse(level: &str) -> Option<Self> {
        match level {
            "quiet" | "minimal" => Some(Verbosity::Quiet),
            "normal" | "info" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "debug" | "trace" => Some(Verbosity::Debug),
            _ => None,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "modledger=info,warn",
            Verbosity::Debug => "modledger=debug,info",
        }
    }
}

// MODLEDGER_LOG wins over RUST_LOG, which wins over the command-line level.
fn build_filter(verbosity: Verbosity) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(verbosity.directive())
}

pub fn init(verbosity: Verbosity) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity == Verbosity::Debug)
        .without_time()
        .compact();
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(build_filter(verbosity))
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(Verbosity::parse("quiet"), Some(Verbosity::Quiet));
        assert_eq!(Verbosity::parse("trace"), Some(Verbosity::Debug));
        assert_eq!(Verbosity::parse("loud"), None);
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Debug,
        ] {
            assert!(EnvFilter::try_new(verbosity.directive()).is_ok());
        }
    }
}
