use std::sync::Once;

use tracing_subscriber::filter::{Directive, LevelFilter};

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_DIRECTIVE: &str = "job_ledger=info";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_DIRECTIVE);
}

/// Initializes the global tracing subscriber, adding `directive` on top of
/// whatever `RUST_LOG` provides. Falls back to the default directive when
/// `directive` does not parse. Only the first call has any effect.
pub fn init_tracing_with(directive: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let directive = parse_directive(directive);
        let filter = EnvFilter::from_default_env().add_directive(directive);

        // Another subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

fn parse_directive(raw: &str) -> Directive {
    raw.parse::<Directive>()
        .or_else(|_| DEFAULT_LOG_DIRECTIVE.parse())
        .unwrap_or_else(|_| Directive::from(LevelFilter::INFO))
}
