use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,sqlx=warn,actix_server=warn";

/// Install the global subscriber. `json` switches to one JSON object per line
/// for log shippers.
pub fn init_tracing(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = fmt().with_env_filter(env_filter).with_target(false);
    let result = if json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        // Tests and embedding binaries may have installed one already.
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}
