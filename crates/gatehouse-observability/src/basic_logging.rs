use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const WORKSPACE_TARGETS: &[&str] = &[
    "gatehouse",
    "gatehouse_auth",
    "gatehouse_config",
    "gatehouse_core",
    "gatehouse_db",
    "gatehouse_observability",
];

/// Filter directives used when `RUST_LOG` is unset: workspace crates at
/// `level`, noisy dependencies at `warn`.
pub fn default_filter(level: &str) -> String {
    let mut directives: Vec<String> = WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect();
    directives.extend(
        ["tower_http=warn", "hyper=warn", "sqlx=warn"]
            .iter()
            .map(|d| d.to_string()),
    );
    directives.join(",")
}

pub(crate) fn env_filter() -> EnvFilter {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(&log_level)))
}

/// `OBSERVABILITY_ENABLED` semantics: on unless set to `false` or `0`.
pub fn parse_enabled(raw: Option<&str>) -> bool {
    match raw {
        Some(value) => {
            let value = value.trim();
            !value.eq_ignore_ascii_case("false") && value != "0"
        }
        None => true,
    }
}

/// Console-only logging, used when observability is off.
///
/// `LOG_LEVEL` sets the workspace level (default `info`); `RUST_LOG`
/// overrides the whole filter.
pub fn init_basic_console_logging() -> anyhow::Result<()> {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    eprintln!("Observability disabled: console logging only");
    Ok(())
}
