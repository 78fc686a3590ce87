use tracing_subscriber::EnvFilter;

/// Our own spans at `info`, dependencies (hyper, tungstenite, reqwest) only
/// when they warn.
const DEFAULT_DIRECTIVES: &str = "warn,f1_dashboard=info";
const DEBUG_DIRECTIVES: &str = "info,f1_dashboard=debug";

fn directives(debug: bool) -> &'static str {
    if debug {
        DEBUG_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    }
}

/// Builds the filter for both binaries. `RUST_LOG` is only honoured when
/// debug logging is switched on.
pub fn filter(debug: bool) -> EnvFilter {
    let fallback = || EnvFilter::new(directives(debug));
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}

pub fn init(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_target(debug)
        .try_init();
}
