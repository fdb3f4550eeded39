use std::{backtrace::Backtrace, panic::PanicHookInfo};

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// Calling it twice keeps the first subscriber.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    if fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
    {
        std::panic::set_hook(Box::new(log_panic));
    }
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let payload = info.payload();
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    let backtrace = Backtrace::capture();

    match info.location() {
        Some(location) => tracing::error!(
            panic = %message,
            location = %location,
            backtrace = %backtrace,
            "panic"
        ),
        None => tracing::error!(panic = %message, backtrace = %backtrace, "panic"),
    }
}
