//! Logging setup for hosts embedding the bridge

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "vela=info,vela_async=info,vela_platform_android=info";

/// Tag Android log lines are written under
pub const LOG_TAG: &str = "Vela";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global `tracing` subscriber.
///
/// On Android, events go to logcat through `tracing-android` and the `log`
/// facade is routed through `android_logger`. Elsewhere a plain formatter
/// writes to stderr. Calling this more than once is harmless; only the first
/// call installs anything.
#[cfg(target_os = "android")]
pub fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;

    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag(LOG_TAG),
    );

    match tracing_android::layer(LOG_TAG) {
        Ok(layer) => {
            let subscriber = tracing_subscriber::registry().with(env_filter()).with(layer);
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        Err(err) => log::warn!("tracing-android unavailable: {err}"),
    }
}

#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init();
}
