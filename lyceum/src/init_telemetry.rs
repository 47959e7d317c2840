use anyhow::Result;
use tracing::{info, Subscriber};
use tracing_subscriber::{layer::SubscriberExt, registry, registry::LookupSpan, EnvFilter, Layer};

pub fn build_reduced_logger_text<S>() -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if cfg!(debug_assertions) {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_line_number(false)
                .with_thread_names(false)
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_target(true)
                .event_format(tracing_subscriber::fmt::format().compact()),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_target(true),
        )
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` for lyceum itself when
/// the `debug` setting is on.
pub fn build_loglevel_filter_layer(debug: bool) -> EnvFilter {
    let default_directives = if debug {
        "info,lyceum=debug,lyceum_core=debug,tower_http=debug"
    } else {
        "info,tower_http=warn"
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

pub fn init_telemetry_and_tracing(debug_enabled: bool) -> Result<()> {
    let subscriber = registry()
        .with(build_loglevel_filter_layer(debug_enabled))
        .with(build_reduced_logger_text());
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Logging initialized (debug: {})", debug_enabled);
    Ok(())
}
