use std::time::Instant;

use once_cell::sync::OnceCell;
use tracing::trace;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install the global tracing subscriber. Safe to call more than once; only
/// the first call has any effect.
///
/// The filter is taken from `RUST_LOG` when set and defaults to `info`.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(filter)
            .with(
                HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_indent_lines(true)
                    .with_timer(tracing_tree::time::UtcDateTime::default()),
            )
            .init();
    });
}

/// Run `f`, tracing how long it took under the `misc` target.
pub fn trace_misc<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let result = f();
    trace!(target: "misc", "{name} took {:?}", started.elapsed());
    result
}
