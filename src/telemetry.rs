//! Process-wide console tracing switch.
//!
//! The first call to [`enable_console_tracing`] installs a global `fmt`
//! subscriber behind a reloadable level filter. Later calls only move the
//! level; [`disable_tracing`] sets it to `OFF`. `RUST_LOG`, when present,
//! narrows output further. If another global subscriber was installed first,
//! the switch does nothing and reports `false`.

use std::sync::OnceLock;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

type FilterHandle = reload::Handle<LevelFilter, Registry>;

static CONSOLE_FILTER: OnceLock<Option<FilterHandle>> = OnceLock::new();

fn install_console_subscriber() -> Option<FilterHandle> {
    let (filter, handle) = reload::Layer::new(LevelFilter::OFF);

    tracing_subscriber::registry()
        .with(filter)
        .with(EnvFilter::try_from_default_env().ok())
        .with(fmt::layer().with_target(false))
        .try_init()
        .ok()?;

    Some(handle)
}

/// Turns console tracing on at `level`. Returns `false` when this crate does
/// not own the global subscriber.
pub fn enable_console_tracing(level: Level) -> bool {
    match CONSOLE_FILTER.get_or_init(install_console_subscriber) {
        Some(handle) => handle
            .modify(|filter| *filter = LevelFilter::from_level(level))
            .is_ok(),
        None => false,
    }
}

pub fn disable_tracing() {
    if let Some(Some(handle)) = CONSOLE_FILTER.get() {
        let _ = handle.modify(|filter| *filter = LevelFilter::OFF);
    }
}

/// Current console level, `None` when tracing is off or not installed.
pub fn console_tracing_level() -> Option<LevelFilter> {
    let handle = CONSOLE_FILTER.get()?.as_ref()?;
    handle
        .clone_current()
        .filter(|level| *level != LevelFilter::OFF)
}
