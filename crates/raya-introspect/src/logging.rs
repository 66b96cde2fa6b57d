//! Logging setup
//!
//! Failures the introspector absorbs (access denials, failed construction)
//! are only visible through `tracing` events. Hosts usually install their own
//! subscriber; test binaries, benches and small tools call [`init_tracing`]
//! to get those events on stderr.
//!
//! Filter directives are read from `RAYA_INTROSPECT_LOG`, falling back to
//! `RUST_LOG`:
//!
//! ```text
//! RAYA_INTROSPECT_LOG=raya_introspect=error cargo test
//! RAYA_INTROSPECT_LOG=raya_introspect::introspect=trace cargo bench
//! ```

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "RAYA_INTROSPECT_LOG";

static TRACING_INIT: Once = Once::new();

/// Install a global stderr subscriber for introspection diagnostics
///
/// Does nothing when neither variable is set, when the directives do not
/// parse, or when another global subscriber is already installed. Only the
/// first call has any effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let Some(directives) = directives(|name| std::env::var(name).ok()) else {
            return;
        };
        let filter = match EnvFilter::try_new(&directives) {
            Ok(filter) => filter,
            Err(err) => {
                eprintln!("raya-introspect: ignoring log directives {directives:?}: {err}");
                return;
            }
        };

        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true),
            )
            .with(filter)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(%directives, "introspection tracing enabled");
        }
    });
}

/// First non-blank value of `RAYA_INTROSPECT_LOG`, then `RUST_LOG`
fn directives(var: impl Fn(&str) -> Option<String>) -> Option<String> {
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .find_map(|name| var(name).filter(|value| !value.trim().is_empty()))
}
