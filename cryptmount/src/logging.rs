// SPDX-License-Identifier: GPL-3.0-only

use tracing_subscriber::{EnvFilter, fmt};

/// Log to stderr, filtered by `RUST_LOG` when set.
pub(crate) fn init(verbose: bool) {
    let default = if verbose {
        "cryptmount=debug,cryptmount_sys=debug,warn"
    } else {
        "cryptmount=info,cryptmount_sys=info,warn"
    };

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
