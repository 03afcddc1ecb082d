//! Log subscriber setup.
//!
//! stderr gets human-readable records filtered by `RUST_LOG`, or by the
//! verbosity flags when it is unset. `--log-file` adds a second layer that
//! always records at debug level.

use anyhow::Context;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

const FILE_DIRECTIVES: &str = "debug,hyper=info,hyper_util=info,reqwest=info";

/// Default directive for the stderr layer.
pub fn console_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

pub fn init(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive(verbose, quiet)));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let file = match log_file {
        Some(path) => {
            let f = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(f))
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(FILE_DIRECTIVES)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("installing log subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags_pick_the_console_level() {
        assert_eq!(console_directive(0, false), "info");
        assert_eq!(console_directive(1, false), "debug");
        assert_eq!(console_directive(3, false), "trace");
        assert_eq!(console_directive(0, true), "warn");
    }
}
