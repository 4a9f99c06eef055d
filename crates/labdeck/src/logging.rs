//! Diagnostic logging through `tracing`.
//!
//! Output goes to stderr. `RUST_LOG` takes precedence over the verbosity
//! flags when it is set.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level selected by `-q` / `-v` / `-vv`.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    // Dependencies (winit, wgpu, eframe) stay at warn.
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,labdeck={level}")))
}

/// Install the global subscriber. Calling it twice is harmless; the second
/// call keeps the first subscriber.
pub fn init(verbose: u8, quiet: bool, no_color: bool) {
    let level = level_for(verbose, quiet);
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose > 0)
        .with_ansi(!no_color)
        .compact();

    if let Err(e) = tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(layer)
        .try_init()
    {
        eprintln!("logging already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(0, false), Level::WARN);
        assert_eq!(level_for(1, false), Level::DEBUG);
        assert_eq!(level_for(5, false), Level::TRACE);
        assert_eq!(level_for(2, true), Level::ERROR, "quiet wins over verbose");
    }
}
