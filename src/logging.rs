//! Diagnostic logging setup.
//!
//! The library only emits `tracing` events; binaries call `init` once to
//! print them. `RUST_LOG` overrides the configured filter.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber. Calling it twice is harmless.
pub fn init(default_filter: &str) -> Result<(), String> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| format!("Invalid log filter '{}': {}", default_filter, e))?,
    };

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        assert!(init("debug").is_ok());
        assert!(init("info").is_ok());
    }
}
