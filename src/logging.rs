//! Tracing setup and log-safe message fingerprints.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_DEV_LOG: &str = "TRANSFORMER_DEV_LOG";

/// Dev logging gate: TRANSFORMER_DEV_LOG=1 AND dev env (debug build or
/// SHUTTLE_ENV in {local, development, dev}).
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Install a compact fmt subscriber in development. No-op in production or
/// when the host runtime already installed one.
pub fn init_tracing() {
    if !dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rewrite=debug,store=info,corpus=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// Subscriber for command-line tools: always on, `RUST_LOG` wins over the
/// default filter. Safe to call more than once.
pub fn init_cli_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("evaluate=info,corpus=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

/// Short SHA-256 fingerprint of `text`, so logs never carry message content.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("free cash now");
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, anon_hash("free cash now"));
        assert_ne!(a, anon_hash("free cash later"));
    }

    #[test]
    fn cli_tracing_tolerates_an_existing_subscriber() {
        init_cli_tracing();
        init_cli_tracing();
        tracing::info!(target: "evaluate", "still logging");
    }

    #[serial_test::serial]
    #[test]
    fn dev_log_requires_flag() {
        std::env::remove_var(ENV_DEV_LOG);
        assert!(!dev_logging_enabled());
        std::env::set_var(ENV_DEV_LOG, "1");
        if cfg!(debug_assertions) {
            assert!(dev_logging_enabled());
        }
        std::env::remove_var(ENV_DEV_LOG);
    }
}
