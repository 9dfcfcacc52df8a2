use std::path::Path;

use crate::cli::output;
use crate::config::Config;
use crate::error::Result;

/// Validate a configuration file and print a summary of what it resolves to.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    output::section("Configuration");
    output::key_value("File", path.display());

    let config = Config::load(path)?;
    output::ok("Configuration file is valid");

    let settings = config.connection.settings();
    output::section("Summary");
    output::key_value("Target", config.target.address());
    output::key_value("TCP_NODELAY", settings.tcp_nodelay);
    match settings.connect_timeout {
        Some(timeout) => output::key_value("Timeout", output::millis(timeout.as_millis())),
        None => output::key_value("Timeout", "none"),
    }
    if let Some(ttl) = settings.ttl {
        output::key_value("TTL", ttl);
    }
    if let Some(linger) = settings.linger {
        output::key_value("Linger", output::millis(linger.as_millis()));
    }
    output::key_value(
        "Backoff",
        format!(
            "{}..{} ms x{}{}",
            config.backoff.initial_delay_ms,
            config.backoff.max_delay_ms,
            config.backoff.multiplier,
            if config.backoff.jitter { " +jitter" } else { "" }
        ),
    );
    output::key_value(
        "Logging",
        format!("{} ({})", config.logging.level, config.logging.format),
    );

    if settings.connect_timeout.is_none() {
        output::warn("No connect timeout; creates wait for the OS to give up");
    }

    println!();
    output::note("Configuration is ready to use.");
    Ok(())
}
