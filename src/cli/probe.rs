//! `lifeline probe`: drive the lifecycle against a live target.
//!
//! Each round opens `count` connections concurrently, retries refused ones on
//! the configured backoff, validates and destroys every connection that came
//! up and then reports the round's connect latency distribution.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::output;
use crate::cli::ProbeArgs;
use crate::config::{BackoffConfig, Config};
use crate::domain::{LifecycleStats, TargetAddress};
use crate::error::{Error, LifecycleError, Result};
use crate::lifecycle::{ChannelLifecycle, RetryBackoff};
use crate::port::Transport;

/// Outcome of one probe round.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub connected: usize,
    pub failed: usize,
    /// Refused attempts that were retried.
    pub retries: u32,
    /// Connections that failed validation before being destroyed.
    pub invalid: usize,
    pub destroy_failures: usize,
    pub stats: LifecycleStats,
}

/// Run the probe command.
pub async fn execute(args: &ProbeArgs) -> Result<()> {
    let config = resolve_config(args)?;
    config.logging.init();

    let lifecycle = ChannelLifecycle::from_config(&config);
    info!(
        remote = %lifecycle.target(),
        count = args.count,
        rounds = args.rounds,
        "Starting probe"
    );

    if !args.json {
        output::section("Probe");
        output::key_value("Target", lifecycle.target());
        output::key_value("Connections", args.count);
        output::key_value("Rounds", args.rounds);
    }

    let mut connected = 0;
    for round in 1..=args.rounds {
        let report = run_round(&lifecycle, &config.backoff, round, args.count, args.retries).await;
        connected += report.connected;

        if args.json {
            output::json_line(&report)?;
        } else {
            print_report(&report);
        }
    }

    let closed = lifecycle.registry().close_all().await;
    debug!(closed, "Probe finished");

    if connected == 0 {
        return Err(Error::Connection(format!(
            "no connection to {} succeeded",
            lifecycle.target()
        )));
    }
    Ok(())
}

/// Load the config file if present, apply command-line overrides, validate.
pub fn resolve_config(args: &ProbeArgs) -> Result<Config> {
    let mut config = if args.config.exists() {
        Config::read(&args.config)?
    } else {
        Config::default()
    };

    if let Some(target) = &args.target {
        let address: TargetAddress = target.parse()?;
        config.target = address.into();
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }

    config.validate()?;
    Ok(config)
}

/// Open `count` connections concurrently, then validate and destroy each.
pub async fn run_round<T: Transport>(
    lifecycle: &ChannelLifecycle<T>,
    backoff: &BackoffConfig,
    round: u32,
    count: usize,
    retries: u32,
) -> RoundReport {
    let attempts = join_all((0..count).map(|_| create_with_retry(lifecycle, backoff, retries))).await;

    let mut report = RoundReport {
        round,
        ..RoundReport::default()
    };
    let mut conns = Vec::with_capacity(count);
    for (result, retried) in attempts {
        report.retries += retried;
        match result {
            Ok(conn) => conns.push(conn),
            Err(e) => {
                warn!(remote = %lifecycle.target(), error = %e, "Probe connection failed");
                report.failed += 1;
            }
        }
    }
    report.connected = conns.len();

    let destroys = conns.into_iter().map(|conn| {
        let valid = lifecycle.validate_get(&conn) && lifecycle.validate_put(&conn);
        async move { (valid, lifecycle.destroy(conn, !valid).await) }
    });
    for (valid, result) in join_all(destroys).await {
        if !valid {
            report.invalid += 1;
        }
        if result.is_err() {
            report.destroy_failures += 1;
        }
    }

    report.stats = lifecycle.stats();
    report
}

/// Create one connection, sleeping on the backoff schedule after each
/// retriable failure. Returns the final result and the number of retries.
async fn create_with_retry<T: Transport>(
    lifecycle: &ChannelLifecycle<T>,
    backoff: &BackoffConfig,
    retries: u32,
) -> (std::result::Result<Arc<T::Conn>, LifecycleError>, u32) {
    let mut backoff = RetryBackoff::new(backoff.clone());
    loop {
        match lifecycle.create().await {
            Err(e) if e.is_retriable() && backoff.attempts() < retries => {
                let delay = backoff.next_delay();
                debug!(
                    remote = %lifecycle.target(),
                    attempt = backoff.attempts(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Retrying refused connection"
                );
                tokio::time::sleep(delay).await;
            }
            result => return (result, backoff.attempts()),
        }
    }
}

fn print_report(report: &RoundReport) {
    output::section(&format!("Round {}", report.round));
    output::key_value("Connected", report.connected);
    output::key_value("Failed", report.failed);
    output::key_value("Retries", report.retries);

    if report.stats.is_empty() {
        output::warn("No successful connects this round");
    } else {
        let stats = &report.stats;
        output::key_value("Samples", stats.sample_count);
        output::key_value("Average", output::millis(format!("{:.2}", stats.average)));
        output::key_value("p50", output::millis(stats.p50));
        output::key_value("p95", output::millis(stats.p95));
        output::key_value("p99", output::millis(stats.p99));
        output::key_value("Min / Max", format!("{} / {} ms", stats.min, stats.max));
    }

    if report.invalid > 0 {
        output::warn(&format!("{} connection(s) failed validation", report.invalid));
    }
    if report.destroy_failures > 0 {
        output::warn(&format!("{} connection(s) failed to close", report.destroy_failures));
    }
    if report.failed == 0 && report.invalid == 0 && report.destroy_failures == 0 {
        output::ok("All connections opened and closed cleanly");
    }
}
