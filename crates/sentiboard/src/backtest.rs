//! Trigger for the external backtest process.
//!
//! The process owns the backtest and IC computations and writes the chart
//! artifacts itself; the only contract here is its exit status. Failures
//! are recoverable, the caller may simply retry.

use std::process::Command;

use tracing::info;

use crate::config::BacktestConfig;
use crate::error::{DashboardError, Result};

/// Runs the configured backtest command to completion.
///
/// Success is a zero exit status. On failure the captured stderr, when
/// non-empty, becomes the error message.
pub fn run(config: &BacktestConfig) -> Result<()> {
    info!(command = %config.command, "launching backtest");
    let output = Command::new(&config.command)
        .args(&config.args)
        .output()
        .map_err(|err| {
            DashboardError::Backtest(format!("failed to launch {}: {err}", config.command))
        })?;

    if output.status.success() {
        info!("backtest completed");
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.trim();
    Err(DashboardError::Backtest(if detail.is_empty() {
        format!("{} exited with {}", config.command, output.status)
    } else {
        format!("{} exited with {}: {detail}", config.command, output.status)
    }))
}
