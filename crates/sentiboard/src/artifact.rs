//! Pre-rendered chart artifacts produced by the external backtest process.
//!
//! The documents are consumed as opaque HTML. An absent file means the
//! backtest has not been run yet, which is a reportable state rather than
//! a hard failure.

use std::fs;
use std::io;
use std::path::Path;

use derive_more::Display;

use crate::config::ArtifactConfig;
use crate::error::{DashboardError, Result};

/// Which chart document to load.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    /// Backtest performance chart.
    Backtest,
    /// Cumulative IC and rank-IC comparison chart.
    IcComparison,
}

impl ChartKind {
    /// Configured location of this chart.
    pub fn path(self, config: &ArtifactConfig) -> &Path {
        match self {
            Self::Backtest => &config.backtest_chart,
            Self::IcComparison => &config.ic_comparison,
        }
    }
}

/// Reads a chart document.
///
/// A missing file maps to [`DashboardError::ArtifactMissing`]; any other
/// read failure is [`DashboardError::ArtifactUnreadable`].
pub fn load_chart(kind: ChartKind, config: &ArtifactConfig) -> Result<String> {
    let path = kind.path(config);
    match fs::read_to_string(path) {
        Ok(html) => Ok(html),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(DashboardError::ArtifactMissing {
                path: path.to_path_buf(),
            })
        }
        Err(err) => Err(DashboardError::ArtifactUnreadable {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_chart_is_distinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArtifactConfig {
            backtest_chart: dir.path().join("backtest_chart.html"),
            ic_comparison: dir.path().join("ic.html"),
        };
        let err = load_chart(ChartKind::Backtest, &config).unwrap_err();
        assert!(matches!(err, DashboardError::ArtifactMissing { .. }));
    }

    #[test]
    fn present_chart_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ic.html");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "<html>ic</html>").unwrap();

        let config = ArtifactConfig {
            backtest_chart: dir.path().join("missing.html"),
            ic_comparison: path,
        };
        let html = load_chart(ChartKind::IcComparison, &config).unwrap();
        assert_eq!(html, "<html>ic</html>");
    }
}
