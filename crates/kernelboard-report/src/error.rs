//! Error types for kernelboard-report.

use kernelboard_charts::ChartKind;
use thiserror::Error;

/// Errors that can occur while exporting a report.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A chart the report embeds was not rendered.
    #[error("Missing chart: {0}")]
    MissingChart(ChartKind),

    /// IO error while writing the document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ExportError = io_err.into();
        assert!(matches!(err, ExportError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_missing_chart_names_chart() {
        let err = ExportError::MissingChart(ChartKind::ToolchainBar);
        assert_eq!(err.to_string(), "Missing chart: toolchain-bar");
    }
}
