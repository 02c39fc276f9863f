//! Report generation port trait.

use crate::domain::correlation::CorrelationMatrix;
use crate::domain::error::StockscopeError;
use crate::domain::summary::AssetSummary;
use std::path::{Path, PathBuf};

/// Everything the summary report renders.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    /// Sorted by ticker.
    pub summaries: &'a [AssetSummary],
    pub correlation: &'a CorrelationMatrix,
    /// File names of the charts written alongside the report.
    pub charts: &'a [String],
}

/// Port for writing the analysis report.
pub trait ReportPort {
    /// Write the report into `output_dir`, returning the file written.
    fn write(&self, ctx: &ReportContext<'_>, output_dir: &Path)
        -> Result<PathBuf, StockscopeError>;
}
