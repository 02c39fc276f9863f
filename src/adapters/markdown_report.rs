//! Markdown summary report adapter implementing ReportPort.

use crate::domain::correlation::CorrelationMatrix;
use crate::domain::error::StockscopeError;
use crate::domain::summary::AssetSummary;
use crate::ports::report_port::{ReportContext, ReportPort};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_FILE: &str = "analysis_report.md";

#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownReportAdapter;

impl MarkdownReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// `12.34%`, or `NA` when undefined.
fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => "NA".to_string(),
    }
}

fn format_summary_line(s: &AssetSummary) -> String {
    format!(
        "- {}: trend={}, total_return={}, annualized_vol={}, latest_close={:.2}",
        s.ticker,
        s.trend,
        format_pct(Some(s.total_return)),
        format_pct(s.annualized_volatility),
        s.latest_close
    )
}

pub fn format_correlation_table(matrix: &CorrelationMatrix) -> String {
    if matrix.is_empty() {
        return "_No correlation data._\n".to_string();
    }

    let mut out = String::from("| |");
    for t in &matrix.tickers {
        let _ = write!(out, " {t} |");
    }
    out.push_str("\n|---|");
    out.push_str(&"---:|".repeat(matrix.len()));
    out.push('\n');

    for (i, t) in matrix.tickers.iter().enumerate() {
        let _ = write!(out, "| {t} |");
        for r in matrix.row(i) {
            match r {
                Some(r) => {
                    let _ = write!(out, " {r:.4} |");
                }
                None => out.push_str(" NA |"),
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_report(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();
    out.push_str("# Stock Price Analysis Report\n\n");

    out.push_str("## Trend and Volatility Summary\n");
    for s in ctx.summaries {
        out.push_str(&format_summary_line(s));
        out.push('\n');
    }

    out.push_str("\n## Correlation Matrix\n");
    let _ = writeln!(
        out,
        "Pearson correlation of simple returns over {} common observations.\n",
        ctx.correlation.observations
    );
    out.push_str(&format_correlation_table(ctx.correlation));

    out.push_str("\n## Generated Charts\n");
    for chart in ctx.charts {
        let _ = writeln!(out, "- `{chart}`");
    }
    out
}

impl ReportPort for MarkdownReportAdapter {
    fn write(
        &self,
        ctx: &ReportContext<'_>,
        output_dir: &Path,
    ) -> Result<PathBuf, StockscopeError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(REPORT_FILE);
        fs::write(&path, render_report(ctx))?;
        tracing::debug!(path = %path.display(), "wrote report");
        Ok(path)
    }
}
