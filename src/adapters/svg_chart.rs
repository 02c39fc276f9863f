//! SVG chart adapter.
//!
//! Charts are plain SVG strings with fixed-size canvases; undefined indicator
//! values break the line instead of being interpolated.

use crate::domain::correlation::CorrelationMatrix;
use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StockscopeError;
use crate::domain::indicator::{IndicatorSeries, IndicatorValue};
use crate::ports::chart_port::ChartPort;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const CHART_WIDTH: f64 = 900.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

const PRICE_PANEL_HEIGHT: f64 = 360.0;
const VOLUME_PANEL_HEIGHT: f64 = 110.0;
const PANEL_GAP: f64 = 20.0;

const HEATMAP_CELL: f64 = 80.0;
const HEATMAP_LABEL: f64 = 70.0;

const UP_COLOR: &str = "#16a34a";
const DOWN_COLOR: &str = "#dc2626";
const SHORT_MA_COLOR: &str = "#2563eb";
const LONG_MA_COLOR: &str = "#f59e0b";
const BAND_COLOR: &str = "#9ca3af";

#[derive(Debug, Default, Clone, Copy)]
pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Vertical mapping of a value range onto a panel.
#[derive(Debug, Clone, Copy)]
struct YScale {
    min: f64,
    max: f64,
    top: f64,
    height: f64,
}

impl YScale {
    fn new(min: f64, max: f64, top: f64, height: f64) -> Self {
        // flat data still needs a non-zero span
        let (min, max) = if max > min {
            (min, max)
        } else {
            let pad = min.abs().max(1.0) * 0.01;
            (min - pad, max + pad)
        };
        Self {
            min,
            max,
            top,
            height,
        }
    }

    fn y(&self, v: f64) -> f64 {
        self.top + self.height - (v - self.min) / (self.max - self.min) * self.height
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

fn x_slot(i: usize, n: usize) -> f64 {
    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    MARGIN_LEFT + (i as f64 + 0.5) * plot_width / n.max(1) as f64
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn svg_open(svg: &mut String, width: f64, height: f64) {
    let _ = writeln!(
        svg,
        r##"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">"##
    );
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
}

fn title(svg: &mut String, width: f64, text: &str) {
    let _ = writeln!(
        svg,
        "  <text x=\"{:.1}\" y=\"18\" text-anchor=\"middle\" font-size=\"14\" fill=\"#111\">{}</text>",
        width / 2.0,
        escape_xml(text)
    );
}

fn label(svg: &mut String, x: f64, y: f64, anchor: &str, text: &str) {
    let _ = writeln!(
        svg,
        "  <text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"{anchor}\" font-size=\"10\" fill=\"#666\">{}</text>",
        escape_xml(text)
    );
}

/// Axis lines plus min/mid/max value labels for one panel.
fn axes(svg: &mut String, scale: &YScale, fmt_value: impl Fn(f64) -> String) {
    let _ = writeln!(
        svg,
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{:.1}\" x2=\"{MARGIN_LEFT}\" y2=\"{:.1}\" stroke=\"#ccc\" stroke-width=\"1\"/>",
        scale.top,
        scale.bottom()
    );
    let _ = writeln!(
        svg,
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{:.1}\" x2=\"{}\" y2=\"{:.1}\" stroke=\"#ccc\" stroke-width=\"1\"/>",
        scale.bottom(),
        CHART_WIDTH - MARGIN_RIGHT,
        scale.bottom()
    );
    let mid = (scale.min + scale.max) / 2.0;
    for v in [scale.max, mid, scale.min] {
        label(svg, MARGIN_LEFT - 5.0, scale.y(v) + 4.0, "end", &fmt_value(v));
    }
}

/// First, middle and last date under the plot.
fn date_labels(svg: &mut String, enriched: &EnrichedSeries, y: f64) {
    let bars = enriched.bars();
    let n = bars.len();
    if n == 0 {
        return;
    }
    let mut picks = vec![0, n / 2, n - 1];
    picks.dedup();
    for i in picks {
        label(svg, x_slot(i, n), y, "middle", &bars[i].date.to_string());
    }
}

/// Path through defined points; each run of `None` starts a new subpath.
fn line_path(values: &[Option<f64>], scale: &YScale) -> String {
    let n = values.len();
    let mut d = String::new();
    let mut pen_down = false;
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) => {
                let cmd = if pen_down { " L" } else { " M" };
                let _ = write!(d, "{cmd} {:.1} {:.1}", x_slot(i, n), scale.y(*v));
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    d.trim_start().to_string()
}

fn polyline(svg: &mut String, values: &[Option<f64>], scale: &YScale, color: &str, dashed: bool) {
    let d = line_path(values, scale);
    if d.is_empty() {
        return;
    }
    let dash = if dashed { " stroke-dasharray=\"4 3\"" } else { "" };
    let _ = writeln!(
        svg,
        "  <path d=\"{d}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.5\"{dash}/>"
    );
}

fn legend(svg: &mut String, entries: &[(String, &str)], y: f64) {
    let mut x = MARGIN_LEFT;
    for (name, color) in entries {
        let _ = writeln!(
            svg,
            "  <rect x=\"{x:.1}\" y=\"{:.1}\" width=\"12\" height=\"3\" fill=\"{color}\"/>",
            y - 4.0
        );
        label(svg, x + 16.0, y, "start", name);
        x += 16.0 + 7.0 * name.len() as f64 + 14.0;
    }
}

fn no_data(svg: &mut String, width: f64, y: f64) {
    let _ = writeln!(
        svg,
        "  <text x=\"{:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#999\">no data</text>",
        width / 2.0
    );
}

/// Split the Bollinger column into (upper, lower) lines.
fn band_lines(series: &IndicatorSeries) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    series
        .values
        .iter()
        .map(|p| match p.value {
            Some(IndicatorValue::Bollinger { upper, lower, .. }) => (Some(upper), Some(lower)),
            _ => (None, None),
        })
        .unzip()
}

fn render_candlestick(enriched: &EnrichedSeries) -> String {
    let height = MARGIN_TOP + PRICE_PANEL_HEIGHT + PANEL_GAP + VOLUME_PANEL_HEIGHT + MARGIN_BOTTOM;
    let mut svg = String::new();
    svg_open(&mut svg, CHART_WIDTH, height);
    title(
        &mut svg,
        CHART_WIDTH,
        &format!("{} Candlestick with MA/Bollinger Bands", enriched.ticker()),
    );

    let bars = enriched.bars();
    if bars.is_empty() {
        no_data(&mut svg, CHART_WIDTH, height / 2.0);
        svg.push_str("</svg>\n");
        return svg;
    }

    let config = enriched.config();
    let mut overlays: Vec<(String, Vec<Option<f64>>, &str, bool)> = Vec::new();
    let mut windows = vec![(config.short_ma(), SHORT_MA_COLOR)];
    if config.long_ma() != config.short_ma() {
        windows.push((config.long_ma(), LONG_MA_COLOR));
    }
    for (window, color) in windows {
        if let Some(ma) = enriched.moving_average(window) {
            overlays.push((format!("MA_{window}"), ma.simple_values(), color, false));
        }
    }
    if let Some(bb) = enriched.bollinger() {
        let (upper, lower) = band_lines(bb);
        overlays.push((format!("BB_UPPER_{}", config.bb_window), upper, BAND_COLOR, true));
        overlays.push((format!("BB_LOWER_{}", config.bb_window), lower, BAND_COLOR, true));
    }

    let lo = bars
        .iter()
        .map(|b| b.low)
        .chain(overlays.iter().flat_map(|(_, v, ..)| v.iter().flatten().copied()))
        .fold(f64::INFINITY, f64::min);
    let hi = bars
        .iter()
        .map(|b| b.high)
        .chain(overlays.iter().flat_map(|(_, v, ..)| v.iter().flatten().copied()))
        .fold(f64::NEG_INFINITY, f64::max);
    let price = YScale::new(lo, hi, MARGIN_TOP, PRICE_PANEL_HEIGHT);
    axes(&mut svg, &price, |v| format!("{v:.2}"));

    let n = bars.len();
    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let body_width = (plot_width / n as f64 * 0.7).max(1.0);

    for (i, bar) in bars.iter().enumerate() {
        let x = x_slot(i, n);
        let color = if bar.is_bullish() { UP_COLOR } else { DOWN_COLOR };
        let _ = writeln!(
            svg,
            "  <line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"{color}\" stroke-width=\"1\"/>",
            price.y(bar.high),
            price.y(bar.low)
        );
        let top = price.y(bar.open.max(bar.close));
        let body_height = (price.y(bar.open.min(bar.close)) - top).max(1.0);
        let _ = writeln!(
            svg,
            "  <rect x=\"{:.1}\" y=\"{top:.1}\" width=\"{body_width:.1}\" height=\"{body_height:.1}\" fill=\"{color}\"/>",
            x - body_width / 2.0
        );
    }

    for (_, values, color, dashed) in &overlays {
        polyline(&mut svg, values, &price, color, *dashed);
    }
    let entries: Vec<(String, &str)> = overlays
        .iter()
        .map(|(name, _, color, _)| (name.clone(), *color))
        .collect();
    legend(&mut svg, &entries, MARGIN_TOP - 2.0);

    let max_volume = bars.iter().map(|b| b.volume).fold(0.0, f64::max);
    let volume = YScale::new(
        0.0,
        max_volume,
        MARGIN_TOP + PRICE_PANEL_HEIGHT + PANEL_GAP,
        VOLUME_PANEL_HEIGHT,
    );
    axes(&mut svg, &volume, fmt_volume);
    for (i, bar) in bars.iter().enumerate() {
        let color = if bar.is_bullish() { UP_COLOR } else { DOWN_COLOR };
        let top = volume.y(bar.volume);
        let _ = writeln!(
            svg,
            "  <rect x=\"{:.1}\" y=\"{top:.1}\" width=\"{body_width:.1}\" height=\"{:.1}\" fill=\"{color}\" fill-opacity=\"0.5\"/>",
            x_slot(i, n) - body_width / 2.0,
            volume.bottom() - top
        );
    }

    date_labels(&mut svg, enriched, height - 10.0);
    svg.push_str("</svg>\n");
    svg
}

fn fmt_volume(v: f64) -> String {
    if v >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

fn render_rolling_volatility(enriched: &EnrichedSeries) -> String {
    let mut svg = String::new();
    svg_open(&mut svg, CHART_WIDTH, CHART_HEIGHT);
    title(
        &mut svg,
        CHART_WIDTH,
        &format!("{} Rolling Volatility", enriched.ticker()),
    );

    let values = enriched
        .rolling_volatility()
        .map(IndicatorSeries::simple_values)
        .unwrap_or_default();
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        no_data(&mut svg, CHART_WIDTH, CHART_HEIGHT / 2.0);
        svg.push_str("</svg>\n");
        return svg;
    }

    let lo = defined.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let scale = YScale::new(lo, hi, MARGIN_TOP, plot_height);
    axes(&mut svg, &scale, |v| format!("{v:.3}"));
    polyline(&mut svg, &values, &scale, SHORT_MA_COLOR, false);
    legend(
        &mut svg,
        &[(
            format!(
                "{}D Rolling Annualized Vol",
                enriched.config().volatility_window
            ),
            SHORT_MA_COLOR,
        )],
        MARGIN_TOP - 2.0,
    );
    date_labels(&mut svg, enriched, CHART_HEIGHT - 10.0);
    svg.push_str("</svg>\n");
    svg
}

/// Diverging red/blue fill: -1 blue, 0 white, +1 red.
fn heat_color(r: f64) -> String {
    let t = r.clamp(-1.0, 1.0);
    let (end_r, end_g, end_b) = if t >= 0.0 {
        (178.0, 24.0, 43.0)
    } else {
        (33.0, 102.0, 172.0)
    };
    let k = t.abs();
    let mix = |c: f64| (255.0 + (c - 255.0) * k).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(end_r), mix(end_g), mix(end_b))
}

fn render_heatmap(matrix: &CorrelationMatrix) -> String {
    let n = matrix.len();
    let width = HEATMAP_LABEL + HEATMAP_CELL * n as f64 + MARGIN_RIGHT;
    let height = MARGIN_TOP + HEATMAP_CELL * n as f64 + HEATMAP_LABEL;
    let mut svg = String::new();
    svg_open(&mut svg, width, height);
    title(&mut svg, width, "Asset Return Correlation");

    for i in 0..n {
        let y = MARGIN_TOP + HEATMAP_CELL * i as f64;
        label(
            &mut svg,
            HEATMAP_LABEL - 6.0,
            y + HEATMAP_CELL / 2.0 + 4.0,
            "end",
            &matrix.tickers[i],
        );
        for j in 0..n {
            let x = HEATMAP_LABEL + HEATMAP_CELL * j as f64;
            let (fill, text) = match matrix.get(i, j) {
                Some(r) => (heat_color(r), format!("{r:.2}")),
                None => ("#e5e7eb".to_string(), "NA".to_string()),
            };
            let text_color = match matrix.get(i, j) {
                Some(r) if r.abs() > 0.6 => "white",
                _ => "#111",
            };
            let _ = writeln!(
                svg,
                "  <rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{HEATMAP_CELL}\" height=\"{HEATMAP_CELL}\" fill=\"{fill}\" stroke=\"white\" stroke-width=\"1\"/>"
            );
            let _ = writeln!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\" fill=\"{text_color}\">{text}</text>",
                x + HEATMAP_CELL / 2.0,
                y + HEATMAP_CELL / 2.0 + 4.0
            );
        }
    }
    for (j, ticker) in matrix.tickers.iter().enumerate() {
        label(
            &mut svg,
            HEATMAP_LABEL + HEATMAP_CELL * (j as f64 + 0.5),
            MARGIN_TOP + HEATMAP_CELL * n as f64 + 16.0,
            "middle",
            ticker,
        );
    }
    svg.push_str("</svg>\n");
    svg
}

fn write_chart(output_dir: &Path, file_name: String, svg: String) -> Result<PathBuf, StockscopeError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);
    fs::write(&path, svg)?;
    tracing::debug!(path = %path.display(), "wrote chart");
    Ok(path)
}

impl ChartPort for SvgChartAdapter {
    fn candlestick(
        &self,
        enriched: &EnrichedSeries,
        output_dir: &Path,
    ) -> Result<PathBuf, StockscopeError> {
        write_chart(
            output_dir,
            format!("{}_candlestick.svg", enriched.ticker()),
            render_candlestick(enriched),
        )
    }

    fn rolling_volatility(
        &self,
        enriched: &EnrichedSeries,
        output_dir: &Path,
    ) -> Result<PathBuf, StockscopeError> {
        write_chart(
            output_dir,
            format!("{}_rolling_volatility.svg", enriched.ticker()),
            render_rolling_volatility(enriched),
        )
    }

    fn correlation_heatmap(
        &self,
        matrix: &CorrelationMatrix,
        output_dir: &Path,
    ) -> Result<PathBuf, StockscopeError> {
        write_chart(
            output_dir,
            "asset_correlation_heatmap.svg".to_string(),
            render_heatmap(matrix),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis_config::IndicatorConfig;
    use crate::domain::correlation::{compute_correlation, CloseSeries};
    use crate::domain::enriched::add_indicators;
    use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn enriched(ticker: &str, closes: &[f64]) -> EnrichedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: start + Duration::days(i as i64),
                open: if i % 2 == 0 { close - 0.5 } else { close + 0.5 },
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0 + i as f64,
            })
            .collect();
        add_indicators(
            &PriceSeries::new(ticker, bars).unwrap(),
            &IndicatorConfig::default(),
        )
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn candlestick_has_candles_overlays_and_volume() {
        let svg = render_candlestick(&enriched("AAPL", &wave(80)));
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("AAPL Candlestick with MA/Bollinger Bands"));
        assert!(svg.contains(UP_COLOR) && svg.contains(DOWN_COLOR));
        assert!(svg.contains("MA_20") && svg.contains("MA_50"));
        assert!(svg.contains("BB_UPPER_20") && svg.contains("stroke-dasharray"));
        assert!(svg.contains("fill-opacity=\"0.5\""));
        assert!(svg.contains("1.0M"));
    }

    #[test]
    fn short_series_draws_candles_without_overlay_paths() {
        let svg = render_candlestick(&enriched("AAPL", &[100.0, 101.0, 99.0]));
        assert!(svg.contains("<rect x="));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn empty_series_says_no_data() {
        let empty = add_indicators(
            &PriceSeries::new("NONE", vec![]).unwrap(),
            &IndicatorConfig::default(),
        );
        assert!(render_candlestick(&empty).contains("no data"));
        assert!(render_rolling_volatility(&empty).contains("no data"));
    }

    #[test]
    fn volatility_line_skips_warmup() {
        let svg = render_rolling_volatility(&enriched("MSFT", &wave(60)));
        assert!(svg.contains("MSFT Rolling Volatility"));
        assert!(svg.contains("20D Rolling Annualized Vol"));
        assert_eq!(svg.matches("<path").count(), 1);
    }

    #[test]
    fn line_path_breaks_on_gaps() {
        let scale = YScale::new(0.0, 10.0, 0.0, 100.0);
        let d = line_path(&[Some(1.0), Some(2.0), None, Some(3.0)], &scale);
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('L').count(), 1);
        assert!(line_path(&[None, None], &scale).is_empty());
    }

    #[test]
    fn heat_colors_diverge() {
        assert_eq!(heat_color(0.0), "#ffffff");
        assert_eq!(heat_color(1.0), "#b2182b");
        assert_eq!(heat_color(-1.0), "#2166ac");
        assert_eq!(heat_color(2.0), heat_color(1.0));
    }

    #[test]
    fn heatmap_annotates_every_cell() {
        let pts: Vec<(NaiveDate, f64)> = wave(10)
            .into_iter()
            .enumerate()
            .map(|(i, c)| (NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(), c))
            .collect();
        let flat: Vec<(NaiveDate, f64)> = pts.iter().map(|&(d, _)| (d, 50.0)).collect();
        let m = compute_correlation(&[
            CloseSeries::new("A", pts.clone()),
            CloseSeries::new("B", pts),
            CloseSeries::new("C", flat),
        ])
        .unwrap();
        let svg = render_heatmap(&m);
        assert!(svg.contains("Asset Return Correlation"));
        assert_eq!(svg.matches("width=\"80\"").count(), 9);
        assert!(svg.contains(">1.00<"));
        assert!(svg.contains(">NA<"));
    }

    #[test]
    fn adapter_writes_named_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("charts");
        let adapter = SvgChartAdapter::new();
        let e = enriched("TSLA", &wave(30));

        let candle = adapter.candlestick(&e, &out).unwrap();
        let vol = adapter.rolling_volatility(&e, &out).unwrap();
        assert_eq!(candle, out.join("TSLA_candlestick.svg"));
        assert_eq!(vol, out.join("TSLA_rolling_volatility.svg"));
        assert!(fs::read_to_string(candle).unwrap().contains("<svg"));
    }

    #[test]
    fn ticker_text_is_escaped() {
        let svg = render_rolling_volatility(&enriched("A&B", &wave(5)));
        assert!(svg.contains("A&amp;B"));
    }
}
