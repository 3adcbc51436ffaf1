//! Plain-text charts for the report.
//!
//! Both charts are built from block characters so they render in any Markdown
//! viewer inside a fenced code block and in a terminal.

use fraudsim_core::{Histogram, Tornado};

use crate::util::format::{format_currency_delta, format_currency_short, format_percentage};

/// Block characters for sub-character precision (from empty to full)
const BIN_CHARS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

/// Number of histogram bins used in the report
pub const HISTOGRAM_BINS: usize = 60;
/// Rows of the histogram chart
const HISTOGRAM_HEIGHT: usize = 12;
/// Characters on each side of the tornado axis
const TORNADO_HALF_WIDTH: usize = 24;

/// Glyphs for a vertical bar chart of `counts`, `height` rows from top to bottom.
///
/// Each row holds one glyph per count; the tallest bar fills every row.
pub(crate) fn bar_rows(counts: &[usize], height: usize) -> Vec<Vec<&'static str>> {
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
    let height_units = height * 8;
    let bar_heights: Vec<usize> = counts
        .iter()
        .map(|&c| ((c as f64 / max_count as f64) * height_units as f64).round() as usize)
        .collect();

    (0..height)
        .map(|row| {
            let row_base = (height - 1 - row) * 8;
            bar_heights
                .iter()
                .map(|&bar_h| {
                    if bar_h >= row_base + 8 {
                        BIN_CHARS[8]
                    } else if bar_h > row_base {
                        BIN_CHARS[bar_h - row_base]
                    } else {
                        BIN_CHARS[0]
                    }
                })
                .collect()
        })
        .collect()
}

/// Vertical histogram of `values`, one column per bin.
pub fn text_histogram(values: &[f64], bins: usize, title: &str) -> String {
    let hist = Histogram::from_values(values, bins);
    let mut out = format!("{title} ({} paths)\n", hist.total());

    let max_count = hist.max_count();
    if max_count == 0 {
        out.push_str("(no data)\n");
        return out;
    }

    let label_width = max_count.to_string().len();
    for (row, glyphs) in bar_rows(&hist.counts, HISTOGRAM_HEIGHT).iter().enumerate() {
        // Count scale on the first and last row only
        let label = match row {
            0 => max_count.to_string(),
            r if r == HISTOGRAM_HEIGHT - 1 => "0".to_string(),
            _ => String::new(),
        };
        out.push_str(&format!("{label:>label_width$} │"));
        out.extend(glyphs.iter().copied());
        out.push('\n');
    }

    let n_bins = hist.counts.len();
    out.push_str(&format!(
        "{:label_width$} └{}\n",
        "",
        "─".repeat(n_bins)
    ));

    let lo = format_currency_short(hist.min);
    let hi = format_currency_short(hist.max);
    let gap = n_bins.saturating_sub(lo.chars().count() + hi.chars().count());
    out.push_str(&format!(
        "{:label_width$}  {lo}{}{hi}\n",
        "",
        " ".repeat(gap)
    ));
    out
}

/// Horizontal tornado chart: decreases extend left of the axis, increases right.
pub fn text_tornado(tornado: &Tornado) -> String {
    let mut out = format!(
        "Δ {} vs baseline ({}) for ±{} drivers\n",
        tornado.metric.label(),
        format_currency_short(tornado.base),
        format_percentage(tornado.perturbation)
    );

    if tornado.bars.is_empty() {
        out.push_str("(no drivers)\n");
        return out;
    }

    let max_impact = tornado
        .bars
        .iter()
        .map(|b| b.impact())
        .fold(0.0_f64, f64::max);
    let scale = |v: f64| -> usize {
        if max_impact > 0.0 {
            ((v.abs() / max_impact) * TORNADO_HALF_WIDTH as f64).round() as usize
        } else {
            0
        }
    };

    let label_width = tornado
        .bars
        .iter()
        .map(|b| b.driver.key().len())
        .max()
        .unwrap_or(0);

    for bar in &tornado.bars {
        let down = bar.low.min(bar.high).min(0.0);
        let up = bar.low.max(bar.high).max(0.0);
        let left = scale(down).min(TORNADO_HALF_WIDTH);
        let right = scale(up).min(TORNADO_HALF_WIDTH);

        out.push_str(&format!(
            "{:<label_width$} {}{}│{}{} low {} / high {}\n",
            bar.driver.key(),
            " ".repeat(TORNADO_HALF_WIDTH - left),
            "█".repeat(left),
            "█".repeat(right),
            " ".repeat(TORNADO_HALF_WIDTH - right),
            format_currency_delta(bar.low),
            format_currency_delta(bar.high),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudsim_core::{Driver, TornadoBar, TornadoMetric};

    #[test]
    fn test_histogram_shape() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let chart = text_histogram(&values, 10, "Loss distribution");
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "Loss distribution (100 paths)");
        // title + rows + axis + labels
        assert_eq!(lines.len(), 1 + HISTOGRAM_HEIGHT + 2);
        // Uniform data fills every column of the bottom row
        let bottom = lines[HISTOGRAM_HEIGHT];
        assert_eq!(bottom.matches('█').count(), 10);
    }

    #[test]
    fn test_bar_rows_partial_blocks() {
        // 8 rows of 8 units: counts 16 and 3 of 16 map to 64 and 12 units
        let rows = bar_rows(&[16, 3, 0], 8);
        assert_eq!(rows.len(), 8);
        assert!(rows.iter().all(|r| r[0] == "█" && r[2] == " "));
        assert_eq!(rows[7][1], "█");
        assert_eq!(rows[6][1], "▄");
        assert_eq!(rows[5][1], " ");
    }

    #[test]
    fn test_histogram_empty() {
        let chart = text_histogram(&[], 10, "Loss distribution");
        assert!(chart.contains("(no data)"));
    }

    #[test]
    fn test_tornado_directions() {
        let tornado = Tornado {
            metric: TornadoMetric::MeanLoss,
            perturbation: 0.2,
            base: 1000.0,
            bars: vec![
                TornadoBar {
                    driver: Driver::DetectionRate,
                    low: 400.0,
                    high: -400.0,
                },
                TornadoBar {
                    driver: Driver::BaseFraudRate,
                    low: -200.0,
                    high: 200.0,
                },
            ],
        };
        let chart = text_tornado(&tornado);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);

        let full = "█".repeat(TORNADO_HALF_WIDTH);
        assert!(lines[1].starts_with("detection_rate"));
        assert!(lines[1].contains(&format!("{full}│{full}")));

        let half = "█".repeat(TORNADO_HALF_WIDTH / 2);
        assert!(lines[2].contains(&format!(" {half}│{half} ")));
    }
}
