// =============================================================================
// Static SVG line charts
// =============================================================================
//
// Minimal plotting: one or more line series over a shared date axis, optional
// histogram bars around zero, optional horizontal guide lines, a legend, and
// evenly spaced axis labels. Undefined points break the line instead of being
// drawn as zero.

use std::fmt::Write as _;

use chrono::NaiveDate;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 5;
const MAX_X_LABELS: usize = 6;

/// One plotted line.
#[derive(Debug, Clone)]
pub struct Line {
    pub label: String,
    pub color: &'static str,
    pub values: Vec<Option<f64>>,
}

impl Line {
    pub fn new(label: impl Into<String>, color: &'static str, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            color,
            values,
        }
    }

    /// Line over a fully defined series.
    pub fn dense(label: impl Into<String>, color: &'static str, values: &[f64]) -> Self {
        Self::new(label, color, values.iter().copied().map(Some).collect())
    }
}

/// Builder for a single static chart.
#[derive(Debug, Clone, Default)]
pub struct LineChart {
    title: String,
    y_label: String,
    lines: Vec<Line>,
    bars: Option<(String, Vec<f64>)>,
    guides: Vec<f64>,
    y_range: Option<(f64, f64)>,
}

impl LineChart {
    pub fn new(title: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            ..Self::default()
        }
    }

    pub fn line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    /// Histogram bars drawn from zero, e.g. MACD minus signal.
    pub fn bars(mut self, label: impl Into<String>, values: Vec<f64>) -> Self {
        self.bars = Some((label.into(), values));
        self
    }

    /// Dashed horizontal reference line.
    pub fn guide(mut self, y: f64) -> Self {
        self.guides.push(y);
        self
    }

    /// Fix the y axis instead of fitting it to the data.
    pub fn y_range(mut self, lo: f64, hi: f64) -> Self {
        self.y_range = Some((lo, hi));
        self
    }

    /// Render against `dates`; every line must have one entry per date.
    pub fn render(&self, dates: &[NaiveDate]) -> String {
        let (lo, hi) = self.y_range.unwrap_or_else(|| self.fit_y_range());
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let n = dates.len();

        let x = |i: usize| -> f64 {
            if n <= 1 {
                MARGIN_LEFT + plot_w / 2.0
            } else {
                MARGIN_LEFT + plot_w * i as f64 / (n - 1) as f64
            }
        };
        let y = |v: f64| -> f64 { MARGIN_TOP + plot_h * (hi - v) / (hi - lo) };

        let mut svg = String::with_capacity(16 * 1024);
        // Writing into a String cannot fail.
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="30" text-anchor="middle" font-size="18">{}</text>"#,
            WIDTH / 2.0,
            escape(&self.title)
        );

        // --- Axes and grid ---------------------------------------------------
        let _ = writeln!(
            svg,
            r##"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w}" height="{plot_h}" fill="none" stroke="#444"/>"##
        );
        for k in 0..=Y_TICKS {
            let v = lo + (hi - lo) * k as f64 / Y_TICKS as f64;
            let py = y(v);
            let _ = writeln!(
                svg,
                r##"<line x1="{MARGIN_LEFT}" y1="{py:.1}" x2="{:.1}" y2="{py:.1}" stroke="#e5e5e5"/><text x="{:.1}" y="{:.1}" text-anchor="end">{v:.2}</text>"##,
                MARGIN_LEFT + plot_w,
                MARGIN_LEFT - 8.0,
                py + 4.0
            );
        }
        for i in x_label_positions(n) {
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                x(i),
                MARGIN_TOP + plot_h + 20.0,
                dates[i]
            );
        }
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">Date</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            HEIGHT - 20.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="20" y="{:.1}" text-anchor="middle" transform="rotate(-90 20 {:.1})">{}</text>"#,
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0,
            escape(&self.y_label)
        );

        // --- Guides ----------------------------------------------------------
        for &g in &self.guides {
            if g >= lo && g <= hi {
                let _ = writeln!(
                    svg,
                    r##"<line x1="{MARGIN_LEFT}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#999" stroke-dasharray="6 4"/>"##,
                    y(g),
                    MARGIN_LEFT + plot_w,
                    y(g)
                );
            }
        }

        // --- Histogram -------------------------------------------------------
        if let Some((_, values)) = &self.bars {
            let bar_w = (plot_w / n.max(1) as f64 * 0.8).max(1.0);
            let zero = y(0.0_f64.clamp(lo, hi));
            for (i, &v) in values.iter().enumerate().take(n) {
                let top = y(v).min(zero);
                let h = (y(v) - zero).abs();
                let fill = if v >= 0.0 { "#7fbf7f" } else { "#e08080" };
                let _ = writeln!(
                    svg,
                    r#"<rect x="{:.1}" y="{top:.1}" width="{bar_w:.1}" height="{h:.1}" fill="{fill}"/>"#,
                    x(i) - bar_w / 2.0
                );
            }
        }

        // --- Lines -----------------------------------------------------------
        for line in &self.lines {
            let path = line_path(&line.values, &x, &y);
            if !path.is_empty() {
                let _ = writeln!(
                    svg,
                    r#"<path d="{path}" fill="none" stroke="{}" stroke-width="1.8"/>"#,
                    line.color
                );
            }
        }

        // --- Legend ----------------------------------------------------------
        let mut entries: Vec<(&str, &str)> = self
            .lines
            .iter()
            .map(|l| (l.label.as_str(), l.color))
            .collect();
        if let Some((label, _)) = &self.bars {
            entries.push((label.as_str(), "#7fbf7f"));
        }
        for (k, (label, color)) in entries.iter().enumerate() {
            let ly = MARGIN_TOP + 18.0 + 18.0 * k as f64;
            let lx = MARGIN_LEFT + plot_w - 160.0;
            let _ = writeln!(
                svg,
                r#"<rect x="{lx:.1}" y="{:.1}" width="14" height="4" fill="{color}"/><text x="{:.1}" y="{ly:.1}">{}</text>"#,
                ly - 6.0,
                lx + 20.0,
                escape(label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn fit_y_range(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        let defined = self
            .lines
            .iter()
            .flat_map(|l| l.values.iter().flatten().copied())
            .chain(self.bars.iter().flat_map(|(_, v)| v.iter().copied()))
            .chain(self.guides.iter().copied())
            .filter(|v| v.is_finite());
        for v in defined {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return (0.0, 1.0);
        }
        if hi - lo < f64::EPSILON {
            return (lo - 1.0, hi + 1.0);
        }
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }
}

/// SVG path data; each run of defined points becomes its own `M ... L ...`
/// segment.
fn line_path(values: &[Option<f64>], x: &impl Fn(usize) -> f64, y: &impl Fn(f64) -> f64) -> String {
    let mut d = String::new();
    let mut pen_down = false;
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => {
                let cmd = if pen_down { 'L' } else { 'M' };
                let _ = write!(d, "{cmd}{:.1},{:.1} ", x(i), y(*v));
                pen_down = true;
            }
            _ => pen_down = false,
        }
    }
    d.trim_end().to_string()
}

/// Up to `MAX_X_LABELS` indices spread evenly over `0..n`, ends included.
fn x_label_positions(n: usize) -> Vec<usize> {
    match n {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let count = n.min(MAX_X_LABELS);
            let mut out: Vec<usize> = (0..count)
                .map(|k| k * (n - 1) / (count - 1))
                .collect();
            out.dedup();
            out
        }
    }
}

pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Days::new(i as u64)).collect()
    }

    #[test]
    fn path_breaks_on_undefined() {
        let x = |i: usize| i as f64;
        let y = |v: f64| v;
        let d = line_path(&[None, Some(1.0), Some(2.0), None, Some(3.0)], &x, &y);
        assert_eq!(d, "M1.0,1.0 L2.0,2.0 M4.0,3.0");
    }

    #[test]
    fn label_positions_cover_ends() {
        assert_eq!(x_label_positions(0), Vec::<usize>::new());
        assert_eq!(x_label_positions(1), vec![0]);
        assert_eq!(x_label_positions(3), vec![0, 1, 2]);
        let many = x_label_positions(100);
        assert_eq!(many.len(), MAX_X_LABELS);
        assert_eq!(many.first(), Some(&0));
        assert_eq!(many.last(), Some(&99));
    }

    #[test]
    fn render_contains_title_legend_and_paths() {
        let svg = LineChart::new("A&B price over time", "Price")
            .line(Line::dense("Close", "#1f77b4", &[1.0, 2.0, 3.0]))
            .line(Line::new("MA", "#ff7f0e", vec![None, Some(1.5), Some(2.5)]))
            .render(&dates(3));
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("A&amp;B price over time"));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains(">Close</text>"));
        assert!(svg.contains("2024-01-03"));
    }

    #[test]
    fn fixed_range_and_guides() {
        let svg = LineChart::new("RSI", "RSI")
            .line(Line::new("RSI", "#9467bd", vec![None, Some(55.0)]))
            .y_range(0.0, 100.0)
            .guide(30.0)
            .guide(70.0)
            .render(&dates(2));
        assert_eq!(svg.matches("stroke-dasharray").count(), 2);
        assert!(svg.contains(">100.00</text>"));
    }

    #[test]
    fn flat_series_still_renders() {
        let svg = LineChart::new("flat", "Price")
            .line(Line::dense("Close", "#000", &[5.0, 5.0]))
            .render(&dates(2));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn histogram_bars_drawn() {
        let svg = LineChart::new("MACD", "MACD")
            .bars("Histogram", vec![1.0, -1.0, 0.5])
            .render(&dates(3));
        assert!(svg.contains("#7fbf7f"));
        assert!(svg.contains("#e08080"));
    }
}
