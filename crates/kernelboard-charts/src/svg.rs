//! Standalone SVG documents for each chart family.
//!
//! Output depends only on the input shape: the same data always renders the
//! same bytes. Empty inputs render a frame with a "No data" caption.

use crate::adapter::{BarSeries, HeatmapMatrix, LineSeries, PieSlices, ScatterPoints};
use crate::color::Color;
use crate::geometry::{ArcGeometry, DataNormalizer, Point2D};

/// Default document width.
pub const WIDTH: f64 = 720.0;
/// Default document height.
pub const HEIGHT: f64 = 420.0;

const FONT: &str = "font-family=\"sans-serif\"";
const GRID: &str = "#e0e0e0";
const AXIS: &str = "#555555";
const Y_TICKS: usize = 5;

/// Escape text for use in SVG content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plotting area inside the document margins.
#[derive(Debug, Clone, Copy)]
struct Plot {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Plot {
    fn width(self) -> f64 {
        self.right - self.left
    }

    fn height(self) -> f64 {
        self.bottom - self.top
    }

    /// Vertical position of `value` on `scale`.
    fn y(self, scale: &DataNormalizer, value: f64) -> f64 {
        self.bottom - scale.normalize(value) * self.height()
    }

    /// Horizontal center of category `index` out of `count`.
    fn category_x(self, index: usize, count: usize) -> f64 {
        let step = self.width() / count.max(1) as f64;
        step.mul_add(index as f64 + 0.5, self.left)
    }
}

struct SvgDoc {
    buf: String,
    width: f64,
    height: f64,
}

impl SvgDoc {
    fn new(width: f64, height: f64, title: &str) -> Self {
        let mut buf = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" \
viewBox=\"0 0 {width:.0} {height:.0}\" role=\"img\">\
<title>{t}</title>\
<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>",
            t = escape(title)
        );
        buf.push_str(&format!(
            "<text x=\"{:.1}\" y=\"28\" text-anchor=\"middle\" {FONT} font-size=\"16\" font-weight=\"bold\">{}</text>",
            width / 2.0,
            escape(title)
        ));
        Self { buf, width, height }
    }

    fn push(&mut self, fragment: &str) {
        self.buf.push_str(fragment);
    }

    fn text(&mut self, x: f64, y: f64, anchor: &str, size: u32, body: &str) {
        self.buf.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"{anchor}\" {FONT} font-size=\"{size}\">{}</text>",
            escape(body)
        ));
    }

    fn no_data(mut self) -> String {
        let (x, y) = (self.width / 2.0, self.height / 2.0);
        self.buf.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" {FONT} font-size=\"14\" fill=\"#888888\">No data</text>"
        ));
        self.finish()
    }

    fn finish(mut self) -> String {
        self.buf.push_str("</svg>");
        self.buf
    }

    /// Horizontal grid lines with tick labels on the left edge.
    fn y_axis(&mut self, plot: Plot, scale: &DataNormalizer, label: &str) {
        for tick in scale.ticks(Y_TICKS) {
            let y = plot.y(scale, tick);
            self.push(&format!(
                "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{GRID}\"/>",
                plot.left, plot.right
            ));
            self.text(plot.left - 6.0, y + 4.0, "end", 11, &format_tick(tick));
        }
        self.push(&format!(
            "<line x1=\"{l:.1}\" y1=\"{t:.1}\" x2=\"{l:.1}\" y2=\"{b:.1}\" stroke=\"{AXIS}\"/>\
<line x1=\"{l:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\" stroke=\"{AXIS}\"/>",
            l = plot.left,
            t = plot.top,
            b = plot.bottom,
            r = plot.right
        ));
        let mid = (plot.top + plot.bottom) / 2.0;
        self.push(&format!(
            "<text x=\"16\" y=\"{mid:.1}\" text-anchor=\"middle\" {FONT} font-size=\"12\" \
transform=\"rotate(-90 16 {mid:.1})\">{}</text>",
            escape(label)
        ));
    }

    /// Category labels under the plot, slanted when crowded.
    fn x_categories(&mut self, plot: Plot, labels: &[&str], title: &str) {
        let slant = labels.len() > 6;
        for (i, label) in labels.iter().enumerate() {
            let x = plot.category_x(i, labels.len());
            let y = plot.bottom + 16.0;
            if slant {
                self.push(&format!(
                    "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"end\" {FONT} font-size=\"11\" \
transform=\"rotate(-35 {x:.1} {y:.1})\">{}</text>",
                    escape(label)
                ));
            } else {
                self.text(x, y, "middle", 11, label);
            }
        }
        let cx = (plot.left + plot.right) / 2.0;
        self.text(cx, self.height - 8.0, "middle", 12, title);
    }
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Heatmap with one row per `"job (arch)"` and one column per toolchain.
#[must_use]
pub fn heatmap(matrix: &HeatmapMatrix, title: &str) -> String {
    const CELL_HEIGHT: f64 = 26.0;
    const MIN_CELL_WIDTH: f64 = 24.0;
    const GAP: f64 = 3.0;

    // the document grows with the matrix so cells never shrink below the gap
    let width = (matrix.columns.len() as f64).mul_add(MIN_CELL_WIDTH, 310.0).max(WIDTH);
    let height = (matrix.rows.len() as f64).mul_add(CELL_HEIGHT, 150.0).max(HEIGHT);
    let mut doc = SvgDoc::new(width, height, title);
    if matrix.is_empty() {
        return doc.no_data();
    }
    let plot = Plot {
        left: 230.0,
        top: 50.0,
        right: width - 80.0,
        bottom: (matrix.rows.len() as f64).mul_add(CELL_HEIGHT, 50.0),
    };
    let max = matrix.max().max(1) as f32;
    let cell_width = plot.width() / matrix.columns.len() as f64;

    for (r, (label, cells)) in matrix.rows.iter().zip(&matrix.z).enumerate() {
        let y = (r as f64).mul_add(CELL_HEIGHT, plot.top);
        doc.text(plot.left - 8.0, y + CELL_HEIGHT / 2.0 + 4.0, "end", 11, label);
        for (c, &count) in cells.iter().enumerate() {
            let x = (c as f64).mul_add(cell_width, plot.left);
            let fill = Color::heat(count as f32 / max);
            let ink = if fill.luma() < 0.5 { "#ffffff" } else { "#000000" };
            doc.push(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\">\
<title>{} / {}: {count}</title></rect>\
<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" {FONT} font-size=\"12\" fill=\"{ink}\">{count}</text>",
                x + GAP / 2.0,
                y + GAP / 2.0,
                cell_width - GAP,
                CELL_HEIGHT - GAP,
                fill.to_hex(),
                escape(&matrix.columns[c]),
                escape(label),
                x + cell_width / 2.0,
                y + CELL_HEIGHT / 2.0 + 4.0
            ));
        }
    }

    let labels: Vec<&str> = matrix.columns.iter().map(String::as_str).collect();
    for (c, label) in labels.iter().enumerate() {
        let x = (c as f64 + 0.5).mul_add(cell_width, plot.left);
        doc.text(x, plot.bottom + 16.0, "middle", 11, label);
    }
    doc.text(
        (plot.left + plot.right) / 2.0,
        plot.bottom + 36.0,
        "middle",
        12,
        "Toolchain",
    );

    // color scale
    let (sx, sy, sh) = (width - 50.0, plot.top, plot.height().min(200.0));
    doc.push(&format!(
        "<defs><linearGradient id=\"heat\" x1=\"0\" y1=\"1\" x2=\"0\" y2=\"0\">\
<stop offset=\"0\" stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/></linearGradient></defs>\
<rect x=\"{sx:.1}\" y=\"{sy:.1}\" width=\"14\" height=\"{sh:.1}\" fill=\"url(#heat)\" stroke=\"{GRID}\"/>",
        Color::heat(0.0).to_hex(),
        Color::heat(1.0).to_hex()
    ));
    doc.text(sx + 18.0, sy + 10.0, "start", 10, &matrix.max().to_string());
    doc.text(sx + 18.0, sy + sh, "start", 10, "0");
    doc.finish()
}

/// Pie with percentage labels and a legend.
#[must_use]
pub fn pie(slices: &PieSlices, title: &str) -> String {
    let mut doc = SvgDoc::new(WIDTH, HEIGHT, title);
    if slices.is_empty() {
        return doc.no_data();
    }
    let center = Point2D::new(240.0, 225.0);
    let radius = 150.0;

    for (i, slice) in slices.slices.iter().enumerate() {
        let arc = ArcGeometry::new(center, radius, slice.start_angle, slice.end_angle);
        let fill = Color::palette(i).to_hex();
        let tooltip = format!(
            "<title>{}: {} ({:.1}%)</title>",
            escape(&slice.label),
            slice.value,
            slice.fraction * 100.0
        );
        if arc.is_full() {
            doc.push(&format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius:.2}\" fill=\"{fill}\" stroke=\"#ffffff\">{tooltip}</circle>",
                center.x, center.y
            ));
        } else {
            doc.push(&format!(
                "<path d=\"{}\" fill=\"{fill}\" stroke=\"#ffffff\">{tooltip}</path>",
                arc.to_svg_path()
            ));
        }
        if slice.fraction >= 0.04 {
            let at = arc.label_point(0.65);
            doc.text(
                at.x,
                at.y + 4.0,
                "middle",
                11,
                &format!("{:.1}% ({})", slice.fraction * 100.0, slice.value),
            );
        }
    }

    for (i, slice) in slices.slices.iter().enumerate() {
        let y = (i as f64).mul_add(20.0, 70.0);
        doc.push(&format!(
            "<rect x=\"440\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>",
            y - 10.0,
            Color::palette(i).to_hex()
        ));
        doc.text(458.0, y, "start", 12, &slice.label);
    }
    doc.finish()
}

/// Vertical bars, one color per category.
#[must_use]
pub fn bar(series: &BarSeries, title: &str, x_label: &str, y_label: &str) -> String {
    let mut doc = SvgDoc::new(WIDTH, HEIGHT, title);
    if series.is_empty() {
        return doc.no_data();
    }
    let plot = standard_plot();
    let scale = DataNormalizer::counts(series.max());
    doc.y_axis(plot, &scale, y_label);

    let n = series.bars.len();
    let band = plot.width() / n as f64;
    let bar_width = band * 0.7;
    for (i, (label, value)) in series.bars.iter().enumerate() {
        let top = plot.y(&scale, *value as f64);
        let x = plot.category_x(i, n) - bar_width / 2.0;
        doc.push(&format!(
            "<rect x=\"{x:.1}\" y=\"{top:.1}\" width=\"{bar_width:.1}\" height=\"{:.1}\" fill=\"{}\">\
<title>{}: {value}</title></rect>",
            plot.bottom - top,
            Color::palette(i).to_hex(),
            escape(label)
        ));
        doc.text(x + bar_width / 2.0, top - 4.0, "middle", 11, &value.to_string());
    }
    let labels: Vec<&str> = series.bars.iter().map(|(l, _)| l.as_str()).collect();
    doc.x_categories(plot, &labels, x_label);
    doc.finish()
}

/// Labelled points on two count axes.
#[must_use]
pub fn scatter(points: &ScatterPoints, title: &str, x_label: &str, y_label: &str) -> String {
    let mut doc = SvgDoc::new(WIDTH, HEIGHT, title);
    if points.is_empty() {
        return doc.no_data();
    }
    let plot = standard_plot();
    let y_scale = DataNormalizer::counts(points.points.iter().map(|p| p.y).max().unwrap_or(0));
    let x_scale = DataNormalizer::counts(points.points.iter().map(|p| p.x).max().unwrap_or(0));
    doc.y_axis(plot, &y_scale, y_label);

    for tick in x_scale.ticks(Y_TICKS) {
        let x = x_scale.normalize(tick).mul_add(plot.width(), plot.left);
        doc.text(x, plot.bottom + 16.0, "middle", 11, &format_tick(tick));
    }
    doc.text(
        (plot.left + plot.right) / 2.0,
        HEIGHT - 8.0,
        "middle",
        12,
        x_label,
    );

    for (i, p) in points.points.iter().enumerate() {
        let cx = x_scale.normalize(p.x as f64).mul_add(plot.width(), plot.left);
        let cy = plot.y(&y_scale, p.y as f64);
        doc.push(&format!(
            "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"6\" fill=\"{}\" fill-opacity=\"0.85\">\
<title>{}: {} builds, {} tests</title></circle>",
            Color::palette(i).to_hex(),
            escape(&p.label),
            p.x,
            p.y
        ));
        doc.text(cx + 9.0, cy - 6.0, "start", 10, &p.label);
    }
    doc.finish()
}

/// Polyline over categorical x positions.
#[must_use]
pub fn line(series: &LineSeries, title: &str, x_label: &str, y_label: &str) -> String {
    let mut doc = SvgDoc::new(WIDTH, HEIGHT, title);
    if series.is_empty() {
        return doc.no_data();
    }
    let plot = standard_plot();
    let scale = DataNormalizer::counts(series.max());
    doc.y_axis(plot, &scale, y_label);

    let n = series.points.len();
    let coords: Vec<Point2D> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| Point2D::new(plot.category_x(i, n), plot.y(&scale, *v as f64)))
        .collect();
    let path: Vec<String> = coords
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect();
    let stroke = Color::palette(4).to_hex();
    doc.push(&format!(
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
        path.join(" ")
    ));
    for (p, (label, value)) in coords.iter().zip(&series.points) {
        doc.push(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{stroke}\"><title>{}: {value}</title></circle>",
            p.x,
            p.y,
            escape(label)
        ));
    }
    let labels: Vec<&str> = series.points.iter().map(|(l, _)| l.as_str()).collect();
    doc.x_categories(plot, &labels, x_label);
    doc.finish()
}

fn standard_plot() -> Plot {
    Plot {
        left: 70.0,
        top: 50.0,
        right: WIDTH - 30.0,
        bottom: HEIGHT - 90.0,
    }
}
