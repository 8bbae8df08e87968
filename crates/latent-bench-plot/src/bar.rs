use latent_bench_stats::{
    pairwise_ttests, significance_stars, significant_pairs, ttest_1samp, Condition, PairwiseRow,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PlotError, PlotResult};
use crate::figure::font;
use crate::palette::Palette;

/// Appearance and annotation switches for [`plot_bar`].
///
/// Sizes are in points and converted with `dpi`.
#[derive(Debug, Clone)]
pub struct BarPlotStyle {
    pub fontsize: f64,
    pub fontsize_star: f64,
    pub bold: bool,
    pub line_width: f64,
    pub marker_size: f64,
    /// Defaults to the analysis key.
    pub title: Option<String>,
    pub palette: Palette,
    pub report_t: bool,
    pub do_pairwise_stars: bool,
    pub do_one_sample_stars: bool,
    pub yname: String,
    pub dpi: f64,
    /// Seed for the bootstrap intervals and the strip jitter.
    pub seed: u64,
}

impl Default for BarPlotStyle {
    fn default() -> Self {
        BarPlotStyle {
            fontsize: 16.0,
            fontsize_star: 25.0,
            bold: true,
            line_width: 2.5,
            marker_size: 0.1,
            title: None,
            palette: Palette::Spectral,
            report_t: false,
            do_pairwise_stars: false,
            do_one_sample_stars: true,
            yname: "model fit (r)".to_string(),
            dpi: 100.0,
            seed: 0,
        }
    }
}

impl BarPlotStyle {
    fn px(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }

    fn font(&self, points: f64) -> TextStyle<'static> {
        font(points, self.bold, self.dpi)
    }

    fn stroke(&self) -> u32 {
        self.px(self.line_width).round().max(1.0) as u32
    }
}

/// Tick label for a condition: `_`-separated parts minus the last one, one per line.
///
/// Names without an underscore are kept whole.
pub fn tick_label(name: &str) -> String {
    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() == 1 {
        return name.to_string();
    }
    parts[..parts.len() - 1].join("\n")
}

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Percentile of sorted data with linear interpolation.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// 95% percentile bootstrap interval of the mean.
pub fn bootstrap_ci<R: Rng>(values: &[f64], n_boot: usize, rng: &mut R) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len();
    let mut means: Vec<f64> = (0..n_boot)
        .map(|_| (0..n).map(|_| values[rng.gen_range(0..n)]).sum::<f64>() / n as f64)
        .collect();
    means.sort_by(|a, b| a.total_cmp(b));
    (percentile(&means, 2.5), percentile(&means, 97.5))
}

struct BarSummary {
    values: Vec<f64>,
    mean: f64,
    ci: (f64, f64),
}

fn summarize(conditions: &[Condition], rng: &mut StdRng) -> Vec<BarSummary> {
    conditions
        .iter()
        .map(|c| {
            let values: Vec<f64> = c.values.iter().cloned().filter(|v| v.is_finite()).collect();
            let mean = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            let ci = bootstrap_ci(&values, 1000, rng);
            BarSummary { values, mean, ci }
        })
        .collect()
}

/// Vertical extent: `(lower, data upper)`, bars always include zero.
fn value_range(bars: &[BarSummary]) -> (f64, f64) {
    let mut lo: f64 = 0.0;
    let mut hi: f64 = 0.0;
    for bar in bars {
        for &v in bar.values.iter().chain([bar.mean, bar.ci.0, bar.ci.1].iter()) {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    let span = if hi - lo > 0.0 { hi - lo } else { 1.0 };
    let lo = if lo < 0.0 { lo - 0.05 * span } else { lo };
    (lo, hi + 0.05 * span)
}

/// Bar plot of per-condition means with bootstrap error bars and strip points.
///
/// Returns the pairwise t-tests when `report_t` or `do_pairwise_stars` is set.
pub fn plot_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    key: &str,
    conditions: &[Condition],
    style: &BarPlotStyle,
) -> PlotResult<Option<Vec<PairwiseRow>>> {
    if conditions.is_empty() {
        return Err(PlotError::Empty(format!("no conditions for '{}'", key)));
    }
    let n = conditions.len();
    let mut rng = StdRng::seed_from_u64(style.seed);
    let bars = summarize(conditions, &mut rng);

    let mut labels: Vec<String> = conditions.iter().map(|c| tick_label(&c.name)).collect();
    if style.do_one_sample_stars {
        for (label, cond) in labels.iter_mut().zip(conditions) {
            let res = ttest_1samp(&cond.values, 0.0);
            label.push_str(&format!("\n({})", significance_stars(res.pvalue)));
        }
    }

    let pairwise = if style.report_t || style.do_pairwise_stars {
        Some(pairwise_ttests(key, conditions))
    } else {
        None
    };
    let brackets = match (&pairwise, style.do_pairwise_stars) {
        (Some(rows), true) => significant_pairs(rows, n),
        _ => Vec::new(),
    };

    let (y_lo, y_hi) = value_range(&bars);
    let span = y_hi - y_lo;
    let bracket_step = 0.08 * span;
    let mut y_top = if y_hi > 0.0 { y_hi * 1.1 } else { y_hi + 0.1 * span };
    y_top += bracket_step * brackets.len() as f64;

    let font_px = style.px(style.fontsize);
    let line_px = (font_px * 1.2).ceil() as i32;
    let max_lines = labels.iter().map(|l| l.lines().count()).max().unwrap_or(1) as i32;
    let lw = style.stroke();
    let title = style.title.clone().unwrap_or_else(|| key.to_string());

    let mut chart = ChartBuilder::on(area)
        .margin(8)
        .caption(title, style.font(style.fontsize * 1.5))
        .x_label_area_size((max_lines * line_px + 8) as u32)
        .y_label_area_size((font_px * 6.0) as u32)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_lo..y_top)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_label_formatter(&|_| String::new())
        .set_all_tick_mark_size(0)
        .axis_style(BLACK.stroke_width(lw))
        .y_desc(style.yname.as_str())
        .axis_desc_style(style.font(style.fontsize))
        .draw()?;

    let colors: Vec<RGBColor> = (0..n).map(|i| style.palette.color(i, n)).collect();
    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, bar.mean)], colors[i].mix(0.3).filled())
    }))?;
    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, bar.mean)], colors[i].stroke_width(lw))
    }))?;

    let radius = (style.px(style.marker_size) / 2.0).round().max(1.0) as u32;
    let mut points = Vec::new();
    for (i, bar) in bars.iter().enumerate() {
        for &v in &bar.values {
            let jitter = rng.gen_range(-0.15..=0.15);
            points.push((i as f64 + jitter, v));
        }
    }
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), radius, BLACK.filled())),
    )?;

    chart.draw_series(
        bars.iter()
            .enumerate()
            .filter(|(_, bar)| bar.ci.0.is_finite() && bar.ci.1.is_finite())
            .map(|(i, bar)| {
                PathElement::new(
                    vec![(i as f64, bar.ci.0), (i as f64, bar.ci.1)],
                    RED.stroke_width(lw),
                )
            }),
    )?;

    // Brackets over significant pairs, stacked from the lowest pair upwards.
    let star_font = style
        .font(style.fontsize_star)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    for (level, &(i, j, stars)) in brackets.iter().enumerate() {
        let y = y_hi + bracket_step * (level as f64 + 0.5);
        let h = bracket_step * 0.25;
        let (xi, xj) = (i as f64, j as f64);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(xi, y - h), (xi, y), (xj, y), (xj, y - h)],
            BLACK.stroke_width(lw),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            stars.to_string(),
            ((xi + xj) / 2.0, y),
            star_font.clone(),
        )))?;
    }

    // Six evenly spaced y ticks and the multi-line x tick labels are placed
    // in pixels relative to this panel.
    let (base_x, base_y) = area.get_base_pixel();
    let tick_font = style.font(style.fontsize);
    let y_tick_font = tick_font.clone().pos(Pos::new(HPos::Right, VPos::Center));
    for v in linspace(y_lo, y_hi, 6) {
        let (px, py) = chart.backend_coord(&(-0.5, v));
        let (x, y) = (px - base_x, py - base_y);
        area.draw(&PathElement::new(vec![(x - 5, y), (x, y)], BLACK.stroke_width(lw)))?;
        area.draw(&Text::new(format!("{:.2}", v), (x - 8, y), y_tick_font.clone()))?;
    }
    let x_tick_font = tick_font.pos(Pos::new(HPos::Center, VPos::Top));
    for (i, label) in labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64, y_lo));
        let (x, y) = (px - base_x, py - base_y + 6);
        for (k, line) in label.lines().enumerate() {
            area.draw(&Text::new(
                line.to_string(),
                (x, y + k as i32 * line_px),
                x_tick_font.clone(),
            ))?;
        }
    }

    Ok(pairwise)
}
