use ndarray::ArrayView2;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{PlotError, PlotResult};
use crate::figure::font;
use crate::palette::Palette;

#[derive(Debug, Clone)]
pub struct MatPlotStyle {
    pub fontsize: f64,
    pub bold: bool,
    /// Defaults to the matrix key.
    pub title: Option<String>,
    /// Colour scale limits; the data range when unset.
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub dpi: f64,
}

impl Default for MatPlotStyle {
    fn default() -> Self {
        MatPlotStyle {
            fontsize: 16.0,
            bold: true,
            title: None,
            vmin: None,
            vmax: None,
            dpi: 100.0,
        }
    }
}

/// Colour limits of `mat`, ignoring NaN, overridden by the style.
pub fn color_limits(mat: ArrayView2<f64>, vmin: Option<f64>, vmax: Option<f64>) -> (f64, f64) {
    let (lo, hi) = mat
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let lo = vmin.unwrap_or(if lo.is_finite() { lo } else { 0.0 });
    let hi = vmax.unwrap_or(if hi.is_finite() { hi } else { 1.0 });
    (lo, hi)
}

/// Heatmap of `mat` with the Reds map, row 0 on top.
pub fn plot_mat<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    key: &str,
    mat: ArrayView2<f64>,
    style: &MatPlotStyle,
) -> PlotResult<()> {
    let (nrows, ncols) = mat.dim();
    if nrows == 0 || ncols == 0 {
        return Err(PlotError::Empty(key.to_string()));
    }
    let (vmin, vmax) = color_limits(mat, style.vmin, style.vmax);
    let span = if vmax > vmin { vmax - vmin } else { 1.0 };

    let title = style.title.as_deref().unwrap_or(key);
    let mut chart = ChartBuilder::on(area)
        .caption(title, font(style.fontsize * 1.5, style.bold, style.dpi))
        .x_label_area_size((style.fontsize * style.dpi / 72.0 * 1.5) as u32)
        .y_label_area_size((style.fontsize * style.dpi / 72.0 * 2.0) as u32)
        .build_cartesian_2d(0f64..ncols as f64, 0f64..nrows as f64)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(ncols.min(10))
        .y_labels(nrows.min(10))
        .y_label_formatter(&|v| format!("{}", (nrows as f64 - v).floor()))
        .label_style(font(style.fontsize * 0.6, false, style.dpi))
        .draw()?;

    chart.draw_series(mat.indexed_iter().map(|((r, c), &v)| {
        let color = if v.is_nan() {
            WHITE
        } else {
            Palette::Reds.at((v - vmin) / span)
        };
        let top = (nrows - r) as f64;
        Rectangle::new([(c as f64, top - 1.0), (c as f64 + 1.0, top)], color.filled())
    }))?;
    Ok(())
}
