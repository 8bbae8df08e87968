use ndarray::ArrayView2;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{PlotError, PlotResult};
use crate::figure::font;

#[derive(Debug, Clone)]
pub struct CurvePlotStyle {
    pub fontsize: f64,
    pub bold: bool,
    pub title: Option<String>,
    pub dpi: f64,
}

impl Default for CurvePlotStyle {
    fn default() -> Self {
        CurvePlotStyle {
            fontsize: 16.0,
            bold: true,
            title: None,
            dpi: 100.0,
        }
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return None;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    Some((lo - pad, hi + pad))
}

/// One line per row of `mat` against `x`, legend entries `to 1`, `to 2`, ...
pub fn plot_curve<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    x: &[f64],
    mat: ArrayView2<f64>,
    style: &CurvePlotStyle,
) -> PlotResult<()> {
    if mat.ncols() != x.len() {
        return Err(PlotError::Drawing(format!(
            "{} abscissae for curves of length {}",
            x.len(),
            mat.ncols()
        )));
    }
    let x_range = finite_range(x.iter().copied())
        .ok_or_else(|| PlotError::Empty("curve abscissa".to_string()))?;
    let y_range = finite_range(mat.iter().copied())
        .ok_or_else(|| PlotError::Empty("curve ordinates".to_string()))?;

    let title = style.title.clone().unwrap_or_else(|| "curves".to_string());
    let mut chart = ChartBuilder::on(area)
        .caption(title, font(style.fontsize * 1.5, style.bold, style.dpi))
        .margin_right((area.dim_in_pixel().0 as f64 * 0.2) as u32)
        .x_label_area_size((style.fontsize * style.dpi / 72.0 * 1.5) as u32)
        .y_label_area_size((style.fontsize * style.dpi / 72.0 * 2.5) as u32)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .label_style(font(style.fontsize * 0.6, false, style.dpi))
        .draw()?;

    for (i, row) in mat.outer_iter().enumerate() {
        let color = Palette99::pick(i).mix(1.0);
        let points: Vec<(f64, f64)> = x.iter().copied().zip(row.iter().copied()).collect();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(format!("to {}", i + 1))
            .legend(move |(lx, ly)| {
                PathElement::new(vec![(lx, ly), (lx + 20, ly)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(font(style.fontsize * 0.6, false, style.dpi))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}
