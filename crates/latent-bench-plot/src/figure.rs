use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::PlotResult;

/// Black sans-serif text of `points` size at `dpi`.
pub fn font(points: f64, bold: bool, dpi: f64) -> TextStyle<'static> {
    let weight = if bold { FontStyle::Bold } else { FontStyle::Normal };
    FontDesc::new(FontFamily::SansSerif, points * dpi / 72.0, weight).color(&BLACK)
}

/// `(rows, cols)` needed for `n_panels` laid out `ncols` per row.
pub fn grid_shape(n_panels: usize, ncols: usize) -> (usize, usize) {
    let ncols = ncols.max(1);
    (n_panels.div_ceil(ncols).max(1), ncols)
}

/// PNG figure split into a grid of equally sized panels under a suptitle.
pub struct Figure<'a> {
    root: DrawingArea<BitMapBackend<'a>, Shift>,
    panels: Vec<DrawingArea<BitMapBackend<'a>, Shift>>,
}

impl<'a> Figure<'a> {
    pub fn grid(
        path: &'a Path,
        n_panels: usize,
        ncols: usize,
        panel_inches: f64,
        dpi: f64,
        suptitle: &str,
    ) -> PlotResult<Self> {
        let (nrows, ncols) = grid_shape(n_panels, ncols);
        let panel_px = (panel_inches * dpi).round() as u32;
        let size = (ncols as u32 * panel_px, nrows as u32 * panel_px);

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let body = root.titled(suptitle, font(20.0, false, dpi))?;

        let gap = (panel_px as f64 * 0.08) as i32;
        let panels = body
            .split_evenly((nrows, ncols))
            .into_iter()
            .take(n_panels)
            .map(|p| p.margin(gap, gap, gap, gap))
            .collect();
        log::debug!(
            "figure {}: {}x{} px, {} panels in {}x{}",
            path.display(),
            size.0,
            size.1,
            n_panels,
            nrows,
            ncols
        );
        Ok(Figure { root, panels })
    }

    pub fn panels(&self) -> &[DrawingArea<BitMapBackend<'a>, Shift>] {
        &self.panels
    }

    /// Encode and write the image.
    pub fn save(self) -> PlotResult<()> {
        self.root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_shape() {
        assert_eq!(grid_shape(7, 3), (3, 3));
        assert_eq!(grid_shape(3, 3), (1, 3));
        assert_eq!(grid_shape(1, 3), (1, 3));
        assert_eq!(grid_shape(0, 3), (1, 3));
    }

    #[test]
    fn test_grid_saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.png");
        let figure = Figure::grid(&path, 4, 3, 1.5, 50.0, "TOY RESULTS").unwrap();
        assert_eq!(figure.panels().len(), 4);
        for panel in figure.panels() {
            panel.fill(&BLUE.mix(0.2)).unwrap();
        }
        figure.save().unwrap();
        assert!(path.exists());
    }
}
