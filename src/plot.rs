//! PNG figure with one mean-SWE panel per water year.

use image::{Rgb, RgbImage};
use ndarray::Array2;
use palette::{LinSrgb, Mix, Srgb};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("nothing to plot")]
    NoPanels,

    #[error("figure of {width}x{height} pixels is too large")]
    TooLarge { width: u64, height: u64 },

    #[error("failed to write figure: {0}")]
    Image(#[from] image::ImageError),
}

/// Layout and colours of the figure. Passed to the renderer explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    /// Panels per row.
    pub columns: usize,
    /// Edge length, in figure pixels, of one raster cell.
    pub cell_size: u32,
    pub padding: u32,
    pub colorbar_height: u32,
    pub background: [u8; 3],
    pub low_color: [u8; 3],
    pub high_color: [u8; 3],
    pub nodata_color: [u8; 3],
    pub mask_color: [u8; 3],
    /// Weight of the mask colour over non-seasonal-snow cells, in [0, 1].
    pub mask_opacity: f32,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            columns: 4,
            cell_size: 4,
            padding: 8,
            colorbar_height: 12,
            background: [255, 255, 255],
            low_color: [247, 251, 255],
            high_color: [8, 48, 107],
            nodata_color: [200, 200, 200],
            mask_color: [220, 50, 47],
            mask_opacity: 0.6,
        }
    }
}

/// Mean spatial SWE of one water year with its non-seasonal-snow cells.
#[derive(Debug, Clone)]
pub struct YearPanel {
    pub year: i32,
    /// Per-pixel mean over the year, NaN where no day had data.
    pub mean: Array2<f64>,
    /// True where the mask flags non-seasonal snow.
    pub non_seasonal: Array2<bool>,
}

/// Minimum and maximum over every finite value of every panel.
pub fn color_range(panels: &[YearPanel]) -> (f64, f64) {
    let finite = || {
        panels
            .iter()
            .flat_map(|p| p.mean.iter().copied())
            .filter(|v| v.is_finite())
    };
    match (finite().reduce(f64::min), finite().reduce(f64::max)) {
        (Some(lo), Some(hi)) if hi > lo => (lo, hi),
        (Some(lo), Some(_)) => (lo, lo + 1.0),
        _ => (0.0, 1.0),
    }
}

struct Colormap {
    low: LinSrgb,
    high: LinSrgb,
    min: f64,
    max: f64,
}

impl Colormap {
    fn new(style: &FigureStyle, (min, max): (f64, f64)) -> Self {
        Self {
            low: to_linear(style.low_color),
            high: to_linear(style.high_color),
            min,
            max,
        }
    }

    fn at_fraction(&self, t: f32) -> LinSrgb {
        self.low.mix(self.high, t.clamp(0.0, 1.0))
    }

    fn at_value(&self, value: f64) -> LinSrgb {
        self.at_fraction(((value - self.min) / (self.max - self.min)) as f32)
    }
}

fn to_linear([r, g, b]: [u8; 3]) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

fn to_pixel(color: LinSrgb) -> Rgb<u8> {
    let srgb: Srgb<u8> = Srgb::<f32>::from_linear(color).into_format();
    Rgb([srgb.red, srgb.green, srgb.blue])
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Draws the panels on a grid, in the order given, with a shared colour bar
/// along the bottom edge.
pub fn render(panels: &[YearPanel], style: &FigureStyle) -> Result<RgbImage, PlotError> {
    if panels.is_empty() {
        return Err(PlotError::NoPanels);
    }

    let rows_cells = panels.iter().map(|p| p.mean.nrows()).max().unwrap_or(0) as u64;
    let cols_cells = panels.iter().map(|p| p.mean.ncols()).max().unwrap_or(0) as u64;
    let cell = u64::from(style.cell_size.max(1));
    let pad = u64::from(style.padding);
    let columns = style.columns.clamp(1, panels.len()) as u64;
    let rows = (panels.len() as u64).div_ceil(columns);

    let panel_w = cols_cells * cell;
    let panel_h = rows_cells * cell;
    let width = columns * panel_w + (columns + 1) * pad;
    let height = rows * panel_h + (rows + 2) * pad + u64::from(style.colorbar_height);

    let too_large = || PlotError::TooLarge { width, height };
    let width = u32::try_from(width).map_err(|_| too_large())?;
    let height = u32::try_from(height).map_err(|_| too_large())?;
    let (cell, pad, panel_w, panel_h) = (cell as u32, pad as u32, panel_w as u32, panel_h as u32);

    let colormap = Colormap::new(style, color_range(panels));
    let mask_color = to_linear(style.mask_color);
    let nodata = Rgb(style.nodata_color);

    let mut img = RgbImage::from_pixel(width, height, Rgb(style.background));

    for (i, panel) in panels.iter().enumerate() {
        let col = (i as u32) % columns as u32;
        let row = (i as u32) / columns as u32;
        let x0 = pad + col * (panel_w + pad);
        let y0 = pad + row * (panel_h + pad);

        for ((r, c), &value) in panel.mean.indexed_iter() {
            let masked = panel.non_seasonal.get((r, c)).copied().unwrap_or(false);
            let color = match (value.is_finite(), masked) {
                (true, false) => to_pixel(colormap.at_value(value)),
                (true, true) => to_pixel(
                    colormap
                        .at_value(value)
                        .mix(mask_color, style.mask_opacity.clamp(0.0, 1.0)),
                ),
                (false, true) => to_pixel(mask_color),
                (false, false) => nodata,
            };
            fill_rect(&mut img, x0 + c as u32 * cell, y0 + r as u32 * cell, cell, cell, color);
        }
    }

    let bar_y = pad + rows as u32 * (panel_h + pad);
    let bar_w = width.saturating_sub(2 * pad).max(1);
    for x in 0..bar_w {
        let t = if bar_w > 1 {
            x as f32 / (bar_w - 1) as f32
        } else {
            0.0
        };
        fill_rect(
            &mut img,
            pad + x,
            bar_y,
            1,
            style.colorbar_height,
            to_pixel(colormap.at_fraction(t)),
        );
    }

    Ok(img)
}

pub fn render_figure(
    path: &Path,
    panels: &[YearPanel],
    style: &FigureStyle,
) -> Result<(), PlotError> {
    let img = render(panels, style)?;
    img.save(path)?;
    log::info!(
        "Figure with {} panel(s) saved to {}",
        panels.len(),
        path.display()
    );
    Ok(())
}
