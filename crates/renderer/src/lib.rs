//! Image rendering for PM2.5 prediction maps.
//!
//! - [`equalize`]: histogram equalization of predictions
//! - [`colormap`]: Spectral_r color ramp, NaN-transparent grid rendering
//! - [`png`]: indexed/RGBA PNG encoding

pub mod colormap;
pub mod equalize;
pub mod png;

use pm25_common::{Pm25Error, Pm25Result};
use tracing::debug;

pub use colormap::{render_grid, spectral_r, Color};
pub use equalize::{equalize_hist, DEFAULT_BINS};

/// Render a row-major grid of (equalized) predictions to PNG bytes.
///
/// Each cell becomes a `scale` x `scale` block of pixels. Non-finite cells
/// are transparent.
pub fn render_prediction_map(
    grid: &[f64],
    width: usize,
    height: usize,
    scale: usize,
) -> Pm25Result<Vec<u8>> {
    if grid.len() != width * height {
        return Err(Pm25Error::RenderError(format!(
            "grid has {} cells, expected {}x{}",
            grid.len(),
            height,
            width
        )));
    }

    let scale = scale.max(1);
    let pixels = render_grid(grid, width, height, spectral_r);
    let pixels = colormap::upscale(&pixels, width, height, scale);
    let png = png::create_png_auto(&pixels, width * scale, height * scale)
        .map_err(|e| Pm25Error::RenderError(e.to_string()))?;

    debug!(width, height, scale, bytes = png.len(), "Rendered prediction map");
    Ok(png)
}
