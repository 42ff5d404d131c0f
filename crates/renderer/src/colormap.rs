//! Color-mapped rendering of gridded predictions.

use rayon::prelude::*;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

/// ColorBrewer "Spectral" reversed: blue-violet for low values, deep red for high.
pub const SPECTRAL_R: [Color; 11] = [
    Color::opaque(94, 79, 162),
    Color::opaque(50, 136, 189),
    Color::opaque(102, 194, 165),
    Color::opaque(171, 221, 164),
    Color::opaque(230, 245, 152),
    Color::opaque(255, 255, 191),
    Color::opaque(254, 224, 139),
    Color::opaque(253, 174, 97),
    Color::opaque(244, 109, 67),
    Color::opaque(213, 62, 79),
    Color::opaque(158, 1, 66),
];

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| (a as f64 * t_inv + b as f64 * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Map a normalized value (0-1) onto evenly spaced color stops.
pub fn ramp_color(stops: &[Color], t: f64) -> Color {
    match stops {
        [] => Color::transparent(),
        [only] => *only,
        _ => {
            let t = t.clamp(0.0, 1.0);
            let segments = (stops.len() - 1) as f64;
            let pos = t * segments;
            let i = (pos.floor() as usize).min(stops.len() - 2);
            interpolate_color(stops[i], stops[i + 1], pos - i as f64)
        }
    }
}

/// Spectral_r color for a normalized value.
pub fn spectral_r(t: f64) -> Color {
    ramp_color(&SPECTRAL_R, t)
}

/// Finite (min, max) of the data, or `None` when nothing is finite.
pub fn value_range(data: &[f64]) -> Option<(f64, f64)> {
    data.iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Render grid data as a color-mapped image.
///
/// Values are scaled linearly from the finite data range to 0-1 before
/// `color_fn` is applied. Non-finite cells are transparent.
///
/// # Arguments
/// - `data`: grid values (row-major order)
/// - `width`: Number of columns
/// - `height`: Number of rows
/// - `color_fn`: Function to convert a normalized value (0-1) to a color
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel)
pub fn render_grid<F>(data: &[f64], width: usize, height: usize, color_fn: F) -> Vec<u8>
where
    F: Fn(f64) -> Color + Sync,
{
    let mut pixels = vec![0u8; width * height * 4];
    let Some((min_val, max_val)) = value_range(data) else {
        return pixels;
    };
    let range = max_val - min_val;

    if width == 0 {
        return pixels;
    }

    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let Some(&value) = data.get(y * width + x) else {
                    continue;
                };
                if !value.is_finite() {
                    continue;
                }
                let normalized = if range > 0.0 { (value - min_val) / range } else { 0.0 };
                let color = color_fn(normalized);
                row[x * 4..x * 4 + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
            }
        });

    pixels
}

/// Enlarge an RGBA image by an integer factor, replicating each pixel.
pub fn upscale(pixels: &[u8], width: usize, height: usize, factor: usize) -> Vec<u8> {
    if factor <= 1 {
        return pixels.to_vec();
    }
    let out_width = width * factor;
    let mut out = Vec::with_capacity(pixels.len() * factor * factor);
    for y in 0..height {
        let row = &pixels[y * width * 4..(y + 1) * width * 4];
        let mut scaled_row = Vec::with_capacity(out_width * 4);
        for pixel in row.chunks_exact(4) {
            for _ in 0..factor {
                scaled_row.extend_from_slice(pixel);
            }
        }
        for _ in 0..factor {
            out.extend_from_slice(&scaled_row);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(spectral_r(0.0), SPECTRAL_R[0]);
        assert_eq!(spectral_r(1.0), SPECTRAL_R[10]);
        assert_eq!(spectral_r(0.5), SPECTRAL_R[5]);
    }

    #[test]
    fn test_ramp_clamps() {
        assert_eq!(spectral_r(-3.0), SPECTRAL_R[0]);
        assert_eq!(spectral_r(7.0), SPECTRAL_R[10]);
    }

    #[test]
    fn test_value_range_skips_nan() {
        assert_eq!(value_range(&[f64::NAN, 2.0, -1.0]), Some((-1.0, 2.0)));
        assert_eq!(value_range(&[f64::NAN]), None);
    }

    #[test]
    fn test_upscale() {
        let pixels = [1, 2, 3, 4, 5, 6, 7, 8];
        let out = upscale(&pixels, 2, 1, 2);
        assert_eq!(out.len(), 4 * 2 * 4);
        assert_eq!(&out[0..8], &[1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(&out[16..24], &[1, 2, 3, 4, 1, 2, 3, 4]);
    }
}
